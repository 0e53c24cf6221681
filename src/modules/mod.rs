//! Feature modules. Each has a `controller.rs` with the handlers and a
//! `router.rs` mounting them; modules with logic beyond a store call add a
//! `service.rs`.

pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod users;
