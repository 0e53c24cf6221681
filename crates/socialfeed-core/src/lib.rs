//! # SocialFeed Core
//!
//! Types shared by every crate in the workspace:
//!
//! - [`errors`]: the [`AppError`] taxonomy returned by handlers and the
//!   [`StoreError`] returned by persistence backends
//! - [`password`]: bcrypt hashing helpers

pub mod errors;
pub mod password;

pub use errors::{AppError, ErrorKind, StoreError, StoreResult};
