//! # SocialFeed API
//!
//! A social feed backend built with Axum and PostgreSQL: users register and
//! activate by email, exchange credentials for session tokens, publish posts,
//! comment, follow each other and read a personalized feed.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/   # rate limit, bearer/basic auth, ownership, request context
//! ├── modules/      # auth, posts, comments, users, health
//! ├── store/        # store traits with postgres and in-memory backends
//! ├── mailer.rs     # welcome mail delivery
//! ├── state.rs      # AppState and startup wiring
//! └── router.rs     # /v1 routes, docs and tower layers
//! ```
//!
//! Each request passes rate limiting, then bearer verification and identity
//! loading, then (for post mutations) the ownership-or-role check, before the
//! handler runs.
//!
//! ## Post concurrency
//!
//! Posts carry a `version`. Updates must echo the version they read; the store
//! applies them with one conditional statement and bumps the version. A stale
//! version is answered with 404, same as a missing post.
//!
//! ## API Documentation
//!
//! - Swagger UI: `/swagger-ui`
//! - Scalar: `/scalar`

pub mod docs;
pub mod logging;
pub mod mailer;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod response;
pub mod router;
pub mod state;
pub mod store;
pub mod validator;

pub use socialfeed_auth;
pub use socialfeed_config;
pub use socialfeed_core;
pub use socialfeed_db;
pub use socialfeed_models;
pub use socialfeed_ratelimit;
