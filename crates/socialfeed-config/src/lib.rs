//! # SocialFeed Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`server`]: listen address, environment name, public URLs
//! - [`jwt`]: session token signing and validation
//! - [`basic_auth`]: operator credentials for administrative endpoints
//! - [`rate_limit`]: fixed-window admission control
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP delivery and invitation lifetime
//!
//! Every struct has a `from_env()` constructor that falls back to the
//! `Default` value for anything unset or unparsable.
//!
//! # Example
//!
//! ```ignore
//! use socialfeed_config::{JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod basic_auth;
pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod server;

mod env_util;

pub use basic_auth::BasicAuthConfig;
pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
