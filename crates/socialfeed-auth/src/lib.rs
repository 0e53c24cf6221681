//! # SocialFeed Auth
//!
//! - [`claims`]: the [`SessionClaims`] carried by session tokens
//! - [`jwt`]: the [`TokenAuthenticator`] that issues and verifies them

pub mod claims;
pub mod jwt;

pub use claims::SessionClaims;
pub use jwt::TokenAuthenticator;
