//! Session token configuration.
//!
//! - `AUTH_TOKEN_SECRET`: HMAC secret shared by issue and verify
//! - `AUTH_TOKEN_EXPIRY_SECS`: token lifetime (default: 3 days)
//! - `AUTH_TOKEN_ISSUER` / `AUTH_TOKEN_AUDIENCE`: exact-match `iss`/`aud` claims

use std::fmt;

use crate::env_util::{parsed_or, string_or};

const DEV_SECRET: &str = "socialfeed-dev-secret-change-in-production";

#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_seconds: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiry_seconds: 60 * 60 * 24 * 3,
            issuer: "socialfeed".to_string(),
            audience: "socialfeed".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let issuer = string_or("AUTH_TOKEN_ISSUER", &defaults.issuer);
        Self {
            secret: string_or("AUTH_TOKEN_SECRET", DEV_SECRET),
            expiry_seconds: parsed_or("AUTH_TOKEN_EXPIRY_SECS", defaults.expiry_seconds),
            audience: string_or("AUTH_TOKEN_AUDIENCE", &issuer),
            issuer,
        }
    }
}

// The secret must never reach a log line.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiry_seconds", &self.expiry_seconds)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}
