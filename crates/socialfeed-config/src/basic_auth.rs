use std::fmt;

use crate::env_util::string_or;

/// Operator credentials guarding the health and metrics endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl Default for BasicAuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl BasicAuthConfig {
    pub fn from_env() -> Self {
        Self {
            username: string_or("BASIC_AUTH_USERNAME", "admin"),
            password: string_or("BASIC_AUTH_PASSWORD", "admin"),
        }
    }
}

impl fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}
