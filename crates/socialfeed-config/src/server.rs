use crate::env_util::{parsed_or, string_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: String,
    pub env: String,
    pub version: String,
    pub api_url: String,
    /// bcrypt work factor for newly hashed passwords.
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            env: "development".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_url: "http://localhost:8080".to_string(),
            bcrypt_cost: 12,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: string_or("ADDR", &defaults.addr),
            env: string_or("ENV", &defaults.env),
            version: defaults.version,
            api_url: string_or("EXTERNAL_URL", &defaults.api_url),
            bcrypt_cost: parsed_or("BCRYPT_COST", defaults.bcrypt_cost).clamp(4, 31),
        }
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}
