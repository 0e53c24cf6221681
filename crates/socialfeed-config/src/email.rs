use std::time::Duration;

use crate::env_util::{flag_or, parsed_or, string_or};

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub frontend_url: String,
    /// How long an activation link stays valid.
    pub invitation_ttl: Duration,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@socialfeed.local".to_string(),
            from_name: "SocialFeed".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            invitation_ttl: Duration::from_secs(60 * 60 * 24),
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: flag_or("SMTP_ENABLED", defaults.enabled),
            smtp_host: string_or("SMTP_HOST", &defaults.smtp_host),
            smtp_port: parsed_or("SMTP_PORT", defaults.smtp_port),
            smtp_username: string_or("SMTP_USERNAME", ""),
            smtp_password: string_or("SMTP_PASSWORD", ""),
            from_email: string_or("SMTP_FROM_EMAIL", &defaults.from_email),
            from_name: string_or("SMTP_FROM_NAME", &defaults.from_name),
            frontend_url: string_or("FRONTEND_URL", &defaults.frontend_url),
            invitation_ttl: Duration::from_secs(parsed_or(
                "INVITATION_EXPIRY_SECS",
                defaults.invitation_ttl.as_secs(),
            )),
        }
    }

    pub fn activation_url(&self, token: &str) -> String {
        format!("{}/confirm/{}", self.frontend_url.trim_end_matches('/'), token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_url() {
        let config = EmailConfig {
            frontend_url: "https://feed.example/".to_string(),
            ..EmailConfig::default()
        };
        assert_eq!(
            config.activation_url("abc123"),
            "https://feed.example/confirm/abc123"
        );
    }
}
