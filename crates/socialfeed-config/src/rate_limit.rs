//! Fixed-window rate limiting configuration.
//!
//! - `RATE_LIMITER_ENABLED`: toggle the limiter (default: true)
//! - `RATE_LIMITER_REQUESTS`: admitted requests per client per window (default: 20)
//! - `RATE_LIMITER_WINDOW_SECS`: window length in seconds (default: 5)
//! - `RATE_LIMITER_TRUST_PROXY`: key clients on `X-Forwarded-For` / `X-Real-IP`
//!   instead of the peer address (default: false)
//!
//! A client's window opens on its first request and closes `window` later;
//! windows are not aligned to wall-clock boundaries.

use std::time::Duration;

use crate::env_util::{flag_or, parsed_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_window: u32,
    pub window: Duration,
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_window: 20,
            window: Duration::from_secs(5),
            trust_proxy_headers: false,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: flag_or("RATE_LIMITER_ENABLED", defaults.enabled),
            requests_per_window: parsed_or("RATE_LIMITER_REQUESTS", defaults.requests_per_window)
                .max(1),
            window: Duration::from_secs(
                parsed_or("RATE_LIMITER_WINDOW_SECS", defaults.window.as_secs()).max(1),
            ),
            trust_proxy_headers: flag_or("RATE_LIMITER_TRUST_PROXY", defaults.trust_proxy_headers),
        }
    }

    /// Config used when the limiter is switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.requests_per_window, 20);
        assert_eq!(config.window, Duration::from_secs(5));
        assert!(!config.trust_proxy_headers);
    }

    #[test]
    fn test_disabled_keeps_other_defaults() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.requests_per_window, 20);
    }
}
