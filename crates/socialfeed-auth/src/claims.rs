//! Claim set carried by session tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registered JWT claims for a session.
///
/// `sub` holds the decimal identity id. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Identity id (subject claim)
    pub sub: String,
    /// Issued-at timestamp
    pub iat: i64,
    /// Not-before timestamp
    pub nbf: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl SessionClaims {
    /// Claims for `subject` valid from `now` for `ttl_seconds`.
    pub fn new(subject: impl ToString, now: i64, ttl_seconds: i64, iss: &str, aud: &str) -> Self {
        Self {
            sub: subject.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl_seconds,
            iss: iss.to_string(),
            aud: aud.to_string(),
        }
    }

    /// Parses the subject claim as a numeric identity id.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_registered_names() {
        let claims = SessionClaims::new(42, 1_700_000_000, 60, "iss-a", "aud-a");
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"42""#));
        assert!(serialized.contains(r#""exp":1700000060"#));
        assert!(serialized.contains(r#""nbf":1700000000"#));
        assert!(serialized.contains(r#""aud":"aud-a""#));
    }

    #[test]
    fn test_subject_id() {
        let mut claims = SessionClaims::new(7, 0, 10, "i", "a");
        assert_eq!(claims.subject_id(), Some(7));
        claims.sub = "seven".to_string();
        assert_eq!(claims.subject_id(), None);
    }
}
