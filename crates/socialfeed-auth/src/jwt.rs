//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret from
//! [`JwtConfig`]. Verification is strict: the algorithm must be exactly
//! HS256, `exp`, `nbf`, `iss`, `aud` and `sub` must all be present, `iss` and
//! `aud` must match the configured values, and no clock leeway is granted.
//!
//! Every verification failure maps to the same `AuthInvalid` error so callers
//! cannot tell which check rejected the token.
//!
//! # Example
//!
//! ```ignore
//! use socialfeed_auth::TokenAuthenticator;
//! use socialfeed_config::JwtConfig;
//!
//! let authenticator = TokenAuthenticator::new(&JwtConfig::from_env());
//! let token = authenticator.issue_for(user_id)?;
//! let claims = authenticator.verify(&token)?;
//! ```

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use socialfeed_config::JwtConfig;
use socialfeed_core::AppError;

use crate::claims::SessionClaims;

const ALGORITHM: Algorithm = Algorithm::HS256;
const REQUIRED_CLAIMS: [&str; 5] = ["exp", "nbf", "iss", "aud", "sub"];

pub struct TokenAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
    issuer: String,
    audience: String,
}

impl TokenAuthenticator {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl_seconds: config.expiry_seconds,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Signs an arbitrary claim set.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, AppError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
    }

    /// Issues a session token for `subject`, valid from now for the configured lifetime.
    pub fn issue_for(&self, subject: i64) -> Result<String, AppError> {
        let claims = SessionClaims::new(
            subject,
            Utc::now().timestamp(),
            self.ttl_seconds,
            &self.issuer,
            &self.audience,
        );
        self.issue(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "session token rejected");
                AppError::unauthorized("invalid session token")
            })
    }
}

impl fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialfeed_core::ErrorKind;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            expiry_seconds: 3600,
            issuer: "socialfeed-test".to_string(),
            audience: "socialfeed-test".to_string(),
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    fn claims_at(iat: i64, nbf: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: "1".to_string(),
            iat,
            nbf,
            exp,
            iss: "socialfeed-test".to_string(),
            aud: "socialfeed-test".to_string(),
        }
    }

    fn assert_auth_invalid(result: Result<SessionClaims, AppError>) {
        let err = result.expect_err("token should be rejected");
        assert_eq!(err.kind, ErrorKind::AuthInvalid);
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let token = authenticator.issue_for(42).unwrap();
        let claims = authenticator.verify(&token).unwrap();

        assert_eq!(claims.subject_id(), Some(42));
        assert_eq!(claims.iss, "socialfeed-test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_issue_is_deterministic_for_fixed_claims() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let claims = claims_at(1_700_000_000, 1_700_000_000, 4_000_000_000);
        assert_eq!(
            authenticator.issue(&claims).unwrap(),
            authenticator.issue(&claims).unwrap()
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let t = now();
        let token = authenticator.issue(&claims_at(t - 120, t - 120, t - 1)).unwrap();
        assert_auth_invalid(authenticator.verify(&token));
    }

    #[test]
    fn test_not_yet_valid_token_rejected() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let t = now();
        let token = authenticator.issue(&claims_at(t, t + 300, t + 3600)).unwrap();
        assert_auth_invalid(authenticator.verify(&token));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenAuthenticator::new(&get_test_jwt_config())
            .issue_for(1)
            .unwrap();

        let other = TokenAuthenticator::new(&JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        });
        assert_auth_invalid(other.verify(&token));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let config = get_test_jwt_config();
        let authenticator = TokenAuthenticator::new(&config);
        let t = now();
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims_at(t, t, t + 3600),
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert_auth_invalid(authenticator.verify(&token));
    }

    #[test]
    fn test_issuer_and_audience_must_match() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let t = now();

        let mut wrong_iss = claims_at(t, t, t + 3600);
        wrong_iss.iss = "someone-else".to_string();
        let token = authenticator.issue(&wrong_iss).unwrap();
        assert_auth_invalid(authenticator.verify(&token));

        let mut wrong_aud = claims_at(t, t, t + 3600);
        wrong_aud.aud = "someone-else".to_string();
        let token = authenticator.issue(&wrong_aud).unwrap();
        assert_auth_invalid(authenticator.verify(&token));
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let config = get_test_jwt_config();
        let authenticator = TokenAuthenticator::new(&config);
        let t = now();
        let claims = serde_json::json!({
            "sub": "1",
            "iat": t,
            "nbf": t,
            "iss": "socialfeed-test",
            "aud": "socialfeed-test",
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert_auth_invalid(authenticator.verify(&token));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        assert_auth_invalid(authenticator.verify("invalid-token"));
        assert_auth_invalid(authenticator.verify(""));
    }

    #[test]
    fn test_debug_does_not_print_keys() {
        let authenticator = TokenAuthenticator::new(&get_test_jwt_config());
        let debug_str = format!("{:?}", authenticator);
        assert!(!debug_str.contains("test-secret-key"));
    }
}
