use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use sha2::{Digest, Sha256};
use socialfeed_config::BasicAuthConfig;
use socialfeed_core::{AppError, StoreError};
use socialfeed_models::{User, UserId};

use crate::metrics::track_auth_failure;
use crate::state::AppState;

/// The authenticated caller, loaded from the bearer token's subject.
///
/// Only active users load. The first extraction caches the user in request
/// extensions so later extractors in the same request reuse it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }

    pub fn role_level(&self) -> i32 {
        self.0.role_level
    }
}

fn missing(message: &str) -> AppError {
    track_auth_failure("missing");
    AppError::missing_credentials(message)
}

fn invalid(message: &str) -> AppError {
    track_auth_failure("invalid");
    AppError::unauthorized(message)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| missing("missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| missing("authorization header is not a bearer token"))?;

        let claims = state.authenticator.verify(token).inspect_err(|_| {
            track_auth_failure("invalid");
        })?;
        let user_id = claims
            .subject_id()
            .map(UserId::new)
            .ok_or_else(|| invalid("token subject is not an identity id"))?;

        let user = state
            .store
            .users
            .get_by_id(user_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => invalid("unknown or inactive identity"),
                other => AppError::from(other),
            })?;

        let auth_user = AuthUser(user);
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (l, r) in a.iter().zip(b) {
        diff |= l ^ r;
    }
    diff == 0
}

/// Compares both fields through fixed-length digests, always evaluating both.
pub fn basic_credentials_match(config: &BasicAuthConfig, username: &str, password: &str) -> bool {
    let user_ok = constant_time_eq(
        &Sha256::digest(username.as_bytes()),
        &Sha256::digest(config.username.as_bytes()),
    );
    let pass_ok = constant_time_eq(
        &Sha256::digest(password.as_bytes()),
        &Sha256::digest(config.password.as_bytes()),
    );
    user_ok & pass_ok
}

/// Operator gate for health and metrics. Every failure carries the Basic
/// challenge header.
pub async fn require_basic(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(Authorization(basic)) = req.headers().typed_get::<Authorization<Basic>>() else {
        track_auth_failure("missing");
        return Err(AppError::basic_challenge("missing basic credentials"));
    };

    if !basic_credentials_match(&state.basic_auth_config, basic.username(), basic.password()) {
        track_auth_failure("invalid");
        return Err(AppError::basic_challenge("invalid basic credentials"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BasicAuthConfig {
        BasicAuthConfig {
            username: "operator".to_string(),
            password: "s3cret".to_string(),
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn test_basic_credentials_match() {
        assert!(basic_credentials_match(&config(), "operator", "s3cret"));
        assert!(!basic_credentials_match(&config(), "operator", "wrong"));
        assert!(!basic_credentials_match(&config(), "someone", "s3cret"));
        assert!(!basic_credentials_match(&config(), "", ""));
    }
}
