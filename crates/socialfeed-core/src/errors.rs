//! Error taxonomy shared by every layer of the API.
//!
//! Handlers return [`AppError`]; stores return [`StoreError`] which converts
//! into the matching [`ErrorKind`]. Only validation errors carry their own
//! message to the client; every other kind answers with a fixed public
//! message so internal details and authentication sub-checks never leak.

use std::fmt;
use std::time::Duration;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Challenge sent with every failed basic-credentials check.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    AuthMissing,
    AuthInvalid,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::AuthMissing | ErrorKind::AuthInvalid => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(self) -> &'static str {
        match self {
            ErrorKind::Validation => "bad request",
            ErrorKind::AuthMissing | ErrorKind::AuthInvalid => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "resource not found",
            ErrorKind::Conflict => "resource already exists",
            ErrorKind::RateLimited => "rate limit exceeded",
            ErrorKind::Internal => "the server encountered an error",
        }
    }
}

/// Extra response header attached to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Challenge {
    Basic,
    RetryAfter(Duration),
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
    challenge: Option<Challenge>,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
            challenge: None,
        }
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    /// No credentials were presented, or they used the wrong scheme.
    pub fn missing_credentials(message: &str) -> Self {
        Self::new(ErrorKind::AuthMissing, anyhow!("{message}"))
    }

    /// Credentials were presented but did not check out.
    pub fn unauthorized(message: &str) -> Self {
        Self::new(ErrorKind::AuthInvalid, anyhow!("{message}"))
    }

    pub fn basic_challenge(message: &str) -> Self {
        Self::unauthorized(message).with_challenge(Challenge::Basic)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(ErrorKind::Forbidden, anyhow!("{message}"))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Conflict, err)
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::new(ErrorKind::RateLimited, anyhow!("retry after {retry_after:?}"))
            .with_challenge(Challenge::RetryAfter(retry_after))
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(ErrorKind::Internal, anyhow!(message))
    }

    pub fn with_challenge(mut self, challenge: Challenge) -> Self {
        self.challenge = Some(challenge);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn challenge(&self) -> Option<Challenge> {
        self.challenge
    }

    fn client_message(&self) -> String {
        match (self.kind, self.challenge) {
            (ErrorKind::Validation, _) => self.error.to_string(),
            (ErrorKind::RateLimited, Some(Challenge::RetryAfter(after))) => format!(
                "{}, retry after: {}s",
                self.kind.public_message(),
                retry_after_secs(after)
            ),
            (kind, _) => kind.public_message().to_string(),
        }
    }
}

/// Whole seconds a client should wait, rounded up and never zero.
pub fn retry_after_secs(after: Duration) -> u64 {
    let secs = after.as_secs() + u64::from(after.subsec_nanos() > 0);
    secs.max(1)
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:#}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.kind {
            ErrorKind::Internal => {
                tracing::error!(error = ?self.error, "internal error");
            }
            kind => {
                tracing::warn!(kind = ?kind, error = %self.error, "request rejected");
            }
        }

        let body = Json(json!({ "error": self.client_message() }));
        let mut response = (self.status(), body).into_response();

        match self.challenge {
            Some(Challenge::Basic) => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(BASIC_CHALLENGE),
                );
            }
            Some(Challenge::RetryAfter(after)) => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(after)));
            }
            None => {}
        }

        response
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::internal(err)
    }
}

/// Failures surfaced by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("resource not found")]
    NotFound,
    #[error("resource already exists")]
    Conflict,
    #[error("query exceeded {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Unexpected(#[from] Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            _ => StoreError::Unexpected(err.into()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found(err),
            StoreError::Conflict => AppError::conflict(err),
            StoreError::Timeout(_) => AppError::internal(err),
            StoreError::Unexpected(inner) => AppError::internal(inner),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
