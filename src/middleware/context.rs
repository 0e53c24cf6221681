//! Typed request context for path-addressed resources.
//!
//! Each extractor parses its path id (400 on malformed input) and, where
//! named for a loaded resource, fetches it (404 when absent).

use anyhow::anyhow;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;
use socialfeed_core::AppError;
use socialfeed_models::{Post, PostId, User, UserId};

use crate::state::AppState;

#[derive(Deserialize)]
struct PostPath {
    post_id: String,
}

#[derive(Deserialize)]
struct UserPath {
    user_id: String,
}

fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request(anyhow!("invalid {what} id")))
}

/// `{post_id}` from the path, not loaded.
#[derive(Debug, Clone, Copy)]
pub struct PostIdPath(pub PostId);

impl FromRequestParts<AppState> for PostIdPath {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<PostPath>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(anyhow!("invalid post id")))?;
        Ok(PostIdPath(PostId::new(parse_id(&path.post_id, "post")?)))
    }
}

/// The post addressed by `{post_id}`.
#[derive(Debug, Clone)]
pub struct PostContext(pub Post);

impl FromRequestParts<AppState> for PostContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let PostIdPath(id) = PostIdPath::from_request_parts(parts, state).await?;
        let post = state.store.posts.get_by_id(id).await?;
        Ok(PostContext(post))
    }
}

/// The active user addressed by `{user_id}`.
#[derive(Debug, Clone)]
pub struct TargetUser(pub User);

impl FromRequestParts<AppState> for TargetUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<UserPath>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request(anyhow!("invalid user id")))?;
        let id = UserId::new(parse_id(&path.user_id, "user")?);
        let user = state.store.users.get_by_id(id).await?;
        Ok(TargetUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialfeed_core::ErrorKind;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "post").unwrap(), 42);
        for bad in ["0", "-3", "abc", "", "1.5"] {
            assert_eq!(parse_id(bad, "post").unwrap_err().kind, ErrorKind::Validation);
        }
    }
}
