use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use socialfeed_core::AppError;
use socialfeed_models::{FeedParams, Post, User};
use tracing::instrument;

use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::middleware::context::TargetUser;
use crate::response::{Envelope, ErrorResponse, envelope};
use crate::state::AppState;

/// The caller's personalized feed
///
/// Posts by the caller and everyone the caller follows.
#[utoipa::path(
    get,
    path = "/v1/users/feed",
    params(FeedParams),
    responses(
        (status = 200, description = "Feed page", body = Envelope<Vec<Post>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_user_feed(
    State(state): State<AppState>,
    AuthUser(reader): AuthUser,
    Query(params): Query<FeedParams>,
) -> Result<Json<Envelope<Vec<Post>>>, AppError> {
    let posts = UserService::feed(&state, &reader, params).await?;
    Ok(envelope(posts))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = Envelope<User>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn get_user(
    _auth_user: AuthUser,
    TargetUser(user): TargetUser,
) -> Result<Json<Envelope<User>>, AppError> {
    Ok(envelope(user))
}

/// Follow a user
#[utoipa::path(
    put,
    path = "/v1/users/{user_id}/follow",
    params(("user_id" = i64, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Now following"),
        (status = 400, description = "Cannot follow yourself", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Already following", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(follower): AuthUser,
    TargetUser(target): TargetUser,
) -> Result<StatusCode, AppError> {
    UserService::follow(&state, &follower, &target).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unfollow a user
#[utoipa::path(
    put,
    path = "/v1/users/{user_id}/unfollow",
    params(("user_id" = i64, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found or not followed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip_all)]
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(follower): AuthUser,
    TargetUser(target): TargetUser,
) -> Result<StatusCode, AppError> {
    UserService::unfollow(&state, &follower, &target).await?;
    Ok(StatusCode::NO_CONTENT)
}
