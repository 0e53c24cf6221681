use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use socialfeed_core::AppError;
use socialfeed_models::{CreatePostDto, Post, PostWithComments, UpdatePostDto};
use tracing::instrument;

use super::service::PostService;
use crate::middleware::auth::AuthUser;
use crate::middleware::context::PostContext;
use crate::middleware::ownership::{PostEditor, PostRemover};
use crate::response::{Envelope, ErrorResponse, envelope};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a post
#[utoipa::path(
    post,
    path = "/v1/posts",
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = Envelope<Post>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreatePostDto>,
) -> Result<(StatusCode, Json<Envelope<Post>>), AppError> {
    let post = PostService::create(&state, auth_user.id(), dto).await?;
    Ok((StatusCode::CREATED, envelope(post)))
}

/// Get a post with its comments
#[utoipa::path(
    get,
    path = "/v1/posts/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = Envelope<PostWithComments>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
#[instrument(skip_all)]
pub async fn get_post(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    PostContext(post): PostContext,
) -> Result<Json<Envelope<PostWithComments>>, AppError> {
    let post = PostService::with_comments(&state, post).await?;
    Ok(envelope(post))
}

/// Update a post
///
/// Requires the caller to own the post or hold at least the moderator role.
/// `version` must match the stored version; a stale version yields 404.
#[utoipa::path(
    patch,
    path = "/v1/posts/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = Envelope<Post>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner and not a moderator", body = ErrorResponse),
        (status = 404, description = "Post not found or version is stale", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
#[instrument(skip_all, fields(actor = %editor.actor.id, post_id = %editor.post.id))]
pub async fn update_post(
    State(state): State<AppState>,
    editor: PostEditor,
    ValidatedJson(dto): ValidatedJson<UpdatePostDto>,
) -> Result<Json<Envelope<Post>>, AppError> {
    let post = PostService::update(&state, &editor.post, dto).await?;
    Ok(envelope(post))
}

/// Delete a post
///
/// Requires the caller to own the post or hold the admin role.
#[utoipa::path(
    delete,
    path = "/v1/posts/{post_id}",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner and not an admin", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Posts"
)]
#[instrument(skip_all, fields(actor = %remover.actor.id, post_id = %remover.post.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    remover: PostRemover,
) -> Result<StatusCode, AppError> {
    PostService::delete(&state, &remover.post).await?;
    Ok(StatusCode::NO_CONTENT)
}
