use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use socialfeed_core::AppError;
use socialfeed_models::{Comment, CreateCommentDto, NewComment};
use tracing::{info, instrument};

use crate::middleware::auth::AuthUser;
use crate::middleware::context::{PostContext, PostIdPath};
use crate::response::{Envelope, ErrorResponse, envelope};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Comment on a post
///
/// The post's `comments_count` is incremented in the same transaction.
#[utoipa::path(
    post,
    path = "/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post ID")),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = Envelope<Comment>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.id()))]
pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    PostIdPath(post_id): PostIdPath,
    ValidatedJson(dto): ValidatedJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<Envelope<Comment>>), AppError> {
    let comment = state
        .store
        .comments
        .create(NewComment {
            post_id,
            user_id: auth_user.id(),
            content: dto.content,
        })
        .await?;
    info!(comment_id = %comment.id, "comment created");
    Ok((StatusCode::CREATED, envelope(comment)))
}

/// List a post's comments, oldest first
#[utoipa::path(
    get,
    path = "/v1/posts/{post_id}/comments",
    params(("post_id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = Envelope<Vec<Comment>>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Comments"
)]
#[instrument(skip_all)]
pub async fn list_comments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    PostContext(post): PostContext,
) -> Result<Json<Envelope<Vec<Comment>>>, AppError> {
    let comments = state.store.comments.list_by_post(post.id).await?;
    Ok(envelope(comments))
}
