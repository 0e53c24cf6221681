use anyhow::anyhow;
use socialfeed_core::{AppError, StoreError};
use socialfeed_models::{
    CreatePostDto, NewPost, Post, PostWithComments, UpdatePostDto, UserId,
};
use tracing::{info, instrument};

use crate::metrics::{track_post_created, track_post_update_conflict};
use crate::state::AppState;

pub struct PostService;

impl PostService {
    #[instrument(skip(state, dto))]
    pub async fn create(state: &AppState, owner: UserId, dto: CreatePostDto) -> Result<Post, AppError> {
        let post = state.store.posts.create(NewPost::from_dto(dto, owner)).await?;
        info!(post_id = %post.id, "post created");
        track_post_created();
        Ok(post)
    }

    #[instrument(skip(state, post), fields(post_id = %post.id))]
    pub async fn with_comments(state: &AppState, post: Post) -> Result<PostWithComments, AppError> {
        let comments = state.store.comments.list_by_post(post.id).await?;
        Ok(PostWithComments { post, comments })
    }

    /// Applies the patch only if `dto.version` is still current. A stale
    /// version is reported exactly like a missing post.
    #[instrument(skip(state, current, dto), fields(post_id = %current.id, expected = dto.version))]
    pub async fn update(state: &AppState, current: &Post, dto: UpdatePostDto) -> Result<Post, AppError> {
        if !dto.has_changes() {
            return Err(AppError::bad_request(anyhow!(
                "at least one of title, content or tags is required"
            )));
        }

        let expected_version = dto.version;
        let next = dto.apply_to(current);
        match state.store.posts.update(&next, expected_version).await {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound) => {
                track_post_update_conflict();
                Err(StoreError::NotFound.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(state))]
    pub async fn delete(state: &AppState, post: &Post) -> Result<(), AppError> {
        state.store.posts.delete_by_id(post.id).await?;
        info!(post_id = %post.id, "post deleted");
        Ok(())
    }
}
