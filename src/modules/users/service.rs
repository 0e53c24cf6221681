use anyhow::anyhow;
use socialfeed_core::AppError;
use socialfeed_models::{FeedParams, FeedQuery, Post, User};
use tracing::{info, instrument};

use crate::state::AppState;

pub struct UserService;

impl UserService {
    #[instrument(skip(state, reader), fields(user_id = %reader.id))]
    pub async fn feed(state: &AppState, reader: &User, params: FeedParams) -> Result<Vec<Post>, AppError> {
        let query = FeedQuery::parse(params)?;
        let posts = state.store.posts.user_feed(reader.id, &query).await?;
        Ok(posts)
    }

    #[instrument(skip_all, fields(follower = %follower.id, target = %target.id))]
    pub async fn follow(state: &AppState, follower: &User, target: &User) -> Result<(), AppError> {
        if follower.id == target.id {
            return Err(AppError::bad_request(anyhow!("users cannot follow themselves")));
        }
        state.store.followers.follow(target.id, follower.id).await?;
        info!("follow recorded");
        Ok(())
    }

    #[instrument(skip_all, fields(follower = %follower.id, target = %target.id))]
    pub async fn unfollow(state: &AppState, follower: &User, target: &User) -> Result<(), AppError> {
        state.store.followers.unfollow(target.id, follower.id).await?;
        info!("follow removed");
        Ok(())
    }
}
