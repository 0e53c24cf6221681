use axum::{
    Router,
    routing::{get, put},
};

use super::controller::{follow_user, get_user, get_user_feed, unfollow_user};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/feed", get(get_user_feed))
        .route("/{user_id}", get(get_user))
        .route("/{user_id}/follow", put(follow_user))
        .route("/{user_id}/unfollow", put(unfollow_user))
}
