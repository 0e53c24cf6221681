use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{create_post, delete_post, get_post, update_post};
use crate::modules::comments::router::init_comments_router;
use crate::state::AppState;

pub fn init_posts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post))
        .route(
            "/{post_id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .nest("/{post_id}/comments", init_comments_router())
}
