use axum::{Router, routing::post};

use super::controller::{create_comment, list_comments};
use crate::state::AppState;

pub fn init_comments_router() -> Router<AppState> {
    Router::new().route("/", post(create_comment).get(list_comments))
}
