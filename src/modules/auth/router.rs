use axum::{
    Router,
    routing::{post, put},
};

use super::controller::{activate_user, create_token, register_user};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/user", post(register_user))
        .route("/user/activate", put(activate_user))
        .route("/token", post(create_token))
}
