use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use socialfeed_core::AppError;
use socialfeed_models::{ActivationParams, CreateTokenDto, RegisterUserDto, UserWithToken};
use tracing::instrument;

use super::service::AuthService;
use crate::response::{Envelope, ErrorResponse, envelope};
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Register a new user
#[utoipa::path(
    post,
    path = "/v1/auth/user",
    request_body = RegisterUserDto,
    responses(
        (status = 201, description = "User registered; activation token returned", body = Envelope<UserWithToken>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterUserDto>,
) -> Result<(StatusCode, Json<Envelope<UserWithToken>>), AppError> {
    let registered = AuthService::register(&state, dto).await?;
    Ok((StatusCode::CREATED, envelope(registered)))
}

/// Activate a registered user
#[utoipa::path(
    put,
    path = "/v1/auth/user/activate",
    params(ActivationParams),
    responses(
        (status = 204, description = "User activated"),
        (status = 404, description = "Unknown or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn activate_user(
    State(state): State<AppState>,
    Query(params): Query<ActivationParams>,
) -> Result<StatusCode, AppError> {
    AuthService::activate(&state, &params.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a session token
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    request_body = CreateTokenDto,
    responses(
        (status = 201, description = "Session token issued", body = Envelope<String>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn create_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateTokenDto>,
) -> Result<(StatusCode, Json<Envelope<String>>), AppError> {
    let token = AuthService::create_token(&state, dto).await?;
    Ok((StatusCode::CREATED, envelope(token)))
}
