//! JSON envelopes shared by every handler.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Success body: `{"data": ...}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub data: T,
}

/// Failure body produced by `AppError`. Documentation only.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn envelope<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { data })
}
