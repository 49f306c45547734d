use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::Envelope;

// GET /health
pub async fn health() -> Response {
    Envelope::new(StatusCode::OK, "ok", "up").into_response()
}

pub async fn not_found() -> Response {
    Envelope::<()>::error(StatusCode::NOT_FOUND, "no such route").into_response()
}
