//! The `{ code, message, payload }` envelope every operation answers with.
//! The HTTP status always mirrors `code`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, payload: T) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// Success envelope whose message is the canonical reason phrase.
    pub fn ok(status: StatusCode, payload: T) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("OK"), payload)
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            payload: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
