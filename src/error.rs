use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{models::OrderStatus, response::Envelope};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but acting on somebody else's resource.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid state change from {from} to {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    #[error("insufficient holdings for {symbol}: have {available}, need {requested}")]
    InsufficientHoldings {
        symbol: String,
        available: i64,
        requested: i64,
    },

    #[error("quote source unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::Forbidden(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidStateTransition { .. } => StatusCode::BAD_REQUEST,
            Self::InsufficientHoldings { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for ServiceError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        Envelope::<()>::error(status, self.to_string()).into_response()
    }
}
