use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    error::ServiceError,
    models::CurrentUser,
    response::Envelope,
    services::validators::normalize_symbol,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct PricePayload {
    pub symbol: String,
    pub price: f64,
}

// GET /prices/:symbol
pub async fn get_current_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    if user.is_none() {
        return ServiceError::Unauthorized("no token found".into()).into_response();
    }

    let symbol = match normalize_symbol(&symbol) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };

    let price = state.prices.get_price(&symbol).await;
    Envelope::ok(StatusCode::OK, PricePayload { symbol, price }).into_response()
}
