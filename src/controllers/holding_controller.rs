use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    error::ServiceError,
    models::{CurrentUser, Holding},
    response::Envelope,
    services::validators::normalize_symbol,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct HoldingPayload {
    pub symbol: String,
    pub quantity: i64,
    pub total_price: f64,
}

impl From<Holding> for HoldingPayload {
    fn from(h: Holding) -> Self {
        Self {
            symbol: h.symbol,
            quantity: h.quantity,
            total_price: h.total_price,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HoldingsPayload {
    pub holdings: Vec<HoldingPayload>,
}

fn unauthorized() -> Response {
    ServiceError::Unauthorized("no token found".into()).into_response()
}

// GET /holdings
pub async fn get_current_holdings(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    match state.holdings.list_holdings(&u.id).await {
        Ok(list) => {
            let holdings = list.into_iter().map(HoldingPayload::from).collect();
            Envelope::ok(StatusCode::OK, HoldingsPayload { holdings }).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// GET /holdings/:symbol
pub async fn get_holding(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    let symbol = match normalize_symbol(&symbol) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };

    match state.holdings.get_holding(&u.id, &symbol).await {
        Ok(h) => Envelope::ok(StatusCode::OK, HoldingPayload::from(h)).into_response(),
        Err(e) => e.into_response(),
    }
}
