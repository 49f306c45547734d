use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ServiceError,
    models::{CurrentUser, Order, OrderStatus, OrderType},
    response::Envelope,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct OrderPayload {
    pub order_id: String,
    pub symbol: String,
    pub quantity: i64,
    pub price_per_stock: f64,
    pub total_price: f64,
    pub order_type: OrderType,
    pub order_status: OrderStatus,
}

impl From<Order> for OrderPayload {
    fn from(o: Order) -> Self {
        Self {
            order_id: o.order_id,
            symbol: o.symbol,
            quantity: o.quantity,
            price_per_stock: o.price_per_stock,
            total_price: o.total_price,
            order_type: o.order_type,
            order_status: o.order_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderHistoryPayload {
    pub orders: Vec<OrderPayload>,
}

fn unauthorized() -> Response {
    ServiceError::Unauthorized("no token found".into()).into_response()
}

// Missing fields fall through to service validation instead of a body rejection.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub quantity: i64,
}

// POST /orders
pub async fn post_place_order(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(form): Json<PlaceOrderForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    match state
        .orders
        .place_order(&u.id, &form.symbol, &form.order_type, form.quantity)
        .await
    {
        Ok(order) => Envelope::ok(StatusCode::CREATED, OrderPayload::from(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /orders/:order_id/cancel
pub async fn post_cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    match state.orders.cancel_order(&u.id, &order_id).await {
        Ok(order) => Envelope::ok(StatusCode::OK, OrderPayload::from(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /orders/:order_id/complete
pub async fn post_complete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    if user.is_none() {
        return unauthorized();
    }

    match state.orders.complete_order(&order_id).await {
        Ok(order) => {
            Envelope::new(StatusCode::OK, "order completed", OrderPayload::from(order)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// GET /orders
pub async fn get_order_history(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized();
    };

    match state.orders.order_history(&u.id).await {
        Ok(orders) => {
            let orders = orders.into_iter().map(OrderPayload::from).collect();
            Envelope::ok(StatusCode::OK, OrderHistoryPayload { orders }).into_response()
        }
        Err(e) => e.into_response(),
    }
}
