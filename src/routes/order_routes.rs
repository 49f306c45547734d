use axum::{Router, routing::{get, post}};

use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/orders",
            get(order_controller::get_order_history).post(order_controller::post_place_order),
        )
        .route("/orders/:order_id/cancel", post(order_controller::post_cancel_order))
        .route("/orders/:order_id/complete", post(order_controller::post_complete_order))
}
