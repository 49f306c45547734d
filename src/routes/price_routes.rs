use axum::{Router, routing::get};

use crate::{AppState, controllers::price_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/prices/:symbol", get(price_controller::get_current_price))
}
