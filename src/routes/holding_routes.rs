use axum::{Router, routing::get};

use crate::{AppState, controllers::holding_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/holdings", get(holding_controller::get_current_holdings))
        .route("/holdings/:symbol", get(holding_controller::get_holding))
}
