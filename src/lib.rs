//! Library entrypoint for RustOrders.
//!
//! Integration tests under `tests/` import the app state, routers and services
//! from here; `main.rs` only wires configuration and storage.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod response;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    finnhub::QuoteSource,
    holding_service::HoldingService,
    holding_store::HoldingStore,
    order_service::OrderService,
    order_store::OrderStore,
    price_cache::PriceCache,
    price_service::PriceOracle,
    settlement::SettlementDriver,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub orders: Arc<OrderService>,
    pub holdings: Arc<HoldingService>,
    pub prices: Arc<PriceOracle>,
}

impl AppState {
    /// Builds the component graph: oracle and ledger first, then the order
    /// service on top of both.
    pub fn new(
        settings: config::Settings,
        order_store: Arc<dyn OrderStore>,
        holding_store: Arc<dyn HoldingStore>,
        cache: Arc<dyn PriceCache>,
        quotes: Arc<dyn QuoteSource>,
    ) -> Self {
        let prices = Arc::new(PriceOracle::new(
            quotes,
            cache,
            settings.price_ttl,
            settings.quote_timeout,
            settings.price_jitter,
        ));
        let holdings = Arc::new(HoldingService::new(holding_store));
        let orders = Arc::new(OrderService::new(order_store, holdings.clone(), prices.clone()));

        Self {
            settings,
            orders,
            holdings,
            prices,
        }
    }

    pub fn settlement_driver(&self) -> SettlementDriver {
        SettlementDriver::new(self.orders.clone(), self.settings.settlement_probability)
    }
}
