use std::sync::Arc;
use std::time::Duration;

use tokio::{task::JoinHandle, time};
use tracing::{debug, info, warn};

use crate::{error::ServiceResult, models::Order};

use super::order_service::OrderService;

#[derive(Debug)]
pub enum SettlementOutcome {
    /// No placed orders.
    Idle,
    /// An order was picked but left for a later cycle.
    Skipped { order_id: String },
    Completed(Order),
}

/// Simulates exchange settlement by completing placed orders at random,
/// through the same path as a manual completion.
pub struct SettlementDriver {
    orders: Arc<OrderService>,
    completion_probability: f64,
}

impl SettlementDriver {
    pub fn new(orders: Arc<OrderService>, completion_probability: f64) -> Self {
        Self {
            orders,
            completion_probability: if completion_probability.is_nan() {
                0.0
            } else {
                completion_probability.clamp(0.0, 1.0)
            },
        }
    }

    pub async fn run_settlement_cycle(&self) -> ServiceResult<SettlementOutcome> {
        let Some(order) = self.orders.pick_placed_order().await? else {
            return Ok(SettlementOutcome::Idle);
        };

        if !rand::random_bool(self.completion_probability) {
            debug!(order_id = %order.order_id, "settlement skipped this cycle");
            return Ok(SettlementOutcome::Skipped { order_id: order.order_id });
        }

        let completed = self.orders.complete_order(&order.order_id).await?;
        info!(order_id = %completed.order_id, "order settled");
        Ok(SettlementOutcome::Completed(completed))
    }
}

/// Runs a settlement cycle every `every`. Abort the handle to stop it.
pub fn spawn_settlement_driver(driver: SettlementDriver, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);

        loop {
            interval.tick().await;

            if let Err(e) = driver.run_settlement_cycle().await {
                warn!(error = %e, "settlement cycle failed");
            }
        }
    })
}
