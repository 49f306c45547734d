use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    error::{ServiceError, ServiceResult},
    models::{Holding, OrderType},
};

use super::{holding_store::HoldingStore, key_lock::KeyedLocks};

/// Upper bound on compare-and-set retries when another writer (e.g. a second
/// process) changes the row between our read and write.
const MAX_WRITE_ATTEMPTS: usize = 5;

pub struct HoldingService {
    store: Arc<dyn HoldingStore>,
    locks: KeyedLocks,
}

impl HoldingService {
    pub fn new(store: Arc<dyn HoldingStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn get_holding(&self, user_id: &str, symbol: &str) -> ServiceResult<Holding> {
        self.store
            .get(user_id, symbol)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no holding for {symbol}")))
    }

    pub async fn list_holdings(&self, user_id: &str) -> ServiceResult<Vec<Holding>> {
        self.store.list_for_user(user_id).await
    }

    /// Applies a completed order to the (user, symbol) position. A sell that
    /// would take the quantity below zero fails and writes nothing.
    pub async fn apply_order(
        &self,
        user_id: &str,
        symbol: &str,
        quantity: i64,
        total_price: f64,
        order_type: OrderType,
    ) -> ServiceResult<Holding> {
        if quantity <= 0 {
            return Err(ServiceError::Validation(format!(
                "holding delta must be positive, got {quantity}"
            )));
        }

        let _guard = self.locks.lock(&format!("{user_id}\u{1f}{symbol}")).await;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let existing = self.store.get(user_id, symbol).await?;

            let written = match existing {
                None => {
                    let Some(created) = first_position(user_id, symbol, quantity, total_price, order_type) else {
                        return Err(ServiceError::InsufficientHoldings {
                            symbol: symbol.to_string(),
                            available: 0,
                            requested: quantity,
                        });
                    };
                    self.store.insert(&created).await?.then_some(created)
                }
                Some(current) => {
                    let next = apply_delta(&current, quantity, total_price, order_type)?;
                    self.store.replace(&current, &next).await?.then_some(next)
                }
            };

            if let Some(h) = written {
                info!(user_id, symbol, %order_type, quantity, new_quantity = h.quantity, "holding updated");
                return Ok(h);
            }
            debug!(user_id, symbol, attempt, "holding changed underneath us, retrying");
        }

        Err(ServiceError::Storage(format!(
            "holding {symbol} kept changing during update"
        )))
    }
}

fn first_position(
    user_id: &str,
    symbol: &str,
    quantity: i64,
    total_price: f64,
    order_type: OrderType,
) -> Option<Holding> {
    match order_type {
        OrderType::Buy => Some(Holding {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            quantity,
            total_price,
        }),
        OrderType::Sell => None,
    }
}

fn apply_delta(current: &Holding, quantity: i64, total_price: f64, order_type: OrderType) -> ServiceResult<Holding> {
    let mut next = current.clone();
    match order_type {
        OrderType::Buy => {
            next.quantity = current
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| ServiceError::Validation(format!("holding {} would overflow", current.symbol)))?;
            next.total_price += total_price;
        }
        OrderType::Sell => {
            if current.quantity < quantity {
                return Err(ServiceError::InsufficientHoldings {
                    symbol: current.symbol.clone(),
                    available: current.quantity,
                    requested: quantity,
                });
            }
            next.quantity = current
                .quantity
                .checked_sub(quantity)
                .ok_or_else(|| ServiceError::Validation(format!("holding {} would underflow", current.symbol)))?;
            next.total_price -= total_price;
        }
    }
    Ok(next)
}
