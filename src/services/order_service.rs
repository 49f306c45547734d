//! Order lifecycle: placement, cancellation, completion and history.
//!
//! Every status change goes through [`OrderStatus::can_transition_to`] and is
//! written with a compare-and-set against the status that was validated.
//! Cancel and complete hold a per-order lock for their whole
//! read → validate → write sequence, so racing callers on one order run one at
//! a time. Completion and the holdings update form one unit: if the ledger
//! refuses the delta, the order goes back to `placed`. The unit runs on a
//! spawned task, so it finishes even when the caller goes away.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    error::{ServiceError, ServiceResult},
    models::{Order, OrderStatus, OrderType},
};

use super::{
    holding_service::HoldingService,
    key_lock::KeyedLocks,
    order_store::OrderStore,
    price_service::PriceOracle,
    validators::{normalize_symbol, validate_order_id},
};

/// Largest quantity a single order may carry.
pub const MAX_ORDER_QUANTITY: i64 = i32::MAX as i64;

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    holdings: Arc<HoldingService>,
    prices: Arc<PriceOracle>,
    locks: KeyedLocks,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, holdings: Arc<HoldingService>, prices: Arc<PriceOracle>) -> Self {
        Self {
            store,
            holdings,
            prices,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn place_order(
        &self,
        user_id: &str,
        symbol: &str,
        order_type: &str,
        quantity: i64,
    ) -> ServiceResult<Order> {
        let sym = normalize_symbol(symbol)?;

        if order_type.trim().is_empty() {
            return Err(ServiceError::Validation("order type can't be empty".into()));
        }
        let kind = OrderType::parse(order_type)
            .ok_or_else(|| ServiceError::Validation("order type must be either buy or sell".into()))?;

        if quantity <= 0 {
            return Err(ServiceError::Validation("quantity must be greater than zero".into()));
        }
        if quantity > MAX_ORDER_QUANTITY {
            return Err(ServiceError::Validation(format!(
                "quantity must not exceed {MAX_ORDER_QUANTITY}"
            )));
        }

        if kind == OrderType::Sell {
            self.ensure_sellable(user_id, &sym, quantity).await?;
        }

        let price = self.prices.get_price(&sym).await;
        let order = Order::new_placed(user_id, &sym, kind, quantity, price);

        self.store.insert(&order).await?;

        info!(
            order_id = %order.order_id,
            user_id,
            symbol = %sym,
            order_type = %kind,
            quantity,
            price,
            "order placed"
        );
        Ok(order)
    }

    pub async fn cancel_order(&self, user_id: &str, order_id: &str) -> ServiceResult<Order> {
        let id = validate_order_id(order_id)?;
        let _guard = self.locks.lock(&id).await;

        let order = load(self.store.as_ref(), &id).await?;
        if order.user_id != user_id {
            warn!(order_id = %id, user_id, "cancel attempted by non-owner");
            return Err(ServiceError::Forbidden("can't cancel order which is not yours".into()));
        }

        let (order, _) = transition(self.store.as_ref(), order, OrderStatus::Cancelled).await?;
        info!(order_id = %id, user_id, "order cancelled");
        Ok(order)
    }

    /// The status write, ledger update and any revert run on their own task
    /// holding the order lock, so dropping the caller cannot split them.
    pub async fn complete_order(&self, order_id: &str) -> ServiceResult<Order> {
        let id = validate_order_id(order_id)?;
        let guard = self.locks.lock(&id).await;

        let store = self.store.clone();
        let holdings = self.holdings.clone();

        tokio::spawn(async move {
            let _guard = guard;
            complete_locked(store, holdings, id).await
        })
        .await
        .map_err(|e| ServiceError::Storage(format!("completion task failed: {e}")))?
    }

    pub async fn order_history(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        self.store.list_for_user(user_id).await
    }

    /// A `placed` order chosen uniformly at random, for settlement.
    pub async fn pick_placed_order(&self) -> ServiceResult<Option<Order>> {
        self.store.random_placed().await
    }

    async fn ensure_sellable(&self, user_id: &str, symbol: &str, quantity: i64) -> ServiceResult<()> {
        let available = match self.holdings.get_holding(user_id, symbol).await {
            Ok(h) => h.quantity,
            Err(ServiceError::NotFound(_)) => 0,
            Err(e) => return Err(e),
        };

        if available < quantity {
            return Err(ServiceError::InsufficientHoldings {
                symbol: symbol.to_string(),
                available,
                requested: quantity,
            });
        }
        Ok(())
    }
}

async fn complete_locked(
    store: Arc<dyn OrderStore>,
    holdings: Arc<HoldingService>,
    id: String,
) -> ServiceResult<Order> {
    let order = load(store.as_ref(), &id).await?;
    let (order, changed) = transition(store.as_ref(), order, OrderStatus::Completed).await?;
    if !changed {
        debug!(order_id = %id, "order already completed");
        return Ok(order);
    }

    let applied = holdings
        .apply_order(
            &order.user_id,
            &order.symbol,
            order.quantity,
            order.total_price,
            order.order_type,
        )
        .await;

    if let Err(e) = applied {
        revert_completion(store.as_ref(), &id).await;
        return Err(e);
    }

    info!(order_id = %id, user_id = %order.user_id, symbol = %order.symbol, "order completed");
    Ok(order)
}

async fn load(store: &dyn OrderStore, order_id: &str) -> ServiceResult<Order> {
    store
        .get(order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("you have no such order".into()))
}

/// Moves `order` to `to`. The flag is false for an allowed same-state
/// no-op, in which case nothing is written.
async fn transition(store: &dyn OrderStore, order: Order, to: OrderStatus) -> ServiceResult<(Order, bool)> {
    let from = order.order_status;
    if !from.can_transition_to(to) {
        return Err(ServiceError::InvalidStateTransition { from, to });
    }
    if from == to {
        return Ok((order, false));
    }

    if !store.update_status(&order.order_id, from, to).await? {
        // another writer got there first
        let current = load(store, &order.order_id).await?;
        let now = current.order_status;
        if !now.can_transition_to(to) {
            return Err(ServiceError::InvalidStateTransition { from: now, to });
        }
        if now == to {
            return Ok((current, false));
        }
        return Err(ServiceError::Storage(format!(
            "order {} changed concurrently",
            order.order_id
        )));
    }

    let mut updated = order;
    updated.order_status = to;
    Ok((updated, true))
}

// Compensating write, not a lifecycle transition.
async fn revert_completion(store: &dyn OrderStore, order_id: &str) {
    match store
        .update_status(order_id, OrderStatus::Completed, OrderStatus::Placed)
        .await
    {
        Ok(true) => warn!(order_id, "holdings update failed, order returned to placed"),
        Ok(false) => error!(order_id, "holdings update failed and order was no longer completed"),
        Err(e) => error!(order_id, error = %e, "holdings update failed and status revert failed"),
    }
}
