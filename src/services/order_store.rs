use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::{
    bson::{doc, from_document, Document},
    options::FindOptions,
    Collection, Database,
};
use parking_lot::Mutex;

use crate::{
    error::ServiceResult,
    models::{Order, OrderStatus},
};

/// Persistence for orders. Only the order service talks to it.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> ServiceResult<()>;

    async fn get(&self, order_id: &str) -> ServiceResult<Option<Order>>;

    /// All orders of a user, oldest first.
    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Order>>;

    /// Compare-and-set on the status. Returns `false` (and writes nothing) when
    /// the stored status is not `from`.
    async fn update_status(&self, order_id: &str, from: OrderStatus, to: OrderStatus) -> ServiceResult<bool>;

    /// One `placed` order chosen uniformly at random.
    async fn random_placed(&self) -> ServiceResult<Option<Order>>;
}

pub struct MongoOrderStore {
    orders: Collection<Order>,
}

impl MongoOrderStore {
    pub fn new(db: &Database) -> Self {
        Self {
            orders: db.collection::<Order>("orders"),
        }
    }
}

#[async_trait]
impl OrderStore for MongoOrderStore {
    async fn insert(&self, order: &Order) -> ServiceResult<()> {
        self.orders.insert_one(order, None).await?;
        Ok(())
    }

    async fn get(&self, order_id: &str) -> ServiceResult<Option<Order>> {
        Ok(self.orders.find_one(doc! { "_id": order_id }, None).await?)
    }

    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        let find_opts = FindOptions::builder()
            .sort(doc! { "placed_at": 1, "_id": 1 })
            .build();

        let mut cursor = self.orders.find(doc! { "user_id": user_id }, find_opts).await?;

        let mut out: Vec<Order> = vec![];
        while let Some(res) = cursor.next().await {
            out.push(res?);
        }
        Ok(out)
    }

    async fn update_status(&self, order_id: &str, from: OrderStatus, to: OrderStatus) -> ServiceResult<bool> {
        let res = self
            .orders
            .update_one(
                doc! { "_id": order_id, "order_status": from.as_str() },
                doc! { "$set": { "order_status": to.as_str() } },
                None,
            )
            .await?;
        Ok(res.matched_count == 1)
    }

    async fn random_placed(&self) -> ServiceResult<Option<Order>> {
        let pipeline = vec![
            doc! { "$match": { "order_status": OrderStatus::Placed.as_str() } },
            doc! { "$sample": { "size": 1 } },
        ];

        let mut cursor = self.orders.aggregate(pipeline, None).await?;
        match cursor.next().await {
            Some(res) => {
                let raw: Document = res?;
                Ok(Some(from_document::<Order>(raw)?))
            }
            None => Ok(None),
        }
    }
}

/// Process-local store, kept in insertion order.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> ServiceResult<()> {
        self.orders.lock().push(order.clone());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> ServiceResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        Ok(self
            .orders
            .lock()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_status(&self, order_id: &str, from: OrderStatus, to: OrderStatus) -> ServiceResult<bool> {
        let mut orders = self.orders.lock();
        match orders.iter_mut().find(|o| o.order_id == order_id) {
            Some(o) if o.order_status == from => {
                o.order_status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn random_placed(&self) -> ServiceResult<Option<Order>> {
        let orders = self.orders.lock();
        let placed: Vec<&Order> = orders
            .iter()
            .filter(|o| o.order_status == OrderStatus::Placed)
            .collect();

        if placed.is_empty() {
            return Ok(None);
        }
        let pick = rand::random_range(0..placed.len());
        Ok(Some(placed[pick].clone()))
    }
}
