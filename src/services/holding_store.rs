use async_trait::async_trait;
use futures_util::StreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::FindOptions,
    Collection, Database,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::{error::ServiceResult, models::Holding};

const DUPLICATE_KEY: i32 = 11000;

/// Persistence for holdings. Only the holdings ledger talks to it.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    async fn get(&self, user_id: &str, symbol: &str) -> ServiceResult<Option<Holding>>;

    /// All holdings of a user, ordered by symbol.
    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Holding>>;

    /// Returns `false` if a holding for the pair already exists.
    async fn insert(&self, holding: &Holding) -> ServiceResult<bool>;

    /// Writes `next` only if the stored row still equals `expected`.
    async fn replace(&self, expected: &Holding, next: &Holding) -> ServiceResult<bool>;
}

pub struct MongoHoldingStore {
    holdings: Collection<Holding>,
}

impl MongoHoldingStore {
    pub fn new(db: &Database) -> Self {
        Self {
            holdings: db.collection::<Holding>("holdings"),
        }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl HoldingStore for MongoHoldingStore {
    async fn get(&self, user_id: &str, symbol: &str) -> ServiceResult<Option<Holding>> {
        Ok(self
            .holdings
            .find_one(doc! { "user_id": user_id, "symbol": symbol }, None)
            .await?)
    }

    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Holding>> {
        let find_opts = FindOptions::builder().sort(doc! { "symbol": 1 }).build();

        let mut cursor = self
            .holdings
            .find(doc! { "user_id": user_id }, find_opts)
            .await?;

        let mut out: Vec<Holding> = vec![];
        while let Some(res) = cursor.next().await {
            out.push(res?);
        }
        Ok(out)
    }

    async fn insert(&self, holding: &Holding) -> ServiceResult<bool> {
        match self.holdings.insert_one(holding, None).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace(&self, expected: &Holding, next: &Holding) -> ServiceResult<bool> {
        let res = self
            .holdings
            .update_one(
                doc! {
                    "user_id": &expected.user_id,
                    "symbol": &expected.symbol,
                    "quantity": expected.quantity,
                    "total_price": expected.total_price,
                },
                doc! {
                    "$set": {
                        "quantity": next.quantity,
                        "total_price": next.total_price,
                    }
                },
                None,
            )
            .await?;
        Ok(res.matched_count == 1)
    }
}

#[derive(Default)]
pub struct MemoryHoldingStore {
    holdings: Mutex<BTreeMap<(String, String), Holding>>,
}

impl MemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HoldingStore for MemoryHoldingStore {
    async fn get(&self, user_id: &str, symbol: &str) -> ServiceResult<Option<Holding>> {
        Ok(self
            .holdings
            .lock()
            .get(&(user_id.to_string(), symbol.to_string()))
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> ServiceResult<Vec<Holding>> {
        Ok(self
            .holdings
            .lock()
            .values()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, holding: &Holding) -> ServiceResult<bool> {
        let key = (holding.user_id.clone(), holding.symbol.clone());
        let mut holdings = self.holdings.lock();
        if holdings.contains_key(&key) {
            return Ok(false);
        }
        holdings.insert(key, holding.clone());
        Ok(true)
    }

    async fn replace(&self, expected: &Holding, next: &Holding) -> ServiceResult<bool> {
        let key = (expected.user_id.clone(), expected.symbol.clone());
        let mut holdings = self.holdings.lock();
        match holdings.get_mut(&key) {
            Some(current) if current == expected => {
                *current = next.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
