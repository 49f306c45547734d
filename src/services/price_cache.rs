use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ServiceResult;

/// Key-value store for formatted prices with per-entry expiry.
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, symbol: &str) -> ServiceResult<Option<String>>;

    /// Overwrites any existing entry.
    async fn set(&self, symbol: &str, value: String, ttl: Duration) -> ServiceResult<()>;
}

#[derive(Default)]
pub struct MemoryPriceCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored entries, counting expired ones not yet pruned.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PriceCache for MemoryPriceCache {
    async fn get(&self, symbol: &str) -> ServiceResult<Option<String>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(symbol) {
            Some((value, expires_at)) if now < *expires_at => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(symbol);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, symbol: &str, value: String, ttl: Duration) -> ServiceResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        // writes sweep expired symbols so the map tracks only live prices
        entries.retain(|_, (_, expires_at)| now < *expires_at);
        entries.insert(symbol.to_string(), (value, now + ttl));
        Ok(())
    }
}
