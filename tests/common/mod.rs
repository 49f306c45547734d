#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::BodyExt;
use parking_lot::Mutex;

use rustorders::{
    config::{self, Settings},
    error::{ServiceError, ServiceResult},
    services::{
        finnhub::QuoteSource,
        holding_store::MemoryHoldingStore,
        order_store::MemoryOrderStore,
        price_cache::MemoryPriceCache,
    },
    AppState,
};

pub const TEST_SECRET: &str = "test-secret";

/// Quote source double: fixed answer, optional delay, counts calls.
pub struct StubQuotes {
    price: Mutex<Option<f64>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubQuotes {
    pub fn fixed(price: f64) -> Arc<Self> {
        Arc::new(Self {
            price: Mutex::new(Some(price)),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            price: Mutex::new(None),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(price: f64, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            price: Mutex::new(Some(price)),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_price(&self, price: f64) {
        *self.price.lock() = Some(price);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for StubQuotes {
    async fn quote(&self, _symbol: &str) -> ServiceResult<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let price = *self.price.lock();
        price.ok_or_else(|| ServiceError::UpstreamUnavailable("stub offline".into()))
    }
}

pub fn test_settings() -> Settings {
    let mut settings = config::load();
    settings.jwt_secret = TEST_SECRET.to_string();
    settings.finnhub_api_key = String::new();
    settings.quote_timeout = Duration::from_millis(200);
    settings.price_ttl = Duration::from_secs(60);
    settings.price_jitter = 0.0;
    settings.settlement_interval = None;
    settings.settlement_probability = 1.0;
    settings
}

pub fn state_with(settings: Settings, quotes: Arc<StubQuotes>) -> AppState {
    AppState::new(
        settings,
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MemoryHoldingStore::new()),
        Arc::new(MemoryPriceCache::new()),
        quotes,
    )
}

/// Memory-backed state quoting every symbol at `price`, without jitter.
pub fn test_state(price: f64) -> AppState {
    state_with(test_settings(), StubQuotes::fixed(price))
}

pub async fn response_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
