use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{finnhub::QuoteSource, price_cache::PriceCache};

/// Range used when the quote source has nothing usable for a symbol.
pub const SYNTHETIC_PRICE_MIN: f64 = 20.0;
pub const SYNTHETIC_PRICE_MAX: f64 = 500.0;

/// Floor applied after perturbation so a quote never goes non-positive.
const MIN_PRICE: f64 = 0.01;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub struct PriceOracle {
    quotes: Arc<dyn QuoteSource>,
    cache: Arc<dyn PriceCache>,
    ttl: Duration,
    quote_timeout: Duration,
    jitter: f64,
}

impl PriceOracle {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        cache: Arc<dyn PriceCache>,
        ttl: Duration,
        quote_timeout: Duration,
        jitter: f64,
    ) -> Self {
        Self {
            quotes,
            cache,
            ttl,
            quote_timeout,
            jitter: if jitter.is_finite() { jitter.abs() } else { 0.0 },
        }
    }

    /// Current price for an already-normalized symbol. Never fails: cache and
    /// upstream problems degrade to a synthesized price.
    pub async fn get_price(&self, symbol: &str) -> f64 {
        if let Some(price) = self.cached(symbol).await {
            return price;
        }

        let base = self.base_price(symbol).await;
        let price = self.simulate(base);

        if let Err(e) = self.cache.set(symbol, format!("{price:.2}"), self.ttl).await {
            warn!(symbol, error = %e, "price cache write failed");
        }

        price
    }

    async fn cached(&self, symbol: &str) -> Option<f64> {
        let raw = match self.cache.get(symbol).await {
            Ok(v) => v?,
            Err(e) => {
                warn!(symbol, error = %e, "price cache read failed");
                return None;
            }
        };

        match raw.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => Some(p),
            _ => {
                warn!(symbol, raw = %raw, "ignoring unparseable cached price");
                None
            }
        }
    }

    async fn base_price(&self, symbol: &str) -> f64 {
        let quote = tokio::time::timeout(self.quote_timeout, self.quotes.quote(symbol)).await;

        match quote {
            Ok(Ok(c)) if c.is_finite() && c > 0.0 => c,
            Ok(Ok(c)) => {
                debug!(symbol, quote = c, "no usable quote, synthesizing price");
                synthesize()
            }
            Ok(Err(e)) => {
                warn!(symbol, error = %e, "quote source unavailable, synthesizing price");
                synthesize()
            }
            Err(_) => {
                warn!(symbol, timeout_ms = self.quote_timeout.as_millis() as u64, "quote source timed out, synthesizing price");
                synthesize()
            }
        }
    }

    // simulated market movement
    fn simulate(&self, base: f64) -> f64 {
        let change = if self.jitter > 0.0 {
            rand::random_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        round2(base + change).max(MIN_PRICE)
    }
}

fn synthesize() -> f64 {
    round2(rand::random_range(SYNTHETIC_PRICE_MIN..=SYNTHETIC_PRICE_MAX))
}
