use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,
    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub jwt_secret: String,

    pub finnhub_api_key: String,
    pub finnhub_base_url: String,
    pub quote_timeout: Duration,

    // price oracle
    pub price_ttl: Duration,
    pub price_jitter: f64,

    // background settlement; None disables the driver
    pub settlement_interval: Option<Duration>,
    pub settlement_probability: f64,
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn or(&self, key: &str, default: &str) -> String {
        (self.0)(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.0)(key)
            .and_then(|s| s.trim().parse::<T>().ok())
            .unwrap_or(default)
    }

    // "inf" and "NaN" parse as f64 but are never usable here
    fn finite(&self, key: &str, default: f64) -> f64 {
        Some(self.parse(key, default))
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    from_lookup(|key| env::var(key).ok())
}

/// Builds settings from an arbitrary variable source; `load` passes the
/// process environment.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Settings {
    let vars = Vars(lookup);

    let store_backend = match vars.or("STORE_BACKEND", "mongo").to_lowercase().as_str() {
        "memory" => StoreBackend::Memory,
        _ => StoreBackend::Mongo,
    };

    let settlement_secs: u64 = vars.parse("SETTLEMENT_INTERVAL_SECS", 10);
    let settlement_interval = (settlement_secs > 0).then(|| Duration::from_secs(settlement_secs));

    Settings {
        host: vars.or("HOST", "127.0.0.1"),
        port: vars.parse("PORT", 3000),

        store_backend,
        mongodb_uri: vars.or("MONGODB_URI", "mongodb://localhost:27017"),
        mongodb_db: vars.or("MONGODB_DB", "rustorders"),

        jwt_secret: vars.or("JWT_SECRET", "change-me-dev-secret"),

        finnhub_api_key: vars.or("FINNHUB_API_KEY", ""),
        finnhub_base_url: vars.or("FINNHUB_BASE_URL", "https://finnhub.io/api/v1"),
        quote_timeout: Duration::from_millis(vars.parse("QUOTE_TIMEOUT_MS", 3000)),

        price_ttl: Duration::from_secs(vars.parse("PRICE_TTL_SECS", 60)),
        price_jitter: vars.finite("PRICE_JITTER", 1.0).abs(),

        settlement_interval,
        settlement_probability: vars.finite("SETTLEMENT_PROBABILITY", 0.5).clamp(0.0, 1.0),
    }
}
