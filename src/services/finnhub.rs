use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

/// External source of the latest traded price for a symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> ServiceResult<f64>;
}

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[async_trait]
impl QuoteSource for FinnhubClient {
    async fn quote(&self, symbol: &str) -> ServiceResult<f64> {
        if !self.has_key() {
            return Err(ServiceError::UpstreamUnavailable(
                "FINNHUB_API_KEY is missing".to_string(),
            ));
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ServiceError::UpstreamUnavailable(format!(
                "Finnhub quote failed: {status} {body}"
            )));
        }

        let quote = res
            .json::<QuoteResponse>()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?;

        Ok(quote.c)
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponse {
    // current price; other fields of the payload are ignored
    pub c: f64,
}
