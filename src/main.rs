use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mongodb::Client;
use tracing_subscriber::EnvFilter;

use rustorders::{
    config::{self, StoreBackend},
    routes,
    services::{
        db_init,
        finnhub::FinnhubClient,
        holding_store::{HoldingStore, MemoryHoldingStore, MongoHoldingStore},
        order_store::{MemoryOrderStore, MongoOrderStore, OrderStore},
        price_cache::MemoryPriceCache,
        settlement,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::load();

    let (order_store, holding_store): (Arc<dyn OrderStore>, Arc<dyn HoldingStore>) =
        match settings.store_backend {
            StoreBackend::Mongo => {
                let client = Client::with_uri_str(&settings.mongodb_uri)
                    .await
                    .context("failed to connect to MongoDB")?;
                let db = client.database(&settings.mongodb_db);

                db_init::ensure_indexes(&db)
                    .await
                    .context("failed to create MongoDB indexes")?;

                (Arc::new(MongoOrderStore::new(&db)), Arc::new(MongoHoldingStore::new(&db)))
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory stores; data is lost on exit");
                (Arc::new(MemoryOrderStore::new()), Arc::new(MemoryHoldingStore::new()))
            }
        };

    let quotes = Arc::new(FinnhubClient::new(
        settings.finnhub_base_url.clone(),
        settings.finnhub_api_key.clone(),
        settings.quote_timeout,
    ));

    let state = AppState::new(
        settings.clone(),
        order_store,
        holding_store,
        Arc::new(MemoryPriceCache::new()),
        quotes,
    );

    let settlement_task = settings
        .settlement_interval
        .map(|every| settlement::spawn_settlement_driver(state.settlement_driver(), every));

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("invalid HOST {}", settings.host))?;
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")?;

    if let Some(task) = settlement_task {
        task.abort();
    }
    Ok(())
}
