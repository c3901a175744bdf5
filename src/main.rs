//! Postfan webhook fan-out ingestion service.
//!
//! Main entry point: initializes tracing, loads configuration, connects
//! to the durable store with bounded retries, and serves the ingestion
//! endpoint until shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use postfan_api::{AppState, Config};
use postfan_store::{Enqueuer, RedisStore};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting postfan ingestion service");

    let config = Config::load()?;
    info!(
        redis_url = %config.redis_url_masked(),
        scheme = ?config.storage_scheme,
        list_key = %config.list_key_name,
        "Configuration loaded"
    );

    let store = connect_store(&config).await?;
    info!("Store connection established");

    let enqueuer = Arc::new(Enqueuer::new(Arc::new(store), config.to_enqueue_config()));
    let state = AppState::new(enqueuer);

    let addr = config.parse_server_addr()?;
    info!(%addr, "Postfan is ready to receive ingestion requests");

    postfan_api::start_server(state, addr, config.http_timeout())
        .await
        .context("HTTP server failed")?;

    info!("Postfan shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,postfan=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Connects to the store with retry logic.
///
/// A store that is briefly unavailable at boot (container orchestration
/// race) should not kill the service; a store that stays down should.
async fn connect_store(config: &Config) -> Result<RedisStore> {
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let mut retries = 0;
    loop {
        match RedisStore::connect(&config.redis_url, config.connect_timeout(), config.op_timeout())
            .await
        {
            Ok(store) => return Ok(store),
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Store connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to connect to store after retries");
            },
        }
    }
}
