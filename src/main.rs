use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use treasury_tracker::{
    config::Config, connection, start_polling, AlchemyClient, EthRpcClient, SqliteStore, Tracker,
    TrackerSettings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting treasury-tracker");

    let config = Config::from_env();
    tracing::info!(
        chain_id = config.chain_id,
        block_delay = config.block_delay,
        "Configuration loaded, poll interval: {:?}",
        config.poll_interval
    );

    let db_pool = connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established");

    let store = Arc::new(SqliteStore::new(db_pool));
    let tracker = Arc::new(Tracker::new(
        Arc::new(EthRpcClient::new(&config)?),
        Arc::new(AlchemyClient::new(&config)?),
        store.clone(),
        store,
        TrackerSettings::from_config(&config),
    ));

    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal");
                signal_shutdown.cancel();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    start_polling(tracker, shutdown).await;
    tracing::info!("Tracker stopped");

    Ok(())
}
