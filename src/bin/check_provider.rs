use std::time::Instant;
use tracing::{error, info, Level};
use treasury_tracker::{
    config::Config,
    models::{ETHER_ADDRESS, WETH_ADDRESS},
    provider::TransferQuery,
    AlchemyClient, EthRpcClient,
};

// Vitalik's public address, active enough to always have balances and transfers.
const SAMPLE_WALLET: &str = "0xd8da6bf26964af9d7eed9e03e5b1f6fbb4e2d9a0";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting provider smoke check...");
    let config = Config::from_env();
    if config.alchemy_api_key.is_empty() {
        error!("❌ ALCHEMY_API_KEY is not set");
        return Ok(());
    }

    let wallet = std::env::args().nth(1).unwrap_or_else(|| SAMPLE_WALLET.to_string());
    let wallet = treasury_tracker::normalize_address(&wallet)?;

    let rpc = EthRpcClient::new(&config)?;
    let provider = AlchemyClient::new(&config)?;

    // 1. Chain RPC
    info!("Testing chain RPC...");
    let head = rpc.block_number().await?;
    info!("✅ Current block: {}", head);
    let wei = rpc.get_balance(&wallet, "latest").await?;
    info!("✅ Native balance of {}: {} wei", wallet, wei);

    // 2. Token balances
    info!("Testing token balances...");
    let balances = provider.token_balances(&wallet).await?;
    info!("✅ {} token balances", balances.len());
    for balance in balances.iter().take(5) {
        info!("   {}: {}", balance.address, balance.balance);
    }

    // 3. Prices
    info!("Testing price lookup...");
    let prices = provider.get_token_prices(&[WETH_ADDRESS.to_string()]).await?;
    match prices.get(WETH_ADDRESS) {
        Some(price) => info!("✅ Native coin ({}) price: ${}", ETHER_ADDRESS, price),
        None => error!("❌ No price returned for the wrapped native coin"),
    }

    // 4. Transfers over the last few hundred final blocks
    info!("Testing transfer history...");
    let upper = head.saturating_sub(config.block_delay);
    let lower = upper.saturating_sub(500);
    let started = Instant::now();
    let incoming = provider
        .get_asset_transfers(&TransferQuery::incoming(&wallet, lower, upper))
        .await?;
    info!(
        "✅ {} incoming transfers in blocks {}-{} ({:?})",
        incoming.len(),
        lower,
        upper,
        started.elapsed()
    );
    for tr in incoming.iter().take(3) {
        info!("   {} log {} from {}: {} {}", tr.tx_hash, tr.log_index, tr.from_address, tr.amount, tr.asset_name);
    }

    info!("Provider smoke check completed");
    Ok(())
}
