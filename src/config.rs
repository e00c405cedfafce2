// Configuration for the treasury tracker:
// - database connection string
// - provider API key, endpoints and timeout
// - chain RPC endpoint and timeout
// - finality buffer and poll interval

use dotenv::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub alchemy_api_key: String,
    pub alchemy_network: String,
    pub alchemy_rpc_url: String,
    pub alchemy_prices_url: String,
    pub alchemy_timeout_secs: u64,
    pub rpc_url: String,
    pub rpc_timeout_secs: u64,
    pub chain_id: i64,
    pub block_delay: u64,
    pub poll_interval: Duration,
    pub provider_rate_limit: Option<u32>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:treasury.db".to_string());
        let alchemy_api_key = env::var("ALCHEMY_API_KEY").unwrap_or_default();
        let alchemy_network = env::var("ALCHEMY_NETWORK").unwrap_or_else(|_| "eth-mainnet".to_string());
        let alchemy_rpc_url = env::var("ALCHEMY_RPC_URL")
            .unwrap_or_else(|_| format!("https://{}.g.alchemy.com/v2/{}", alchemy_network, alchemy_api_key));
        let alchemy_prices_url = env::var("ALCHEMY_PRICES_URL").unwrap_or_else(|_| {
            format!("https://api.g.alchemy.com/prices/v1/{}/tokens/by-address", alchemy_api_key)
        });
        let alchemy_timeout_secs = env::var("ALCHEMY_API_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(10))
            .unwrap_or(10);
        // Without a dedicated node the provider's own JSON-RPC endpoint serves eth_* calls.
        let rpc_url = env::var("RPC_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| alchemy_rpc_url.clone());
        let rpc_timeout_secs = env::var("RPC_API_TIMEOUT_SECS")
            .map(|v| v.parse().unwrap_or(10))
            .unwrap_or(10);
        let chain_id = env::var("CHAIN_ID")
            .map(|v| v.parse().unwrap_or(1))
            .unwrap_or(1);
        let block_delay = env::var("BLOCK_DELAY")
            .map(|v| v.parse().unwrap_or(8))
            .unwrap_or(8);
        let poll_interval = env::var("TRACKER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));
        let provider_rate_limit = env::var("PROVIDER_RATE_LIMIT")
            .map(|v| v.parse().ok())
            .unwrap_or(None);

        Self {
            database_url,
            alchemy_api_key,
            alchemy_network,
            alchemy_rpc_url,
            alchemy_prices_url,
            alchemy_timeout_secs,
            rpc_url,
            rpc_timeout_secs,
            chain_id,
            block_delay,
            poll_interval,
            provider_rate_limit,
        }
    }

    pub fn alchemy_timeout(&self) -> Duration {
        Duration::from_secs(self.alchemy_timeout_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}
