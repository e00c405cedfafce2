use crate::blockchain::client::{ClientError, RpcTransport};
use crate::config::Config;
use crate::provider::models::{
    AssetTransfersResult, PriceAddress, PriceRequest, PriceResponse, TokenBalance, TokenBalancesResult,
    TokenTransfer, TransferQuery, MAX_COUNT,
};
use crate::provider::ProviderError;
use crate::tracker::traits::AssetProvider;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

/// The price endpoint accepts at most this many addresses per request.
const PRICE_BATCH_SIZE: usize = 25;

/// Client for the indexing provider: token balances, paginated transfer
/// history and spot USD prices.
pub struct AlchemyClient {
    rpc: RpcTransport,
    prices_url: String,
    network: String,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl AlchemyClient {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        info!(
            "Initializing provider client for network {}, timeout: {:?}",
            config.alchemy_network,
            config.alchemy_timeout()
        );
        let client = Self::with_endpoints(
            config.alchemy_rpc_url.clone(),
            config.alchemy_prices_url.clone(),
            config.alchemy_network.clone(),
            config.alchemy_timeout(),
        )?;

        Ok(match config.provider_rate_limit {
            Some(per_second) => client.with_rate_limit(per_second),
            None => client,
        })
    }

    pub fn with_endpoints(
        rpc_url: impl Into<String>,
        prices_url: impl Into<String>,
        network: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            rpc: RpcTransport::new(rpc_url, timeout)?,
            prices_url: prices_url.into(),
            network: network.into(),
            limiter: None,
        })
    }

    /// Cap outgoing requests per second. A zero limit leaves the client unthrottled.
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.limiter = NonZeroU32::new(per_second).map(|n| RateLimiter::direct(Quota::per_second(n)));
        self
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// ERC-20 balances held by `address`. The native balance is not included.
    pub async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError> {
        self.throttle().await;
        let result: TokenBalancesResult = self
            .rpc
            .call("alchemy_getTokenBalances", (address, "erc20"))
            .await?;
        result.into_token_balances()
    }

    /// All transfers matching `query`, following page cursors until the provider
    /// stops returning one.
    pub async fn get_asset_transfers(&self, query: &TransferQuery) -> Result<Vec<TokenTransfer>, ProviderError> {
        let mut out = Vec::new();
        let mut page_key: Option<String> = None;
        let mut pages = 0usize;

        loop {
            self.throttle().await;
            let params = query.to_params(MAX_COUNT, page_key.as_deref());
            let result: AssetTransfersResult = self
                .rpc
                .call("alchemy_getAssetTransfers", [params])
                .await?;
            pages += 1;

            let next = result.next_page_key().map(str::to_string);
            for raw in result.transfers {
                out.push(raw.into_token_transfer()?);
            }

            match next {
                Some(key) => page_key = Some(key),
                None => break,
            }
        }

        debug!(pages, transfers = out.len(), "Fetched asset transfers");
        Ok(out)
    }

    /// USD spot prices keyed by lower-case asset address. Assets the provider
    /// cannot price are absent from the map.
    pub async fn get_token_prices(&self, tokens: &[String]) -> Result<HashMap<String, f64>, ProviderError> {
        let mut out = HashMap::new();
        for chunk in tokens.chunks(PRICE_BATCH_SIZE) {
            self.throttle().await;
            let body = PriceRequest {
                addresses: chunk
                    .iter()
                    .map(|address| PriceAddress {
                        network: &self.network,
                        address,
                    })
                    .collect(),
            };

            let response = self
                .rpc
                .http()
                .post(&self.prices_url)
                .json(&body)
                .send()
                .await
                .map_err(ClientError::from)?;
            let status = response.status();
            let text = response.text().await.map_err(ClientError::from)?;
            if !status.is_success() {
                return Err(ClientError::Status {
                    status: status.as_u16(),
                    body: text,
                }
                .into());
            }

            let parsed: PriceResponse = serde_json::from_str(&text).map_err(ClientError::from)?;
            out.extend(parsed.into_usd_prices()?);
        }
        Ok(out)
    }
}

#[async_trait]
impl AssetProvider for AlchemyClient {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError> {
        AlchemyClient::token_balances(self, address).await
    }

    async fn get_asset_transfers(&self, query: &TransferQuery) -> Result<Vec<TokenTransfer>, ProviderError> {
        AlchemyClient::get_asset_transfers(self, query).await
    }

    async fn get_token_prices(&self, tokens: &[String]) -> Result<HashMap<String, f64>, ProviderError> {
        AlchemyClient::get_token_prices(self, tokens).await
    }
}
