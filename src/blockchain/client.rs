use crate::blockchain::models::{parse_hex_biguint, parse_hex_u64, HexError, JsonRpcRequest, JsonRpcResponse};
use crate::config::Config;
use crate::tracker::traits::ChainRpc;
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC response for {0} has no result")]
    MissingResult(String),

    #[error("Invalid hex quantity: {0}")]
    Hex(#[from] HexError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Minimal JSON-RPC-over-HTTP caller. One request per call, no retries.
pub struct RpcTransport {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, url))
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn call<P, T>(&self, method: &str, params: P) -> Result<T, ClientError>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: JsonRpcResponse<T> = serde_json::from_str(&body)?;
        if let Some(error) = envelope.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        debug!(method, id, "RPC call completed");
        envelope
            .result
            .ok_or_else(|| ClientError::MissingResult(method.to_string()))
    }
}

/// Thin client for the two chain calls the tracker needs.
pub struct EthRpcClient {
    transport: RpcTransport,
}

impl EthRpcClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        info!("Initializing chain RPC client, timeout: {:?}", config.rpc_timeout());
        Self::with_url(config.rpc_url.clone(), config.rpc_timeout())
    }

    pub fn with_url(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            transport: RpcTransport::new(rpc_url, timeout)?,
        })
    }

    /// Get the current block height
    pub async fn block_number(&self) -> Result<u64, ClientError> {
        let result: String = self.transport.call("eth_blockNumber", Vec::<String>::new()).await?;
        Ok(parse_hex_u64(&result)?)
    }

    /// Get the native balance (in wei) of an address at the given block tag
    pub async fn get_balance(&self, address: &str, block_tag: &str) -> Result<BigUint, ClientError> {
        let result: String = self
            .transport
            .call("eth_getBalance", [address, block_tag])
            .await?;
        Ok(parse_hex_biguint(&result)?)
    }
}

#[async_trait]
impl ChainRpc for EthRpcClient {
    async fn current_block_height(&self) -> Result<u64, ClientError> {
        self.block_number().await
    }

    async fn get_balance(&self, address: &str, block_tag: &str) -> Result<BigUint, ClientError> {
        EthRpcClient::get_balance(self, address, block_tag).await
    }
}
