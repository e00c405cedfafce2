// Seams between the tracker and the outside world. The production types are
// `EthRpcClient`, `AlchemyClient` and `SqliteStore`.

use crate::blockchain::ClientError;
use crate::db::StoreError;
use crate::models::{Asset, Transfer, Wallet, WalletBalance};
use crate::provider::{ProviderError, TokenBalance, TokenTransfer, TransferQuery};
use async_trait::async_trait;
use num_bigint::BigUint;
use std::collections::HashMap;

#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn current_block_height(&self) -> Result<u64, ClientError>;

    /// Native balance in base units.
    async fn get_balance(&self, address: &str, block_tag: &str) -> Result<BigUint, ClientError>;
}

#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// Fungible-token balances only.
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError>;

    /// Every page of matching transfers, concatenated.
    async fn get_asset_transfers(&self, query: &TransferQuery) -> Result<Vec<TokenTransfer>, ProviderError>;

    /// USD price per lower-case asset address. Unpriced assets are absent.
    async fn get_token_prices(&self, tokens: &[String]) -> Result<HashMap<String, f64>, ProviderError>;
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get_u64(&self, key: &str) -> Result<u64, StoreError>;
    async fn set_u64(&self, key: &str, value: u64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TreasuryStore: Send + Sync {
    async fn get_wallets(&self) -> Result<Vec<Wallet>, StoreError>;
    async fn get_assets(&self) -> Result<Vec<Asset>, StoreError>;

    /// Replace the whole balance snapshot of `wallet`.
    async fn update_wallet_balances(&self, wallet: &str, balances: &[WalletBalance]) -> Result<(), StoreError>;

    /// Returns `false` when the transfer was already recorded.
    async fn create_transfer(&self, transfer: &Transfer) -> Result<bool, StoreError>;
}
