use crate::db::{asset, balance, settings, transfer, wallet, StoreError};
use crate::models::{Asset, Transfer, Wallet, WalletBalance};
use crate::tracker::traits::{CheckpointStore, TreasuryStore};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// SQLite-backed treasury and checkpoint store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TreasuryStore for SqliteStore {
    async fn get_wallets(&self) -> Result<Vec<Wallet>, StoreError> {
        wallet::get_wallets(&self.pool).await
    }

    async fn get_assets(&self) -> Result<Vec<Asset>, StoreError> {
        asset::get_assets(&self.pool).await
    }

    async fn update_wallet_balances(&self, wallet: &str, balances: &[WalletBalance]) -> Result<(), StoreError> {
        balance::update_wallet_balances(&self.pool, wallet, balances).await
    }

    async fn create_transfer(&self, transfer: &Transfer) -> Result<bool, StoreError> {
        transfer::create_transfer(&self.pool, transfer).await
    }
}

#[async_trait]
impl CheckpointStore for SqliteStore {
    async fn get_u64(&self, key: &str) -> Result<u64, StoreError> {
        settings::get_u64(&self.pool, key).await
    }

    async fn set_u64(&self, key: &str, value: u64) -> Result<(), StoreError> {
        settings::set_u64(&self.pool, key, value).await
    }
}
