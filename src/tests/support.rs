//! In-memory collaborators and a stub HTTP server shared by the test suites.

use crate::blockchain::ClientError;
use crate::db::StoreError;
use crate::models::{Asset, Transfer, Wallet, WalletBalance};
use crate::provider::{AddressFilter, ProviderError, TokenBalance, TokenTransfer, TransferQuery};
use crate::tracker::traits::{AssetProvider, ChainRpc, CheckpointStore, TreasuryStore};
use crate::tracker::{Tracker, TrackerSettings};
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WALLET: &str = "0x1000000000000000000000000000000000000001";
pub const WALLET_2: &str = "0x2000000000000000000000000000000000000002";
pub const COUNTERPARTY: &str = "0x9000000000000000000000000000000000000009";
pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";
pub const UNKNOWN_TOKEN: &str = "0x3000000000000000000000000000000000000003";

pub fn tracker_settings() -> TrackerSettings {
    TrackerSettings {
        chain_id: 1,
        block_delay: 8,
        poll_interval: Duration::from_secs(60),
    }
}

pub fn usdc() -> Asset {
    Asset {
        chain_id: 1,
        address: USDC.to_string(),
        name: "USD Coin".to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
    }
}

pub fn dai() -> Asset {
    Asset {
        chain_id: 1,
        address: DAI.to_string(),
        name: "Dai Stablecoin".to_string(),
        symbol: "DAI".to_string(),
        decimals: 18,
    }
}

pub fn token_balance(address: &str, raw: u64) -> TokenBalance {
    TokenBalance {
        address: address.to_string(),
        balance: BigUint::from(raw),
    }
}

pub fn token_transfer(tx_hash: &str, block: u64, from: &str, to: &str, asset: &str, raw: u64, log_index: u32) -> TokenTransfer {
    TokenTransfer {
        tx_hash: tx_hash.to_string(),
        block,
        asset_name: String::new(),
        asset_address: asset.to_string(),
        amount: BigUint::from(raw),
        from_address: from.to_string(),
        to_address: to.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + block as i64 * 12, 0).unwrap_or_default(),
        log_index,
    }
}

pub fn injected() -> sqlx::Error {
    sqlx::Error::Protocol("injected failure".to_string())
}

/// Chain with a fixed head and per-address native balances.
#[derive(Default)]
pub struct FakeChain {
    pub head: AtomicU64,
    pub balances: Mutex<HashMap<String, BigUint>>,
    pub balance_calls: Mutex<Vec<String>>,
}

impl FakeChain {
    pub fn at_height(head: u64) -> Self {
        let chain = Self::default();
        chain.head.store(head, Ordering::SeqCst);
        chain
    }

    pub fn set_balance(&self, address: &str, wei: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert(address.to_string(), BigUint::from(wei));
    }

    pub fn balance_calls(&self) -> Vec<String> {
        self.balance_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for FakeChain {
    async fn current_block_height(&self) -> Result<u64, ClientError> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_balance(&self, address: &str, _block_tag: &str) -> Result<BigUint, ClientError> {
        self.balance_calls.lock().unwrap().push(address.to_string());
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

/// Provider backed by a flat list of on-chain transfers, answering each
/// one-sided query the way the real indexer does.
#[derive(Default)]
pub struct FakeProvider {
    pub balances: Mutex<HashMap<String, Vec<TokenBalance>>>,
    pub transfers: Mutex<Vec<TokenTransfer>>,
    pub prices: Mutex<HashMap<String, f64>>,
    pub fail_prices: Mutex<bool>,
    pub price_calls: AtomicUsize,
    pub queries: Mutex<Vec<TransferQuery>>,
}

impl FakeProvider {
    pub fn set_price(&self, address: &str, usd: f64) {
        self.prices.lock().unwrap().insert(address.to_string(), usd);
    }

    pub fn set_balances(&self, wallet: &str, balances: Vec<TokenBalance>) {
        self.balances.lock().unwrap().insert(wallet.to_string(), balances);
    }

    pub fn push_transfer(&self, transfer: TokenTransfer) {
        self.transfers.lock().unwrap().push(transfer);
    }

    pub fn queries(&self) -> Vec<TransferQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetProvider for FakeProvider {
    async fn token_balances(&self, address: &str) -> Result<Vec<TokenBalance>, ProviderError> {
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_asset_transfers(&self, query: &TransferQuery) -> Result<Vec<TokenTransfer>, ProviderError> {
        self.queries.lock().unwrap().push(query.clone());
        let in_range = |block: u64| block >= query.from_block && (query.to_block == 0 || block <= query.to_block);

        Ok(self
            .transfers
            .lock()
            .unwrap()
            .iter()
            .filter(|tr| in_range(tr.block))
            .filter(|tr| match &query.address {
                AddressFilter::From(address) => &tr.from_address == address,
                AddressFilter::To(address) => &tr.to_address == address,
            })
            .cloned()
            .collect())
    }

    async fn get_token_prices(&self, tokens: &[String]) -> Result<HashMap<String, f64>, ProviderError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_prices.lock().unwrap() {
            return Err(ClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }
            .into());
        }

        let prices = self.prices.lock().unwrap();
        Ok(tokens
            .iter()
            .filter_map(|token| prices.get(token).map(|price| (token.clone(), *price)))
            .collect())
    }
}

/// Treasury and checkpoint store with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    pub wallets: Mutex<Vec<Wallet>>,
    pub assets: Mutex<Vec<Asset>>,
    pub balances: Mutex<HashMap<String, Vec<WalletBalance>>>,
    pub ledger: Mutex<Vec<Transfer>>,
    pub checkpoints: Mutex<HashMap<String, u64>>,
    /// Transaction hash whose insert fails.
    pub fail_transfer: Mutex<Option<String>>,
    /// Wallet whose balance update fails.
    pub fail_balances: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn with_wallets(wallets: &[&str], assets: Vec<Asset>) -> Self {
        let store = Self::default();
        *store.wallets.lock().unwrap() = wallets
            .iter()
            .map(|address| Wallet {
                address: address.to_string(),
            })
            .collect();
        *store.assets.lock().unwrap() = assets;
        store
    }

    pub fn checkpoint(&self, wallet: &str) -> Option<u64> {
        self.checkpoints
            .lock()
            .unwrap()
            .get(&Tracker::checkpoint_key(wallet))
            .copied()
    }

    pub fn set_checkpoint(&self, wallet: &str, block: u64) {
        self.checkpoints
            .lock()
            .unwrap()
            .insert(Tracker::checkpoint_key(wallet), block);
    }

    pub fn balances_of(&self, wallet: &str) -> Vec<WalletBalance> {
        self.balances
            .lock()
            .unwrap()
            .get(wallet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn ledger(&self) -> Vec<Transfer> {
        self.ledger.lock().unwrap().clone()
    }
}

#[async_trait]
impl TreasuryStore for MemoryStore {
    async fn get_wallets(&self) -> Result<Vec<Wallet>, StoreError> {
        Ok(self.wallets.lock().unwrap().clone())
    }

    async fn get_assets(&self) -> Result<Vec<Asset>, StoreError> {
        Ok(self.assets.lock().unwrap().clone())
    }

    async fn update_wallet_balances(&self, wallet: &str, balances: &[WalletBalance]) -> Result<(), StoreError> {
        if self.fail_balances.lock().unwrap().as_deref() == Some(wallet) {
            return Err(injected().into());
        }
        self.balances
            .lock()
            .unwrap()
            .insert(wallet.to_string(), balances.to_vec());
        Ok(())
    }

    async fn create_transfer(&self, transfer: &Transfer) -> Result<bool, StoreError> {
        if self.fail_transfer.lock().unwrap().as_deref() == Some(transfer.tx_hash.as_str()) {
            return Err(injected().into());
        }

        let mut ledger = self.ledger.lock().unwrap();
        let exists = ledger.iter().any(|t| {
            t.chain_id == transfer.chain_id && t.tx_hash == transfer.tx_hash && t.log_index == transfer.log_index
        });
        if exists {
            return Ok(false);
        }
        ledger.push(transfer.clone());
        Ok(true)
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn get_u64(&self, key: &str) -> Result<u64, StoreError> {
        self.checkpoints
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn set_u64(&self, key: &str, value: u64) -> Result<(), StoreError> {
        self.checkpoints.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

pub struct Harness {
    pub chain: Arc<FakeChain>,
    pub provider: Arc<FakeProvider>,
    pub store: Arc<MemoryStore>,
    pub tracker: Arc<Tracker>,
}

pub fn harness(chain: FakeChain, provider: FakeProvider, store: MemoryStore) -> Harness {
    let chain = Arc::new(chain);
    let provider = Arc::new(provider);
    let store = Arc::new(store);
    let tracker = Arc::new(Tracker::new(
        chain.clone(),
        provider.clone(),
        store.clone(),
        store.clone(),
        tracker_settings(),
    ));

    Harness {
        chain,
        provider,
        store,
        tracker,
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
