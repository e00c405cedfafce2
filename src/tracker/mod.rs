pub mod polling;
pub mod traits;
pub mod valuation;

pub use polling::{start_polling, wait_or_cancel};
pub use valuation::{Lookup, PriceSnapshot, SkipReason};

use crate::config::Config;
use crate::db::StoreError;
use crate::error::TrackerError;
use crate::models::{Transfer, TransferDirection, Wallet, ETHER_ADDRESS};
use crate::provider::{TokenTransfer, TransferQuery};
use bigdecimal::BigDecimal;
use chrono::Utc;
use num_bigint::BigInt;
use std::sync::Arc;
use std::time::Duration;
use traits::{AssetProvider, ChainRpc, CheckpointStore, TreasuryStore};
use tracing::{debug, info, warn};

/// Settings key prefix for a wallet's last processed block.
pub const CHECKPOINT_PREFIX: &str = "last_processed_block_";

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub chain_id: i64,
    /// Most recent blocks left out of transfer scans until they are final.
    pub block_delay: u64,
    pub poll_interval: Duration,
}

impl TrackerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chain_id: config.chain_id,
            block_delay: config.block_delay,
            poll_interval: config.poll_interval,
        }
    }
}

/// What one reconciliation cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub wallets_processed: usize,
    /// Wallets whose checkpoint had already reached the finality bound.
    pub wallets_up_to_date: usize,
    pub balances_written: usize,
    pub transfers_fetched: usize,
    pub transfers_inserted: usize,
    pub transfers_duplicate: usize,
    pub skipped: Vec<SkipReason>,
}

/// Mirrors treasury wallets into the local store: balance snapshots every
/// cycle, and the transfer ledger up to the finality bound.
pub struct Tracker {
    rpc: Arc<dyn ChainRpc>,
    provider: Arc<dyn AssetProvider>,
    checkpoints: Arc<dyn CheckpointStore>,
    store: Arc<dyn TreasuryStore>,
    settings: TrackerSettings,
}

impl Tracker {
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        provider: Arc<dyn AssetProvider>,
        checkpoints: Arc<dyn CheckpointStore>,
        store: Arc<dyn TreasuryStore>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            rpc,
            provider,
            checkpoints,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn checkpoint_key(wallet: &str) -> String {
        format!("{}{}", CHECKPOINT_PREFIX, wallet)
    }

    /// Load the asset registry and price it in a single provider call.
    pub async fn load_prices(&self) -> Result<PriceSnapshot, TrackerError> {
        let assets = self.store.get_assets().await.map_err(TrackerError::Assets)?;
        let targets = PriceSnapshot::price_targets(&assets);

        let prices = self
            .provider
            .get_token_prices(&targets)
            .await
            .map_err(TrackerError::Pricing)?;
        debug!(assets = assets.len(), priced = prices.len(), "Loaded asset prices");

        Ok(PriceSnapshot::new(self.settings.chain_id, assets, prices))
    }

    /// Rebuild the wallet's balance snapshot and replace the stored one.
    pub async fn process_balances(
        &self,
        snapshot: &PriceSnapshot,
        wallet: &Wallet,
        report: &mut CycleReport,
    ) -> Result<(), TrackerError> {
        let chain_id = self.settings.chain_id;
        let tokens = self
            .provider
            .token_balances(&wallet.address)
            .await
            .map_err(TrackerError::TokenBalances)?;
        let wei = self
            .rpc
            .get_balance(&wallet.address, "latest")
            .await
            .map_err(TrackerError::NativeBalance)?;

        let now = Utc::now();
        let mut balances = Vec::with_capacity(tokens.len() + 1);
        if let Lookup::Skipped(reason) = snapshot.price(ETHER_ADDRESS) {
            info!(wallet = %wallet.address, "{}, native balance valued at 0", reason);
        }
        balances.push(snapshot.value_native_balance(chain_id, &wallet.address, &wei, now));

        for token in &tokens {
            match snapshot.value_token_balance(chain_id, &wallet.address, token, now) {
                Lookup::Found(balance) => balances.push(balance),
                Lookup::Skipped(reason) => {
                    info!(wallet = %wallet.address, "{}, skipping balance", reason);
                    report.skipped.push(reason);
                }
            }
        }

        self.store
            .update_wallet_balances(&wallet.address, &balances)
            .await
            .map_err(TrackerError::UpdateBalances)?;
        report.balances_written += balances.len();

        Ok(())
    }

    /// Outgoing then incoming transfers over `[from_block, to_block]`, tagged
    /// with their direction relative to `wallet`.
    pub async fn fetch_transfers(
        &self,
        snapshot: &PriceSnapshot,
        wallet: &Wallet,
        from_block: u64,
        to_block: u64,
        report: &mut CycleReport,
    ) -> Result<Vec<Transfer>, TrackerError> {
        let outgoing = self
            .provider
            .get_asset_transfers(&TransferQuery::outgoing(&wallet.address, from_block, to_block))
            .await
            .map_err(TrackerError::OutgoingTransfers)?;
        info!(
            wallet = %wallet.address,
            from_block,
            to_block,
            outgoing = outgoing.len(),
            "Fetched outgoing transfers"
        );

        let incoming = self
            .provider
            .get_asset_transfers(&TransferQuery::incoming(&wallet.address, from_block, to_block))
            .await
            .map_err(TrackerError::IncomingTransfers)?;
        info!(
            wallet = %wallet.address,
            from_block,
            to_block,
            incoming = incoming.len(),
            "Fetched incoming transfers"
        );

        report.transfers_fetched += outgoing.len() + incoming.len();

        let tagged = outgoing
            .into_iter()
            .map(|tr| (tr, TransferDirection::Outgoing))
            .chain(incoming.into_iter().map(|tr| (tr, TransferDirection::Incoming)));

        let mut transfers = Vec::new();
        for (tr, direction) in tagged {
            match self.ledger_transfer(snapshot, tr, direction) {
                Lookup::Found(transfer) => transfers.push(transfer),
                Lookup::Skipped(reason) => {
                    warn!(wallet = %wallet.address, "{}, skipping transfer", reason);
                    report.skipped.push(reason);
                }
            }
        }

        Ok(transfers)
    }

    fn ledger_transfer(
        &self,
        snapshot: &PriceSnapshot,
        tr: TokenTransfer,
        direction: TransferDirection,
    ) -> Lookup<Transfer> {
        if let Lookup::Skipped(reason) = snapshot.asset(&tr.asset_address) {
            return Lookup::Skipped(reason);
        }

        // Ledger amounts stay in raw base units
        Lookup::Found(Transfer {
            chain_id: self.settings.chain_id,
            amount: BigDecimal::from(BigInt::from(tr.amount)),
            block_timestamp: tr.timestamp.timestamp(),
            tx_hash: tr.tx_hash,
            block_number: tr.block,
            from_address: tr.from_address,
            to_address: tr.to_address,
            asset: tr.asset_address,
            direction,
            log_index: tr.log_index,
        })
    }

    /// Ingest transfers between the wallet's checkpoint and the finality
    /// bound. The checkpoint only moves once every transfer is stored.
    pub async fn process_transfers(
        &self,
        snapshot: &PriceSnapshot,
        wallet: &Wallet,
        report: &mut CycleReport,
    ) -> Result<(), TrackerError> {
        let key = Self::checkpoint_key(&wallet.address);
        let checkpoint = match self.checkpoints.get_u64(&key).await {
            Ok(block) => block,
            Err(StoreError::NotFound(_)) => {
                info!(wallet = %wallet.address, "No checkpoint yet, scanning from block 0");
                0
            }
            Err(e) => {
                warn!(wallet = %wallet.address, "Failed to read checkpoint, scanning from block 0: {}", e);
                0
            }
        };

        let head = self
            .rpc
            .current_block_height()
            .await
            .map_err(TrackerError::BlockHeight)?;
        let upper = head.saturating_sub(self.settings.block_delay);
        if checkpoint >= upper {
            debug!(wallet = %wallet.address, checkpoint, upper, "Transfers up to date");
            report.wallets_up_to_date += 1;
            return Ok(());
        }

        let transfers = self
            .fetch_transfers(snapshot, wallet, checkpoint, upper, report)
            .await?;

        for transfer in &transfers {
            let inserted = self
                .store
                .create_transfer(transfer)
                .await
                .map_err(|source| TrackerError::CreateTransfer {
                    tx_hash: transfer.tx_hash.clone(),
                    source,
                })?;
            if inserted {
                report.transfers_inserted += 1;
            } else {
                report.transfers_duplicate += 1;
            }
            debug!(tx_hash = %transfer.tx_hash, log_index = transfer.log_index, inserted, "Processed transfer");
        }

        self.checkpoints
            .set_u64(&key, upper)
            .await
            .map_err(|source| TrackerError::Checkpoint { key, source })?;
        info!(wallet = %wallet.address, checkpoint = upper, "Advanced checkpoint");

        Ok(())
    }

    /// One full pass over every wallet. The first failing wallet ends the
    /// cycle; wallets after it wait for the next one.
    pub async fn run_cycle(&self) -> Result<CycleReport, TrackerError> {
        let mut report = CycleReport::default();
        let snapshot = self.load_prices().await?;
        let wallets = self.store.get_wallets().await.map_err(TrackerError::Wallets)?;

        for wallet in &wallets {
            info!(wallet = %wallet.address, "Processing wallet");
            self.process_balances(&snapshot, wallet, &mut report)
                .await
                .map_err(|e| TrackerError::Balances {
                    wallet: wallet.address.clone(),
                    source: Box::new(e),
                })?;
            self.process_transfers(&snapshot, wallet, &mut report)
                .await
                .map_err(|e| TrackerError::Transfers {
                    wallet: wallet.address.clone(),
                    source: Box::new(e),
                })?;
            report.wallets_processed += 1;
            info!(wallet = %wallet.address, "Finished processing wallet");
        }

        Ok(report)
    }
}
