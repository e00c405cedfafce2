use crate::blockchain::ClientError;
use crate::db::StoreError;
use crate::provider::ProviderError;
use std::error::Error as StdError;
use std::fmt::Write;
use thiserror::Error;

/// A failed reconciliation step, labelled with what the tracker was doing.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("failed to get assets")]
    Assets(#[source] StoreError),

    #[error("failed to get token prices")]
    Pricing(#[source] ProviderError),

    #[error("failed to get wallets")]
    Wallets(#[source] StoreError),

    #[error("failed to process balances for wallet {wallet}")]
    Balances {
        wallet: String,
        #[source]
        source: Box<TrackerError>,
    },

    #[error("failed to process transfers for wallet {wallet}")]
    Transfers {
        wallet: String,
        #[source]
        source: Box<TrackerError>,
    },

    #[error("failed to get token balances")]
    TokenBalances(#[source] ProviderError),

    #[error("failed to get native balance")]
    NativeBalance(#[source] ClientError),

    #[error("failed to get current block height")]
    BlockHeight(#[source] ClientError),

    #[error("failed to get outgoing transfers")]
    OutgoingTransfers(#[source] ProviderError),

    #[error("failed to get incoming transfers")]
    IncomingTransfers(#[source] ProviderError),

    #[error("failed to create transfer for tx {tx_hash}")]
    CreateTransfer {
        tx_hash: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to update wallet balances")]
    UpdateBalances(#[source] StoreError),

    #[error("failed to set checkpoint {key}")]
    Checkpoint {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl TrackerError {
    /// The error and every source below it, joined with `": "`.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            let _ = write!(out, ": {}", err);
            source = err.source();
        }
        out
    }
}
