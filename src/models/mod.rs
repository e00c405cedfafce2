// Treasury domain models: tracked wallets, the asset registry,
// balance snapshots and the transfer ledger.

pub mod decimal;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel address standing in for the native coin, which has no contract.
pub const ETHER_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// Wrapped native coin. The price provider only quotes the wrapped token,
/// so its price is copied onto [`ETHER_ADDRESS`].
pub const WETH_ADDRESS: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";

pub const NATIVE_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub chain_id: i64,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

impl Asset {
    /// Registry entry used for the native coin when the operator has not added one.
    pub fn native(chain_id: i64) -> Self {
        Self {
            chain_id,
            address: ETHER_ADDRESS.to_string(),
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: NATIVE_DECIMALS,
        }
    }
}

/// One row of a wallet's balance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub chain_id: i64,
    /// Asset address
    pub address: String,
    pub wallet: String,
    pub amount: BigDecimal,
    pub usd_worth: f64,
    pub eth_worth: BigDecimal,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            other => Err(format!("unknown transfer direction: {}", other)),
        }
    }
}

/// A ledger entry, unique on `(chain_id, tx_hash, log_index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub chain_id: i64,
    pub tx_hash: String,
    pub block_number: u64,
    pub block_timestamp: i64,
    pub from_address: String,
    pub to_address: String,
    pub asset: String,
    pub amount: BigDecimal,
    pub direction: TransferDirection,
    pub log_index: u32,
}

/// A stored transfer as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerTransfer {
    pub id: i64,
    #[serde(flatten)]
    pub transfer: Transfer,
    pub asset_symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreasuryTotals {
    pub wallets: i64,
    pub assets: i64,
    pub total_value_usd: f64,
    pub last_updated: Option<DateTime<Utc>>,
}
