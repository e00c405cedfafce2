use crate::blockchain::models::{parse_hex_biguint, parse_hex_u64, to_hex_quantity};
use crate::models::ETHER_ADDRESS;
use crate::provider::ProviderError;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page size for `alchemy_getAssetTransfers`.
pub const MAX_COUNT: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalance {
    pub address: String,
    pub balance: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub tx_hash: String,
    pub block: u64,
    pub asset_name: String,
    pub asset_address: String,
    pub amount: BigUint,
    pub from_address: String,
    pub to_address: String,
    pub timestamp: DateTime<Utc>,
    pub log_index: u32,
}

/// The provider filters transfers on one side only, so a query names
/// either the sender or the recipient, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFilter {
    From(String),
    To(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuery {
    pub address: AddressFilter,
    pub from_block: u64,
    /// 0 means "latest"
    pub to_block: u64,
}

impl TransferQuery {
    pub fn outgoing(wallet: &str, from_block: u64, to_block: u64) -> Self {
        Self {
            address: AddressFilter::From(wallet.to_string()),
            from_block,
            to_block,
        }
    }

    pub fn incoming(wallet: &str, from_block: u64, to_block: u64) -> Self {
        Self {
            address: AddressFilter::To(wallet.to_string()),
            from_block,
            to_block,
        }
    }

    pub fn to_params<'a>(&'a self, max_count: u64, page_key: Option<&'a str>) -> AssetTransfersParams<'a> {
        let (from_address, to_address) = match &self.address {
            AddressFilter::From(addr) => (Some(addr.as_str()), None),
            AddressFilter::To(addr) => (None, Some(addr.as_str())),
        };

        let to_block = if self.to_block == 0 {
            "latest".to_string()
        } else {
            to_hex_quantity(self.to_block)
        };

        AssetTransfersParams {
            from_block: to_hex_quantity(self.from_block),
            to_block,
            from_address,
            to_address,
            category: ["erc20"],
            exclude_zero_value: true,
            with_metadata: true,
            order: "desc",
            max_count: to_hex_quantity(max_count),
            page_key,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersParams<'a> {
    pub from_block: String,
    pub to_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<&'a str>,
    pub category: [&'static str; 1],
    pub exclude_zero_value: bool,
    pub with_metadata: bool,
    pub order: &'static str,
    pub max_count: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesResult {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub token_balances: Vec<RawTokenBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenBalance {
    pub contract_address: String,
    pub token_balance: Option<String>,
}

impl TokenBalancesResult {
    pub fn into_token_balances(self) -> Result<Vec<TokenBalance>, ProviderError> {
        self.token_balances
            .into_iter()
            .map(|raw| {
                let value = raw
                    .token_balance
                    .ok_or_else(|| ProviderError::MissingField("tokenBalance", raw.contract_address.clone()))?;
                let balance = parse_hex_biguint(&value).map_err(|source| ProviderError::Hex {
                    field: "tokenBalance",
                    source,
                })?;
                Ok(TokenBalance {
                    address: raw.contract_address.to_lowercase(),
                    balance,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersResult {
    #[serde(default)]
    pub transfers: Vec<RawTransfer>,
    pub page_key: Option<String>,
}

impl AssetTransfersResult {
    /// Cursor for the next page, if the provider returned one.
    pub fn next_page_key(&self) -> Option<&str> {
        self.page_key.as_deref().filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransfer {
    pub block_num: String,
    pub unique_id: String,
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub asset: Option<String>,
    pub category: Option<String>,
    pub raw_contract: RawContract,
    pub metadata: TransferMetadata,
}

#[derive(Debug, Deserialize)]
pub struct RawContract {
    pub value: Option<String>,
    pub address: Option<String>,
    pub decimal: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    pub block_timestamp: DateTime<Utc>,
}

/// Recover the log index from a unique id of the form `<txHash>:log:<logIndex>`.
pub fn parse_log_index(unique_id: &str) -> Result<u32, ProviderError> {
    let parts: Vec<&str> = unique_id.split(':').collect();
    if parts.len() != 3 || parts[1] != "log" {
        return Err(ProviderError::InvalidUniqueId(unique_id.to_string()));
    }
    parts[2]
        .parse()
        .map_err(|_| ProviderError::InvalidUniqueId(unique_id.to_string()))
}

impl RawTransfer {
    pub fn into_token_transfer(self) -> Result<TokenTransfer, ProviderError> {
        let log_index = parse_log_index(&self.unique_id)?;
        let block = parse_hex_u64(&self.block_num).map_err(|source| ProviderError::Hex {
            field: "blockNum",
            source,
        })?;
        let raw_value = self
            .raw_contract
            .value
            .ok_or_else(|| ProviderError::MissingField("rawContract.value", self.unique_id.clone()))?;
        let amount = parse_hex_biguint(&raw_value).map_err(|source| ProviderError::Hex {
            field: "rawContract.value",
            source,
        })?;
        let asset_address = self
            .raw_contract
            .address
            .map(|addr| addr.to_lowercase())
            .unwrap_or_else(|| ETHER_ADDRESS.to_string());

        Ok(TokenTransfer {
            tx_hash: self.hash.to_lowercase(),
            block,
            asset_name: self.asset.unwrap_or_default().to_lowercase(),
            asset_address,
            amount,
            from_address: self.from.to_lowercase(),
            to_address: self.to.unwrap_or_default().to_lowercase(),
            timestamp: self.metadata.block_timestamp,
            log_index,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PriceRequest<'a> {
    pub addresses: Vec<PriceAddress<'a>>,
}

#[derive(Debug, Serialize)]
pub struct PriceAddress<'a> {
    pub network: &'a str,
    pub address: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PriceResponse {
    #[serde(default)]
    pub data: Vec<PriceData>,
}

#[derive(Debug, Deserialize)]
pub struct PriceData {
    pub network: Option<String>,
    pub address: String,
    #[serde(default)]
    pub prices: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub currency: String,
    pub value: String,
    pub last_updated_at: Option<String>,
}

impl PriceResponse {
    /// Keep only the USD quote for each asset, keyed by lower-case address.
    pub fn into_usd_prices(self) -> Result<HashMap<String, f64>, ProviderError> {
        let mut out = HashMap::new();
        for info in self.data {
            for price in info.prices.iter().filter(|p| p.currency == "usd") {
                let value: f64 = price
                    .value
                    .parse()
                    .map_err(|_| ProviderError::InvalidPrice(price.value.clone()))?;
                out.insert(info.address.to_lowercase(), value);
            }
        }
        Ok(out)
    }
}
