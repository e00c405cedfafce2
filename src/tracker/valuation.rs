use crate::models::decimal::from_base_units;
use crate::models::{Asset, WalletBalance, ETHER_ADDRESS, NATIVE_DECIMALS, WETH_ADDRESS};
use crate::provider::TokenBalance;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::collections::HashMap;
use std::fmt;

/// Fractional digits kept on a token's native-coin worth.
const ETH_WORTH_SCALE: i64 = 18;

/// Outcome of a lookup that may legitimately come up empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The address is not in the asset registry.
    UnknownAsset(String),
    /// The asset is registered but the provider returned no USD price.
    MissingPrice(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAsset(address) => write!(f, "unknown asset {}", address),
            Self::MissingPrice(address) => write!(f, "no price for asset {}", address),
        }
    }
}

/// Asset registry and USD prices loaded once at the start of a cycle.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    assets: HashMap<String, Asset>,
    prices: HashMap<String, f64>,
}

impl PriceSnapshot {
    /// Addresses to send to the price endpoint: the wrapped native coin
    /// followed by every registered asset.
    pub fn price_targets(assets: &[Asset]) -> Vec<String> {
        let mut targets = vec![WETH_ADDRESS.to_string()];
        for asset in assets {
            if !targets.contains(&asset.address) {
                targets.push(asset.address.clone());
            }
        }
        targets
    }

    /// Build the snapshot. The wrapped native price, when present, is copied
    /// onto the native sentinel, and the sentinel is always a known asset.
    pub fn new(chain_id: i64, assets: Vec<Asset>, mut prices: HashMap<String, f64>) -> Self {
        let mut assets: HashMap<String, Asset> = assets
            .into_iter()
            .map(|asset| (asset.address.clone(), asset))
            .collect();
        assets
            .entry(ETHER_ADDRESS.to_string())
            .or_insert_with(|| Asset::native(chain_id));

        match prices.get(WETH_ADDRESS).copied() {
            Some(price) => {
                prices.insert(ETHER_ADDRESS.to_string(), price);
            }
            None => {
                prices.remove(ETHER_ADDRESS);
            }
        }

        Self { assets, prices }
    }

    pub fn asset(&self, address: &str) -> Lookup<&Asset> {
        match self.assets.get(address) {
            Some(asset) => Lookup::Found(asset),
            None => Lookup::Skipped(SkipReason::UnknownAsset(address.to_string())),
        }
    }

    pub fn price(&self, address: &str) -> Lookup<f64> {
        match self.prices.get(address) {
            Some(price) if price.is_finite() => Lookup::Found(*price),
            _ => Lookup::Skipped(SkipReason::MissingPrice(address.to_string())),
        }
    }

    /// USD price of the native coin, 0 when unpriced.
    pub fn native_price(&self) -> f64 {
        match self.price(ETHER_ADDRESS) {
            Lookup::Found(price) => price,
            Lookup::Skipped(_) => 0.0,
        }
    }

    /// Value one ERC-20 balance. Unregistered or unpriced assets are skipped.
    pub fn value_token_balance(
        &self,
        chain_id: i64,
        wallet: &str,
        balance: &TokenBalance,
        now: DateTime<Utc>,
    ) -> Lookup<WalletBalance> {
        let asset = match self.asset(&balance.address) {
            Lookup::Found(asset) => asset,
            Lookup::Skipped(reason) => return Lookup::Skipped(reason),
        };
        let price = match self.price(&balance.address) {
            Lookup::Found(price) => price,
            Lookup::Skipped(reason) => return Lookup::Skipped(reason),
        };

        let amount = from_base_units(&balance.balance, asset.decimals);
        let usd = amount.clone() * to_decimal(price);
        let native_price = self.native_price();
        let eth_worth = if native_price == 0.0 {
            BigDecimal::zero()
        } else {
            (usd.clone() / to_decimal(native_price)).round(ETH_WORTH_SCALE)
        };

        Lookup::Found(WalletBalance {
            chain_id,
            address: balance.address.clone(),
            wallet: wallet.to_string(),
            amount,
            usd_worth: usd.to_f64().unwrap_or_default(),
            eth_worth,
            last_updated: now,
        })
    }

    /// Value the native coin balance. Always produces a row; an unpriced
    /// native coin is worth 0 USD.
    pub fn value_native_balance(
        &self,
        chain_id: i64,
        wallet: &str,
        wei: &BigUint,
        now: DateTime<Utc>,
    ) -> WalletBalance {
        let amount = from_base_units(wei, NATIVE_DECIMALS);
        let usd = amount.clone() * to_decimal(self.native_price());

        WalletBalance {
            chain_id,
            address: ETHER_ADDRESS.to_string(),
            wallet: wallet.to_string(),
            eth_worth: amount.clone(),
            amount,
            usd_worth: usd.to_f64().unwrap_or_default(),
            last_updated: now,
        }
    }
}

// Goes through the shortest round-trip representation so 0.1 stays 0.1.
fn to_decimal(value: f64) -> BigDecimal {
    value.to_string().parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x1111111111111111111111111111111111111111";

    fn token(decimals: u32) -> Asset {
        Asset {
            chain_id: 1,
            address: TOKEN.to_string(),
            name: "Token".to_string(),
            symbol: "TKN".to_string(),
            decimals,
        }
    }

    fn raw(units: &str) -> BigUint {
        units.parse().unwrap()
    }

    #[test]
    fn usd_and_eth_worth_of_a_token() {
        let prices = HashMap::from([(TOKEN.to_string(), 10.0), (WETH_ADDRESS.to_string(), 2000.0)]);
        let snapshot = PriceSnapshot::new(1, vec![token(18)], prices);
        let balance = TokenBalance {
            address: TOKEN.to_string(),
            balance: raw("2500000000000000000"),
        };

        let Lookup::Found(row) = snapshot.value_token_balance(1, "0xw", &balance, Utc::now()) else {
            panic!("expected a valued balance");
        };
        assert_eq!(row.amount.normalized().to_plain_string(), "2.5");
        assert_eq!(row.usd_worth, 25.0);
        assert_eq!(row.eth_worth.normalized().to_plain_string(), "0.0125");
    }

    #[test]
    fn eth_worth_is_zero_without_a_native_price() {
        let prices = HashMap::from([(TOKEN.to_string(), 10.0)]);
        let snapshot = PriceSnapshot::new(1, vec![token(18)], prices);
        let balance = TokenBalance {
            address: TOKEN.to_string(),
            balance: raw("2500000000000000000"),
        };

        let Lookup::Found(row) = snapshot.value_token_balance(1, "0xw", &balance, Utc::now()) else {
            panic!("expected a valued balance");
        };
        assert_eq!(row.usd_worth, 25.0);
        assert!(row.eth_worth.is_zero());
    }

    #[test]
    fn unknown_and_unpriced_assets_are_skipped() {
        let snapshot = PriceSnapshot::new(1, vec![token(6)], HashMap::new());
        let unpriced = TokenBalance {
            address: TOKEN.to_string(),
            balance: raw("1"),
        };
        let unknown = TokenBalance {
            address: "0x2222222222222222222222222222222222222222".to_string(),
            balance: raw("1"),
        };

        assert_eq!(
            snapshot.value_token_balance(1, "0xw", &unpriced, Utc::now()),
            Lookup::Skipped(SkipReason::MissingPrice(TOKEN.to_string()))
        );
        assert_eq!(
            snapshot.value_token_balance(1, "0xw", &unknown, Utc::now()),
            Lookup::Skipped(SkipReason::UnknownAsset(unknown.address.clone()))
        );
    }

    #[test]
    fn wrapped_price_is_copied_onto_the_native_sentinel() {
        let prices = HashMap::from([(WETH_ADDRESS.to_string(), 3000.0)]);
        let snapshot = PriceSnapshot::new(1, Vec::new(), prices);

        assert_eq!(snapshot.price(ETHER_ADDRESS), Lookup::Found(3000.0));
        assert!(matches!(snapshot.asset(ETHER_ADDRESS), Lookup::Found(a) if a.decimals == 18));

        let row = snapshot.value_native_balance(1, "0xw", &raw("1500000000000000000"), Utc::now());
        assert_eq!(row.amount.normalized().to_plain_string(), "1.5");
        assert_eq!(row.eth_worth, row.amount);
        assert_eq!(row.usd_worth, 4500.0);
    }

    #[test]
    fn unpriced_native_balance_is_still_reported() {
        let snapshot = PriceSnapshot::new(1, Vec::new(), HashMap::new());
        let row = snapshot.value_native_balance(1, "0xw", &BigUint::from(0u8), Utc::now());

        assert_eq!(row.address, ETHER_ADDRESS);
        assert!(row.amount.is_zero());
        assert_eq!(row.usd_worth, 0.0);
    }

    #[test]
    fn price_targets_start_with_the_wrapped_native_coin() {
        let targets = PriceSnapshot::price_targets(&[token(6), token(6)]);
        assert_eq!(targets, vec![WETH_ADDRESS.to_string(), TOKEN.to_string()]);
    }
}
