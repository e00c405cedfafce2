//! Conversions between raw on-chain integers and decimal token amounts.

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use std::str::FromStr;

/// Scale a raw integer amount by the asset's decimal count.
pub fn from_base_units(raw: &BigUint, decimals: u32) -> BigDecimal {
    BigDecimal::new(BigInt::from(raw.clone()), i64::from(decimals))
}

pub fn parse_decimal(value: &str) -> Result<BigDecimal, bigdecimal::ParseBigDecimalError> {
    BigDecimal::from_str(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_by_decimals() {
        let raw = BigUint::from(2_500_000_000_000_000_000u128);
        let amount = from_base_units(&raw, 18);
        assert_eq!(amount, parse_decimal("2.5").unwrap());

        let tiny = from_base_units(&BigUint::from(1u32), 18);
        assert_eq!(tiny.normalized().to_plain_string(), "0.000000000000000001");
    }

    #[test]
    fn keeps_precision_beyond_u128() {
        // 2^256 - 1 wei
        let max = BigUint::parse_bytes(b"ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff", 16).unwrap();
        let amount = from_base_units(&max, 18);
        assert_eq!(
            amount.normalized().to_plain_string(),
            "115792089237316195423570985008687907853269984665640564039457.584007913129639935"
        );
    }
}
