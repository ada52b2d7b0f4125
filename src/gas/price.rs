//! Gas price values and congestion levels.
//!
//! A price arrives from the wire as a hex-encoded wei quantity. It is kept as
//! a 256-bit integer and displayed as gwei with four fractional digits.
//! Congestion levels are classified from the raw wei value, so rounding can
//! never move a price across a threshold.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display};

/// Wei per gwei (10^9).
const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Wei per 10^-4 gwei, the display resolution.
const WEI_PER_GWEI_E4: u64 = 100_000;

/// Congestion level of a gas price.
///
/// Buckets are half-open gwei intervals with the lower bound inclusive:
/// `[0, 5)` low, `[5, 20)` medium, `[20, 50)` high, `[50, ∞)` extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl GasLevel {
    /// Classify a wei quantity. Boundary values belong to the upper bucket:
    /// exactly 5 gwei is `Medium`, not `Low`.
    pub fn classify(wei: U256) -> GasLevel {
        let gwei = |n: u64| U256::from(n as u128 * WEI_PER_GWEI as u128);
        if wei < gwei(5) {
            GasLevel::Low
        } else if wei < gwei(20) {
            GasLevel::Medium
        } else if wei < gwei(50) {
            GasLevel::High
        } else {
            GasLevel::Extreme
        }
    }
}

impl Display for GasLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GasLevel::Low => write!(f, "low"),
            GasLevel::Medium => write!(f, "medium"),
            GasLevel::High => write!(f, "high"),
            GasLevel::Extreme => write!(f, "extreme"),
        }
    }
}

/// Errors turning a wire value into a [`GasPrice`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasPriceError {
    #[error("not a hex quantity: {0}")]
    InvalidHex(String),
    #[error("gas price exceeds displayable range")]
    OutOfRange,
}

/// A gas price: exact wei plus its gwei rendering.
///
/// Serializes as `{"wei": 21000000000, "gwei": "21.0000"}` — wei stays a JSON
/// number while it fits an u128, gwei is a fixed four-digit decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    wei: U256,
    gwei: Decimal,
}

impl GasPrice {
    /// Build from a raw wei quantity.
    ///
    /// The gwei rendering is `wei / 1e9` rounded half-up to four fractional
    /// digits; exact multiples stay exact (21_000_000_000 wei is 21.0000
    /// gwei, no drift).
    pub fn from_wei(wei: U256) -> Result<Self, GasPriceError> {
        let half_step = U256::from(WEI_PER_GWEI_E4 / 2);
        let scaled = wei
            .checked_add(half_step)
            .ok_or(GasPriceError::OutOfRange)?
            / U256::from(WEI_PER_GWEI_E4);
        let scaled = i128::try_from(scaled).map_err(|_| GasPriceError::OutOfRange)?;
        let gwei = Decimal::try_from_i128_with_scale(scaled, 4)
            .map_err(|_| GasPriceError::OutOfRange)?;
        Ok(Self { wei, gwei })
    }

    /// Parse a hex wei quantity as returned by `eth_gasPrice`, with or
    /// without the `0x` prefix.
    pub fn from_hex_wei(hex: &str) -> Result<Self, GasPriceError> {
        let digits = hex.strip_prefix("0x").unwrap_or(hex);
        let wei = U256::from_str_radix(digits, 16)
            .map_err(|_| GasPriceError::InvalidHex(hex.to_string()))?;
        Self::from_wei(wei)
    }

    /// The exact price in wei.
    pub fn wei(&self) -> U256 {
        self.wei
    }

    /// The price in gwei, rounded to four fractional digits.
    pub fn gwei(&self) -> Decimal {
        self.gwei
    }

    /// The congestion level of this price.
    pub fn level(&self) -> GasLevel {
        GasLevel::classify(self.wei)
    }
}

impl Serialize for GasPrice {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("GasPrice", 2)?;
        match u128::try_from(self.wei) {
            Ok(wei) => state.serialize_field("wei", &wei)?,
            Err(_) => state.serialize_field("wei", &self.wei.to_string())?,
        }
        state.serialize_field("gwei", &self.gwei)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(n: u128) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_classify_thresholds() {
        // (gwei * 1e9, expected); boundary values belong to the upper bucket.
        let cases = [
            (0u128, GasLevel::Low),
            (4_999_900_000, GasLevel::Low),
            (5_000_000_000, GasLevel::Medium),
            (19_999_900_000, GasLevel::Medium),
            (20_000_000_000, GasLevel::High),
            (49_999_900_000, GasLevel::High),
            (50_000_000_000, GasLevel::Extreme),
        ];
        for (value, expected) in cases {
            assert_eq!(GasLevel::classify(wei(value)), expected, "{value} wei");
        }
    }

    #[test]
    fn test_gwei_conversion_is_exact_for_exact_values() {
        let price = GasPrice::from_wei(wei(21_000_000_000)).unwrap();
        assert_eq!(price.gwei(), Decimal::new(210_000, 4));
        assert_eq!(price.gwei().to_string(), "21.0000");
    }

    #[test]
    fn test_gwei_rounds_half_up_to_four_digits() {
        // 0.123456789 gwei -> 0.1235
        let price = GasPrice::from_wei(wei(123_456_789)).unwrap();
        assert_eq!(price.gwei(), Decimal::new(1_235, 4));
        // 0.12344 gwei -> 0.1234
        let price = GasPrice::from_wei(wei(123_440_000)).unwrap();
        assert_eq!(price.gwei(), Decimal::new(1_234, 4));
    }

    #[test]
    fn test_from_hex_wei() {
        let price = GasPrice::from_hex_wei("0x4e3b29200").unwrap();
        assert_eq!(price.wei(), wei(21_000_000_000));
        assert_eq!(price.level(), GasLevel::Medium);

        // prefix is optional per standard hex parsing
        let bare = GasPrice::from_hex_wei("4e3b29200").unwrap();
        assert_eq!(bare, price);
    }

    #[test]
    fn test_from_hex_wei_rejects_garbage() {
        assert!(matches!(
            GasPrice::from_hex_wei("0xnope"),
            Err(GasPriceError::InvalidHex(_))
        ));
        assert!(matches!(
            GasPrice::from_hex_wei(""),
            Err(GasPriceError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serialize_shape() {
        let price = GasPrice::from_wei(wei(21_000_000_000)).unwrap();
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["wei"], serde_json::json!(21_000_000_000u64));
        assert_eq!(json["gwei"], serde_json::json!("21.0000"));
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&GasLevel::Low).unwrap(), "\"low\"");
        assert_eq!(
            serde_json::to_string(&GasLevel::Extreme).unwrap(),
            "\"extreme\""
        );
    }
}
