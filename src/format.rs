//! Decimal Scaling
//!
//! On-chain amounts are integers. Everything handed to a caller is a pair of
//! the raw integer and its decimal rendering:
//! - `value = amount / 10^decimal`
//! - 64.64 fixed-point rates and fees: `value = raw / 2^64 / 10^decimal`
//!
//! Division by 2^64 is done exactly as `raw * 5^64 / 10^64`, so every
//! rendering is a finite decimal string with no rounding.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SdkError};

/// Number of fractional bits in the protocol's fixed-point rates
pub const FIXED_POINT_BITS: u32 = 64;

/// Raw integer amount with its human readable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaledAmount {
    pub amount: String,
    pub value: String,
}

impl ScaledAmount {
    pub fn new(raw: U256, decimal: u8) -> Self {
        Self {
            amount: raw.to_string(),
            value: format_amount(raw, decimal),
        }
    }

    pub fn from_u64(raw: u64, decimal: u8) -> Self {
        Self::new(U256::from(raw), decimal)
    }

    /// A 64.64 fixed-point raw value
    pub fn fixed_point(raw: U256, decimal: u8) -> Result<Self> {
        Ok(Self {
            amount: raw.to_string(),
            value: format_fixed_point(raw, decimal)?,
        })
    }
}

/// `raw / 10^decimal` as a plain decimal string
pub fn format_amount(raw: U256, decimal: u8) -> String {
    format_scaled(raw, decimal as u32)
}

/// Same as [`format_amount`] for amounts that arrive as strings
pub fn format_amount_str(raw: &str, decimal: u8) -> Result<String> {
    let raw = parse_integer(raw)?;
    Ok(format_amount(raw, decimal))
}

/// `raw / 2^64 / 10^decimal`
pub fn format_fixed_point(raw: U256, decimal: u8) -> Result<String> {
    let numerator = raw
        .checked_mul(five_pow_64())
        .ok_or_else(|| SdkError::decode(format!("fixed-point value {} overflows", raw)))?;
    Ok(format_scaled(numerator, FIXED_POINT_BITS + decimal as u32))
}

/// Parse a decimal string back into raw units
///
/// Rejects values with more fractional digits than `decimal`.
pub fn parse_amount(value: &str, decimal: u8) -> Result<U256> {
    parse_amount_inner(value, decimal, false)
}

/// Like [`parse_amount`] but floors extra fractional digits
pub fn parse_amount_rounded(value: &str, decimal: u8) -> Result<U256> {
    parse_amount_inner(value, decimal, true)
}

/// The API sends decimals as strings ("9")
pub fn parse_decimal(decimal: &str) -> Result<u8> {
    let d: u8 = decimal
        .trim()
        .parse()
        .map_err(|_| SdkError::decode(format!("invalid decimal count '{}'", decimal)))?;
    if d > 38 {
        return Err(SdkError::decode(format!("decimal count {} is out of range", d)));
    }
    Ok(d)
}

/// Minimum acceptable output after applying a slippage fraction (0.005 = 0.5%)
pub fn min_out_with_slippage(amount: u64, slippage: f64) -> u64 {
    let bps = (slippage.clamp(0.0, 1.0) * 10_000.0).round() as u128;
    ((amount as u128 * (10_000 - bps)) / 10_000) as u64
}

fn five_pow_64() -> U256 {
    U256::from(5u64).pow(U256::from(FIXED_POINT_BITS))
}

fn format_scaled(numerator: U256, scale: u32) -> String {
    let digits = numerator.to_string();
    let scale = scale as usize;
    if scale == 0 {
        return digits;
    }

    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

fn parse_integer(raw: &str) -> Result<U256> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SdkError::decode(format!("invalid integer amount '{}'", raw)));
    }
    U256::from_str_radix(raw, 10)
        .map_err(|e| SdkError::decode(format!("invalid integer amount '{}': {}", raw, e)))
}

fn parse_amount_inner(value: &str, decimal: u8, floor: bool) -> Result<U256> {
    let value = value.trim();
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(SdkError::decode(format!("invalid amount '{}'", value)));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(SdkError::decode(format!("invalid amount '{}'", value)));
    }

    let decimal = decimal as usize;
    let frac_part = if frac_part.len() > decimal {
        let (kept, dropped) = frac_part.split_at(decimal);
        if !floor && dropped.bytes().any(|b| b != b'0') {
            return Err(SdkError::decode(format!(
                "amount '{}' has more than {} fractional digits",
                value, decimal
            )));
        }
        kept.to_string()
    } else {
        format!("{:0<width$}", frac_part, width = decimal)
    };

    let joined = format!("{}{}", int_part, frac_part);
    let joined = joined.trim_start_matches('0');
    if joined.is_empty() {
        return Ok(U256::ZERO);
    }
    parse_integer(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_nine_decimals() {
        assert_eq!(format_amount(U256::from(1_500_000_000u64), 9), "1.5");
        assert_eq!(format_amount(U256::from(1u64), 9), "0.000000001");
        assert_eq!(format_amount(U256::ZERO, 9), "0");
        assert_eq!(format_amount(U256::from(42u64), 0), "42");
        assert_eq!(format_amount(U256::from(1_000_000_000_000u64), 9), "1000");
    }

    #[test]
    fn test_format_amount_str() {
        assert_eq!(format_amount_str("1500000000", 9).unwrap(), "1.5");
        assert!(format_amount_str("-5", 9).is_err());
        assert!(format_amount_str("", 9).is_err());
    }

    #[test]
    fn test_fixed_point_one_unit() {
        let one = U256::from(1u64) << 64;
        assert_eq!(format_fixed_point(one, 0).unwrap(), "1");
    }

    #[test]
    fn test_fixed_point_fractions() {
        let half = U256::from(1u64) << 63;
        assert_eq!(format_fixed_point(half, 0).unwrap(), "0.5");

        // 1.05 is not a dyadic rational, check the decimal-scaled path instead
        let one_and_quarter = (U256::from(5u64) << 64) / U256::from(4u64);
        assert_eq!(format_fixed_point(one_and_quarter, 0).unwrap(), "1.25");
        assert_eq!(format_fixed_point(one_and_quarter, 2).unwrap(), "0.0125");
    }

    #[test]
    fn test_fixed_point_smallest_unit_is_exact() {
        let value = format_fixed_point(U256::from(1u64), 0).unwrap();
        // 2^-64 has exactly 64 fractional digits
        let expected = format!("0.{}542101086242752217003726400434970855712890625", "0".repeat(19));
        assert_eq!(value, expected);
    }

    #[test]
    fn test_parse_amount_round_trip() {
        for (raw, decimal) in [(1_500_000_000u64, 9u8), (1, 9), (0, 6), (123_456_789, 6), (10, 0)] {
            let formatted = format_amount(U256::from(raw), decimal);
            assert_eq!(parse_amount(&formatted, decimal).unwrap(), U256::from(raw));
        }
    }

    #[test]
    fn test_parse_amount_rejects_excess_precision() {
        assert!(parse_amount("1.0000000001", 9).is_err());
        assert_eq!(parse_amount("1.5000000000", 9).unwrap(), U256::from(1_500_000_000u64));
        assert_eq!(
            parse_amount_rounded("1.0000000019", 9).unwrap(),
            U256::from(1_000_000_001u64)
        );
    }

    #[test]
    fn test_parse_amount_edge_forms() {
        assert_eq!(parse_amount(".5", 1).unwrap(), U256::from(5u64));
        assert_eq!(parse_amount("2.", 2).unwrap(), U256::from(200u64));
        assert_eq!(parse_amount("0", 9).unwrap(), U256::ZERO);
        assert!(parse_amount(".", 9).is_err());
        assert!(parse_amount("1e9", 9).is_err());
        assert!(parse_amount("-1", 9).is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("9").unwrap(), 9);
        assert_eq!(parse_decimal(" 6 ").unwrap(), 6);
        assert!(parse_decimal("nine").is_err());
        assert!(parse_decimal("99").is_err());
    }

    #[test]
    fn test_scaled_amount() {
        let scaled = ScaledAmount::from_u64(1_500_000_000, 9);
        assert_eq!(scaled.amount, "1500000000");
        assert_eq!(scaled.value, "1.5");
    }

    #[test]
    fn test_min_out_with_slippage() {
        assert_eq!(min_out_with_slippage(10_000, 0.005), 9_950);
        assert_eq!(min_out_with_slippage(10_000, 0.0), 10_000);
        assert_eq!(min_out_with_slippage(10_000, 2.0), 0);
    }
}
