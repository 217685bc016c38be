//! Market configuration
//!
//! A [`CoinConfig`] describes one PT/YT market: the coin types involved,
//! the on-chain objects the calls touch, and the underlying protocol the
//! yield comes from. It is fetched from the API and never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants;
use crate::error::{Result, SdkError};
use crate::format;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinConfig {
    /// Yield-bearing coin the SY wraps
    pub coin_type: String,
    /// Asset the yield-bearing coin is minted from (SUI for LSTs)
    #[serde(default)]
    pub underlying_coin_type: String,
    pub sy_coin_type: String,
    #[serde(default)]
    pub pt_coin_type: String,
    #[serde(default)]
    pub yt_coin_type: String,

    /// Special-cased for "SpringSui" and "Winter"; otherwise informational
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_market: Option<String>,

    /// Decimal places as a string, e.g. "9"
    pub decimal: String,
    /// Maturity in unix milliseconds, as a string
    #[serde(default)]
    pub maturity: String,

    pub package_id: String,
    pub version: String,
    pub sy_state_id: String,
    pub py_state_id: String,
    pub market_state_id: String,
    pub market_factory_config_id: String,
    pub yield_factory_config_id: String,

    pub oracle_package_id: String,
    pub oracle_ticket: String,
    pub price_oracle_config_id: String,

    #[serde(default)]
    pub fee_rate: String,
    #[serde(default)]
    pub underlying_protocol: String,
}

impl CoinConfig {
    pub fn decimals(&self) -> Result<u8> {
        format::parse_decimal(&self.decimal)
    }

    pub fn is_sui_underlying(&self) -> bool {
        constants::is_sui(&self.underlying_coin_type)
    }

    /// `package::module::function` in this market's package
    pub fn target(&self, module: &str, function: &str) -> String {
        format!("{}::{}::{}", self.package_id, module, function)
    }

    /// Same, in the oracle package
    pub fn oracle_target(&self, module: &str, function: &str) -> String {
        format!("{}::{}::{}", self.oracle_package_id, module, function)
    }

    pub fn maturity_ms(&self) -> Option<u64> {
        self.maturity.parse().ok()
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.maturity_ms().map(|m| m <= now_ms).unwrap_or(false)
    }

    /// Coin the user spends for a given entry path
    pub fn input_coin_type(&self, token_type: TokenType) -> &str {
        match token_type {
            TokenType::Underlying => &self.underlying_coin_type,
            TokenType::Wrapped => &self.coin_type,
        }
    }

    /// Short label for logs: the last path segment of the coin type
    pub fn symbol(&self) -> &str {
        self.coin_type.rsplit("::").next().unwrap_or(&self.coin_type)
    }
}

impl fmt::Display for CoinConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol(), self.underlying_protocol)
    }
}

/// Which asset the user brings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// The direct asset; it is minted into the yield-bearing coin first
    Underlying = 0,
    /// The yield-bearing coin itself
    Wrapped = 1,
}

impl TryFrom<u8> for TokenType {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(TokenType::Underlying),
            1 => Ok(TokenType::Wrapped),
            other => Err(SdkError::precondition(format!("unknown token type {}", other))),
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Underlying => write!(f, "underlying"),
            TokenType::Wrapped => write!(f, "wrapped"),
        }
    }
}
