//! Configuration for the PT/YT SDK tools
//!
//! Loaded from the environment (and `.env`) or a TOML file. Library code
//! only reads it; `validate` is the gate the binaries go through before
//! touching the network.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::debug::DebugLog;
use crate::probe::DEFAULT_PROBE_AMOUNTS;
use crate::ptb::ObjectId;
use crate::rpc::SuiEndpoints;

// ============================================
// NETWORK
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

impl Default for Network {
    fn default() -> Self {
        Network::Mainnet
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "MAINNET"),
            Network::Testnet => write!(f, "TESTNET"),
            Network::Devnet => write!(f, "DEVNET"),
        }
    }
}

impl Network {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => SuiEndpoints::MAINNET,
            Network::Testnet => SuiEndpoints::TESTNET,
            Network::Devnet => SuiEndpoints::DEVNET,
        }
    }
}

// ============================================
// CONFIG
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Network ==========
    pub network: Network,

    /// Full node JSON-RPC endpoint
    pub sui_rpc_url: String,

    /// Market API base URL
    pub api_url: String,

    /// HTTP timeout for node and API calls
    pub request_timeout_secs: u64,

    // ========== Dry runs ==========
    /// Address dry runs are simulated as (the connected wallet)
    pub sender_address: Option<String>,

    /// Descending trial amounts for probed quotes, raw units
    pub probe_amounts: Vec<u64>,

    /// Slippage fraction for min-out guards (0.005 = 0.5%)
    pub slippage: f64,

    // ========== Debug log ==========
    pub debug_log: bool,
    pub debug_log_path: String,
}

impl Config {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let network = match env::var("NETWORK")
            .unwrap_or_else(|_| "mainnet".to_string())
            .to_lowercase()
            .as_str()
        {
            "testnet" => Network::Testnet,
            "devnet" => Network::Devnet,
            _ => Network::Mainnet,
        };

        Ok(Self {
            network,
            sui_rpc_url: env::var("SUI_RPC_URL")
                .unwrap_or_else(|_| network.default_rpc_url().to_string()),
            api_url: env::var("API_URL")
                .unwrap_or_else(|_| "https://app.nemoprotocol.com".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),

            sender_address: env::var("SENDER_ADDRESS").ok().filter(|s| !s.trim().is_empty()),
            probe_amounts: env::var("PROBE_AMOUNTS")
                .ok()
                .and_then(|s| Self::parse_probe_amounts(&s))
                .unwrap_or_else(|| DEFAULT_PROBE_AMOUNTS.to_vec()),
            slippage: env::var("SLIPPAGE")
                .unwrap_or_else(|_| "0.005".to_string())
                .parse()
                .unwrap_or(0.005),

            debug_log: env::var("DEBUG_LOG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            debug_log_path: env::var("DEBUG_LOG_PATH")
                .unwrap_or_else(|_| "./logs/dry_runs.jsonl".to_string()),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// "1000,100,10" -> [1000, 100, 10]; `None` if any entry is not a number
    fn parse_probe_amounts(raw: &str) -> Option<Vec<u64>> {
        raw.split(',')
            .map(|s| s.trim().replace('_', "").parse().ok())
            .collect()
    }

    pub fn sender(&self) -> Result<Option<ObjectId>> {
        match &self.sender_address {
            Some(s) => Ok(Some(ObjectId::from_str(s)?)),
            None => Ok(None),
        }
    }

    pub fn debug_logger(&self) -> Option<DebugLog> {
        self.debug_log.then(|| DebugLog::new(&self.debug_log_path))
    }

    /// Validate configuration before any network use
    pub fn validate(&self) -> Result<()> {
        if !(self.sui_rpc_url.starts_with("http://") || self.sui_rpc_url.starts_with("https://")) {
            return Err(eyre::eyre!("Invalid SUI_RPC_URL '{}'", self.sui_rpc_url));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(eyre::eyre!("Invalid API_URL '{}'", self.api_url));
        }
        if self.request_timeout_secs == 0 {
            return Err(eyre::eyre!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        if let Some(sender) = &self.sender_address {
            if ObjectId::from_str(sender).is_err() {
                return Err(eyre::eyre!("SENDER_ADDRESS '{}' is not a Sui address", sender));
            }
        }

        if self.probe_amounts.is_empty() {
            return Err(eyre::eyre!("PROBE_AMOUNTS must not be empty"));
        }
        if self.probe_amounts.contains(&0) {
            return Err(eyre::eyre!("PROBE_AMOUNTS must not contain 0"));
        }
        if self.probe_amounts.windows(2).any(|w| w[0] <= w[1]) {
            return Err(eyre::eyre!(
                "PROBE_AMOUNTS must be strictly descending (currently {:?})",
                self.probe_amounts
            ));
        }

        if !(0.0..=0.5).contains(&self.slippage) {
            return Err(eyre::eyre!(
                "SLIPPAGE should be between 0 and 0.5 (currently {:.4})",
                self.slippage
            ));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║                 PT/YT SDK - CONFIGURATION                  ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Network:           {:^40} ║", self.network);
        println!("║ Timeout:           {:>37} s ║", self.request_timeout_secs);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ ENDPOINTS                                                  ║");
        println!("║ • Node:  {:<49} ║", truncate(&self.sui_rpc_url, 49));
        println!("║ • API:   {:<49} ║", truncate(&self.api_url, 49));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ DRY RUNS                                                   ║");
        println!("║ • Sender:          {:^40} ║",
            match &self.sender_address {
                Some(s) => truncate(s, 40),
                None => "✗ Not Set".to_string(),
            }
        );
        println!("║ • Probe Amounts:   {:^40} ║", self.probe_amounts.len());
        println!("║ • Slippage:        {:>38.2}% ║", self.slippage * 100.0);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ • Debug Log:       {:^40} ║",
            if self.debug_log { "✓ Enabled" } else { "✗ Disabled" }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            sui_rpc_url: SuiEndpoints::MAINNET.to_string(),
            api_url: "https://app.nemoprotocol.com".to_string(),
            request_timeout_secs: 15,
            sender_address: None,
            probe_amounts: DEFAULT_PROBE_AMOUNTS.to_vec(),
            slippage: 0.005,
            debug_log: false,
            debug_log_path: "./logs/dry_runs.jsonl".to_string(),
        }
    }
}

// ============================================
// TESTS
// ============================================
