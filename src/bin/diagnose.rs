//! Diagnostic tool - Check configuration and connectivity
//!
//! Run with: cargo run --bin diagnose

use std::env;
use std::time::Instant;

use ptyt::api::ApiClient;
use ptyt::config::Config;
use ptyt::rpc::{NodeClient, SuiRpcClient};

#[tokio::main]
async fn main() {
    println!("🔍 PTYT DIAGNOSTIC CHECK\n");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            println!("  ❌ Could not load configuration: {}", e);
            return;
        }
    };

    println!("═══════════════════════════════════════════════════");
    println!("                  CONFIGURATION                     ");
    println!("═══════════════════════════════════════════════════\n");

    let checks = [
        ("NETWORK", "mainnet", "Which Sui network?"),
        ("REQUEST_TIMEOUT_SECS", "15", "HTTP timeout"),
        ("PROBE_AMOUNTS", "1e12 .. 1e6", "Trial amounts for probed quotes"),
        ("SLIPPAGE", "0.005", "Min-out tolerance"),
        ("DEBUG_LOG", "false", "Log every dry run?"),
    ];

    for (key, default, desc) in checks {
        let value = env::var(key).unwrap_or_else(|_| default.to_string());
        let marker = if env::var(key).is_err() { "(default)" } else { "(from .env)" };
        println!("  {}: {} {}", key, value, marker);
        println!("    └─ {}\n", desc);
    }

    config.print_summary();

    println!("\n═══════════════════════════════════════════════════");
    println!("                    VALIDATION                      ");
    println!("═══════════════════════════════════════════════════\n");

    match config.validate() {
        Ok(()) => println!("  ✅ Configuration is valid"),
        Err(e) => {
            println!("  ❌ {}", e);
            return;
        }
    }
    if config.sender_address.is_none() {
        println!("  ⚠️  SENDER_ADDRESS not set: quotes need a wallet address");
    }

    println!("\n═══════════════════════════════════════════════════");
    println!("                   CONNECTIVITY                     ");
    println!("═══════════════════════════════════════════════════\n");

    match SuiRpcClient::from_config(&config) {
        Ok(node) => {
            let start = Instant::now();
            match node.reference_gas_price().await {
                Ok(price) => println!(
                    "  ✅ Node reachable ({:?}), reference gas price {} MIST",
                    start.elapsed(),
                    price
                ),
                Err(e) => println!("  ❌ Node check failed: {}", e),
            }
        }
        Err(e) => println!("  ❌ Could not build node client: {}", e),
    }

    match ApiClient::from_config(&config) {
        Ok(api) => {
            let start = Instant::now();
            match api.list_coin_configs().await {
                Ok(configs) => println!(
                    "  ✅ Market API reachable ({:?}), {} markets listed",
                    start.elapsed(),
                    configs.len()
                ),
                Err(e) => println!("  ❌ Market API check failed: {}", e),
            }
        }
        Err(e) => println!("  ❌ Could not build API client: {}", e),
    }

    println!("\n✅ Diagnostic complete!\n");
}
