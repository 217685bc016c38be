//! ptyt - PT/YT market console
//!
//! Run with: cargo run -- <command>
//!
//! Read-only: lists markets, shows voucher routing, and prices markets
//! through dry runs. Nothing here signs or submits.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use console::style;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptyt::api::{find_market, ApiClient};
use ptyt::config::Config;
use ptyt::errors::parse_error_message;
use ptyt::format::parse_amount;
use ptyt::ptb::ObjectId;
use ptyt::rpc::SuiRpcClient;
use ptyt::voucher;
use ptyt::{CoinConfig, YieldClient};

#[derive(Parser)]
#[command(name = "ptyt", version, about = "PT/YT yield market console")]
struct Cli {
    /// Load settings from a TOML file instead of the environment
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every market the API knows about
    Markets,
    /// Show which oracle entrypoint prices a market
    Voucher {
        coin_type: String,
        #[arg(long)]
        maturity: Option<String>,
    },
    /// SY conversion rate; all active markets when no coin type is given
    Rate {
        coin_type: Option<String>,
        #[arg(long)]
        maturity: Option<String>,
    },
    /// PT price in SY, found by probing trial amounts
    QuotePt {
        coin_type: String,
        #[arg(long)]
        maturity: Option<String>,
    },
    /// Quote selling PT out of a position
    QuoteSwap {
        coin_type: String,
        /// PT amount as a decimal ("1.5")
        pt_amount: String,
        #[arg(long)]
        py_position: String,
        #[arg(long)]
        maturity: Option<String>,
    },
    /// Translate a raw node error into a readable message
    ExplainError { raw: String },
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!("{}", style(" 🪙 PTYT - PT/YT Market Console").cyan().bold());
    println!(
        "{}",
        style("    Dry-run quotes | Voucher routing | Exact decimals").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(p) => Config::from_file(p)?,
        None => Config::from_env()?,
    };
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file");
        return Err(e);
    }
    Ok(config)
}

async fn resolve_market(api: &ApiClient, coin_type: &str, maturity: Option<&str>) -> Result<CoinConfig> {
    let configs = api.list_coin_configs().await?;
    find_market(&configs, coin_type, maturity)
        .cloned()
        .ok_or_else(|| eyre!("no market for {}", coin_type))
}

/// Client for read-only quotes; runs as the zero address without a wallet
fn quote_client(config: &Config) -> Result<YieldClient<SuiRpcClient>> {
    let node = SuiRpcClient::from_config(config)?;
    let mut client = YieldClient::from_config(node, config)?;
    if config.sender_address.is_none() {
        warn!("SENDER_ADDRESS not set, dry runs use the zero address");
        client = client.with_sender(ObjectId::ZERO);
    }
    Ok(client)
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ptyt=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Command::ExplainError { raw } = &cli.command {
        println!("{}", parse_error_message(raw));
        return Ok(());
    }

    print_banner();
    let config = load_config(cli.config.as_deref())?;
    let api = ApiClient::from_config(&config)?;

    match cli.command {
        Command::Markets => {
            let pb = spinner("Fetching markets...");
            let configs = api.list_coin_configs().await?;
            pb.finish_and_clear();

            let now = now_ms();
            println!("{}", style(format!("═══ {} MARKETS ═══", configs.len())).blue().bold());
            for cfg in &configs {
                let status = if cfg.is_expired(now) {
                    style("expired").red()
                } else {
                    style("active").green()
                };
                println!("  {:<12} {:<14} {}  {}", cfg.symbol(), cfg.maturity, status, cfg.coin_type);
            }
        }

        Command::Voucher { coin_type, maturity } => {
            let cfg = resolve_market(&api, &coin_type, maturity.as_deref()).await?;
            let route = voucher::route(&cfg)?;
            println!("{} {}", style("Market:").bold(), cfg);
            println!("{} {:?}", style("Route:").bold(), route);
            println!("{} {}", style("Entrypoint:").bold(), cfg.oracle_target(route.entrypoint().0, route.entrypoint().1));
        }

        Command::Rate { coin_type, maturity } => {
            let client = quote_client(&config)?;
            let markets = match coin_type {
                Some(ct) => vec![resolve_market(&api, &ct, maturity.as_deref()).await?],
                None => {
                    let now = now_ms();
                    api.list_coin_configs()
                        .await?
                        .into_iter()
                        .filter(|c| !c.is_expired(now))
                        .collect()
                }
            };

            let pb = spinner(&format!("Dry-running {} conversion rates...", markets.len()));
            let start = Instant::now();
            let rates = join_all(markets.iter().map(|cfg| client.quote_conversion_rate(cfg))).await;
            pb.finish_and_clear();
            info!("Quoted {} markets in {:?}", markets.len(), start.elapsed());

            for (cfg, rate) in markets.iter().zip(rates) {
                match rate {
                    Ok(r) => println!("  {} {:<12} {}", style("✓").green(), cfg.symbol(), r.value),
                    Err(e) => println!("  {} {:<12} {}", style("✗").red(), cfg.symbol(), e),
                }
            }
        }

        Command::QuotePt { coin_type, maturity } => {
            let cfg = resolve_market(&api, &coin_type, maturity.as_deref()).await?;
            let client = quote_client(&config)?;

            let pb = spinner("Probing PT price...");
            let (price, rate) = futures::join!(client.quote_pt_price(&cfg), client.quote_conversion_rate(&cfg));
            pb.finish_and_clear();

            let price = price?;
            println!("{} {}", style("Market:").bold(), cfg);
            println!("  PT price:        {} SY", price.price);
            println!("  Probe amount:    {} PT", price.pt_amount.value);
            match rate {
                Ok(r) => println!("  SY rate:         {}", r.value),
                Err(e) => warn!("Conversion rate unavailable: {}", e),
            }
        }

        Command::QuoteSwap { coin_type, pt_amount, py_position, maturity } => {
            let cfg = resolve_market(&api, &coin_type, maturity.as_deref()).await?;
            let raw = parse_amount(&pt_amount, cfg.decimals()?)?;
            let raw: u64 = raw
                .try_into()
                .map_err(|_| eyre!("PT amount {} is too large", pt_amount))?;
            let client = quote_client(&config)?;

            let pb = spinner("Dry-running swap...");
            let quote = client.quote_swap_pt_for_sy(&cfg, raw, &py_position).await;
            pb.finish_and_clear();

            let quote = quote?;
            println!("{} {}", style("Market:").bold(), cfg);
            println!("  SY out:          {}", quote.sy_out.value);
            println!("  Fee:             {}", quote.fee.value);
            if let Some(min) = &quote.min_sy_out {
                println!("  Min SY out:      {} ({:.2}% slippage)", min.value, config.slippage * 100.0);
            }
        }

        Command::ExplainError { .. } => {}
    }

    println!();
    Ok(())
}
