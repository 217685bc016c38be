//! PT/YT yield markets on Sui
//!
//! Builds programmable transaction blocks for minting, liquidity and
//! redemption, dry-runs them through a full node, and decodes the results
//! into exact decimal quotes.
//!
//! Layers, bottom-up:
//! - `ptb`: BCS transaction model and the call-sequence builder
//! - `constants`, `market`: protocol registries and per-market config
//! - `voucher`, `calls`: Move call helpers and the user pipelines
//! - `rpc`, `dry_run`, `errors`: node access, simulation, error messages
//! - `format`, `probe`: amount scaling and retry-by-probing
//! - `client`: the quote and build operations a front-end calls

pub mod api;
pub mod calls;
pub mod client;
pub mod config;
pub mod constants;
pub mod debug;
pub mod dry_run;
pub mod error;
pub mod errors;
pub mod format;
pub mod market;
pub mod probe;
pub mod ptb;
pub mod rpc;
pub mod voucher;

pub use client::{BuiltTransaction, PtPrice, YieldClient};
pub use config::Config;
pub use error::{DryRunError, Result, SdkError};
pub use market::{CoinConfig, TokenType};
