//! YieldClient
//!
//! The operations a wallet front-end needs: quotes (built, dry-run and
//! decoded in one call) and unsigned transactions ready for signing.
//! One instance per connected wallet; it holds no per-request state except
//! the probe memo.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calls::{self, CoinInput};
use crate::config::Config;
use crate::constants;
use crate::debug::{DebugInfo, DebugLog};
use crate::dry_run::{self, BurnLpQuote, DryRunOutput, SwapQuote};
use crate::error::{Result, SdkError};
use crate::format::{self, min_out_with_slippage, ScaledAmount};
use crate::market::{CoinConfig, TokenType};
use crate::probe::AmountProber;
use crate::ptb::{ObjectId, Transaction, TransactionKind, TxArg};
use crate::rpc::NodeClient;
use crate::voucher;

/// Decimal places used for the PT price ratio
const PRICE_DECIMALS: u8 = 18;

/// A transaction ready for the wallet plus what went into it
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub kind: TransactionKind,
    pub debug_info: DebugInfo,
}

impl BuiltTransaction {
    pub fn tx_bytes(&self) -> Result<String> {
        self.kind.to_base64()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtPrice {
    /// Probe amount that succeeded
    pub pt_amount: ScaledAmount,
    pub sy_out: ScaledAmount,
    /// SY per PT
    pub price: String,
}

pub struct YieldClient<N: NodeClient> {
    node: N,
    sender: Option<ObjectId>,
    prober: AmountProber,
    slippage: f64,
    debug_log: Option<DebugLog>,
}

impl<N: NodeClient> YieldClient<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            sender: None,
            prober: AmountProber::default(),
            slippage: 0.005,
            debug_log: None,
        }
    }

    pub fn from_config(node: N, config: &Config) -> Result<Self> {
        let sender = config
            .sender_address
            .as_deref()
            .map(str::parse::<ObjectId>)
            .transpose()?;
        Ok(Self {
            node,
            sender,
            prober: AmountProber::new(config.probe_amounts.clone())?,
            slippage: config.slippage,
            debug_log: config.debug_logger(),
        })
    }

    pub fn with_sender(mut self, sender: ObjectId) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_prober(mut self, prober: AmountProber) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_slippage(mut self, slippage: f64) -> Self {
        self.slippage = slippage;
        self
    }

    pub fn with_debug_log(mut self, log: DebugLog) -> Self {
        self.debug_log = Some(log);
        self
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn prober(&self) -> &AmountProber {
        &self.prober
    }

    fn sender(&self) -> Result<ObjectId> {
        self.sender
            .ok_or_else(|| SdkError::precondition("no wallet connected"))
    }

    /// Object ids of the sender's coins of `coin_type`; SUI comes from gas
    async fn coin_ids(&self, sender: &ObjectId, coin_type: &str) -> Result<Vec<String>> {
        if constants::is_sui(coin_type) {
            return Ok(Vec::new());
        }
        let coins = self.node.get_coins(sender, coin_type).await?;
        if coins.is_empty() {
            return Err(SdkError::precondition("no coins available"));
        }
        Ok(coins.into_iter().map(|c| c.coin_object_id).collect())
    }

    /// Dry-run `tx`, decode the output, and log the run with its parsed result
    async fn run<T, D>(&self, operation: &str, tx: &Transaction, decode: D) -> Result<T>
    where
        T: Serialize,
        D: FnOnce(&DryRunOutput) -> Result<T>,
    {
        let sender = self.sender()?;
        let result = dry_run::dry_run(&self.node, &sender, tx)
            .await
            .and_then(|out| {
                let value = decode(&out)?;
                let parsed = serde_json::to_string(&value).map_err(|e| out.fail(e.to_string()))?;
                Ok((value, out.debug_info.with_parsed_output(parsed)))
            });

        match result {
            Ok((value, info)) => {
                if let Some(log) = &self.debug_log {
                    log.record(operation, true, &info);
                }
                Ok(value)
            }
            Err(e) => {
                if let Some(log) = &self.debug_log {
                    let info = e.debug_info().cloned().unwrap_or_else(|| tx.debug_info());
                    log.record(operation, false, &info);
                }
                Err(e)
            }
        }
    }

    // ============================================
    // QUOTES
    // ============================================

    /// SY -> underlying conversion rate from the market's price voucher
    pub async fn quote_conversion_rate(&self, cfg: &CoinConfig) -> Result<ScaledAmount> {
        let mut tx = Transaction::new();
        let (price_voucher, _) = voucher::get_price_voucher(&mut tx, cfg)?;
        voucher::get_price(&mut tx, cfg, price_voucher)?;

        let rate = self
            .run("conversion_rate", &tx, dry_run::decode_conversion_rate)
            .await?;
        debug!("Conversion rate for {}: {}", cfg.symbol(), rate.value);
        Ok(rate)
    }

    /// PT received for minting with `amount` of the input coin
    pub async fn quote_mint_py(&self, cfg: &CoinConfig, amount: u64, token_type: TokenType) -> Result<ScaledAmount> {
        let sender = self.sender()?;
        let decimal = cfg.decimals()?;
        let coins = self.coin_ids(&sender, cfg.input_coin_type(token_type)).await?;

        let mut tx = Transaction::new();
        let input = CoinInput { token_type, coins: &coins, amount };
        calls::mint_py_pipeline(&mut tx, cfg, &input, None, sender)?;

        self.run("mint_py", &tx, |out| dry_run::decode_mint_py(out, decimal))
            .await
    }

    /// LP received for adding `amount` of the input coin plus `pt_amount` PT
    pub async fn quote_mint_lp(
        &self,
        cfg: &CoinConfig,
        amount: u64,
        pt_amount: u64,
        token_type: TokenType,
    ) -> Result<ScaledAmount> {
        let sender = self.sender()?;
        let decimal = cfg.decimals()?;
        let coins = self.coin_ids(&sender, cfg.input_coin_type(token_type)).await?;

        let mut tx = Transaction::new();
        let input = CoinInput { token_type, coins: &coins, amount };
        calls::add_liquidity_pipeline(&mut tx, cfg, &input, pt_amount, None, sender)?;

        self.run("mint_lp", &tx, |out| dry_run::decode_mint_lp(out, decimal))
            .await
    }

    /// SY out and fee for selling `pt_amount` PT from `py_position`
    pub async fn quote_swap_pt_for_sy(
        &self,
        cfg: &CoinConfig,
        pt_amount: u64,
        py_position: &str,
    ) -> Result<SwapQuote> {
        let sender = self.sender()?;
        let decimal = cfg.decimals()?;

        let mut tx = Transaction::new();
        let (price_voucher, _) = voucher::get_price_voucher(&mut tx, cfg)?;
        let (sy_coin, _) =
            calls::swap_exact_pt_for_sy(&mut tx, cfg, pt_amount, 0, TxArg::object(py_position), price_voucher)?;
        calls::coin_value(&mut tx, &cfg.sy_coin_type, sy_coin)?;
        calls::transfer_to(&mut tx, vec![sy_coin], sender)?;

        let slippage = self.slippage;
        self.run("swap_exact_pt_for_sy", &tx, |out| {
            let mut quote = dry_run::decode_swap_pt_for_sy(out, decimal)?;
            let sy_raw = out.last_return_u64()?;
            quote.min_sy_out = Some(ScaledAmount::from_u64(
                min_out_with_slippage(sy_raw, slippage),
                decimal,
            ));
            Ok(quote)
        })
        .await
    }

    /// PT and SY released by burning `lp_amount` LP
    pub async fn quote_burn_lp(
        &self,
        cfg: &CoinConfig,
        lp_amount: u64,
        py_position: &str,
        lp_positions: &[String],
    ) -> Result<BurnLpQuote> {
        let sender = self.sender()?;
        let decimal = cfg.decimals()?;
        if lp_positions.is_empty() {
            return Err(SdkError::precondition("no pool selected"));
        }

        let mut tx = Transaction::new();
        let (price_voucher, _) = voucher::get_price_voucher(&mut tx, cfg)?;
        let (market_position, _) = calls::merge_lp_positions(&mut tx, cfg, lp_positions)?;
        let (sy_coin, _) = calls::burn_lp(
            &mut tx,
            cfg,
            lp_amount,
            price_voucher,
            TxArg::object(py_position),
            market_position,
        )?;
        calls::transfer_to(&mut tx, vec![sy_coin], sender)?;

        self.run("burn_lp", &tx, |out| dry_run::decode_burn_lp(out, decimal))
            .await
    }

    /// SY per PT, probing trial amounts until the quote succeeds
    pub async fn quote_pt_price(&self, cfg: &CoinConfig) -> Result<PtPrice> {
        self.sender()?;
        let decimal = cfg.decimals()?;

        let (pt_amount, sy_out) = self
            .prober
            .probe(|amount| async move {
                let mut tx = Transaction::new();
                let (price_voucher, _) = voucher::get_price_voucher(&mut tx, cfg)?;
                calls::get_sy_amount_out_for_exact_pt_in(&mut tx, cfg, amount, price_voucher)?;
                self.run("pt_price", &tx, |out| dry_run::decode_sy_out(out, decimal))
                    .await
            })
            .await?;

        let sy_raw: U256 = sy_out
            .amount
            .parse()
            .map_err(|_| SdkError::decode(format!("invalid sy amount {}", sy_out.amount)))?;
        let scaled = (sy_raw * U256::from(10u64).pow(U256::from(PRICE_DECIMALS)))
            .checked_div(U256::from(pt_amount))
            .ok_or_else(|| SdkError::decode("PT price with a zero trial amount"))?;
        let price = format::format_amount(scaled, PRICE_DECIMALS);

        info!("📈 {} PT price: {} SY (probe {})", cfg.symbol(), price, pt_amount);
        Ok(PtPrice {
            pt_amount: ScaledAmount::from_u64(pt_amount, decimal),
            sy_out,
            price,
        })
    }

    // ============================================
    // BUILDERS
    // ============================================

    async fn finish(&self, tx: Transaction) -> Result<BuiltTransaction> {
        let debug_info = tx.debug_info();
        let kind = tx.resolve(&self.node).await?;
        Ok(BuiltTransaction { kind, debug_info })
    }

    pub async fn build_mint_py(
        &self,
        cfg: &CoinConfig,
        amount: u64,
        token_type: TokenType,
        py_position: Option<&str>,
    ) -> Result<BuiltTransaction> {
        let sender = self.sender()?;
        let coins = self.coin_ids(&sender, cfg.input_coin_type(token_type)).await?;

        let mut tx = Transaction::new();
        let input = CoinInput { token_type, coins: &coins, amount };
        calls::mint_py_pipeline(&mut tx, cfg, &input, py_position, sender)?;
        self.finish(tx).await
    }

    pub async fn build_add_liquidity(
        &self,
        cfg: &CoinConfig,
        amount: u64,
        pt_amount: u64,
        token_type: TokenType,
        py_position: Option<&str>,
    ) -> Result<BuiltTransaction> {
        let sender = self.sender()?;
        let coins = self.coin_ids(&sender, cfg.input_coin_type(token_type)).await?;

        let mut tx = Transaction::new();
        let input = CoinInput { token_type, coins: &coins, amount };
        calls::add_liquidity_pipeline(&mut tx, cfg, &input, pt_amount, py_position, sender)?;
        self.finish(tx).await
    }

    pub async fn build_redeem_lp(
        &self,
        cfg: &CoinConfig,
        lp_amount: u64,
        py_position: &str,
        lp_positions: &[String],
        token_type: TokenType,
    ) -> Result<BuiltTransaction> {
        let sender = self.sender()?;

        let mut tx = Transaction::new();
        calls::redeem_lp_pipeline(&mut tx, cfg, lp_amount, py_position, lp_positions, token_type, sender)?;
        self.finish(tx).await
    }
}
