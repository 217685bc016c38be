//! Transaction-builder helpers
//!
//! Each helper appends one Move call (or a fixed short sequence) to a
//! [`Transaction`] and returns the handle of its result together with the
//! [`MoveCallInfo`] describing it. Helpers compose linearly: the output of
//! one is the input of the next.
//!
//! The three user-facing pipelines at the bottom are fixed sequences chosen
//! by [`TokenType`]:
//! - mint PT/YT: split -> [mint yield coin] -> deposit -> voucher -> position -> mint_py
//! - add liquidity: split -> [mint yield coin] -> deposit -> voucher -> position -> mint_lp
//! - redeem LP: voucher -> merge positions -> burn_lp -> redeem_sy -> [burn yield coin]

use tracing::{debug, info};

use crate::constants::{self, AFTERMATH, ALPHAFI, HAEDAL, SCALLOP, SPRING_SUI, VOLO};
use crate::debug::MoveCallInfo;
use crate::error::{Result, SdkError};
use crate::market::{CoinConfig, TokenType};
use crate::ptb::{Argument, MoveCall, ObjectId, Transaction, TxArg};
use crate::voucher::{self, VoucherRoute};

type CallResult = Result<(Argument, MoveCallInfo)>;

fn clock() -> TxArg {
    TxArg::read_only(constants::CLOCK_ID.to_string())
}

fn system_state() -> TxArg {
    TxArg::object(constants::SUI_SYSTEM_STATE_ID.to_string())
}

// ============================================
// COINS
// ============================================

/// Split exact `amounts` off the user's coins of `coin_type`.
///
/// SUI is split from the gas coin. Anything else merges every listed coin
/// into the first one and splits from it.
pub fn split_coin(
    tx: &mut Transaction,
    coin_type: &str,
    coins: &[String],
    amounts: &[u64],
) -> Result<Vec<Argument>> {
    let amounts: Vec<TxArg> = amounts.iter().map(|a| TxArg::pure_u64(*a)).collect();

    if constants::is_sui(coin_type) {
        let gas = tx.gas();
        return tx.split_coins(gas, amounts);
    }

    let (primary, rest) = coins
        .split_first()
        .ok_or_else(|| SdkError::precondition("no coins available"))?;

    let primary = tx.input(TxArg::object(primary.as_str()))?;
    if !rest.is_empty() {
        let sources = rest.iter().map(|c| TxArg::object(c.as_str())).collect();
        tx.merge_coins(primary, sources)?;
    }
    tx.split_coins(primary, amounts)
}

/// `0x2::coin::value`, used to read an amount back in a dry run
pub fn coin_value(tx: &mut Transaction, coin_type: &str, coin: Argument) -> CallResult {
    tx.move_call(
        MoveCall::new("0x2::coin::value")
            .arg("coin", coin)
            .type_arg(coin_type),
    )
}

pub fn transfer_to(tx: &mut Transaction, objects: Vec<Argument>, recipient: ObjectId) -> Result<()> {
    tx.transfer_objects(objects, recipient)
}

// ============================================
// UNDERLYING <-> YIELD-BEARING COIN
// ============================================

/// Turn the underlying asset into the market's yield-bearing coin using the
/// protocol's own entrypoint
pub fn mint_yield_coin(tx: &mut Transaction, cfg: &CoinConfig, underlying: Argument) -> CallResult {
    let call = match voucher::route(cfg)? {
        VoucherRoute::ScallopMarketCoin { underlying: underlying_type } => {
            MoveCall::new(format!("{}::mint::mint", SCALLOP.protocol_package))
                .arg("version", TxArg::read_only(SCALLOP.version))
                .arg("market", TxArg::object(SCALLOP.market))
                .arg("coin", underlying)
                .arg("clock", clock())
                .type_arg(underlying_type)
        }
        VoucherRoute::HaSui => MoveCall::new(format!("{}::staking::request_stake_coin", HAEDAL.package))
            .arg("system_state", system_state())
            .arg("staking", TxArg::object(HAEDAL.staking))
            .arg("coin", underlying)
            .arg("validator", TxArg::pure_address(ObjectId::ZERO)),
        VoucherRoute::VSui => MoveCall::new(format!("{}::native_pool::stake_non_entry", VOLO.package))
            .arg("native_pool", TxArg::object(VOLO.native_pool))
            .arg("metadata", TxArg::object(VOLO.metadata))
            .arg("system_state", system_state())
            .arg("coin", underlying),
        VoucherRoute::AfSui => {
            let validator = AFTERMATH.validator.parse()?;
            MoveCall::new(format!("{}::staked_sui_vault::request_stake", AFTERMATH.package))
                .arg("staked_sui_vault", TxArg::object(AFTERMATH.staked_sui_vault))
                .arg("safe", TxArg::object(AFTERMATH.safe))
                .arg("system_state", system_state())
                .arg("referral_vault", TxArg::read_only(AFTERMATH.referral_vault))
                .arg("coin", underlying)
                .arg("validator", TxArg::pure_address(validator))
        }
        VoucherRoute::SpringSui { lst_info } => {
            MoveCall::new(format!("{}::liquid_staking::mint", SPRING_SUI.package))
                .arg("lst_info", TxArg::object(lst_info))
                .arg("system_state", system_state())
                .arg("coin", underlying)
                .type_arg(&cfg.coin_type)
        }
        VoucherRoute::StSui => MoveCall::new(format!("{}::liquid_staking::mint", ALPHAFI.package))
            .arg("liquid_staking_info", TxArg::object(ALPHAFI.liquid_staking_info))
            .arg("system_state", system_state())
            .arg("coin", underlying)
            .type_arg(&cfg.coin_type),
        other => {
            return Err(SdkError::config(format!(
                "no mint route from {} into {} ({})",
                cfg.underlying_coin_type, cfg.coin_type, other
            )))
        }
    };
    tx.move_call(call)
}

/// Inverse of [`mint_yield_coin`]
pub fn burn_yield_coin(tx: &mut Transaction, cfg: &CoinConfig, yield_coin: Argument) -> CallResult {
    let call = match voucher::route(cfg)? {
        VoucherRoute::ScallopMarketCoin { underlying: underlying_type } => {
            MoveCall::new(format!("{}::redeem::redeem", SCALLOP.protocol_package))
                .arg("version", TxArg::read_only(SCALLOP.version))
                .arg("market", TxArg::object(SCALLOP.market))
                .arg("coin", yield_coin)
                .arg("clock", clock())
                .type_arg(underlying_type)
        }
        VoucherRoute::HaSui => {
            MoveCall::new(format!("{}::staking::request_unstake_instant_coin", HAEDAL.package))
                .arg("system_state", system_state())
                .arg("staking", TxArg::object(HAEDAL.staking))
                .arg("coin", yield_coin)
        }
        VoucherRoute::VSui => MoveCall::new(format!("{}::native_pool::unstake", VOLO.package))
            .arg("native_pool", TxArg::object(VOLO.native_pool))
            .arg("metadata", TxArg::object(VOLO.metadata))
            .arg("system_state", system_state())
            .arg("coin", yield_coin),
        VoucherRoute::AfSui => {
            MoveCall::new(format!("{}::staked_sui_vault::request_unstake_atomic", AFTERMATH.package))
                .arg("staked_sui_vault", TxArg::object(AFTERMATH.staked_sui_vault))
                .arg("safe", TxArg::object(AFTERMATH.safe))
                .arg("referral_vault", TxArg::read_only(AFTERMATH.referral_vault))
                .arg("coin", yield_coin)
        }
        VoucherRoute::SpringSui { lst_info } => {
            MoveCall::new(format!("{}::liquid_staking::redeem", SPRING_SUI.package))
                .arg("lst_info", TxArg::object(lst_info))
                .arg("coin", yield_coin)
                .arg("system_state", system_state())
                .type_arg(&cfg.coin_type)
        }
        VoucherRoute::StSui => MoveCall::new(format!("{}::liquid_staking::redeem", ALPHAFI.package))
            .arg("liquid_staking_info", TxArg::object(ALPHAFI.liquid_staking_info))
            .arg("coin", yield_coin)
            .arg("system_state", system_state())
            .type_arg(&cfg.coin_type),
        other => {
            return Err(SdkError::config(format!(
                "no redeem route from {} into {} ({})",
                cfg.coin_type, cfg.underlying_coin_type, other
            )))
        }
    };
    tx.move_call(call)
}

// ============================================
// SY
// ============================================

/// Wrap the yield-bearing coin into SY
pub fn deposit(tx: &mut Transaction, cfg: &CoinConfig, coin: Argument) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("sy", "deposit"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("coin", coin)
            .arg("sy_state", TxArg::object(&cfg.sy_state_id))
            .type_arg(&cfg.coin_type)
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Unwrap SY back into the yield-bearing coin
pub fn redeem_sy(tx: &mut Transaction, cfg: &CoinConfig, sy_coin: Argument) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("sy", "redeem"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("sy_coin", sy_coin)
            .arg("sy_state", TxArg::object(&cfg.sy_state_id))
            .type_arg(&cfg.coin_type)
            .type_arg(&cfg.sy_coin_type),
    )
}

// ============================================
// PY POSITIONS
// ============================================

pub fn init_py_position(tx: &mut Transaction, cfg: &CoinConfig) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("py", "init_py_position"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Split SY into PT + YT credited to `py_position`; returns the PT amount
pub fn mint_py(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    sy_coin: Argument,
    price_voucher: Argument,
    py_position: TxArg,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("yield_factory", "mint_py"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("sy_coin", sy_coin)
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("yield_factory_config", TxArg::read_only(&cfg.yield_factory_config_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

pub fn redeem_py(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    pt_amount: u64,
    yt_amount: u64,
    price_voucher: Argument,
    py_position: TxArg,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("yield_factory", "redeem_py"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("pt_amount", TxArg::pure_u64(pt_amount))
            .arg("yt_amount", TxArg::pure_u64(yt_amount))
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("yield_factory_config", TxArg::read_only(&cfg.yield_factory_config_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Claim the interest accrued by the YT in a position
pub fn redeem_interest(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    py_position: TxArg,
    price_voucher: Argument,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("yield_factory", "redeem_due_interest"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("price_voucher", price_voucher)
            .arg("yield_factory_config", TxArg::read_only(&cfg.yield_factory_config_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

// ============================================
// MARKET
// ============================================

/// Seed liquidity with SY plus PT from `py_position`; returns the market position
#[allow(clippy::too_many_arguments)]
pub fn mint_lp(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    sy_coin: Argument,
    pt_amount: u64,
    price_voucher: Argument,
    py_position: TxArg,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("market", "mint_lp"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("sy_coin", sy_coin)
            .arg("pt_amount", TxArg::pure_u64(pt_amount))
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("market_state", TxArg::object(&cfg.market_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn add_liquidity_single_sy(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    sy_coin: Argument,
    net_pt_amount: u64,
    min_lp_amount: u64,
    price_voucher: Argument,
    py_position: TxArg,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("router", "add_liquidity_single_sy"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("sy_coin", sy_coin)
            .arg("net_pt_amount", TxArg::pure_u64(net_pt_amount))
            .arg("min_lp_amount", TxArg::pure_u64(min_lp_amount))
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("market_factory_config", TxArg::read_only(&cfg.market_factory_config_id))
            .arg("market_state", TxArg::object(&cfg.market_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Burn LP out of `market_position`; PT goes to `py_position`, SY is returned
pub fn burn_lp(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    lp_amount: u64,
    price_voucher: Argument,
    py_position: TxArg,
    market_position: Argument,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("market", "burn_lp"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("lp_amount", TxArg::pure_u64(lp_amount))
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("market_state", TxArg::object(&cfg.market_state_id))
            .arg("market_position", market_position)
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Fold every LP position into the first one.
///
/// Returns the surviving position and one `MoveCallInfo` per join.
pub fn merge_lp_positions(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    positions: &[String],
) -> Result<(Argument, Vec<MoveCallInfo>)> {
    let (target, rest) = positions
        .split_first()
        .ok_or_else(|| SdkError::precondition("no pool selected"))?;

    let target = tx.input(TxArg::object(target.as_str()))?;
    let mut infos = Vec::with_capacity(rest.len());
    for other in rest {
        let (_, info) = tx.move_call(
            MoveCall::new(cfg.target("market_position", "join"))
                .arg("version", TxArg::read_only(&cfg.version))
                .arg("target", target)
                .arg("other", TxArg::object(other.as_str())),
        )?;
        infos.push(info);
    }
    Ok((target, infos))
}

#[allow(clippy::too_many_arguments)]
pub fn swap_exact_pt_for_sy(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    pt_amount: u64,
    min_sy_out: u64,
    py_position: TxArg,
    price_voucher: Argument,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("market", "swap_exact_pt_for_sy"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("pt_amount", TxArg::pure_u64(pt_amount))
            .arg("min_sy_out", TxArg::pure_u64(min_sy_out))
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("price_voucher", price_voucher)
            .arg("market_factory_config", TxArg::read_only(&cfg.market_factory_config_id))
            .arg("market_state", TxArg::object(&cfg.market_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn swap_exact_sy_for_pt(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    min_pt_out: u64,
    sy_coin: Argument,
    price_voucher: Argument,
    py_position: TxArg,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("market", "swap_exact_sy_for_pt"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("min_pt_out", TxArg::pure_u64(min_pt_out))
            .arg("sy_coin", sy_coin)
            .arg("price_voucher", price_voucher)
            .arg("py_position", py_position)
            .arg("py_state", TxArg::object(&cfg.py_state_id))
            .arg("market_factory_config", TxArg::read_only(&cfg.market_factory_config_id))
            .arg("market_state", TxArg::object(&cfg.market_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

/// Read-only quote: SY received for `pt_amount` PT
pub fn get_sy_amount_out_for_exact_pt_in(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    pt_amount: u64,
    price_voucher: Argument,
) -> CallResult {
    tx.move_call(
        MoveCall::new(cfg.target("router", "get_sy_amount_out_for_exact_pt_in"))
            .arg("version", TxArg::read_only(&cfg.version))
            .arg("pt_amount", TxArg::pure_u64(pt_amount))
            .arg("price_voucher", price_voucher)
            .arg("py_state", TxArg::read_only(&cfg.py_state_id))
            .arg("market_state", TxArg::read_only(&cfg.market_state_id))
            .arg("clock", clock())
            .type_arg(&cfg.sy_coin_type),
    )
}

// ============================================
// PIPELINES
// ============================================

/// Coins and amount the user brings
#[derive(Debug, Clone)]
pub struct CoinInput<'a> {
    pub token_type: TokenType,
    /// Object ids of the user's coins of the input type (ignored for SUI)
    pub coins: &'a [String],
    pub amount: u64,
}

/// Handles produced by the shared split -> deposit -> voucher prefix
struct Prepared {
    sy_coin: Argument,
    price_voucher: Argument,
    py_position: TxArg,
    created_position: Option<Argument>,
}

fn prepare_sy(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    input: &CoinInput<'_>,
    py_position: Option<&str>,
) -> Result<Prepared> {
    let coin_type = cfg.input_coin_type(input.token_type);
    let coin = split_coin(tx, coin_type, input.coins, &[input.amount])?
        .into_iter()
        .next()
        .ok_or_else(|| SdkError::decode("split returned no coin"))?;

    let coin = match input.token_type {
        TokenType::Underlying => mint_yield_coin(tx, cfg, coin)?.0,
        TokenType::Wrapped => coin,
    };

    let (sy_coin, _) = deposit(tx, cfg, coin)?;
    let (price_voucher, _) = voucher::get_price_voucher(tx, cfg)?;

    let (py_position, created_position) = match py_position {
        Some(id) => (TxArg::object(id), None),
        None => {
            let (position, _) = init_py_position(tx, cfg)?;
            (position.into(), Some(position))
        }
    };

    Ok(Prepared {
        sy_coin,
        price_voucher,
        py_position,
        created_position,
    })
}

/// Mint PT + YT from the user's coins; returns the `mint_py` result
pub fn mint_py_pipeline(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    input: &CoinInput<'_>,
    py_position: Option<&str>,
    recipient: ObjectId,
) -> Result<Argument> {
    info!("🪙 Mint PT/YT: {} of {} ({})", input.amount, cfg.symbol(), input.token_type);

    let prepared = prepare_sy(tx, cfg, input, py_position)?;
    let (minted, _) = mint_py(
        tx,
        cfg,
        prepared.sy_coin,
        prepared.price_voucher,
        prepared.py_position,
    )?;

    if let Some(position) = prepared.created_position {
        transfer_to(tx, vec![position], recipient)?;
    }
    debug!("Mint pipeline has {} calls", tx.move_calls().len());
    Ok(minted)
}

/// Add liquidity from the user's coins; returns the new market position
pub fn add_liquidity_pipeline(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    input: &CoinInput<'_>,
    pt_amount: u64,
    py_position: Option<&str>,
    recipient: ObjectId,
) -> Result<Argument> {
    info!(
        "💧 Add liquidity: {} of {} + {} PT ({})",
        input.amount,
        cfg.symbol(),
        pt_amount,
        input.token_type
    );

    let prepared = prepare_sy(tx, cfg, input, py_position)?;
    let (market_position, _) = mint_lp(
        tx,
        cfg,
        prepared.sy_coin,
        pt_amount,
        prepared.price_voucher,
        prepared.py_position,
    )?;

    let mut outputs = vec![market_position];
    outputs.extend(prepared.created_position);
    transfer_to(tx, outputs, recipient)?;
    Ok(market_position)
}

/// Burn LP and return the proceeds as `token_type`; returns the output coin
#[allow(clippy::too_many_arguments)]
pub fn redeem_lp_pipeline(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    lp_amount: u64,
    py_position: &str,
    lp_positions: &[String],
    token_type: TokenType,
    recipient: ObjectId,
) -> Result<Argument> {
    if lp_positions.is_empty() {
        return Err(SdkError::precondition("no pool selected"));
    }
    info!(
        "🔥 Redeem LP: {} from {} position(s) of {}",
        lp_amount,
        lp_positions.len(),
        cfg.symbol()
    );

    let (price_voucher, _) = voucher::get_price_voucher(tx, cfg)?;
    let (market_position, _) = merge_lp_positions(tx, cfg, lp_positions)?;
    let (sy_coin, _) = burn_lp(
        tx,
        cfg,
        lp_amount,
        price_voucher,
        TxArg::object(py_position),
        market_position,
    )?;
    let (coin, _) = redeem_sy(tx, cfg, sy_coin)?;

    let coin = match token_type {
        TokenType::Underlying => burn_yield_coin(tx, cfg, coin)?.0,
        TokenType::Wrapped => coin,
    };

    transfer_to(tx, vec![coin], recipient)?;
    Ok(coin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SCALLOP_SSUI_COIN_TYPE, SUI_COIN_TYPE, WAL_COIN_TYPE};
    use crate::market::fixtures::{hasui_config, with_coin};

    fn functions(tx: &Transaction) -> Vec<String> {
        tx.move_calls().iter().map(|c| c.function_path().to_string()).collect()
    }

    #[test]
    fn test_split_sui_uses_gas() {
        let mut tx = Transaction::new();
        let parts = split_coin(&mut tx, SUI_COIN_TYPE, &[], &[5, 6]).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(tx.object_ids().is_empty());
    }

    #[test]
    fn test_split_other_merges_first() {
        let mut tx = Transaction::new();
        let coins = vec!["0x101".to_string(), "0x102".to_string(), "0x103".to_string()];
        let parts = split_coin(&mut tx, WAL_COIN_TYPE, &coins, &[7]).unwrap();
        assert_eq!(parts, vec![Argument::NestedResult(1, 0)]);
        assert_eq!(tx.object_ids().len(), 3);
        assert_eq!(tx.command_count(), 2);
    }

    #[test]
    fn test_split_without_coins_is_precondition() {
        let mut tx = Transaction::new();
        let err = split_coin(&mut tx, WAL_COIN_TYPE, &[], &[1]).unwrap_err();
        assert_eq!(err.to_string(), "no coins available");
    }

    #[test]
    fn test_mint_pipeline_underlying_sequence() {
        let cfg = hasui_config();
        let mut tx = Transaction::new();
        let input = CoinInput { token_type: TokenType::Underlying, coins: &[], amount: 1_000_000_000 };
        let minted = mint_py_pipeline(&mut tx, &cfg, &input, None, ObjectId::from_u8(0x99)).unwrap();

        assert_eq!(
            functions(&tx),
            vec![
                "staking::request_stake_coin",
                "sy::deposit",
                "haedal::get_price_voucher_from_hasui",
                "py::init_py_position",
                "yield_factory::mint_py",
            ]
        );
        // split, 5 calls, transfer of the fresh position
        assert_eq!(tx.command_count(), 7);
        assert_eq!(minted, Argument::Result(5));

        let mint = &tx.move_calls()[4];
        assert_eq!(mint.argument("sy_coin"), Some("Result(2)"));
        assert_eq!(mint.argument("price_voucher"), Some("Result(3)"));
        assert_eq!(mint.argument("py_position"), Some("Result(4)"));
    }

    #[test]
    fn test_mint_pipeline_wrapped_with_existing_position() {
        let cfg = hasui_config();
        let coins = vec!["0x201".to_string()];
        let mut tx = Transaction::new();
        let input = CoinInput { token_type: TokenType::Wrapped, coins: &coins, amount: 10 };
        mint_py_pipeline(&mut tx, &cfg, &input, Some("0x300"), ObjectId::from_u8(0x99)).unwrap();

        assert_eq!(
            functions(&tx),
            vec!["sy::deposit", "haedal::get_price_voucher_from_hasui", "yield_factory::mint_py"]
        );
        let mint = tx.move_calls().last().unwrap();
        let existing: ObjectId = "0x300".parse().unwrap();
        assert_eq!(mint.argument("py_position"), Some(existing.to_string().as_str()));
        // split, deposit, voucher, mint; no position created so no transfer
        assert_eq!(tx.command_count(), 4);
    }

    #[test]
    fn test_add_liquidity_transfers_positions() {
        let cfg = hasui_config();
        let mut tx = Transaction::new();
        let input = CoinInput { token_type: TokenType::Underlying, coins: &[], amount: 100 };
        let position =
            add_liquidity_pipeline(&mut tx, &cfg, &input, 40, None, ObjectId::from_u8(0x99)).unwrap();

        assert_eq!(functions(&tx).last().map(String::as_str), Some("market::mint_lp"));
        assert_eq!(tx.move_calls().last().unwrap().argument("pt_amount"), Some("40"));
        assert_eq!(position, Argument::Result(5));
    }

    #[test]
    fn test_redeem_pipeline_sequence() {
        let cfg = with_coin(SCALLOP_SSUI_COIN_TYPE, "Scallop");
        let positions = vec!["0x401".to_string(), "0x402".to_string(), "0x403".to_string()];
        let mut tx = Transaction::new();
        redeem_lp_pipeline(
            &mut tx,
            &cfg,
            500,
            "0x300",
            &positions,
            TokenType::Underlying,
            ObjectId::from_u8(0x99),
        )
        .unwrap();

        assert_eq!(
            functions(&tx),
            vec![
                "scallop::get_price_voucher_from_market_coin",
                "market_position::join",
                "market_position::join",
                "market::burn_lp",
                "sy::redeem",
                "redeem::redeem",
            ]
        );
        let joins: Vec<_> = tx.move_calls()[1..3].iter().map(|c| c.argument("target").unwrap().to_string()).collect();
        assert_eq!(joins[0], joins[1]);
    }

    #[test]
    fn test_redeem_without_positions_is_rejected() {
        let cfg = hasui_config();
        let mut tx = Transaction::new();
        let err = redeem_lp_pipeline(&mut tx, &cfg, 1, "0x300", &[], TokenType::Wrapped, ObjectId::ZERO)
            .unwrap_err();
        assert_eq!(err.to_string(), "no pool selected");
        assert_eq!(tx.command_count(), 0);
    }

    #[test]
    fn test_unsupported_mint_route_is_config_error() {
        let cfg = with_coin("0x1234::mystery::MYSTERY", "");
        let mut tx = Transaction::new();
        let coin = tx.gas();
        assert!(matches!(mint_yield_coin(&mut tx, &cfg, coin), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_swap_and_view_calls() {
        let cfg = hasui_config();
        let mut tx = Transaction::new();
        let (voucher, _) = voucher::get_price_voucher(&mut tx, &cfg).unwrap();
        let (sy, info) =
            swap_exact_pt_for_sy(&mut tx, &cfg, 1_000, 990, TxArg::object("0x300"), voucher).unwrap();
        assert_eq!(info.argument("min_sy_out"), Some("990"));
        let (_, value) = coin_value(&mut tx, &cfg.sy_coin_type, sy).unwrap();
        assert_eq!(value.target, "0x2::coin::value");
        assert_eq!(tx.move_calls().len(), 3);
    }
}
