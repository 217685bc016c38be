//! Price-voucher dispatch
//!
//! Every pricing call in a market needs a price voucher: a hot-potato
//! object asserting the exchange rate of the yield-bearing coin, produced
//! by the oracle package from the underlying protocol's own state.
//! Which oracle entrypoint to call depends on where the yield comes from:
//!
//! 1. `provider == "SpringSui"` -> SpringSui LST info for the coin type
//! 2. `provider == "Winter"` -> Blizzard staking for the coin type
//! 3. a known coin type -> that protocol's entrypoint
//! 4. anything else -> Scallop x-oracle
//!
//! Exactly one branch is taken. Only the first two can fail, when the
//! per-coin table has no entry.

use std::fmt;
use tracing::debug;

use crate::constants::{
    self, normalize_type, AFTERMATH, ALPHAFI, BUCKET, HAEDAL, MSTABLE, SCALLOP, VOLO, WINTER,
};
use crate::debug::MoveCallInfo;
use crate::error::{Result, SdkError};
use crate::market::CoinConfig;
use crate::ptb::{Argument, MoveCall, Transaction, TxArg};

pub const SPRING_SUI_PROVIDER: &str = "SpringSui";
pub const WINTER_PROVIDER: &str = "Winter";

/// The branch a market's voucher is produced by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherRoute {
    SpringSui { lst_info: &'static str },
    Winter { blizzard_staking: &'static str },
    HaSui,
    HaWal,
    VSui,
    AfSui,
    StSui,
    SBuck,
    MUsd,
    ScallopMarketCoin { underlying: &'static str },
    XOracle,
}

impl VoucherRoute {
    /// `module::function` in the oracle package
    pub fn entrypoint(&self) -> (&'static str, &'static str) {
        match self {
            VoucherRoute::SpringSui { .. } => ("spring", "get_price_voucher_from_spring"),
            VoucherRoute::Winter { .. } => ("haedal", "get_price_voucher_from_blizzard"),
            VoucherRoute::HaSui => ("haedal", "get_price_voucher_from_hasui"),
            VoucherRoute::HaWal => ("haedal", "get_price_voucher_from_hawal"),
            VoucherRoute::VSui => ("volo", "get_price_voucher_from_volo"),
            VoucherRoute::AfSui => ("aftermath", "get_price_voucher_from_aftermath"),
            VoucherRoute::StSui => ("alphafi", "get_price_voucher_from_stsui"),
            VoucherRoute::SBuck => ("buck", "get_price_voucher_from_sbuck"),
            VoucherRoute::MUsd => ("mstable", "get_price_voucher_from_musd"),
            VoucherRoute::ScallopMarketCoin { .. } => ("scallop", "get_price_voucher_from_market_coin"),
            VoucherRoute::XOracle => ("scallop", "get_price_voucher_from_x_oracle"),
        }
    }
}

impl fmt::Display for VoucherRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (module, function) = self.entrypoint();
        write!(f, "{}::{}", module, function)
    }
}

/// Pick the voucher branch for a market
pub fn route(cfg: &CoinConfig) -> Result<VoucherRoute> {
    if cfg.provider == SPRING_SUI_PROVIDER {
        let lst_info = constants::spring_sui_lst_info(&cfg.coin_type).ok_or_else(|| {
            SdkError::config(format!("no SpringSui LST info for {}", cfg.coin_type))
        })?;
        return Ok(VoucherRoute::SpringSui { lst_info });
    }

    if cfg.provider == WINTER_PROVIDER {
        let blizzard_staking = constants::blizzard_staking(&cfg.coin_type).ok_or_else(|| {
            SdkError::config(format!("no Blizzard staking object for {}", cfg.coin_type))
        })?;
        return Ok(VoucherRoute::Winter { blizzard_staking });
    }

    let coin_type = normalize_type(&cfg.coin_type);
    let is = |known: &str| coin_type == normalize_type(known);

    let route = if is(constants::HASUI_COIN_TYPE) {
        VoucherRoute::HaSui
    } else if is(constants::HAWAL_COIN_TYPE) {
        VoucherRoute::HaWal
    } else if is(constants::VSUI_COIN_TYPE) {
        VoucherRoute::VSui
    } else if is(constants::AFSUI_COIN_TYPE) {
        VoucherRoute::AfSui
    } else if is(constants::STSUI_COIN_TYPE) {
        VoucherRoute::StSui
    } else if is(constants::SBUCK_COIN_TYPE) {
        VoucherRoute::SBuck
    } else if is(constants::MUSD_COIN_TYPE) {
        VoucherRoute::MUsd
    } else if let Some(underlying) = constants::scallop_underlying(&cfg.coin_type) {
        VoucherRoute::ScallopMarketCoin { underlying }
    } else {
        VoucherRoute::XOracle
    };
    Ok(route)
}

/// Append the voucher call for `cfg` and return its handle
pub fn get_price_voucher(tx: &mut Transaction, cfg: &CoinConfig) -> Result<(Argument, MoveCallInfo)> {
    let route = route(cfg)?;
    debug!("🎫 Price voucher for {} via {}", cfg.symbol(), route);

    let (module, function) = route.entrypoint();
    let call = MoveCall::new(cfg.oracle_target(module, function))
        .arg("price_oracle_config", TxArg::read_only(&cfg.price_oracle_config_id))
        .arg("price_ticket_cap", TxArg::read_only(&cfg.oracle_ticket));

    let call = match route {
        VoucherRoute::SpringSui { lst_info } => call
            .arg("lst_info", TxArg::read_only(lst_info))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type)
            .type_arg(&cfg.coin_type),
        VoucherRoute::Winter { blizzard_staking } => call
            .arg("blizzard_staking", TxArg::read_only(blizzard_staking))
            .arg("walrus_staking", TxArg::read_only(WINTER.walrus_staking))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type)
            .type_arg(&cfg.coin_type),
        VoucherRoute::HaSui => call
            .arg("haedal_staking", TxArg::read_only(HAEDAL.staking))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::HaWal => call
            .arg("walrus_staking", TxArg::read_only(HAEDAL.walrus_staking))
            .arg("walrus_system", TxArg::read_only(HAEDAL.walrus_system))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::VSui => call
            .arg("native_pool", TxArg::read_only(VOLO.native_pool))
            .arg("metadata", TxArg::read_only(VOLO.metadata))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::AfSui => call
            .arg("staked_sui_vault", TxArg::read_only(AFTERMATH.staked_sui_vault))
            .arg("safe", TxArg::read_only(AFTERMATH.safe))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::StSui => call
            .arg("liquid_staking_info", TxArg::read_only(ALPHAFI.liquid_staking_info))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .type_arg(&cfg.sy_coin_type)
            .type_arg(&cfg.coin_type),
        VoucherRoute::SBuck => call
            .arg("flask", TxArg::read_only(BUCKET.flask))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .arg("clock", TxArg::read_only(constants::CLOCK_ID.to_string()))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::MUsd => call
            .arg("vault", TxArg::read_only(MSTABLE.vault))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .arg("clock", TxArg::read_only(constants::CLOCK_ID.to_string()))
            .type_arg(&cfg.sy_coin_type),
        VoucherRoute::ScallopMarketCoin { underlying } => call
            .arg("scallop_version", TxArg::read_only(SCALLOP.version))
            .arg("scallop_market", TxArg::read_only(SCALLOP.market))
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .arg("clock", TxArg::read_only(constants::CLOCK_ID.to_string()))
            .type_arg(&cfg.sy_coin_type)
            .type_arg(underlying),
        VoucherRoute::XOracle => call
            .arg(
                "provider_version",
                TxArg::read_only(cfg.provider_version.as_deref().unwrap_or(SCALLOP.version)),
            )
            .arg(
                "provider_market",
                TxArg::read_only(cfg.provider_market.as_deref().unwrap_or(SCALLOP.market)),
            )
            .arg("sy_state", TxArg::read_only(&cfg.sy_state_id))
            .arg("clock", TxArg::read_only(constants::CLOCK_ID.to_string()))
            .type_arg(&cfg.sy_coin_type)
            .type_arg(&cfg.coin_type),
    };

    tx.move_call(call)
}

/// `oracle::get_price` on a voucher: the SY/underlying rate as 64.64 u128
pub fn get_price(
    tx: &mut Transaction,
    cfg: &CoinConfig,
    price_voucher: Argument,
) -> Result<(Argument, MoveCallInfo)> {
    tx.move_call(
        MoveCall::new(cfg.target("oracle", "get_price"))
            .arg("price_voucher", price_voucher)
            .type_arg(&cfg.sy_coin_type),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::market::fixtures::{hasui_config, with_coin};
    use crate::ptb::ObjectId;

    #[test]
    fn test_known_coin_types_reach_their_branch() {
        let cases = [
            (HASUI_COIN_TYPE, VoucherRoute::HaSui),
            (HAWAL_COIN_TYPE, VoucherRoute::HaWal),
            (VSUI_COIN_TYPE, VoucherRoute::VSui),
            (AFSUI_COIN_TYPE, VoucherRoute::AfSui),
            (STSUI_COIN_TYPE, VoucherRoute::StSui),
            (SBUCK_COIN_TYPE, VoucherRoute::SBuck),
            (MUSD_COIN_TYPE, VoucherRoute::MUsd),
        ];
        for (coin_type, expected) in cases {
            assert_eq!(route(&with_coin(coin_type, "")).unwrap(), expected, "{}", coin_type);
        }
    }

    #[test]
    fn test_scallop_market_coins_route_with_underlying() {
        for coin_type in scallop_coin_types() {
            match route(&with_coin(&coin_type, "Scallop")).unwrap() {
                VoucherRoute::ScallopMarketCoin { .. } => {}
                other => panic!("{} routed to {:?}", coin_type, other),
            }
        }
        assert_eq!(
            route(&with_coin(SCALLOP_SUSDC_COIN_TYPE, "Scallop")).unwrap(),
            VoucherRoute::ScallopMarketCoin { underlying: USDC_COIN_TYPE }
        );
    }

    #[test]
    fn test_unknown_coin_falls_back_to_x_oracle() {
        let cfg = with_coin("0x1234::mystery::MYSTERY", "SomeLender");
        assert_eq!(route(&cfg).unwrap(), VoucherRoute::XOracle);

        let mut tx = Transaction::new();
        let (handle, info) = get_price_voucher(&mut tx, &cfg).unwrap();
        assert_eq!(handle, Argument::Result(0));
        assert_eq!(info.function_path(), "scallop::get_price_voucher_from_x_oracle");
        assert_eq!(info.argument("provider_market"), Some(
            SCALLOP.market
        ));
    }

    #[test]
    fn test_x_oracle_uses_config_overrides() {
        let mut cfg = with_coin("0x1234::mystery::MYSTERY", "");
        cfg.provider_version = Some("0x77".into());
        cfg.provider_market = Some("0x78".into());

        let mut tx = Transaction::new();
        let (_, info) = get_price_voucher(&mut tx, &cfg).unwrap();
        assert_eq!(info.argument("provider_version"), Some(ObjectId::from_u8(0x77).to_string().as_str()));
        assert_eq!(info.argument("provider_market"), Some(ObjectId::from_u8(0x78).to_string().as_str()));
        assert_eq!(info.type_arguments, vec![cfg.sy_coin_type.clone(), cfg.coin_type.clone()]);
    }

    #[test]
    fn test_provider_takes_precedence_over_coin_type() {
        // a SpringSui market for a coin that also matches a coin-type branch
        let cfg = with_coin(SSUI_SPRING_COIN_TYPE, SPRING_SUI_PROVIDER);
        assert!(matches!(route(&cfg).unwrap(), VoucherRoute::SpringSui { .. }));

        let cfg = with_coin(HASUI_COIN_TYPE, SPRING_SUI_PROVIDER);
        assert!(matches!(route(&cfg), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_winter_requires_blizzard_entry() {
        let ok = with_coin(WWAL_COIN_TYPE, WINTER_PROVIDER);
        assert!(matches!(route(&ok).unwrap(), VoucherRoute::Winter { .. }));

        let missing = with_coin(WAL_COIN_TYPE, WINTER_PROVIDER);
        let mut tx = Transaction::new();
        assert!(matches!(get_price_voucher(&mut tx, &missing), Err(SdkError::Config(_))));
        assert_eq!(tx.command_count(), 0);
    }

    #[test]
    fn test_hasui_voucher_call_shape() {
        let cfg = hasui_config();
        let mut tx = Transaction::new();
        let (voucher, info) = get_price_voucher(&mut tx, &cfg).unwrap();

        assert!(info.target.starts_with("0xc0::haedal::"));
        assert_eq!(info.argument("haedal_staking"), Some(
            HAEDAL.staking
        ));
        assert_eq!(info.type_arguments, vec![cfg.sy_coin_type.clone()]);

        let (_, price) = get_price(&mut tx, &cfg, voucher).unwrap();
        assert_eq!(price.argument("price_voucher"), Some("Result(0)"));
        assert_eq!(tx.move_calls().len(), 2);
    }
}
