//! Human-readable failure messages
//!
//! Dry-run errors come back from the node as raw execution errors, e.g.
//! `MoveAbort(MoveLocation { .. function_name: Some("swap_exact_pt_for_sy") }, 769) in command 3`.
//! Known external-protocol failures are recognised by substring first, then
//! the abort code is looked up in the market package's table. Anything else
//! is passed through unchanged.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref ABORT_MESSAGES: HashMap<u64, &'static str> = {
        let mut m = HashMap::new();
        // version / access
        m.insert(1, "Package version mismatch, please upgrade to the latest version");
        m.insert(2, "Caller is not authorised for this operation");
        // maturity
        m.insert(257, "Market has expired");
        m.insert(258, "Market has not expired yet");
        m.insert(259, "Maturity is not set for this market");
        // py positions
        m.insert(513, "Insufficient PT balance in position");
        m.insert(514, "Insufficient YT balance in position");
        m.insert(515, "Position belongs to a different market");
        m.insert(516, "Position is not empty");
        // market / swaps
        m.insert(769, "Slippage exceeded: output is below the minimum");
        m.insert(770, "Insufficient liquidity in the market");
        m.insert(771, "Trade amount is too small");
        m.insert(772, "Trade amount is too large for the current pool");
        m.insert(773, "Exchange rate is below one; try a smaller amount");
        m.insert(774, "Market is paused");
        m.insert(775, "Market cap reached");
        // oracle / vouchers
        m.insert(1025, "Price voucher does not match this market");
        m.insert(1026, "Price oracle is not registered for this market");
        m.insert(1027, "Price oracle ticket is invalid");
        // lp
        m.insert(1281, "LP amount exceeds position balance");
        m.insert(1282, "Cannot join positions from different markets");
        m.insert(1283, "LP amount is zero");
        // sy
        m.insert(1537, "Deposit amount is below the minimum");
        m.insert(1538, "Redeem amount exceeds SY supply");
        m.insert(1539, "SY deposits are paused");
        m
    };
}

/// (all substrings that must appear, message)
const SPECIAL_CASES: &[(&[&str], &str)] = &[
    (&["InsufficientGas"], "Insufficient gas to execute the transaction"),
    (&["InsufficientCoinBalance"], "Insufficient balance"),
    (&["balance", "split"], "Insufficient balance"),
    (&["x_oracle", "MoveAbort"], "Scallop oracle price is stale, please try again in a moment"),
    (&["staking", "request_stake", "MoveAbort"], "Haedal staking is unavailable or the amount is below its minimum"),
    (&["native_pool", "MoveAbort"], "Volo staking pool rejected the amount"),
    (&["staked_sui_vault", "MoveAbort"], "Aftermath staking rejected the amount"),
    (&["liquid_staking", "MoveAbort"], "Liquid staking pool rejected the amount"),
    (&["UnusedValueWithoutDrop"], "Transaction leaves an object unused"),
];

/// The numeric code of a `MoveAbort(..., code)` error, if any
pub fn abort_code(raw: &str) -> Option<u64> {
    let start = raw.find("MoveAbort")?;
    let segment = &raw[start..];
    let segment = match segment.find(" in command") {
        Some(end) => &segment[..end],
        None => segment,
    };
    let close = segment.rfind(')')?;
    let inner = &segment[..close];
    let code = inner.rsplit(',').next()?.trim();
    code.parse().ok()
}

pub fn message_for_code(code: u64) -> Option<&'static str> {
    ABORT_MESSAGES.get(&code).copied()
}

/// Best human-readable message for a raw node error
pub fn parse_error_message(raw: &str) -> String {
    for (needles, message) in SPECIAL_CASES {
        if needles.iter().all(|n| raw.contains(n)) {
            return message.to_string();
        }
    }

    if let Some(code) = abort_code(raw) {
        return match message_for_code(code) {
            Some(message) => message.to_string(),
            None => format!("Transaction failed with error code {}", code),
        };
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWAP_ABORT: &str = "MoveAbort(MoveLocation { module: ModuleId { address: 0xa0, name: Identifier(\"market\") }, function: 12, instruction: 40, function_name: Some(\"swap_exact_pt_for_sy\") }, 769) in command 3";

    #[test]
    fn test_extracts_abort_code() {
        assert_eq!(abort_code(SWAP_ABORT), Some(769));
        assert_eq!(abort_code("MoveAbort(_, 12)"), Some(12));
        assert_eq!(abort_code("something else"), None);
    }

    #[test]
    fn test_known_code_is_mapped() {
        assert_eq!(parse_error_message(SWAP_ABORT), "Slippage exceeded: output is below the minimum");
    }

    #[test]
    fn test_unknown_code_keeps_number() {
        assert_eq!(
            parse_error_message("MoveAbort(MoveLocation { .. }, 99999) in command 0"),
            "Transaction failed with error code 99999"
        );
    }

    #[test]
    fn test_special_cases_win_over_codes() {
        let raw = "MoveAbort(MoveLocation { module: ModuleId { address: 0x1, name: Identifier(\"x_oracle\") }, function: 3, instruction: 9, function_name: Some(\"price\") }, 769) in command 1";
        assert_eq!(parse_error_message(raw), "Scallop oracle price is stale, please try again in a moment");
        assert_eq!(
            parse_error_message("InsufficientGas in command 0"),
            "Insufficient gas to execute the transaction"
        );
    }

    #[test]
    fn test_unrecognised_text_passes_through() {
        assert_eq!(parse_error_message("node is syncing"), "node is syncing");
    }
}
