//! Dry runs and result decoding
//!
//! A dry run resolves the transaction, sends it to
//! `sui_devInspectTransactionBlock`, and keeps the raw response next to the
//! call sequence. Decoders then read fixed slots out of it:
//! - return values: BCS little-endian integers, one list per command
//! - events: `parsedJson` payloads, addressed from the end
//!
//! Every failure (node error, failure status, missing slot, bad bytes) is a
//! [`DryRunError`] carrying the full [`DebugInfo`].

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::debug::DebugInfo;
use crate::error::{DryRunError, Result, SdkError};
use crate::errors::parse_error_message;
use crate::format::ScaledAmount;
use crate::ptb::{ObjectId, Transaction};
use crate::rpc::{DevInspectResults, ExecutionResult, NodeClient};

/// A successful dry run and its debug context
#[derive(Debug, Clone)]
pub struct DryRunOutput {
    pub results: DevInspectResults,
    pub debug_info: DebugInfo,
}

/// Simulate `tx` as `sender`
pub async fn dry_run<N: NodeClient + ?Sized>(
    node: &N,
    sender: &ObjectId,
    tx: &Transaction,
) -> Result<DryRunOutput> {
    let debug_info = tx.debug_info();
    let kind = tx
        .resolve(node)
        .await
        .map_err(|e| with_context(e, &debug_info))?;
    let tx_bytes = kind.to_base64()?;

    debug!("🔬 Dry run of {} calls as {}", tx.move_calls().len(), sender);
    let results = node
        .dev_inspect(sender, &tx_bytes)
        .await
        .map_err(|e| with_context(e, &debug_info))?;

    let raw = serde_json::to_value(&results).unwrap_or_else(|e| {
        warn!("Could not keep raw dry-run result: {}", e);
        Value::Null
    });
    let debug_info = debug_info.with_raw_result(raw);
    check_result(results, debug_info)
}

/// Node-side failures become a [`DryRunError`] with the call sequence;
/// precondition and registry errors pass through untouched
fn with_context(err: SdkError, debug_info: &DebugInfo) -> SdkError {
    let raw = match err {
        SdkError::Precondition(_) | SdkError::Config(_) | SdkError::DryRun(_) => return err,
        SdkError::Rpc(message) => message,
        other => other.to_string(),
    };
    warn!("Dry run rejected by node: {}", raw);
    DryRunError::new(parse_error_message(&raw), debug_info.clone()).into()
}

/// Reject node errors and failure statuses
pub fn check_result(results: DevInspectResults, debug_info: DebugInfo) -> Result<DryRunOutput> {
    let raw_error = results
        .error
        .clone()
        .or_else(|| {
            (!results.effects.status.is_success()).then(|| {
                results
                    .effects
                    .status
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("execution status {}", results.effects.status.status))
            })
        });

    if let Some(raw) = raw_error {
        warn!("Dry run failed: {}", raw);
        return Err(DryRunError::new(parse_error_message(&raw), debug_info).into());
    }

    Ok(DryRunOutput { results, debug_info })
}

impl DryRunOutput {
    /// A decode failure with this run's context attached
    pub fn fail(&self, message: impl Into<String>) -> SdkError {
        DryRunError::new(message, self.debug_info.clone()).into()
    }

    fn commands(&self) -> &[ExecutionResult] {
        self.results.results.as_deref().unwrap_or(&[])
    }

    pub fn return_bytes(&self, command: usize, slot: usize) -> Result<&[u8]> {
        self.commands()
            .get(command)
            .and_then(|r| r.return_values.get(slot))
            .map(|(bytes, _)| bytes.as_slice())
            .ok_or_else(|| self.fail(format!("no return value {} for command {}", slot, command)))
    }

    /// The first return value of the last command that returned anything
    fn last_return_bytes(&self) -> Result<&[u8]> {
        self.commands()
            .iter()
            .rev()
            .find_map(|r| r.return_values.first())
            .map(|(bytes, _)| bytes.as_slice())
            .ok_or_else(|| self.fail("dry run returned no values"))
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self, bytes: &[u8], what: &str) -> Result<T> {
        bcs::from_bytes(bytes).map_err(|e| self.fail(format!("cannot decode {}: {}", what, e)))
    }

    pub fn return_u64(&self, command: usize, slot: usize) -> Result<u64> {
        let bytes = self.return_bytes(command, slot)?;
        self.decode(bytes, "u64")
    }

    pub fn last_return_u64(&self) -> Result<u64> {
        let bytes = self.last_return_bytes()?;
        self.decode(bytes, "u64")
    }

    pub fn last_return_u128(&self) -> Result<u128> {
        let bytes = self.last_return_bytes()?;
        self.decode(bytes, "u128")
    }

    pub fn last_return_u256(&self) -> Result<U256> {
        let bytes = self.last_return_bytes()?;
        if bytes.len() != 32 {
            return Err(self.fail(format!("cannot decode u256 from {} bytes", bytes.len())));
        }
        Ok(U256::from_le_slice(bytes))
    }

    /// Integer field of an event payload; `from_end` 0 is the last event,
    /// `path` is dot separated (`reserve_fee.value`)
    pub fn event_field(&self, from_end: usize, path: &str) -> Result<U256> {
        let events = &self.results.events;
        let event = events
            .len()
            .checked_sub(from_end + 1)
            .and_then(|i| events.get(i))
            .ok_or_else(|| {
                self.fail(format!("expected at least {} events, got {}", from_end + 1, events.len()))
            })?;

        let mut value = &event.parsed_json;
        for key in path.split('.') {
            value = value
                .get(key)
                .ok_or_else(|| self.fail(format!("event {} has no field '{}'", event.event_type, path)))?;
        }

        match value {
            Value::String(s) => s
                .parse::<U256>()
                .map_err(|e| self.fail(format!("field '{}' is not an integer: {}", path, e))),
            Value::Number(n) => n
                .as_u64()
                .map(U256::from)
                .ok_or_else(|| self.fail(format!("field '{}' is not an unsigned integer", path))),
            other => Err(self.fail(format!("field '{}' has unexpected value {}", path, other))),
        }
    }
}

// ============================================
// DECODERS
// ============================================

/// PT minted, from the last call's u64
pub fn decode_mint_py(out: &DryRunOutput, decimal: u8) -> Result<ScaledAmount> {
    Ok(ScaledAmount::from_u64(out.last_return_u64()?, decimal))
}

/// LP minted, from the last event's `lp_amount`
pub fn decode_mint_lp(out: &DryRunOutput, decimal: u8) -> Result<ScaledAmount> {
    Ok(ScaledAmount::new(out.event_field(0, "lp_amount")?, decimal))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub sy_out: ScaledAmount,
    /// 64.64 fixed point
    pub fee: ScaledAmount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_sy_out: Option<ScaledAmount>,
}

/// SY out from the last call, fee from the second-to-last event
pub fn decode_swap_pt_for_sy(out: &DryRunOutput, decimal: u8) -> Result<SwapQuote> {
    let sy_out = ScaledAmount::from_u64(out.last_return_u64()?, decimal);
    let fee_raw = out.event_field(1, "reserve_fee.value")?;
    let fee = ScaledAmount::fixed_point(fee_raw, decimal).map_err(|e| out.fail(e.to_string()))?;
    Ok(SwapQuote { sy_out, fee, min_sy_out: None })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnLpQuote {
    pub pt_amount: ScaledAmount,
    pub sy_amount: ScaledAmount,
}

/// PT and SY released, from the last event
pub fn decode_burn_lp(out: &DryRunOutput, decimal: u8) -> Result<BurnLpQuote> {
    Ok(BurnLpQuote {
        pt_amount: ScaledAmount::new(out.event_field(0, "pt_amount")?, decimal),
        sy_amount: ScaledAmount::new(out.event_field(0, "sy_amount")?, decimal),
    })
}

/// Conversion rate from the last call's u128, 64.64 with no decimal scaling
pub fn decode_conversion_rate(out: &DryRunOutput) -> Result<ScaledAmount> {
    let raw = U256::from(out.last_return_u128()?);
    ScaledAmount::fixed_point(raw, 0).map_err(|e| out.fail(e.to_string()))
}

/// SY amount from the last call's u64
pub fn decode_sy_out(out: &DryRunOutput, decimal: u8) -> Result<ScaledAmount> {
    Ok(ScaledAmount::from_u64(out.last_return_u64()?, decimal))
}
