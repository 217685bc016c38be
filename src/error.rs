//! SDK error taxonomy
//!
//! - Precondition: wallet/pool/coin missing, surfaced immediately
//! - DryRun: the node rejected the simulation or an expected slot is absent
//! - Config: a hard-coded registry has no entry for the requested coin type
//! - Rpc / Api: transport level failures
//! - ProbeExhausted: every trial amount failed

use thiserror::Error;

use crate::debug::DebugInfo;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    /// User-input or precondition failure (no wallet, no pool, no coins)
    #[error("{0}")]
    Precondition(String),

    /// Simulation failed, carries the accumulated call sequence
    #[error(transparent)]
    DryRun(#[from] DryRunError),

    /// A constant table is missing an entry - the registry is out of date
    #[error("configuration error: {0}")]
    Config(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("api error: {0}")]
    Api(String),

    /// Malformed bytes, ids, type strings or amounts
    #[error("decode error: {0}")]
    Decode(String),

    #[error("all {attempts} probe amounts failed, last error: {last_error}")]
    ProbeExhausted {
        attempts: usize,
        last_error: Box<SdkError>,
    },
}

impl SdkError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        SdkError::Precondition(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SdkError::Config(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        SdkError::Decode(msg.into())
    }

    /// Debug context of a failed dry run, if any
    pub fn debug_info(&self) -> Option<&DebugInfo> {
        match self {
            SdkError::DryRun(e) => Some(&e.debug_info),
            SdkError::ProbeExhausted { last_error, .. } => last_error.debug_info(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Rpc(e.to_string())
    }
}

impl From<bcs::Error> for SdkError {
    fn from(e: bcs::Error) -> Self {
        SdkError::Decode(e.to_string())
    }
}

/// A failed dry run with everything needed to diagnose it
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DryRunError {
    /// Human readable message (already mapped through the abort-code table)
    pub message: String,
    pub debug_info: DebugInfo,
}

impl DryRunError {
    pub fn new(message: impl Into<String>, debug_info: DebugInfo) -> Self {
        Self {
            message: message.into(),
            debug_info,
        }
    }
}
