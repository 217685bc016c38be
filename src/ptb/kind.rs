//! Wire layout of a programmable transaction
//!
//! These types only exist to be BCS-encoded into the `tx_bytes` handed to
//! `sui_devInspectTransactionBlock`. Enum variant order is the on-chain
//! order and must not change.

use base64::Engine;
use serde::{Serialize, Serializer};
use std::fmt;

use super::{ObjectId, TypeTag};
use crate::error::{Result, SdkError};

pub const DIGEST_LENGTH: usize = 32;

/// Handle to a transaction input or to the output of an earlier command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::GasCoin => write!(f, "GasCoin"),
            Argument::Input(i) => write!(f, "Input({})", i),
            Argument::Result(i) => write!(f, "Result({})", i),
            Argument::NestedResult(i, j) => write!(f, "NestedResult({},{})", i, j),
        }
    }
}

impl Argument {
    /// The `index`-th value of a multi-return command
    pub fn nested(self, index: u16) -> Result<Argument> {
        match self {
            Argument::Result(cmd) => Ok(Argument::NestedResult(cmd, index)),
            other => Err(SdkError::decode(format!(
                "{} is not a command result and has no nested values",
                other
            ))),
        }
    }
}

/// Object digest, base58 in JSON-RPC, length-prefixed bytes in BCS
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ObjectDigest([u8; DIGEST_LENGTH]);

impl ObjectDigest {
    pub fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_base58(s: &str) -> Result<Self> {
        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| SdkError::decode(format!("invalid digest '{}': {}", s, e)))?;
        if decoded.len() != DIGEST_LENGTH {
            return Err(SdkError::decode(format!(
                "digest '{}' has {} bytes, expected {}",
                s,
                decoded.len(),
                DIGEST_LENGTH
            )));
        }
        let mut bytes = [0u8; DIGEST_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({})", self.to_base58())
    }
}

impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

/// (id, version, digest)
pub type ObjectRef = (ObjectId, u64, ObjectDigest);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
    SplitCoins(Argument, Vec<Argument>),
    MergeCoins(Argument, Vec<Argument>),
    Publish(Vec<Vec<u8>>, Vec<ObjectId>),
    MakeMoveVec(Option<TypeTag>, Vec<Argument>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

impl TransactionKind {
    pub fn to_bcs(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// `tx_bytes` parameter of dev-inspect
    pub fn to_base64(&self) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.to_bcs()?))
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            TransactionKind::ProgrammableTransaction(pt) => pt,
        }
    }
}
