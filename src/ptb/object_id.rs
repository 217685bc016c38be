//! 32-byte Sui object ids / account addresses

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::SdkError;

pub const ID_LENGTH: usize = 32;

/// Object id or address. Accepts the short form (`0x6`) and left-pads it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_LENGTH]);

impl ObjectId {
    pub const ZERO: ObjectId = ObjectId([0u8; ID_LENGTH]);

    pub const fn new(bytes: [u8; ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Id with a single trailing byte, used for the framework objects (0x2, 0x5, 0x6)
    pub const fn from_u8(last: u8) -> Self {
        let mut bytes = [0u8; ID_LENGTH];
        bytes[ID_LENGTH - 1] = last;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
        &self.0
    }

    /// `0x` + 64 lowercase hex chars
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.is_empty() || body.len() > ID_LENGTH * 2 {
            return Err(SdkError::decode(format!("invalid object id '{}'", s)));
        }

        let padded = format!("{:0>width$}", body, width = ID_LENGTH * 2);
        let decoded = hex::decode(&padded)
            .map_err(|e| SdkError::decode(format!("invalid object id '{}': {}", s, e)))?;

        let mut bytes = [0u8; ID_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_literal())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex_literal())
    }
}

// Hex string for JSON, raw 32 bytes (no length prefix) for BCS
impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex_literal())
        } else {
            serializer.serialize_newtype_struct("ObjectId", &self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            ObjectId::from_str(&s).map_err(D::Error::custom)
        } else {
            #[derive(Deserialize)]
            #[serde(rename = "ObjectId")]
            struct Raw([u8; ID_LENGTH]);
            Ok(ObjectId(Raw::deserialize(deserializer)?.0))
        }
    }
}
