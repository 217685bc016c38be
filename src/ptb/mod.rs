//! Programmable transaction blocks
//!
//! - `object_id`: 32-byte ids and addresses
//! - `type_tag`: Move type strings
//! - `kind`: the BCS wire layout sent to dev-inspect
//! - `transaction`: the builder the call helpers append to

pub mod kind;
pub mod object_id;
pub mod transaction;
pub mod type_tag;

pub use kind::{Argument, CallArg, Command, ObjectArg, ObjectDigest, TransactionKind};
pub use object_id::ObjectId;
pub use transaction::{MoveCall, Transaction, TxArg};
pub use type_tag::{parse_target, StructTag, TypeTag};
