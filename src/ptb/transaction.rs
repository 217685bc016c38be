//! In-progress call sequence
//!
//! Builders append commands to a [`Transaction`] and get back the
//! [`Argument`] handle of the result, so the output of one call feeds the
//! next. Object inputs are kept as bare ids until [`Transaction::resolve`]
//! asks the node for versions and digests.

use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

use super::kind::{
    Argument, CallArg, Command, ObjectArg, ProgrammableMoveCall, ProgrammableTransaction,
    TransactionKind,
};
use super::type_tag::parse_target;
use super::{ObjectId, TypeTag};
use crate::constants::{CLOCK_ID, SUI_SYSTEM_STATE_ID};
use crate::debug::{DebugInfo, MoveCallArgument, MoveCallInfo};
use crate::error::{Result, SdkError};
use crate::rpc::{NodeClient, Owner};

/// Caller-facing argument: an object id, a pure value, or an earlier result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxArg {
    Object { id: String, mutable: bool },
    Pure { bytes: Vec<u8>, display: String },
    Arg(Argument),
}

impl TxArg {
    /// Object passed by mutable reference or by value
    pub fn object(id: impl Into<String>) -> Self {
        TxArg::Object {
            id: id.into(),
            mutable: true,
        }
    }

    /// Object passed by immutable reference
    pub fn read_only(id: impl Into<String>) -> Self {
        TxArg::Object {
            id: id.into(),
            mutable: false,
        }
    }

    pub fn pure_u8(value: u8) -> Self {
        TxArg::Pure {
            bytes: vec![value],
            display: value.to_string(),
        }
    }

    pub fn pure_u64(value: u64) -> Self {
        TxArg::Pure {
            bytes: value.to_le_bytes().to_vec(),
            display: value.to_string(),
        }
    }

    pub fn pure_u128(value: u128) -> Self {
        TxArg::Pure {
            bytes: value.to_le_bytes().to_vec(),
            display: value.to_string(),
        }
    }

    pub fn pure_bool(value: bool) -> Self {
        TxArg::Pure {
            bytes: vec![value as u8],
            display: value.to_string(),
        }
    }

    pub fn pure_address(address: ObjectId) -> Self {
        TxArg::Pure {
            bytes: address.as_bytes().to_vec(),
            display: address.to_string(),
        }
    }

    pub fn pure_option_u64(value: Option<u64>) -> Self {
        let mut bytes = Vec::with_capacity(9);
        match value {
            Some(v) => {
                bytes.push(1);
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            None => bytes.push(0),
        }
        TxArg::Pure {
            bytes,
            display: value.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string()),
        }
    }

    /// `vector<u8>`
    pub fn pure_bytes(value: &[u8]) -> Self {
        let mut bytes = uleb128(value.len());
        bytes.extend_from_slice(value);
        TxArg::Pure {
            bytes,
            display: format!("0x{}", hex::encode(value)),
        }
    }
}

impl From<Argument> for TxArg {
    fn from(arg: Argument) -> Self {
        TxArg::Arg(arg)
    }
}

fn uleb128(mut value: usize) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// A move call waiting to be appended
#[derive(Debug, Clone)]
pub struct MoveCall {
    target: String,
    arguments: Vec<(String, TxArg)>,
    type_arguments: Vec<String>,
}

impl MoveCall {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
        }
    }

    pub fn arg(mut self, name: &str, arg: impl Into<TxArg>) -> Self {
        self.arguments.push((name.to_string(), arg.into()));
        self
    }

    pub fn type_arg(mut self, type_arg: impl Into<String>) -> Self {
        self.type_arguments.push(type_arg.into());
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingInput {
    Pure(Vec<u8>),
    Object { id: ObjectId, mutable: bool },
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    inputs: Vec<PendingInput>,
    commands: Vec<Command>,
    move_calls: Vec<MoveCallInfo>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gas coin; in a dry run this is the simulated gas payment
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    pub fn move_calls(&self) -> &[MoveCallInfo] {
        &self.move_calls
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Fresh debug context holding every move call emitted so far
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo::new(self.move_calls.clone())
    }

    /// Ids of all object inputs in insertion order
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|input| match input {
                PendingInput::Object { id, .. } => Some(*id),
                PendingInput::Pure(_) => None,
            })
            .collect()
    }

    fn next_result(&self) -> Result<u16> {
        u16::try_from(self.commands.len())
            .map_err(|_| SdkError::precondition("transaction has too many commands"))
    }

    /// Register an argument, returning its handle and its display form
    fn add_input(&mut self, arg: TxArg) -> Result<(Argument, String)> {
        match arg {
            TxArg::Arg(a) => Ok((a, a.to_string())),
            TxArg::Pure { bytes, display } => {
                let index = self.inputs.len();
                self.inputs.push(PendingInput::Pure(bytes));
                Ok((Argument::Input(to_u16(index)?), display))
            }
            TxArg::Object { id, mutable } => {
                let parsed = ObjectId::from_str(&id)?;
                let display = parsed.to_string();

                // one input per object; a mutable use upgrades an earlier read-only one
                for (index, input) in self.inputs.iter_mut().enumerate() {
                    if let PendingInput::Object { id: existing, mutable: m } = input {
                        if *existing == parsed {
                            *m = *m || mutable;
                            return Ok((Argument::Input(to_u16(index)?), display));
                        }
                    }
                }

                let index = self.inputs.len();
                self.inputs.push(PendingInput::Object { id: parsed, mutable });
                Ok((Argument::Input(to_u16(index)?), display))
            }
        }
    }

    /// Handle for an argument without appending a command
    pub fn input(&mut self, arg: TxArg) -> Result<Argument> {
        Ok(self.add_input(arg)?.0)
    }

    /// Append a move call and describe it
    pub fn move_call(&mut self, call: MoveCall) -> Result<(Argument, MoveCallInfo)> {
        let (package, module, function) = parse_target(&call.target)?;

        let type_arguments = call
            .type_arguments
            .iter()
            .map(|t| TypeTag::from_str(t))
            .collect::<Result<Vec<_>>>()?;

        // nothing is registered unless every object id parses
        for (_, arg) in &call.arguments {
            if let TxArg::Object { id, .. } = arg {
                ObjectId::from_str(id)?;
            }
        }
        self.next_result()?;

        let mut info = MoveCallInfo::new(call.target.clone());
        info.type_arguments = call.type_arguments.clone();

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for (name, arg) in call.arguments {
            let (handle, display) = self.add_input(arg)?;
            arguments.push(handle);
            info.arguments.push(MoveCallArgument { name, value: display });
        }

        let result = Argument::Result(self.next_result()?);
        self.commands.push(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package,
            module,
            function,
            type_arguments,
            arguments,
        })));

        trace!("Appended {} as {}", info.target, result);
        self.move_calls.push(info.clone());
        Ok((result, info))
    }

    /// Split exact amounts off a coin, one handle per amount
    pub fn split_coins(&mut self, coin: impl Into<TxArg>, amounts: Vec<TxArg>) -> Result<Vec<Argument>> {
        let (coin, _) = self.add_input(coin.into())?;
        let count = amounts.len();
        let mut handles = Vec::with_capacity(count);
        for amount in amounts {
            handles.push(self.add_input(amount)?.0);
        }

        let cmd = self.next_result()?;
        self.commands.push(Command::SplitCoins(coin, handles));
        (0..count)
            .map(|i| Ok(Argument::NestedResult(cmd, to_u16(i)?)))
            .collect()
    }

    pub fn merge_coins(&mut self, destination: impl Into<TxArg>, sources: Vec<TxArg>) -> Result<()> {
        if sources.is_empty() {
            return Ok(());
        }
        let (destination, _) = self.add_input(destination.into())?;
        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            handles.push(self.add_input(source)?.0);
        }
        self.next_result()?;
        self.commands.push(Command::MergeCoins(destination, handles));
        Ok(())
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: ObjectId) -> Result<()> {
        if objects.is_empty() {
            return Ok(());
        }
        let (recipient, _) = self.add_input(TxArg::pure_address(recipient))?;
        self.next_result()?;
        self.commands.push(Command::TransferObjects(objects, recipient));
        Ok(())
    }

    pub fn make_move_vec(&mut self, type_tag: Option<&str>, elements: Vec<TxArg>) -> Result<Argument> {
        let type_tag = type_tag.map(TypeTag::from_str).transpose()?;
        let mut handles = Vec::with_capacity(elements.len());
        for element in elements {
            handles.push(self.add_input(element)?.0);
        }
        let result = Argument::Result(self.next_result()?);
        self.commands.push(Command::MakeMoveVec(type_tag, handles));
        Ok(result)
    }

    /// Look up every object input and produce the encodable transaction kind
    pub async fn resolve<N: NodeClient + ?Sized>(&self, node: &N) -> Result<TransactionKind> {
        let to_fetch: Vec<ObjectId> = self
            .object_ids()
            .into_iter()
            .filter(|id| well_known_shared(id).is_none())
            .collect();

        let mut infos = HashMap::new();
        if !to_fetch.is_empty() {
            debug!("Resolving {} object inputs", to_fetch.len());
            for info in node.multi_get_objects(&to_fetch).await? {
                infos.insert(info.object_id, info);
            }
        }

        let mut inputs = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let call_arg = match input {
                PendingInput::Pure(bytes) => CallArg::Pure(bytes.clone()),
                PendingInput::Object { id, mutable } => {
                    if let Some(initial_shared_version) = well_known_shared(id) {
                        CallArg::Object(ObjectArg::SharedObject {
                            id: *id,
                            initial_shared_version,
                            mutable: *mutable,
                        })
                    } else {
                        let info = infos
                            .get(id)
                            .ok_or_else(|| SdkError::Rpc(format!("object {} not found", id)))?;
                        match info.owner {
                            Owner::Shared { initial_shared_version } => {
                                CallArg::Object(ObjectArg::SharedObject {
                                    id: *id,
                                    initial_shared_version,
                                    mutable: *mutable,
                                })
                            }
                            _ => CallArg::Object(ObjectArg::ImmOrOwnedObject((
                                *id,
                                info.version,
                                info.digest,
                            ))),
                        }
                    }
                }
            };
            inputs.push(call_arg);
        }

        Ok(TransactionKind::ProgrammableTransaction(ProgrammableTransaction {
            inputs,
            commands: self.commands.clone(),
        }))
    }
}

fn to_u16(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| SdkError::precondition("transaction has too many inputs"))
}

/// System objects whose initial shared version is fixed at genesis
fn well_known_shared(id: &ObjectId) -> Option<u64> {
    if *id == CLOCK_ID || *id == SUI_SYSTEM_STATE_ID {
        Some(1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ptb::kind::ObjectDigest;
    use crate::rpc::mock::MockNode;
    use crate::rpc::ObjectInfo;

    const PKG: &str = "0xabc";

    #[test]
    fn test_move_call_records_info_and_result() {
        let mut tx = Transaction::new();
        let (result, info) = tx
            .move_call(
                MoveCall::new(format!("{}::sy::deposit", PKG))
                    .arg("version", TxArg::object("0x11"))
                    .arg("amount", TxArg::pure_u64(42))
                    .type_arg("0x2::sui::SUI"),
            )
            .unwrap();

        assert_eq!(result, Argument::Result(0));
        assert_eq!(info.argument("amount"), Some("42"));
        assert_eq!(info.argument("version"), Some(ObjectId::from_u8(0x11).to_string().as_str()));
        assert_eq!(tx.move_calls().len(), 1);
        assert_eq!(tx.command_count(), 1);
    }

    #[test]
    fn test_results_chain_into_later_calls() {
        let mut tx = Transaction::new();
        let (first, _) = tx.move_call(MoveCall::new(format!("{}::a::one", PKG))).unwrap();
        let (second, info) = tx
            .move_call(MoveCall::new(format!("{}::a::two", PKG)).arg("input", first))
            .unwrap();
        assert_eq!(second, Argument::Result(1));
        assert_eq!(info.argument("input"), Some("Result(0)"));
    }

    #[test]
    fn test_object_inputs_are_deduplicated_and_upgraded() {
        let mut tx = Transaction::new();
        tx.move_call(MoveCall::new(format!("{}::a::read", PKG)).arg("obj", TxArg::read_only("0x99")))
            .unwrap();
        tx.move_call(MoveCall::new(format!("{}::a::write", PKG)).arg("obj", TxArg::object("0x99")))
            .unwrap();

        assert_eq!(tx.object_ids(), vec![ObjectId::from_u8(0x99)]);
        assert_eq!(
            tx.inputs[0],
            PendingInput::Object { id: ObjectId::from_u8(0x99), mutable: true }
        );
    }

    #[test]
    fn test_split_coins_returns_nested_results() {
        let mut tx = Transaction::new();
        let gas = tx.gas();
        let parts = tx
            .split_coins(gas, vec![TxArg::pure_u64(1), TxArg::pure_u64(2)])
            .unwrap();
        assert_eq!(parts, vec![Argument::NestedResult(0, 0), Argument::NestedResult(0, 1)]);
    }

    #[test]
    fn test_bad_target_or_type_is_rejected() {
        let mut tx = Transaction::new();
        assert!(tx.move_call(MoveCall::new("not-a-target")).is_err());
        assert!(tx
            .move_call(MoveCall::new(format!("{}::a::b", PKG)).type_arg("0x2::sui"))
            .is_err());
        assert_eq!(tx.command_count(), 0);
    }

    #[test]
    fn test_bad_object_id_leaves_no_inputs() {
        let mut tx = Transaction::new();
        let err = tx.move_call(
            MoveCall::new(format!("{}::a::b", PKG))
                .arg("ok", TxArg::object("0x11"))
                .arg("amount", TxArg::pure_u64(5))
                .arg("bad", TxArg::object("0xnothex")),
        );
        assert!(err.is_err());
        assert!(tx.inputs.is_empty());
        assert!(tx.move_calls().is_empty());
        assert_eq!(tx.command_count(), 0);
    }

    #[test]
    fn test_pure_encodings() {
        assert_eq!(TxArg::pure_option_u64(None), TxArg::Pure { bytes: vec![0], display: "none".into() });
        match TxArg::pure_bytes(&[0xaa; 130]) {
            TxArg::Pure { bytes, .. } => {
                assert_eq!(&bytes[..2], &[0x82, 0x01]);
                assert_eq!(bytes.len(), 132);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_uses_node_and_well_known_objects() {
        let owned = ObjectId::from_u8(0x44);
        let shared = ObjectId::from_u8(0x55);
        let node = MockNode::default()
            .with_object(ObjectInfo {
                object_id: owned,
                version: 9,
                digest: ObjectDigest::new([1u8; 32]),
                owner: Owner::AddressOwner("0x1".into()),
                object_type: None,
            })
            .with_object(ObjectInfo {
                object_id: shared,
                version: 100,
                digest: ObjectDigest::new([2u8; 32]),
                owner: Owner::Shared { initial_shared_version: 77 },
                object_type: None,
            });

        let mut tx = Transaction::new();
        tx.move_call(
            MoveCall::new(format!("{}::a::b", PKG))
                .arg("owned", TxArg::object(owned.to_string()))
                .arg("shared", TxArg::read_only(shared.to_string()))
                .arg("clock", TxArg::read_only("0x6")),
        )
        .unwrap();

        let kind = tx.resolve(&node).await.unwrap();
        let inputs = &kind.programmable().inputs;
        assert_eq!(
            inputs[0],
            CallArg::Object(ObjectArg::ImmOrOwnedObject((owned, 9, ObjectDigest::new([1u8; 32]))))
        );
        assert_eq!(
            inputs[1],
            CallArg::Object(ObjectArg::SharedObject { id: shared, initial_shared_version: 77, mutable: false })
        );
        assert_eq!(
            inputs[2],
            CallArg::Object(ObjectArg::SharedObject { id: CLOCK_ID, initial_shared_version: 1, mutable: false })
        );
        assert!(!kind.to_base64().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_fails_on_unknown_object() {
        let node = MockNode::default();
        let mut tx = Transaction::new();
        tx.move_call(MoveCall::new(format!("{}::a::b", PKG)).arg("obj", TxArg::object("0x77")))
            .unwrap();
        assert!(matches!(tx.resolve(&node).await, Err(SdkError::Rpc(_))));
    }
}
