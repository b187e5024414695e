//! Request/response protocol between the orchestrator and the worker
//!
//! # Wire format
//! ```text
//! Request  { "id": 7, "operation": "compileContract", "args": {} }
//! Response { "id": 7, "result": { "status": "success", "value": null } }
//! Response { "id": 8, "result": { "status": "failure", "kind": "precondition", "detail": "..." } }
//! ```
//!
//! Exactly one response is produced for every request whose `id` can be read.
//! Failures travel inside `result`; the channel has no separate error lane.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Correlation identifier for one outstanding call
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(u64);

impl CallId {
    /// First identifier handed out by a fresh proxy
    pub const FIRST: CallId = CallId(1);

    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw integer value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier after this one, `None` once the id space is exhausted
    pub fn next(self) -> Option<CallId> {
        self.0.checked_add(1).map(CallId)
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed catalog of worker operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Wait for the proving library to become ready
    InitLibrary,
    /// Bind the remote network endpoint used for chain reads
    SelectNetwork,
    /// Query the bound network for an account
    FetchAccount,
    /// Resolve the contract class from the registry
    LoadContract,
    /// Compile the loaded contract
    CompileContract,
    /// Construct the contract instance and stage its initialization transaction
    InitInstance,
    /// Stage a transaction that writes a new top history
    BuildHistoryUpdate,
    /// Stage a transaction that runs the credit check
    BuildCreditCheck,
    /// Prove the pending transaction in place
    ProveTransaction,
    /// Serialize the pending transaction for the wallet
    SerializeTransaction,
}

impl Operation {
    /// Every operation, in the order a session normally uses them
    pub const ALL: [Operation; 10] = [
        Operation::InitLibrary,
        Operation::SelectNetwork,
        Operation::FetchAccount,
        Operation::LoadContract,
        Operation::CompileContract,
        Operation::InitInstance,
        Operation::BuildHistoryUpdate,
        Operation::BuildCreditCheck,
        Operation::ProveTransaction,
        Operation::SerializeTransaction,
    ];

    /// Wire name of the operation
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::InitLibrary => "initLibrary",
            Operation::SelectNetwork => "selectNetwork",
            Operation::FetchAccount => "fetchAccount",
            Operation::LoadContract => "loadContract",
            Operation::CompileContract => "compileContract",
            Operation::InitInstance => "initInstance",
            Operation::BuildHistoryUpdate => "buildHistoryUpdate",
            Operation::BuildCreditCheck => "buildCreditCheck",
            Operation::ProveTransaction => "proveTransaction",
            Operation::SerializeTransaction => "serializeTransaction",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation name outside the catalog
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown operation `{0}`")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

/// Which state-mutating contract method a user submission invokes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateKind {
    /// `setTopHistory` with a new pair of histories
    HistoryUpdate,
    /// `checkCredit` over the stored histories
    #[default]
    CreditCheck,
}

impl UpdateKind {
    /// Worker operation that stages this kind of update
    pub const fn operation(self) -> Operation {
        match self {
            UpdateKind::HistoryUpdate => Operation::BuildHistoryUpdate,
            UpdateKind::CreditCheck => Operation::BuildCreditCheck,
        }
    }
}

/// Category of an operation failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The operation ran before the step it depends on
    Precondition,
    /// Arguments did not match the operation's shape
    InvalidArguments,
    /// The operation name is not in the catalog
    UnknownOperation,
    /// The proving/contract library failed
    Library,
    /// The remote network endpoint failed
    Network,
    /// A value could not be serialized
    Serialization,
}

impl FailureKind {
    /// Wire name of the kind
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::Precondition => "precondition",
            FailureKind::InvalidArguments => "invalidArguments",
            FailureKind::UnknownOperation => "unknownOperation",
            FailureKind::Library => "library",
            FailureKind::Network => "network",
            FailureKind::Serialization => "serialization",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed operation, as carried back to the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {detail}")]
pub struct Failure {
    /// What went wrong
    pub kind: FailureKind,
    /// Human-readable description
    pub detail: String,
}

impl Failure {
    /// Build a failure of the given kind
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Shorthand for a precondition violation
    pub fn precondition(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Precondition, detail)
    }
}

/// Outcome of one worker operation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OpResult {
    /// The operation completed
    Success {
        /// Operation-specific result, `null` when there is none
        #[serde(default)]
        value: Value,
    },
    /// The operation failed
    Failure(Failure),
}

impl OpResult {
    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<Value, Failure> {
        match self {
            OpResult::Success { value } => Ok(value),
            OpResult::Failure(failure) => Err(failure),
        }
    }

    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, OpResult::Success { .. })
    }
}

impl From<Result<Value, Failure>> for OpResult {
    fn from(result: Result<Value, Failure>) -> Self {
        match result {
            Ok(value) => OpResult::Success { value },
            Err(failure) => OpResult::Failure(failure),
        }
    }
}

/// A call sent from the orchestrator to the worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation identifier
    pub id: CallId,
    /// Operation to run
    pub operation: Operation,
    /// Operation arguments
    #[serde(default)]
    pub args: Value,
}

/// Raw request shape, read before the operation name is checked
#[derive(Deserialize)]
struct Envelope {
    id: CallId,
    operation: String,
    #[serde(default)]
    args: Value,
}

impl Request {
    /// Decode a request from channel text
    ///
    /// The id is read first so that an unknown operation can still be answered.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let operation =
            envelope
                .operation
                .parse()
                .map_err(|UnknownOperation(name)| DecodeError::UnknownOperation {
                    id: envelope.id,
                    name,
                })?;
        Ok(Request {
            id: envelope.id,
            operation,
            args: envelope.args,
        })
    }
}

/// The worker's answer to one request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Identifier of the request being answered
    pub id: CallId,
    /// Outcome of the operation
    pub result: OpResult,
}

impl Response {
    /// Decode a response from channel text
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A channel message that could not be understood
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not valid JSON, or not the expected envelope
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The envelope is fine but the operation is not in the catalog
    #[error("request {id} names unknown operation `{name}`")]
    UnknownOperation {
        /// Identifier of the offending request
        id: CallId,
        /// The name that was sent
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_ids_increase() {
        let first = CallId::FIRST;
        let second = first.next().expect("next id");
        assert!(second > first);
        assert_eq!(second.get(), 2);
        assert_eq!(CallId::new(u64::MAX).next(), None);
    }

    #[test]
    fn operation_names_round_trip_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>(), Ok(op));
            assert_eq!(
                serde_json::to_value(op).expect("serialize"),
                json!(op.as_str())
            );
        }
        assert!("loadSnarkyJS".parse::<Operation>().is_err());
    }

    #[test]
    fn request_decodes_wire_shape() {
        let req = Request::decode(r#"{"id":3,"operation":"fetchAccount","args":{"publicKey":"x"}}"#)
            .expect("decode");
        assert_eq!(req.id, CallId::new(3));
        assert_eq!(req.operation, Operation::FetchAccount);
        assert_eq!(req.args["publicKey"], "x");
    }

    #[test]
    fn request_without_args_defaults_to_null() {
        let req = Request::decode(r#"{"id":1,"operation":"initLibrary"}"#).expect("decode");
        assert_eq!(req.args, Value::Null);
    }

    #[test]
    fn unknown_operation_keeps_the_id() {
        let err = Request::decode(r#"{"id":9,"operation":"setTopHistory","args":{}}"#)
            .expect_err("unknown op");
        match err {
            DecodeError::UnknownOperation { id, name } => {
                assert_eq!(id, CallId::new(9));
                assert_eq!(name, "setTopHistory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            Request::decode("not json"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(
            Response::decode(r#"{"result":{"status":"success"}}"#),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn results_are_tagged() {
        let ok = OpResult::Success { value: json!(true) };
        assert_eq!(
            serde_json::to_value(&ok).expect("serialize"),
            json!({"status": "success", "value": true})
        );

        let failed = OpResult::Failure(Failure::precondition("contract not compiled"));
        assert_eq!(
            serde_json::to_value(&failed).expect("serialize"),
            json!({"status": "failure", "kind": "precondition", "detail": "contract not compiled"})
        );

        let back: OpResult =
            serde_json::from_value(json!({"status": "failure", "kind": "network", "detail": "x"}))
                .expect("deserialize");
        assert_eq!(
            back.into_result(),
            Err(Failure::new(FailureKind::Network, "x"))
        );
    }

    #[test]
    fn success_without_value_is_null() {
        let response = Response::decode(r#"{"id":4,"result":{"status":"success"}}"#).expect("decode");
        assert_eq!(response.result.into_result(), Ok(Value::Null));
    }

    #[test]
    fn update_kinds_map_to_build_operations() {
        assert_eq!(
            UpdateKind::HistoryUpdate.operation(),
            Operation::BuildHistoryUpdate
        );
        assert_eq!(UpdateKind::default().operation(), Operation::BuildCreditCheck);
    }
}
