//! Errors raised by the proving library

use thiserror::Error;

/// Proving library errors
#[derive(Debug, Error)]
pub enum ProverError {
    /// The library was used before `ready` completed
    #[error("proving library is not ready")]
    NotReady,
    /// No class is registered under this name
    #[error("unknown contract `{0}`")]
    UnknownContract(String),
    /// The class has no such method
    #[error("contract `{contract}` has no method `{method}`")]
    UnknownMethod {
        /// Contract class name
        contract: String,
        /// Requested method
        method: String,
    },
    /// Wrong number of field arguments for a method
    #[error("method `{method}` takes {expected} field arguments, got {actual}")]
    Arity {
        /// Requested method
        method: String,
        /// Declared argument count
        expected: usize,
        /// Given argument count
        actual: usize,
    },
    /// A transaction was proved against a different contract than it targets
    #[error("transaction targets contract `{actual}`, expected `{expected}`")]
    ContractMismatch {
        /// Contract the prover was given
        expected: String,
        /// Contract the account update targets
        actual: String,
    },
    /// A transaction could not be serialized
    #[error("transaction serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
