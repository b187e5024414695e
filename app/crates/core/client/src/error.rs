//! Errors seen by callers of the worker proxy

use thiserror::Error;
use types::{Failure, FailureKind, Operation};

/// Why a call did not produce a value
///
/// A failure reported by the worker and a lost message are different
/// variants; callers can always tell which one happened.
#[derive(Debug, Error)]
pub enum CallError {
    /// The operation ran and failed
    #[error("worker operation failed: {0}")]
    Failed(Failure),
    /// The request or its response was lost because the worker is gone
    #[error("worker disconnected")]
    Disconnected,
    /// The arguments could not be encoded
    #[error("could not encode arguments: {0}")]
    Encode(#[source] serde_json::Error),
    /// The operation succeeded but its value had an unexpected shape
    #[error("unexpected result for {operation}: {source}")]
    Decode {
        /// Operation whose result was malformed
        operation: Operation,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },
    /// Every call identifier has been used
    #[error("call identifiers exhausted")]
    Exhausted,
}

impl CallError {
    /// Failure kind reported by the worker, if the operation ran and failed
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CallError::Failed(failure) => Some(failure.kind),
            _ => None,
        }
    }
}
