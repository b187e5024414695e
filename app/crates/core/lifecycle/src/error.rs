//! Setup and submission errors

use client::CallError;
use thiserror::Error;
use types::PublicKeyError;

use crate::{Phase, PollError, WalletError};

/// Why setup stopped
///
/// The orchestrator stays in the phase it failed in.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Setup was already run
    #[error("setup already started (phase: {0})")]
    AlreadyStarted(Phase),
    /// A worker call failed
    #[error("{phase}: {source}")]
    Worker {
        /// Phase the call was made in
        phase: Phase,
        /// What went wrong
        #[source]
        source: CallError,
    },
    /// The wallet failed
    #[error("wallet: {0}")]
    Wallet(#[from] WalletError),
    /// The wallet returned no account
    #[error("wallet returned no accounts")]
    NoAccounts,
    /// An address could not be parsed
    #[error("invalid address `{address}`: {source}")]
    InvalidAddress {
        /// The address as given
        address: String,
        /// Why it was rejected
        #[source]
        source: PublicKeyError,
    },
    /// Waiting for the account to be funded failed
    #[error("waiting for funding: {0}")]
    Funding(#[from] PollError),
}

/// Why a submission failed
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Submissions are only accepted in [`Phase::Ready`]
    #[error("not ready to submit (phase: {0})")]
    NotReady(Phase),
    /// A worker call failed
    #[error("{phase}: {source}")]
    Worker {
        /// Phase the call was made in
        phase: Phase,
        /// What went wrong
        #[source]
        source: CallError,
    },
    /// The wallet failed
    #[error("wallet: {0}")]
    Wallet(#[from] WalletError),
}
