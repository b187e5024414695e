//! Wallet seam
//!
//! The wallet lives on the orchestrating context. It discovers the user's
//! account and signs and sends the serialized transactions the worker built.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet is available
    #[error("no wallet available")]
    Missing,
    /// The user or the wallet refused the request
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
    /// The wallet answered with something unexpected
    #[error("unexpected wallet response: {0}")]
    Malformed(String),
}

/// Fee payer section of a send request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeePayer {
    /// Fee in network currency
    pub fee: f64,
    /// Memo attached to the transaction
    pub memo: String,
}

/// What the wallet is asked to sign and send
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransaction {
    /// Serialized, proved transaction
    pub transaction: String,
    /// Who pays and how much
    pub fee_payer: FeePayer,
}

/// The wallet's receipt for a sent transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransaction {
    /// Transaction hash
    pub hash: String,
}

/// A browser wallet
#[async_trait(?Send)]
pub trait Wallet {
    /// Ask the user for access to their accounts
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Sign and send a transaction
    async fn send_transaction(
        &self,
        request: &SendTransaction,
    ) -> Result<SentTransaction, WalletError>;
}
