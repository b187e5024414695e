//! Ledger client errors

use thiserror::Error;

/// Ledger client errors
///
/// A missing account is not an error; see [`crate::Ledger::fetch_account`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The endpoint is not a usable URL
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint {
        /// The endpoint that was given
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },
    /// The request did not complete
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status
    #[error("endpoint answered with HTTP {0}")]
    Status(u16),
    /// The body was not the expected GraphQL shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The endpoint reported GraphQL errors
    #[error("graphql errors: {}", .0.join("; "))]
    Graphql(Vec<String>),
}
