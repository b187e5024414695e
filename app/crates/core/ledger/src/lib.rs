//! Remote network endpoint
//!
//! The worker binds one endpoint per session (`selectNetwork`) and reads
//! account state through it. [`Connector`] turns an endpoint URL into a
//! [`Ledger`]; [`graphql`] is the production implementation.

pub mod error;
pub mod graphql;
#[cfg(any(test, feature = "testutils"))]
pub mod memory;

use async_trait::async_trait;
use types::{Account, PublicKey};

pub use error::LedgerError;
pub use graphql::{GraphqlConnector, GraphqlLedger};

/// Default endpoint: the Berkeley network GraphQL proxy
pub const DEFAULT_ENDPOINT: &str = "https://proxy.berkeley.minaexplorer.com/graphql";

/// Read access to account state on one network
#[async_trait(?Send)]
pub trait Ledger {
    /// Look up an account; `Ok(None)` means the ledger does not know it
    async fn fetch_account(&self, key: &PublicKey) -> Result<Option<Account>, LedgerError>;
}

/// Opens a [`Ledger`] for an endpoint
pub trait Connector {
    /// Ledger client produced by this connector
    type Ledger: Ledger;

    /// Bind a ledger client to `endpoint`
    fn connect(&self, endpoint: &str) -> Result<Self::Ledger, LedgerError>;
}
