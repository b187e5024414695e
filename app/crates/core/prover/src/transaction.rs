//! Staged transactions

use serde::{Deserialize, Serialize};
use types::{Field, PublicKey};

use crate::ProverError;

/// Proof attached to an account update, hex encoded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof(pub String);

/// One contract method invocation inside a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// Address of the contract instance
    pub address: PublicKey,
    /// Contract class name
    pub contract: String,
    /// Invoked method
    pub method: String,
    /// Method arguments
    pub args: Vec<Field>,
    /// Proof of correct execution, once proved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// A transaction that has not been submitted yet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Account updates, in execution order
    pub account_updates: Vec<AccountUpdate>,
}

impl Transaction {
    /// Wrap a list of account updates
    pub fn new(account_updates: Vec<AccountUpdate>) -> Self {
        Self { account_updates }
    }

    /// Whether every account update carries a proof
    pub fn is_proved(&self) -> bool {
        !self.account_updates.is_empty() && self.account_updates.iter().all(|u| u.proof.is_some())
    }

    /// Serialize into the JSON text handed to the wallet
    pub fn to_json(&self) -> Result<String, ProverError> {
        Ok(serde_json::to_string(self)?)
    }
}
