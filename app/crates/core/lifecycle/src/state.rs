//! Lifecycle phases and the observable state

use core::fmt;

use serde::{Deserialize, Serialize};
use types::PublicKey;

/// Where the orchestrator is in the setup / submission lifecycle
///
/// ```text
/// Uninitialized → LibraryLoading → WalletCheck ─┬─▶ NoWallet
///                                               └─▶ AccountCheck ─┬─▶ AccountExists
///                                                                 └─▶ WaitingForFunding ─▶ AccountExists
/// AccountExists → ContractLoading → ContractCompiling → InstanceInit → ProvingInit → Ready
/// Ready → BuildingTx → ProvingTx → Submitting → Submitted → Ready
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Nothing has happened yet
    #[default]
    Uninitialized,
    /// Waiting for the proving library and binding the network
    LibraryLoading,
    /// Looking for a wallet
    WalletCheck,
    /// No wallet is installed; setup stops here
    NoWallet,
    /// Checking whether the user's account exists
    AccountCheck,
    /// Polling until the account is funded
    WaitingForFunding,
    /// The user's account exists
    AccountExists,
    /// Loading the contract class
    ContractLoading,
    /// Compiling the contract
    ContractCompiling,
    /// Instantiating the contract
    InstanceInit,
    /// Proving the initialization transaction
    ProvingInit,
    /// Setup is done; updates can be submitted
    Ready,
    /// Staging an update
    BuildingTx,
    /// Proving the update
    ProvingTx,
    /// Handing the update to the wallet
    Submitting,
    /// The wallet accepted the update
    Submitted,
}

impl Phase {
    /// Name used in logs and the UI
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::LibraryLoading => "loading proving library",
            Phase::WalletCheck => "checking wallet",
            Phase::NoWallet => "no wallet",
            Phase::AccountCheck => "checking account",
            Phase::WaitingForFunding => "waiting for funding",
            Phase::AccountExists => "account exists",
            Phase::ContractLoading => "loading contract",
            Phase::ContractCompiling => "compiling contract",
            Phase::InstanceInit => "initializing instance",
            Phase::ProvingInit => "proving initialization",
            Phase::Ready => "ready",
            Phase::BuildingTx => "building transaction",
            Phase::ProvingTx => "proving transaction",
            Phase::Submitting => "submitting transaction",
            Phase::Submitted => "transaction submitted",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of everything the presentation layer shows
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
    /// Current phase
    pub phase: Phase,
    /// Whether a wallet was found; `None` until checked
    pub has_wallet: Option<bool>,
    /// Whether setup reached `Ready`
    pub has_been_setup: bool,
    /// Whether the user's account exists on chain
    pub account_exists: bool,
    /// The user's account
    pub public_key: Option<PublicKey>,
    /// Address of the contract instance
    pub contract_public_key: Option<PublicKey>,
    /// Whether a submission is in flight
    pub creating_transaction: bool,
    /// Why setup stopped, if it failed
    pub setup_error: Option<String>,
    /// Hash of the last transaction the wallet accepted
    pub last_transaction_hash: Option<String>,
}
