//! Lifecycle orchestrator
//!
//! Runs on the orchestrating context and drives the whole user flow through
//! the worker proxy:
//!
//! ```text
//! LibraryLoading ─▶ WalletCheck ─▶ AccountCheck ─▶ (WaitingForFunding) ─▶ AccountExists
//!        ─▶ ContractLoading ─▶ ContractCompiling ─▶ InstanceInit ─▶ ProvingInit ─▶ Ready
//! Ready ─submit_update─▶ BuildingTx ─▶ ProvingTx ─▶ Submitting ─▶ Submitted ─▶ Ready
//! ```
//!
//! The wallet, the sleep source and the account lookup are traits, so the
//! same orchestrator runs in the browser and under test.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod poll;
pub mod state;
#[cfg(any(test, feature = "testutils"))]
pub mod testing;
pub mod timer;
pub mod wallet;

pub use config::{Config, ConfigError, ContractConfig, NetworkConfig, PollConfig, TransactionConfig};
pub use error::{SetupError, SubmitError};
pub use orchestrator::Orchestrator;
pub use poll::{AccountLookup, PollError, PollPolicy, resume_after_miss, wait_until_funded};
pub use state::{LifecycleState, Phase};
pub use timer::{Sleep, Timer};
pub use wallet::{FeePayer, SendTransaction, SentTransaction, Wallet, WalletError};
