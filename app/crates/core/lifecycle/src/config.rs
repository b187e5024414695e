//! Orchestrator configuration
//!
//! Read from TOML. Every field has a default, so an empty document is a
//! complete configuration:
//!
//! ```toml
//! [network]
//! endpoint = "https://proxy.berkeley.minaexplorer.com/graphql"
//! explorer = "https://berkeley.minaexplorer.com/transaction/"
//!
//! [contract]
//! name = "CreditHistory"
//! address = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY"
//!
//! [transaction]
//! fee = 0.2
//! memo = ""
//! update = "creditCheck"
//! submit_initialization = true
//!
//! [poll]
//! interval_secs = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::{PublicKey, PublicKeyError, UpdateKind};

use crate::PollPolicy;

pub use ledger::DEFAULT_ENDPOINT;

/// Explorer page prefix for Berkeley transactions
pub const DEFAULT_EXPLORER: &str = "https://berkeley.minaexplorer.com/transaction/";
/// Address the credit history contract is deployed at
pub const DEFAULT_CONTRACT_ADDRESS: &str =
    "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY";
/// Fee attached to every submitted transaction
pub const DEFAULT_FEE: f64 = 0.2;
/// Seconds between two funding checks
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or has the wrong shape
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Network settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// GraphQL endpoint the worker binds to
    pub endpoint: String,
    /// Prefix of explorer links for submitted transactions
    pub explorer: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from(DEFAULT_ENDPOINT),
            explorer: String::from(DEFAULT_EXPLORER),
        }
    }
}

/// Contract settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Registry name of the contract class
    pub name: String,
    /// Address of the deployed contract
    pub address: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            name: String::from("CreditHistory"),
            address: String::from(DEFAULT_CONTRACT_ADDRESS),
        }
    }
}

/// Transaction settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Fee paid per transaction
    pub fee: f64,
    /// Memo attached to every transaction
    pub memo: String,
    /// Update staged by a user submission
    pub update: UpdateKind,
    /// Whether setup submits the instance initialization transaction
    pub submit_initialization: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            fee: DEFAULT_FEE,
            memo: String::new(),
            update: UpdateKind::default(),
            submit_initialization: true,
        }
    }
}

/// Funding poll settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between two checks
    pub interval_secs: u64,
    /// Give up after this many checks; absent polls forever
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_attempts: None,
        }
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        PollPolicy {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }
}

/// Full orchestrator configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub network: NetworkConfig,
    /// Contract settings
    pub contract: ContractConfig,
    /// Transaction settings
    pub transaction: TransactionConfig,
    /// Funding poll settings
    pub poll: PollConfig,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.contract_address()
            .map_err(|e| ConfigError::Invalid(format!("contract.address: {e}")))?;
        if !self.transaction.fee.is_finite() || self.transaction.fee < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "transaction.fee must be a non-negative number, got {}",
                self.transaction.fee
            )));
        }
        if self.poll.max_attempts == Some(0) {
            return Err(ConfigError::Invalid(String::from(
                "poll.max_attempts must be at least 1",
            )));
        }
        Ok(())
    }

    /// The contract address, parsed
    pub fn contract_address(&self) -> Result<PublicKey, PublicKeyError> {
        self.contract.address.parse()
    }

    /// The funding poll policy
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.poll)
    }

    /// Explorer link for a submitted transaction
    pub fn transaction_link(&self, hash: &str) -> String {
        format!("{}{hash}", self.network.explorer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_the_default() {
        let config = Config::from_toml_str("").expect("parse");
        assert_eq!(config, Config::default());
        assert_eq!(config.network.endpoint, ledger::DEFAULT_ENDPOINT);
        assert_eq!(
            config.contract_address().expect("address").as_str(),
            DEFAULT_CONTRACT_ADDRESS
        );
        assert_eq!(config.transaction.update, UpdateKind::CreditCheck);
        assert!(config.transaction.submit_initialization);
        assert_eq!(config.poll_policy().interval, Duration::from_secs(5));
        assert_eq!(config.poll_policy().max_attempts, None);
    }

    #[test]
    fn overrides_apply() {
        let config = Config::from_toml_str(
            r#"
            [network]
            endpoint = "http://localhost:8080/graphql"

            [transaction]
            fee = 0.5
            memo = "credit"
            update = "historyUpdate"
            submit_initialization = false

            [poll]
            interval_secs = 1
            max_attempts = 3
            "#,
        )
        .expect("parse");
        assert_eq!(config.network.endpoint, "http://localhost:8080/graphql");
        assert_eq!(config.network.explorer, DEFAULT_EXPLORER);
        assert_eq!(config.transaction.memo, "credit");
        assert_eq!(config.transaction.update, UpdateKind::HistoryUpdate);
        assert!(!config.transaction.submit_initialization);
        assert_eq!(config.poll_policy().max_attempts, Some(3));
        assert_eq!(
            config.transaction_link("5Ju"),
            "https://berkeley.minaexplorer.com/transaction/5Ju"
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[transaction]\nfee = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[contract]\naddress = \"B62short\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[poll]\nmax_attempts = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[poll]\ninterval_secs = 9").expect("write");
        let config = Config::load(file.path()).expect("load");
        assert_eq!(config.poll.interval_secs, 9);

        assert!(matches!(
            Config::load(file.path().with_extension("missing")),
            Err(ConfigError::Io { .. })
        ));
    }
}
