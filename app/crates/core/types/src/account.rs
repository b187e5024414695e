//! Account addresses and ledger account snapshots

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A base58check-encoded account public key
///
/// Parsing decodes the address and verifies its version byte and checksum,
/// so a mistyped address is rejected before it reaches the network.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey(String);

impl PublicKey {
    /// Encoded length of every address
    pub const LEN: usize = 55;
    /// Prefix shared by every address
    pub const PREFIX: &'static str = "B62";
    /// Version byte of the decoded address
    pub const VERSION: u8 = 0xcb;

    /// Textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Why a string is not a public key
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PublicKeyError {
    /// Wrong encoded length
    #[error("public key must be {expected} characters, got {actual}")]
    Length {
        /// Required length
        expected: usize,
        /// Length that was given
        actual: usize,
    },
    /// Does not start with the address prefix
    #[error("public key must start with `{}`", PublicKey::PREFIX)]
    Prefix,
    /// Not valid base58check: bad character, wrong version byte or checksum
    #[error("public key is not a valid address: {0}")]
    Encoding(String),
}

impl FromStr for PublicKey {
    type Err = PublicKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let actual = s.chars().count();
        if actual != Self::LEN {
            return Err(PublicKeyError::Length {
                expected: Self::LEN,
                actual,
            });
        }
        if !s.starts_with(Self::PREFIX) {
            return Err(PublicKeyError::Prefix);
        }
        bs58::decode(s)
            .with_check(Some(Self::VERSION))
            .into_vec()
            .map_err(|e| PublicKeyError::Encoding(e.to_string()))?;
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for PublicKey {
    type Error = PublicKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PublicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ledger view of an existing account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account address
    pub public_key: PublicKey,
    /// Number of transactions sent from the account
    pub nonce: u64,
    /// Total balance in the smallest unit
    pub balance: u64,
}

/// Result of an account lookup
///
/// A missing account is a normal answer, not an error: a fresh key stays
/// missing until it is funded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    /// Whether the ledger knows the account
    pub exists: bool,
    /// Account details when it exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
}

impl AccountStatus {
    /// The account was not found
    pub const fn missing() -> Self {
        Self {
            exists: false,
            account: None,
        }
    }

    /// The account was found
    pub const fn found(account: Account) -> Self {
        Self {
            exists: true,
            account: Some(account),
        }
    }
}

impl From<Option<Account>> for AccountStatus {
    fn from(account: Option<Account>) -> Self {
        match account {
            Some(account) => Self::found(account),
            None => Self::missing(),
        }
    }
}
