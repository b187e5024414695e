//! In-memory ledger for tests
//!
//! Accounts can be funded immediately or after a number of lookups have
//! missed, which is how a faucet looks from the polling side. Clones share
//! state, so a test keeps a handle while the worker owns another.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use types::{Account, PublicKey};

use crate::{Connector, Ledger, LedgerError};

#[derive(Debug, Default)]
struct Accounts {
    funded: BTreeMap<PublicKey, Account>,
    // account, lookups left that still miss
    pending: BTreeMap<PublicKey, (Account, u32)>,
    lookups: BTreeMap<PublicKey, u32>,
    failures: Vec<String>,
}

/// Shared in-memory account table
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    inner: Arc<Mutex<Accounts>>,
}

impl MemoryLedger {
    /// An empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make an account visible right away
    pub fn fund(&self, account: Account) {
        self.lock().funded.insert(account.public_key.clone(), account);
    }

    /// Make an account visible after `misses` lookups have returned nothing
    pub fn fund_after(&self, account: Account, misses: u32) {
        if misses == 0 {
            self.fund(account);
        } else {
            self.lock()
                .pending
                .insert(account.public_key.clone(), (account, misses));
        }
    }

    /// Fail the next lookup (of any key) with a GraphQL error
    pub fn fail_next(&self, message: &str) {
        self.lock().failures.push(String::from(message));
    }

    /// Number of lookups made for `key`
    pub fn lookups(&self, key: &PublicKey) -> u32 {
        self.lock().lookups.get(key).copied().unwrap_or(0)
    }
}

#[async_trait(?Send)]
impl Ledger for MemoryLedger {
    async fn fetch_account(&self, key: &PublicKey) -> Result<Option<Account>, LedgerError> {
        let mut accounts = self.lock();
        let count = accounts.lookups.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);

        if !accounts.failures.is_empty() {
            let message = accounts.failures.remove(0);
            return Err(LedgerError::Graphql(vec![message]));
        }
        if let Some(account) = accounts.funded.get(key) {
            return Ok(Some(account.clone()));
        }
        let Some((account, misses)) = accounts.pending.remove(key) else {
            return Ok(None);
        };
        if misses == 0 {
            accounts.funded.insert(key.clone(), account.clone());
            return Ok(Some(account));
        }
        accounts
            .pending
            .insert(key.clone(), (account, misses.saturating_sub(1)));
        Ok(None)
    }
}

/// Connector handing out clones of one [`MemoryLedger`]
#[derive(Clone, Debug, Default)]
pub struct MemoryConnector {
    ledger: MemoryLedger,
    endpoints: Arc<Mutex<Vec<String>>>,
}

impl MemoryConnector {
    /// Connector over `ledger`
    pub fn new(ledger: MemoryLedger) -> Self {
        Self {
            ledger,
            endpoints: Arc::default(),
        }
    }

    /// Every endpoint connected to so far, in order
    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Connector for MemoryConnector {
    type Ledger = MemoryLedger;

    fn connect(&self, endpoint: &str) -> Result<MemoryLedger, LedgerError> {
        self.endpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(String::from(endpoint));
        Ok(self.ledger.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    const KEY: &str = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY";

    fn account() -> Account {
        Account {
            public_key: KEY.parse().expect("key"),
            nonce: 0,
            balance: 1,
        }
    }

    #[test]
    fn funds_after_the_given_number_of_misses() {
        let ledger = MemoryLedger::new();
        let key: PublicKey = KEY.parse().expect("key");
        ledger.fund_after(account(), 2);

        block_on(async {
            assert_eq!(ledger.fetch_account(&key).await.expect("lookup"), None);
            assert_eq!(ledger.fetch_account(&key).await.expect("lookup"), None);
            assert_eq!(
                ledger.fetch_account(&key).await.expect("lookup"),
                Some(account())
            );
            assert_eq!(
                ledger.fetch_account(&key).await.expect("lookup"),
                Some(account())
            );
        });
        assert_eq!(ledger.lookups(&key), 4);
    }

    #[test]
    fn scripted_failure_hits_one_lookup() {
        let ledger = MemoryLedger::new();
        let key: PublicKey = KEY.parse().expect("key");
        ledger.fund(account());
        ledger.fail_next("boom");

        block_on(async {
            assert!(matches!(
                ledger.fetch_account(&key).await,
                Err(LedgerError::Graphql(_))
            ));
            assert!(ledger.fetch_account(&key).await.expect("lookup").is_some());
        });
    }

    #[test]
    fn connector_shares_the_ledger() {
        let ledger = MemoryLedger::new();
        let connector = MemoryConnector::new(ledger.clone());
        let bound = connector.connect("memory://one").expect("connect");
        bound.fund(account());
        assert_eq!(ledger.lookups(&account().public_key), 0);
        assert_eq!(connector.endpoints(), vec![String::from("memory://one")]);
        block_on(async {
            assert!(
                ledger
                    .fetch_account(&account().public_key)
                    .await
                    .expect("lookup")
                    .is_some()
            );
        });
    }
}
