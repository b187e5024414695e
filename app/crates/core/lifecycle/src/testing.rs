//! Test doubles for the wallet and the timer

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{SendTransaction, SentTransaction, Sleep, Wallet, WalletError};

#[derive(Debug, Default)]
struct WalletScript {
    accounts: Vec<String>,
    sent: Vec<SendTransaction>,
    rejections: Vec<String>,
}

/// Wallet that hands out fixed accounts and records what it is asked to send
///
/// Clones share the script.
#[derive(Clone, Debug, Default)]
pub struct ScriptedWallet {
    inner: Rc<RefCell<WalletScript>>,
}

impl ScriptedWallet {
    /// A wallet exposing `accounts`
    pub fn with_accounts(accounts: &[&str]) -> Self {
        let wallet = Self::default();
        wallet.inner.borrow_mut().accounts = accounts.iter().map(|a| String::from(*a)).collect();
        wallet
    }

    /// Reject the next send with `reason`
    pub fn reject_next_send(&self, reason: &str) {
        self.inner.borrow_mut().rejections.push(String::from(reason));
    }

    /// Every accepted send, in order
    pub fn sent(&self) -> Vec<SendTransaction> {
        self.inner.borrow().sent.clone()
    }
}

#[async_trait(?Send)]
impl Wallet for ScriptedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        Ok(self.inner.borrow().accounts.clone())
    }

    async fn send_transaction(
        &self,
        request: &SendTransaction,
    ) -> Result<SentTransaction, WalletError> {
        let mut script = self.inner.borrow_mut();
        if !script.rejections.is_empty() {
            return Err(WalletError::Rejected(script.rejections.remove(0)));
        }
        script.sent.push(request.clone());
        Ok(SentTransaction {
            hash: format!("5Jtx{:04}", script.sent.len()),
        })
    }
}

/// Sleeper that records each requested duration and returns at once
#[derive(Clone, Debug, Default)]
pub struct RecordingSleep {
    sleeps: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleep {
    /// Every requested duration, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Sleep for RecordingSleep {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
