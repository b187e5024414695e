//! Waiting for an account to be funded
//!
//! A cooperative loop: check, and if the account is still missing, sleep and
//! check again. Only "not found" is retried; any other failure ends the wait.
//! Dropping the future stops the loop.

use std::time::Duration;

use async_trait::async_trait;
use client::{CallError, WorkerClient};
use thiserror::Error;
use types::PublicKey;

/// How the funding poll behaves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two checks
    pub interval: Duration,
    /// Give up after this many checks; `None` polls forever
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: None,
        }
    }
}

/// Funding poll errors
#[derive(Debug, Error)]
pub enum PollError {
    /// A check failed for a reason other than "not found"
    #[error("account check failed: {0}")]
    Lookup(#[from] CallError),
    /// The account was still missing after the allowed number of checks
    #[error("account still not funded after {attempts} checks")]
    GaveUp {
        /// Checks made
        attempts: u32,
    },
}

/// Answers whether an account exists
#[async_trait(?Send)]
pub trait AccountLookup {
    /// `Ok(false)` means the account is not there yet
    async fn account_exists(&self, key: &PublicKey) -> Result<bool, CallError>;
}

#[async_trait(?Send)]
impl AccountLookup for WorkerClient {
    async fn account_exists(&self, key: &PublicKey) -> Result<bool, CallError> {
        Ok(self.fetch_account(key).await?.exists)
    }
}

/// Check `key` until it exists, sleeping `policy.interval` between checks
///
/// # Returns
/// The number of checks made, including the successful one.
pub async fn wait_until_funded<P, S>(
    lookup: &P,
    sleeper: &S,
    key: &PublicKey,
    policy: PollPolicy,
) -> Result<u32, PollError>
where
    P: AccountLookup + ?Sized,
    S: crate::Sleep + ?Sized,
{
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        if lookup.account_exists(key).await? {
            log::info!("account {key} funded after {attempts} checks");
            return Ok(attempts);
        }
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(PollError::GaveUp { attempts });
        }
        log::debug!(
            "account {key} not funded yet, checking again in {}s",
            policy.interval.as_secs()
        );
        sleeper.sleep(policy.interval).await;
    }
}

/// Keep checking `key` after a check that already found it missing
///
/// Sleeps before the first check here, so every check after the missed one
/// is preceded by exactly one sleep.
///
/// # Returns
/// The number of checks made, not counting the missed one.
pub async fn resume_after_miss<P, S>(
    lookup: &P,
    sleeper: &S,
    key: &PublicKey,
    policy: PollPolicy,
) -> Result<u32, PollError>
where
    P: AccountLookup + ?Sized,
    S: crate::Sleep + ?Sized,
{
    log::debug!(
        "account {key} not funded yet, checking again in {}s",
        policy.interval.as_secs()
    );
    sleeper.sleep(policy.interval).await;
    wait_until_funded(lookup, sleeper, key, policy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSleep;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use types::{Failure, FailureKind};

    const KEY: &str = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY";

    /// Answers from a script, then panics if asked again
    struct Scripted {
        answers: RefCell<VecDeque<Result<bool, CallError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<bool, CallError>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    #[async_trait(?Send)]
    impl AccountLookup for Scripted {
        async fn account_exists(&self, _: &PublicKey) -> Result<bool, CallError> {
            let mut calls = self.calls.borrow_mut();
            *calls = calls.saturating_add(1);
            self.answers
                .borrow_mut()
                .pop_front()
                .expect("lookup called more often than scripted")
        }
    }

    fn key() -> PublicKey {
        KEY.parse().expect("key")
    }

    #[test]
    fn sleeps_between_misses_only() {
        let lookup = Scripted::new(vec![Ok(false), Ok(false), Ok(false), Ok(true)]);
        let sleeper = RecordingSleep::default();
        let policy = PollPolicy::default();

        let attempts =
            block_on(wait_until_funded(&lookup, &sleeper, &key(), policy)).expect("funded");

        assert_eq!(attempts, 4);
        assert_eq!(lookup.calls(), 4);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(5); 3]);
    }

    #[test]
    fn funded_on_first_check_never_sleeps() {
        let lookup = Scripted::new(vec![Ok(true)]);
        let sleeper = RecordingSleep::default();
        block_on(wait_until_funded(&lookup, &sleeper, &key(), PollPolicy::default()))
            .expect("funded");
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn other_failures_stop_the_poll() {
        let lookup = Scripted::new(vec![
            Ok(false),
            Err(CallError::Failed(Failure::new(FailureKind::Network, "502"))),
        ]);
        let sleeper = RecordingSleep::default();
        let err = block_on(wait_until_funded(&lookup, &sleeper, &key(), PollPolicy::default()))
            .expect_err("network failure");
        assert!(matches!(err, PollError::Lookup(CallError::Failed(_))));
        assert_eq!(lookup.calls(), 2);
        assert_eq!(sleeper.sleeps().len(), 1);
    }

    #[test]
    fn attempt_cap_is_honoured() {
        let lookup = Scripted::new(vec![Ok(false), Ok(false)]);
        let sleeper = RecordingSleep::default();
        let policy = PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: Some(2),
        };
        let err = block_on(wait_until_funded(&lookup, &sleeper, &key(), policy))
            .expect_err("gave up");
        assert!(matches!(err, PollError::GaveUp { attempts: 2 }));
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn resuming_sleeps_before_every_check() {
        let lookup = Scripted::new(vec![Ok(false), Ok(false), Ok(true)]);
        let sleeper = RecordingSleep::default();

        let checks = block_on(resume_after_miss(
            &lookup,
            &sleeper,
            &key(),
            PollPolicy::default(),
        ))
        .expect("funded");

        assert_eq!(checks, 3);
        assert_eq!(lookup.calls(), 3);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(5); 3]);
    }
}
