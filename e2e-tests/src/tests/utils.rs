//! Shared setup for end-to-end tests

use anyhow::Result;
use client::{ResponsePump, WorkerClient};
use ledger::memory::{MemoryConnector, MemoryLedger};
use prover::DigestProver;
use types::{Account, PublicKey};
use worker::{Runtime, WorkerThread};

/// Account the wallet hands out
pub const USER: &str = "B62qjrZB4CzmYs5H7ekw1rcUaMvhsTLPqBbiPKWJ8kH2QRBVAAT7qUF";

/// Address the contract is instantiated at
pub const CONTRACT: &str = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY";

/// Endpoint passed to `selectNetwork`; the memory connector records it
pub const ENDPOINT: &str = "http://127.0.0.1:3085/graphql";

/// Worker thread type used by every test
pub type TestWorker = WorkerThread<DigestProver, MemoryConnector>;

/// Parse one of the test addresses
pub fn key(address: &str) -> Result<PublicKey> {
    Ok(address.parse()?)
}

/// The user's account as the ledger will report it once funded
pub fn user_account() -> Result<Account> {
    Ok(Account {
        public_key: key(USER)?,
        nonce: 0,
        balance: 49_000_000_000,
    })
}

/// Start a worker thread over `ledger` and connect a proxy to it
///
/// The pump must be spawned on a `LocalSet` before any call can complete.
pub fn spawn_worker(
    ledger: &MemoryLedger,
) -> Result<(WorkerClient, ResponsePump, MemoryConnector, TestWorker)> {
    let connector = MemoryConnector::new(ledger.clone());
    let runtime = Runtime::new(DigestProver::default(), connector.clone());
    let (channel, thread) = worker::spawn(runtime)?;
    let (client, pump) = WorkerClient::connect(channel);
    Ok((client, pump, connector, thread))
}
