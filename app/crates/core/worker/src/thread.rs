//! Native execution context: the runtime on its own OS thread

use std::thread::{self, JoinHandle};

use ledger::Connector;
use prover::ProvingLibrary;
use thiserror::Error;
use types::{Duplex, channel};

use crate::Runtime;

/// Errors starting or joining the worker thread
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The OS refused to start the thread
    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker thread panicked
    #[error("worker thread panicked")]
    Panicked,
}

/// Handle to a runtime running on a dedicated thread
pub struct WorkerThread<P, C: Connector> {
    handle: JoinHandle<Runtime<P, C>>,
}

impl<P, C: Connector> WorkerThread<P, C> {
    /// Wait for the runtime to stop and take it back
    ///
    /// The runtime stops once every orchestrator-side sender is dropped.
    pub fn join(self) -> Result<Runtime<P, C>, WorkerError> {
        self.handle.join().map_err(|_| WorkerError::Panicked)
    }
}

/// Start `runtime` on a new thread
///
/// # Returns
/// The orchestrator side of the channel and a handle to the thread.
pub fn spawn<P, C>(runtime: Runtime<P, C>) -> Result<(Duplex, WorkerThread<P, C>), WorkerError>
where
    P: ProvingLibrary + Send + 'static,
    C: Connector + Send + 'static,
    C::Ledger: Send + 'static,
{
    let (orchestrator, worker) = channel::duplex();
    let handle = thread::Builder::new()
        .name(String::from("zkapp-worker"))
        .spawn(move || futures::executor::block_on(runtime.run(worker)))?;
    log::debug!("worker thread started");
    Ok((orchestrator, WorkerThread { handle }))
}
