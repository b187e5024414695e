//! Pending call table

use std::collections::HashMap;

use futures::channel::oneshot;
use types::{CallId, OpResult, Response};

use crate::CallError;

/// Outstanding calls keyed by their identifier
///
/// Identifiers are minted here, strictly increasing from [`CallId::FIRST`]
/// and never reused. An entry lives from the moment its request is posted
/// until the matching response arrives or the worker goes away.
#[derive(Debug)]
pub struct PendingCalls {
    next: Option<CallId>,
    calls: HashMap<CallId, oneshot::Sender<OpResult>>,
    closed: bool,
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self {
            next: Some(CallId::FIRST),
            calls: HashMap::new(),
            closed: false,
        }
    }
}

impl PendingCalls {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next identifier and register a call under it
    pub fn register(&mut self) -> Result<(CallId, oneshot::Receiver<OpResult>), CallError> {
        if self.closed {
            return Err(CallError::Disconnected);
        }
        let id = self.next.ok_or(CallError::Exhausted)?;
        self.next = id.next();
        let (tx, rx) = oneshot::channel();
        self.calls.insert(id, tx);
        Ok((id, rx))
    }

    /// Forget a call whose request never left
    pub fn cancel(&mut self, id: CallId) {
        self.calls.remove(&id);
    }

    /// Hand a response to its caller
    ///
    /// Returns `false` when no call is waiting under the response's id.
    pub fn resolve(&mut self, response: Response) -> bool {
        let Some(tx) = self.calls.remove(&response.id) else {
            return false;
        };
        if tx.send(response.result).is_err() {
            log::debug!("caller of {} stopped waiting", response.id);
        }
        true
    }

    /// Drop every outstanding call and refuse new ones
    ///
    /// Returns how many calls were outstanding. Their callers see
    /// [`CallError::Disconnected`].
    pub fn close(&mut self) -> usize {
        self.closed = true;
        let outstanding = self.calls.len();
        self.calls.clear();
        outstanding
    }

    /// Number of outstanding calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call is outstanding
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}
