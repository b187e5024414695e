//! Message channel ports between the two execution contexts
//!
//! Messages are JSON text, as they would be after a structured copy across a
//! worker boundary, so each side decodes what it receives and can tell a
//! malformed message apart from a well-formed one. Each direction preserves
//! order; nothing orders one direction against the other.
//!
//! ```text
//! orchestrator                         worker
//!   Duplex.outbox  ──── requests ────▶  Duplex.inbox
//!   Duplex.inbox   ◀─── responses ────  Duplex.outbox
//! ```

use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::Serialize;
use thiserror::Error;

/// Errors raised when posting a message
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The receiving context is gone
    #[error("the peer execution context is gone")]
    Closed,
    /// The message could not be encoded as JSON
    #[error("message could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sending half of one direction
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: UnboundedSender<String>,
}

impl Outbox {
    /// Encode and post a message
    pub fn post<T: Serialize>(&self, message: &T) -> Result<(), ChannelError> {
        let text = serde_json::to_string(message)?;
        self.post_text(text)
    }

    /// Post already-encoded text
    pub fn post_text(&self, text: String) -> Result<(), ChannelError> {
        self.tx
            .unbounded_send(text)
            .map_err(|_| ChannelError::Closed)
    }

    /// Whether the receiving half has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of one direction
#[derive(Debug)]
pub struct Inbox {
    rx: UnboundedReceiver<String>,
}

impl Inbox {
    /// Wait for the next message; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.next().await
    }

    /// Stop accepting messages; already queued ones can still be received
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// One direction of the channel
pub fn unbounded() -> (Outbox, Inbox) {
    let (tx, rx) = mpsc::unbounded();
    (Outbox { tx }, Inbox { rx })
}

/// Both directions as seen from one context
#[derive(Debug)]
pub struct Duplex {
    /// Messages this context sends
    pub outbox: Outbox,
    /// Messages this context receives
    pub inbox: Inbox,
}

/// A connected pair of contexts: `(orchestrator side, worker side)`
pub fn duplex() -> (Duplex, Duplex) {
    let (to_worker, worker_inbox) = unbounded();
    let (to_orchestrator, orchestrator_inbox) = unbounded();
    (
        Duplex {
            outbox: to_worker,
            inbox: orchestrator_inbox,
        },
        Duplex {
            outbox: to_orchestrator,
            inbox: worker_inbox,
        },
    )
}
