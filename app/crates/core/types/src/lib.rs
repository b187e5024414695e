//! Shared types for the zkApp worker session
//!
//! Everything that crosses the boundary between the orchestrating context and
//! the proving worker lives here:
//! - the request/response envelope and the closed operation catalog
//! - the tagged operation result
//! - account addresses and the value records passed to contract methods
//! - the message channel ports both contexts talk through

pub mod account;
pub mod channel;
pub mod protocol;
pub mod values;

pub use account::{Account, AccountStatus, PublicKey, PublicKeyError};
pub use channel::{ChannelError, Duplex, Inbox, Outbox};
pub use protocol::{
    CallId, DecodeError, Failure, FailureKind, OpResult, Operation, Request, Response,
    UnknownOperation, UpdateKind,
};
pub use values::{Field, History, TopHistory};
