//! Worker proxy
//!
//! Turns the fire-and-forget Message Channel into awaitable calls. Every
//! call gets a fresh [`types::CallId`]; the [`ResponsePump`] matches responses
//! back to callers by id only, so responses may arrive in any order.
//!
//! # Architecture
//! ```text
//! caller ──invoke──▶ PendingCalls.register ──▶ Outbox ──▶ worker
//!    ▲                                                      │
//!    └── oneshot ◀── PendingCalls.resolve ◀── ResponsePump ◀┘
//! ```
//!
//! Everything lives on the orchestrating context (`Rc<RefCell<_>>`), so the
//! futures here are not `Send`.

pub mod error;
pub mod pending;
pub mod proxy;

pub use error::CallError;
pub use pending::PendingCalls;
pub use proxy::{CompiledHandle, ResponsePump, WorkerClient};
