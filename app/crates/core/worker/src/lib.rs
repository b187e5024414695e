//! Background runtime
//!
//! Holds the session of one contract (library readiness, bound network,
//! contract class, instance and pending transaction) and executes catalog
//! operations against it, one at a time, in arrival order.
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────── Runtime ─────────────────────────────┐
//! │  ProvingLibrary      Connector ──▶ Ledger                        │
//! │        │                              │                          │
//! │        └──────── ops::* handlers ─────┘                          │
//! │                        │ &mut                                    │
//! │                     Session                                      │
//! └──────────────────────────────────────────────────────────────────┘
//!          ▲ Request (JSON text)           │ Response (JSON text)
//!          └──────── Message Channel ◀─────┘
//! ```
//!
//! On native targets [`spawn`] puts the runtime on its own thread. In the
//! browser the web platform crate runs it inside a dedicated Web Worker.

mod ops;
pub mod runtime;
pub mod session;
#[cfg(not(target_arch = "wasm32"))]
pub mod thread;

pub use ops::{DEFAULT_TOP_HISTORY, INITIAL_COUNTER, INITIAL_DOMAIN};
pub use runtime::Runtime;
pub use session::{ContractSlot, Session};
#[cfg(not(target_arch = "wasm32"))]
pub use thread::{WorkerError, WorkerThread, spawn};
