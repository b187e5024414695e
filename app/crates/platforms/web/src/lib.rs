//! Browser platform glue
//!
//! Two wasm modules are built from this crate:
//! - the page module (this library), which runs the orchestrator, talks to
//!   the `window.mina` wallet and owns the worker;
//! - the worker module (`zkapp-worker` binary), which runs the background
//!   runtime inside a dedicated Web Worker.
//!
//! # Architecture
//! ```text
//! page                                              Web Worker
//! ZkApp ─▶ Orchestrator ─▶ WorkerClient             start_worker
//!                              │ Duplex                  │
//!                         spawn_worker ══ gloo-worker ══ SessionReactor ─▶ Runtime
//! BrowserWallet (window.mina)
//! ```
//!
//! Messages cross the boundary as JSON strings, exactly as they travel over
//! the in-process channel.
//!
//! Everything but [`Listeners`] is wasm32 only.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod bridge;
pub mod listeners;
#[cfg(target_arch = "wasm32")]
pub mod wallet;
#[cfg(target_arch = "wasm32")]
pub mod worker_entry;

#[cfg(target_arch = "wasm32")]
pub use app::ZkApp;
#[cfg(target_arch = "wasm32")]
pub use bridge::spawn_worker;
pub use listeners::Listeners;
#[cfg(target_arch = "wasm32")]
pub use wallet::BrowserWallet;
#[cfg(target_arch = "wasm32")]
pub use worker_entry::start_worker;

/// Panic hook and console logger, installed once per wasm module
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_log::init(wasm_log::Config::default());
}
