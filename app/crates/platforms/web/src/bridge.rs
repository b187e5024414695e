//! Page side of the worker boundary

use futures::{SinkExt, StreamExt};
use gloo_worker::Spawnable;
use types::{Duplex, channel};
use wasm_bindgen_futures::spawn_local;

use crate::worker_entry::SessionReactor;

/// Start the worker script at `script_url` and expose it as Message Channel ports
///
/// # Returns
/// The orchestrator side of the channel, ready for
/// [`client::WorkerClient::connect`]. The worker lives as long as the page.
pub fn spawn_worker(script_url: &str) -> Duplex {
    let bridge = SessionReactor::spawner().spawn(script_url);
    let (mut to_worker, mut from_worker) = bridge.split();

    let (orchestrator, worker_side) = channel::duplex();
    let Duplex {
        outbox: responses,
        inbox: mut requests,
    } = worker_side;

    spawn_local(async move {
        while let Some(text) = requests.recv().await {
            if to_worker.send(text).await.is_err() {
                log::error!("worker is gone; dropping request");
                break;
            }
        }
    });
    spawn_local(async move {
        while let Some(text) = from_worker.next().await {
            if responses.post_text(text).is_err() {
                log::warn!("worker response arrived after the proxy went away");
                break;
            }
        }
    });

    log::debug!("worker {script_url} started");
    orchestrator
}
