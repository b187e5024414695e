//! Worker side of the boundary

use futures::{SinkExt, StreamExt, join};
use gloo_worker::Registrable;
use gloo_worker::reactor::{ReactorScope, reactor};
use ledger::GraphqlConnector;
use prover::DigestProver;
use types::{Duplex, channel};
use worker::Runtime;

/// One background runtime per connected page, fed with channel text
#[reactor]
pub(crate) async fn SessionReactor(scope: ReactorScope<String, String>) {
    let runtime = Runtime::new(DigestProver::default(), GraphqlConnector::default());
    let (page, worker_side) = channel::duplex();
    let Duplex {
        outbox: requests,
        inbox: mut responses,
    } = page;
    let (mut to_page, mut from_page) = scope.split();

    let inbound = async move {
        while let Some(text) = from_page.next().await {
            if requests.post_text(text).is_err() {
                log::warn!("runtime stopped; dropping request");
                break;
            }
        }
    };
    let outbound = async move {
        while let Some(text) = responses.recv().await {
            if to_page.send(text).await.is_err() {
                log::warn!("page went away; dropping response");
                break;
            }
        }
    };

    log::info!("worker runtime started");
    join!(runtime.run(worker_side), inbound, outbound);
    log::info!("worker runtime stopped");
}

/// Register the session runtime in the current dedicated worker
///
/// Called from the `zkapp-worker` binary; each page that spawns the worker
/// gets its own runtime.
pub fn start_worker() {
    SessionReactor::registrar().register();
}
