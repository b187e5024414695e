//! The page-side application object handed to JavaScript

use std::cell::RefCell;
use std::rc::Rc;

use client::WorkerClient;
use futures::StreamExt;
use futures::lock::Mutex;
use js_sys::{Function, Promise};
use lifecycle::{Config, LifecycleState, Orchestrator};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::{BrowserWallet, Listeners, spawn_worker};

/// A running zkApp session: worker, proxy and orchestrator
#[wasm_bindgen]
pub struct ZkApp {
    orchestrator: Rc<Mutex<Orchestrator<BrowserWallet>>>,
    latest: Rc<RefCell<LifecycleState>>,
    listeners: Listeners<Function>,
    config: Config,
}

#[wasm_bindgen]
impl ZkApp {
    /// Start the worker at `worker_url` with the given TOML configuration
    ///
    /// Setup is not started; call `setup()`.
    pub fn launch(worker_url: &str, config: &str) -> Result<ZkApp, JsError> {
        let config = Config::from_toml_str(config).map_err(|e| JsError::new(&e.to_string()))?;
        let channel = spawn_worker(worker_url);
        let (client, pump) = WorkerClient::connect(channel);
        spawn_local(pump.run());

        let wallet = BrowserWallet::detect();
        let mut orchestrator =
            Orchestrator::new(client, wallet, lifecycle::Timer, config.clone());
        let mut updates = orchestrator.subscribe();

        let latest = Rc::new(RefCell::new(orchestrator.state().clone()));
        let listeners: Listeners<Function> = Listeners::default();
        {
            let latest = Rc::clone(&latest);
            let listeners = listeners.clone();
            spawn_local(async move {
                while let Some(state) = updates.next().await {
                    let value = serde_wasm_bindgen::to_value(&state);
                    *latest.borrow_mut() = state;
                    let Ok(value) = value else { continue };
                    listeners.notify(|listener| {
                        if let Err(e) = listener.call1(&JsValue::NULL, &value) {
                            log::warn!("state listener threw: {e:?}");
                        }
                    });
                }
            });
        }

        Ok(ZkApp {
            orchestrator: Rc::new(Mutex::new(orchestrator)),
            latest,
            listeners,
            config,
        })
    }

    /// Latest lifecycle state as a plain object
    pub fn state(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&*self.latest.borrow()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Call `listener(state)` on every state change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, listener: Function) {
        self.listeners.add(listener);
    }

    /// Run setup; resolves once `Ready` (or `NoWallet`) is reached
    pub fn setup(&self) -> Promise {
        let orchestrator = Rc::clone(&self.orchestrator);
        future_to_promise(async move {
            let mut orchestrator = orchestrator.lock().await;
            orchestrator
                .setup()
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| JsValue::from(JsError::new(&e.to_string())))
        })
    }

    /// Build, prove and send one update; resolves to the transaction hash
    #[wasm_bindgen(js_name = submitUpdate)]
    pub fn submit_update(&self) -> Promise {
        let orchestrator = Rc::clone(&self.orchestrator);
        future_to_promise(async move {
            let mut orchestrator = orchestrator.lock().await;
            orchestrator
                .submit_update()
                .await
                .map(|hash| JsValue::from_str(&hash))
                .map_err(|e| JsValue::from(JsError::new(&e.to_string())))
        })
    }

    /// Explorer link for a transaction hash
    #[wasm_bindgen(js_name = transactionLink)]
    pub fn transaction_link(&self, hash: &str) -> String {
        self.config.transaction_link(hash)
    }
}
