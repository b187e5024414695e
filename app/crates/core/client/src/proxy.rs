//! The worker proxy and its response pump

use std::cell::RefCell;
use std::rc::Rc;

use prover::{ContractClass, Proof, VerificationKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use types::{
    AccountStatus, ChannelError, Duplex, Field, Inbox, Operation, Outbox, PublicKey, Request,
    Response, TopHistory, UpdateKind,
};

use crate::{CallError, PendingCalls};

/// Result of `compileContract`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledHandle {
    /// Name of the compiled class
    pub name: String,
    /// Key proofs will be checked against
    pub verification_key: VerificationKey,
}

#[derive(Deserialize)]
struct Proved {
    #[serde(default)]
    proof: Option<Proof>,
}

/// Orchestrator-side handle to the background runtime
///
/// Cheap to clone; clones share the pending call table. Must stay on the
/// context that runs the [`ResponsePump`].
#[derive(Clone, Debug)]
pub struct WorkerClient {
    outbox: Outbox,
    pending: Rc<RefCell<PendingCalls>>,
}

/// Reads worker responses and resolves the matching calls
///
/// Has to be driven (spawned on the local executor) for any call to complete.
#[derive(Debug)]
pub struct ResponsePump {
    inbox: Inbox,
    pending: Rc<RefCell<PendingCalls>>,
}

impl WorkerClient {
    /// Wrap the orchestrator side of a worker channel
    pub fn connect(channel: Duplex) -> (Self, ResponsePump) {
        let pending = Rc::new(RefCell::new(PendingCalls::new()));
        let Duplex { outbox, inbox } = channel;
        (
            Self {
                outbox,
                pending: Rc::clone(&pending),
            },
            ResponsePump { inbox, pending },
        )
    }

    /// Number of calls waiting for a response
    pub fn outstanding(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Send `operation` to the worker and wait for its result
    ///
    /// There is no timeout: the call resolves when the worker answers or
    /// fails with [`CallError::Disconnected`] when the worker goes away.
    pub async fn invoke(&self, operation: Operation, args: Value) -> Result<Value, CallError> {
        let (id, rx) = self.pending.borrow_mut().register()?;
        log::debug!("call {id}: {operation}");
        let request = Request {
            id,
            operation,
            args,
        };
        if let Err(e) = self.outbox.post(&request) {
            self.pending.borrow_mut().cancel(id);
            return Err(match e {
                ChannelError::Closed => CallError::Disconnected,
                ChannelError::Encode(e) => CallError::Encode(e),
            });
        }
        let result = rx.await.map_err(|_| CallError::Disconnected)?;
        result.into_result().map_err(CallError::Failed)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        args: Value,
    ) -> Result<T, CallError> {
        let value = self.invoke(operation, args).await?;
        serde_json::from_value(value).map_err(|source| CallError::Decode { operation, source })
    }

    async fn run(&self, operation: Operation, args: Value) -> Result<(), CallError> {
        self.invoke(operation, args).await.map(drop)
    }

    /// Wait for the proving library
    pub async fn init_library(&self) -> Result<(), CallError> {
        self.run(Operation::InitLibrary, Value::Null).await
    }

    /// Bind the worker to a network endpoint
    pub async fn select_network(&self, endpoint: &str) -> Result<(), CallError> {
        self.run(Operation::SelectNetwork, json!({ "endpoint": endpoint }))
            .await
    }

    /// Look up an account on the bound network
    pub async fn fetch_account(&self, key: &PublicKey) -> Result<AccountStatus, CallError> {
        self.call(Operation::FetchAccount, json!({ "publicKey": key }))
            .await
    }

    /// Load a contract class; `None` loads the default contract
    pub async fn load_contract(&self, name: Option<&str>) -> Result<ContractClass, CallError> {
        self.call(Operation::LoadContract, json!({ "name": name }))
            .await
    }

    /// Compile the loaded contract
    pub async fn compile_contract(&self, name: Option<&str>) -> Result<CompiledHandle, CallError> {
        self.call(Operation::CompileContract, json!({ "name": name }))
            .await
    }

    /// Instantiate the contract at `address` with the default initial state
    pub async fn init_instance(&self, address: &PublicKey) -> Result<(), CallError> {
        self.run(Operation::InitInstance, json!({ "publicKey": address }))
            .await
    }

    /// Instantiate the contract at `address` with an explicit initial state
    pub async fn init_instance_with(
        &self,
        address: &PublicKey,
        counter: Field,
        domain: Field,
    ) -> Result<(), CallError> {
        self.run(
            Operation::InitInstance,
            json!({ "publicKey": address, "counter": counter, "domain": domain }),
        )
        .await
    }

    /// Stage a top history update; `None` writes the default history
    pub async fn build_history_update(&self, top: Option<&TopHistory>) -> Result<(), CallError> {
        let top = top.map(|t| t.top.map(|entry| entry.history));
        self.run(Operation::BuildHistoryUpdate, json!({ "top": top }))
            .await
    }

    /// Stage a credit check
    pub async fn build_credit_check(&self) -> Result<(), CallError> {
        self.run(Operation::BuildCreditCheck, Value::Null).await
    }

    /// Stage the given kind of update with its default arguments
    pub async fn build_update(&self, kind: UpdateKind) -> Result<(), CallError> {
        match kind {
            UpdateKind::HistoryUpdate => self.build_history_update(None).await,
            UpdateKind::CreditCheck => self.build_credit_check().await,
        }
    }

    /// Prove the pending transaction
    pub async fn prove_transaction(&self) -> Result<Option<Proof>, CallError> {
        let proved: Proved = self.call(Operation::ProveTransaction, Value::Null).await?;
        Ok(proved.proof)
    }

    /// Serialize the pending transaction for the wallet
    pub async fn serialize_transaction(&self) -> Result<String, CallError> {
        self.call(Operation::SerializeTransaction, Value::Null)
            .await
    }
}

impl ResponsePump {
    /// Resolve calls until the worker side closes
    ///
    /// Malformed messages and responses nobody waits for are logged and
    /// dropped. When the channel closes every outstanding call is failed.
    pub async fn run(mut self) {
        while let Some(text) = self.inbox.recv().await {
            match Response::decode(&text) {
                Ok(response) => {
                    let id = response.id;
                    if !self.pending.borrow_mut().resolve(response) {
                        log::warn!("response {id} matches no outstanding call");
                    }
                }
                Err(e) => log::warn!("discarding worker message: {e}"),
            }
        }
        let outstanding = self.pending.borrow_mut().close();
        if outstanding > 0 {
            log::warn!("worker closed with {outstanding} calls outstanding");
        } else {
            log::debug!("worker channel closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::join;
    use types::{CallId, Failure, FailureKind, OpResult, channel};

    fn reply(outbox: &Outbox, id: CallId, value: Value) {
        outbox
            .post(&Response {
                id,
                result: OpResult::Success { value },
            })
            .expect("reply");
    }

    async fn next_request(inbox: &mut Inbox) -> Request {
        let text = inbox.recv().await.expect("request");
        Request::decode(&text).expect("decode")
    }

    #[test]
    fn reversed_responses_reach_the_right_callers() {
        let (orchestrator, worker) = channel::duplex();
        let (client, pump) = WorkerClient::connect(orchestrator);
        let Duplex {
            outbox,
            mut inbox,
        } = worker;

        let fake_worker = async move {
            let first = next_request(&mut inbox).await;
            let second = next_request(&mut inbox).await;
            assert_eq!(first.operation, Operation::SerializeTransaction);
            assert_eq!(second.operation, Operation::FetchAccount);
            assert!(second.id > first.id);

            reply(&outbox, second.id, json!({ "exists": false }));
            reply(&outbox, first.id, json!("tx-json"));
        };
        let key: PublicKey = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY"
            .parse()
            .expect("key");
        let calls = async {
            let results = join!(client.serialize_transaction(), client.fetch_account(&key));
            drop(client);
            results
        };

        let (_, (serialized, status), ()) = block_on(async { join!(pump.run(), calls, fake_worker) });
        assert_eq!(serialized.expect("serialize"), "tx-json");
        assert!(!status.expect("fetch").exists);
    }

    #[test]
    fn stray_and_malformed_messages_are_ignored() {
        let (orchestrator, worker) = channel::duplex();
        let (client, pump) = WorkerClient::connect(orchestrator);
        let Duplex {
            outbox,
            mut inbox,
        } = worker;

        let fake_worker = async move {
            let request = next_request(&mut inbox).await;
            outbox.post_text(String::from("{not json")).expect("post");
            reply(&outbox, CallId::new(request.id.get().saturating_add(40)), Value::Null);
            outbox
                .post(&Response {
                    id: request.id,
                    result: OpResult::Failure(Failure::precondition("no contract loaded")),
                })
                .expect("reply");
        };
        let call = async {
            let result = client.compile_contract(None).await;
            assert_eq!(client.outstanding(), 0);
            drop(client);
            result
        };

        let (_, result, ()) = block_on(async { join!(pump.run(), call, fake_worker) });
        let err = result.expect_err("worker reported failure");
        assert_eq!(err.failure_kind(), Some(FailureKind::Precondition));
    }

    #[test]
    fn closing_the_worker_disconnects_outstanding_calls() {
        let (orchestrator, worker) = channel::duplex();
        let (client, pump) = WorkerClient::connect(orchestrator);

        let fake_worker = async move {
            let Duplex { outbox, mut inbox } = worker;
            next_request(&mut inbox).await;
            drop(outbox);
        };
        let (_, result, ()) = block_on(async { join!(pump.run(), client.init_library(), fake_worker) });
        assert!(matches!(result, Err(CallError::Disconnected)));
        assert!(matches!(
            block_on(client.init_library()),
            Err(CallError::Disconnected)
        ));
    }

    #[test]
    fn unexpected_value_shape_is_a_decode_error() {
        let (orchestrator, worker) = channel::duplex();
        let (client, pump) = WorkerClient::connect(orchestrator);
        let Duplex {
            outbox,
            mut inbox,
        } = worker;

        let fake_worker = async move {
            let request = next_request(&mut inbox).await;
            reply(&outbox, request.id, json!(42));
        };
        let call = async {
            let result = client.serialize_transaction().await;
            drop(client);
            result
        };
        let (_, result, ()) = block_on(async { join!(pump.run(), call, fake_worker) });
        assert!(matches!(
            result,
            Err(CallError::Decode {
                operation: Operation::SerializeTransaction,
                ..
            })
        ));
    }
}
