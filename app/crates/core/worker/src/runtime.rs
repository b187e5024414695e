//! The background runtime
//!
//! # Execution model
//! ```text
//! inbox ──▶ decode ──▶ execute (awaited to completion) ──▶ outbox
//!   ▲                                                        │
//!   └──────────────── next message only after ◀──────────────┘
//! ```
//! The loop never reads the next request while an operation is in flight, so
//! the session needs no synchronization of its own.

use ledger::Connector;
use prover::ProvingLibrary;
use serde_json::Value;
use types::{
    DecodeError, Duplex, Failure, FailureKind, OpResult, Operation, Request, Response,
};

use crate::ops;
use crate::session::Session;

/// Owns the proving library, the ledger connector and the session
pub struct Runtime<P, C: Connector> {
    library: P,
    connector: C,
    session: Session<C::Ledger>,
}

impl<P: ProvingLibrary, C: Connector> Runtime<P, C> {
    /// A runtime with a fresh session
    pub fn new(library: P, connector: C) -> Self {
        Self {
            library,
            connector,
            session: Session::new(),
        }
    }

    /// Current session state
    pub fn session(&self) -> &Session<C::Ledger> {
        &self.session
    }

    /// The proving library
    pub fn library(&self) -> &P {
        &self.library
    }

    /// Run one operation against the session
    pub async fn execute(&mut self, operation: Operation, args: Value) -> OpResult {
        log::debug!("running {operation}");
        let session = &mut self.session;
        let result = match operation {
            Operation::InitLibrary => ops::init_library(&mut self.library, session).await,
            Operation::SelectNetwork => ops::select_network(&self.connector, session, args),
            Operation::FetchAccount => ops::fetch_account(session, args).await,
            Operation::LoadContract => ops::load_contract(&self.library, session, args),
            Operation::CompileContract => {
                ops::compile_contract(&mut self.library, session, args).await
            }
            Operation::InitInstance => ops::init_instance(session, args),
            Operation::BuildHistoryUpdate => ops::build_history_update(session, args),
            Operation::BuildCreditCheck => ops::build_credit_check(session),
            Operation::ProveTransaction => ops::prove_transaction(&mut self.library, session).await,
            Operation::SerializeTransaction => ops::serialize_transaction(session),
        };
        if let Err(failure) = &result {
            if failure.kind == FailureKind::Precondition {
                log::error!("{operation} called out of order: {}", failure.detail);
            } else {
                log::warn!("{operation} failed: {failure}");
            }
        }
        OpResult::from(result)
    }

    /// Decode one request and answer it
    ///
    /// Returns `None` for messages without a readable id, which cannot be
    /// answered.
    pub async fn handle(&mut self, text: &str) -> Option<Response> {
        match Request::decode(text) {
            Ok(Request {
                id,
                operation,
                args,
            }) => Some(Response {
                id,
                result: self.execute(operation, args).await,
            }),
            Err(DecodeError::UnknownOperation { id, name }) => {
                log::warn!("request {id}: unknown operation `{name}`");
                Some(Response {
                    id,
                    result: OpResult::Failure(Failure::new(
                        FailureKind::UnknownOperation,
                        format!("unknown operation `{name}`"),
                    )),
                })
            }
            Err(e) => {
                log::warn!("discarding request: {e}");
                None
            }
        }
    }

    /// Serve requests until the orchestrator side goes away
    ///
    /// Hands the runtime back so that the final session can be inspected.
    pub async fn run(mut self, channel: Duplex) -> Self {
        let Duplex { outbox, mut inbox } = channel;
        while let Some(text) = inbox.recv().await {
            let Some(response) = self.handle(&text).await else {
                continue;
            };
            if let Err(e) = outbox.post(&response) {
                log::warn!("dropping response {}: {e}", response.id);
                break;
            }
        }
        log::debug!("worker channel closed");
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;
    use std::task::{Context, Poll};

    use async_trait::async_trait;
    use futures::executor::block_on;
    use ledger::memory::{MemoryConnector, MemoryLedger};
    use prover::{
        CompiledContract, ContractClass, ContractRegistry, DigestProver, ProverError, Transaction,
        VerificationKey,
    };
    use serde_json::json;
    use types::{Account, AccountStatus, CallId, channel};

    use super::*;

    const KEY: &str = "B62qnV6T4Q7FvXctSdV63nB4BEC3KiTd4jZtmzEeNzPaF4LPJ3r8RbY";

    fn runtime() -> Runtime<DigestProver, MemoryConnector> {
        Runtime::new(DigestProver::default(), MemoryConnector::default())
    }

    async fn ok(runtime: &mut Runtime<DigestProver, MemoryConnector>, op: Operation, args: Value) -> Value {
        runtime
            .execute(op, args)
            .await
            .into_result()
            .unwrap_or_else(|failure| panic!("{op} failed: {failure}"))
    }

    async fn ready_instance(runtime: &mut Runtime<DigestProver, MemoryConnector>) {
        ok(runtime, Operation::InitLibrary, Value::Null).await;
        ok(runtime, Operation::LoadContract, Value::Null).await;
        ok(runtime, Operation::CompileContract, Value::Null).await;
        ok(runtime, Operation::InitInstance, json!({"publicKey": KEY})).await;
    }

    /// Pending once, then ready
    struct YieldNow(bool);

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Library that records when each `ready` call starts and ends
    struct Recording {
        events: Rc<RefCell<Vec<String>>>,
        calls: usize,
    }

    #[async_trait(?Send)]
    impl ProvingLibrary for Recording {
        async fn ready(&mut self) -> Result<(), ProverError> {
            self.calls = self.calls.saturating_add(1);
            let call = self.calls;
            self.events.borrow_mut().push(format!("start {call}"));
            for _ in 0..3 {
                YieldNow(false).await;
            }
            self.events.borrow_mut().push(format!("end {call}"));
            Ok(())
        }

        fn resolve(&self, name: &str) -> Result<ContractClass, ProverError> {
            ContractRegistry::default().resolve(name)
        }

        async fn compile(&mut self, _: &ContractClass) -> Result<VerificationKey, ProverError> {
            Ok(VerificationKey(String::from("00")))
        }

        async fn prove(
            &mut self,
            _: &CompiledContract,
            _: &mut Transaction,
        ) -> Result<(), ProverError> {
            Ok(())
        }
    }

    #[test]
    fn operations_run_one_at_a_time() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let library = Recording {
            events: Rc::clone(&events),
            calls: 0,
        };
        let runtime = Runtime::new(library, MemoryConnector::default());
        let (orchestrator, worker) = channel::duplex();
        for id in 1..=3 {
            orchestrator
                .outbox
                .post(&json!({"id": id, "operation": "initLibrary"}))
                .expect("post");
        }
        let Duplex { outbox, mut inbox } = orchestrator;
        drop(outbox);

        block_on(runtime.run(worker));

        assert_eq!(
            *events.borrow(),
            vec!["start 1", "end 1", "start 2", "end 2", "start 3", "end 3"]
        );
        block_on(async {
            for id in 1..=3 {
                let text = inbox.recv().await.expect("response");
                let response = Response::decode(&text).expect("decode");
                assert_eq!(response.id, CallId::new(id));
                assert!(response.result.is_success());
            }
        });
    }

    #[test]
    fn init_instance_before_compile_is_a_precondition_failure() {
        let mut runtime = runtime();
        block_on(async {
            ok(&mut runtime, Operation::InitLibrary, Value::Null).await;
            ok(&mut runtime, Operation::LoadContract, Value::Null).await;
            let result = runtime
                .execute(Operation::InitInstance, json!({"publicKey": KEY}))
                .await;
            let failure = result.into_result().expect_err("not compiled");
            assert_eq!(failure.kind, FailureKind::Precondition);
        });
        assert!(runtime.session().instance().is_none());
        assert!(runtime.session().pending_transaction().is_none());
    }

    #[test]
    fn load_before_library_is_a_precondition_failure() {
        let mut runtime = runtime();
        let failure = block_on(runtime.execute(Operation::LoadContract, Value::Null))
            .into_result()
            .expect_err("library not ready");
        assert_eq!(failure.kind, FailureKind::Precondition);
    }

    #[test]
    fn second_build_replaces_the_pending_transaction() {
        let mut runtime = runtime();
        block_on(async {
            ready_instance(&mut runtime).await;
            ok(&mut runtime, Operation::BuildHistoryUpdate, Value::Null).await;
            ok(&mut runtime, Operation::BuildCreditCheck, Value::Null).await;
        });
        let pending = runtime.session().pending_transaction().expect("pending");
        assert_eq!(pending.account_updates.len(), 1);
        assert_eq!(pending.account_updates[0].method, "checkCredit");
    }

    #[test]
    fn prove_then_serialize() {
        let mut runtime = runtime();
        let text = block_on(async {
            ready_instance(&mut runtime).await;
            let proved = ok(&mut runtime, Operation::ProveTransaction, Value::Null).await;
            assert!(proved["proof"].is_string());
            ok(&mut runtime, Operation::SerializeTransaction, Value::Null).await
        });
        let text = text.as_str().expect("string");
        let transaction: Transaction = serde_json::from_str(text).expect("transaction json");
        assert!(transaction.is_proved());
        let session = runtime.session();
        assert!(session.pending_transaction().expect("pending").is_proved());
        let instance = session.instance().expect("instance");
        assert!(DigestProver::verify(instance.contract(), &transaction));
    }

    #[test]
    fn fetch_account_needs_a_network() {
        let ledger = MemoryLedger::new();
        let key = KEY.parse().expect("key");
        let mut runtime = Runtime::new(DigestProver::default(), MemoryConnector::new(ledger.clone()));
        block_on(async {
            let failure = runtime
                .execute(Operation::FetchAccount, json!({"publicKey": KEY}))
                .await
                .into_result()
                .expect_err("no network");
            assert_eq!(failure.kind, FailureKind::Precondition);

            runtime
                .execute(Operation::SelectNetwork, Value::Null)
                .await
                .into_result()
                .expect("select");
            let value = runtime
                .execute(Operation::FetchAccount, json!({"publicKey": KEY}))
                .await
                .into_result()
                .expect("fetch");
            let status: AccountStatus = serde_json::from_value(value).expect("status");
            assert!(!status.exists);

            ledger.fund(Account {
                public_key: key,
                nonce: 0,
                balance: 10,
            });
            let value = runtime
                .execute(Operation::FetchAccount, json!({"publicKey": KEY}))
                .await
                .into_result()
                .expect("fetch");
            let status: AccountStatus = serde_json::from_value(value).expect("status");
            assert!(status.exists);
        });
        assert_eq!(runtime.session().endpoint(), Some(ledger::DEFAULT_ENDPOINT));
    }

    #[test]
    fn ledger_errors_are_network_failures() {
        let ledger = MemoryLedger::new();
        ledger.fail_next("upstream down");
        let mut runtime = Runtime::new(DigestProver::default(), MemoryConnector::new(ledger));
        let failure = block_on(async {
            runtime.execute(Operation::SelectNetwork, Value::Null).await;
            runtime
                .execute(Operation::FetchAccount, json!({"publicKey": KEY}))
                .await
                .into_result()
                .expect_err("scripted failure")
        });
        assert_eq!(failure.kind, FailureKind::Network);
        assert!(failure.detail.contains("upstream down"));
    }

    #[test]
    fn unknown_operation_is_answered_and_malformed_is_dropped() {
        let mut runtime = runtime();
        block_on(async {
            let response = runtime
                .handle(r#"{"id": 7, "operation": "mintTokens"}"#)
                .await
                .expect("answered");
            assert_eq!(response.id, CallId::new(7));
            let failure = response.result.into_result().expect_err("unknown");
            assert_eq!(failure.kind, FailureKind::UnknownOperation);

            assert!(runtime.handle("not json").await.is_none());
            assert!(runtime.handle(r#"{"operation": "initLibrary"}"#).await.is_none());
        });
    }
}
