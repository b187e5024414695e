//! The lifecycle orchestrator
//!
//! Sequences worker calls, wallet calls and the funding poll, and keeps the
//! [`LifecycleState`] the presentation layer renders. The state is only ever
//! changed here; every change is pushed to subscribers as a snapshot.

use client::{CallError, WorkerClient};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use types::PublicKey;

use crate::{
    Config, FeePayer, LifecycleState, Phase, SendTransaction, SetupError, Sleep, SubmitError,
    Timer, Wallet, WalletError, resume_after_miss,
};

fn setup_step(phase: Phase) -> impl FnOnce(CallError) -> SetupError {
    move |source| SetupError::Worker { phase, source }
}

fn submit_step(phase: Phase) -> impl FnOnce(CallError) -> SubmitError {
    move |source| SubmitError::Worker { phase, source }
}

fn parse_address(address: &str) -> Result<PublicKey, SetupError> {
    address
        .parse()
        .map_err(|source| SetupError::InvalidAddress {
            address: String::from(address),
            source,
        })
}

/// Drives one user's session from library loading to submitted updates
pub struct Orchestrator<W, S = Timer> {
    client: WorkerClient,
    wallet: Option<W>,
    sleeper: S,
    config: Config,
    state: LifecycleState,
    watchers: Vec<UnboundedSender<LifecycleState>>,
}

impl<W: Wallet, S: Sleep> Orchestrator<W, S> {
    /// Build an orchestrator; `wallet` is `None` when no wallet is installed
    pub fn new(client: WorkerClient, wallet: Option<W>, sleeper: S, config: Config) -> Self {
        Self {
            client,
            wallet,
            sleeper,
            config,
            state: LifecycleState::default(),
            watchers: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stream of state snapshots, starting with the current one
    pub fn subscribe(&mut self) -> UnboundedReceiver<LifecycleState> {
        let (tx, rx) = mpsc::unbounded();
        if tx.unbounded_send(self.state.clone()).is_ok() {
            self.watchers.push(tx);
        }
        rx
    }

    fn update(&mut self, change: impl FnOnce(&mut LifecycleState)) {
        change(&mut self.state);
        let snapshot = &self.state;
        self.watchers
            .retain(|watcher| watcher.unbounded_send(snapshot.clone()).is_ok());
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("{phase}");
        self.update(|state| state.phase = phase);
    }

    async fn send(&self, transaction: String) -> Result<String, WalletError> {
        let wallet = self.wallet.as_ref().ok_or(WalletError::Missing)?;
        let request = SendTransaction {
            transaction,
            fee_payer: FeePayer {
                fee: self.config.transaction.fee,
                memo: self.config.transaction.memo.clone(),
            },
        };
        Ok(wallet.send_transaction(&request).await?.hash)
    }

    /// Run setup up to [`Phase::Ready`], or [`Phase::NoWallet`] when there
    /// is no wallet
    ///
    /// On failure the phase stays where it failed and the error text is
    /// recorded in [`LifecycleState::setup_error`]. There is no retry.
    pub async fn setup(&mut self) -> Result<(), SetupError> {
        if self.state.phase != Phase::Uninitialized {
            return Err(SetupError::AlreadyStarted(self.state.phase));
        }
        let result = self.run_setup().await;
        if let Err(e) = &result {
            log::error!("setup stopped while {}: {e}", self.state.phase);
            let message = e.to_string();
            self.update(|state| state.setup_error = Some(message));
        }
        result
    }

    async fn run_setup(&mut self) -> Result<(), SetupError> {
        self.enter(Phase::LibraryLoading);
        self.client
            .init_library()
            .await
            .map_err(setup_step(Phase::LibraryLoading))?;
        self.client
            .select_network(&self.config.network.endpoint)
            .await
            .map_err(setup_step(Phase::LibraryLoading))?;

        self.enter(Phase::WalletCheck);
        let Some(wallet) = &self.wallet else {
            log::info!("no wallet found");
            self.update(|state| {
                state.has_wallet = Some(false);
                state.phase = Phase::NoWallet;
            });
            return Ok(());
        };
        let accounts = wallet.request_accounts().await?;
        let first = accounts.first().ok_or(SetupError::NoAccounts)?;
        let public_key = parse_address(first)?;
        log::info!("using account {public_key}");
        let key = public_key.clone();
        self.update(|state| {
            state.has_wallet = Some(true);
            state.public_key = Some(key);
        });

        self.enter(Phase::AccountCheck);
        let status = self
            .client
            .fetch_account(&public_key)
            .await
            .map_err(setup_step(Phase::AccountCheck))?;
        if !status.exists {
            self.enter(Phase::WaitingForFunding);
            resume_after_miss(
                &self.client,
                &self.sleeper,
                &public_key,
                self.config.poll_policy(),
            )
            .await?;
        }
        self.update(|state| {
            state.account_exists = true;
            state.phase = Phase::AccountExists;
        });

        let name = self.config.contract.name.clone();
        self.enter(Phase::ContractLoading);
        self.client
            .load_contract(Some(&name))
            .await
            .map_err(setup_step(Phase::ContractLoading))?;

        self.enter(Phase::ContractCompiling);
        let compiled = self
            .client
            .compile_contract(Some(&name))
            .await
            .map_err(setup_step(Phase::ContractCompiling))?;
        log::info!("compiled {}", compiled.name);

        self.enter(Phase::InstanceInit);
        let address = parse_address(&self.config.contract.address)?;
        self.client
            .init_instance(&address)
            .await
            .map_err(setup_step(Phase::InstanceInit))?;
        let contract = address.clone();
        self.update(|state| state.contract_public_key = Some(contract));

        self.enter(Phase::ProvingInit);
        self.client
            .prove_transaction()
            .await
            .map_err(setup_step(Phase::ProvingInit))?;
        if self.config.transaction.submit_initialization {
            let transaction = self
                .client
                .serialize_transaction()
                .await
                .map_err(setup_step(Phase::ProvingInit))?;
            let hash = self.send(transaction).await?;
            log::info!(
                "initialization sent: {}",
                self.config.transaction_link(&hash)
            );
            self.update(|state| state.last_transaction_hash = Some(hash));
            self.client
                .fetch_account(&address)
                .await
                .map_err(setup_step(Phase::ProvingInit))?;
        }

        self.update(|state| {
            state.has_been_setup = true;
            state.phase = Phase::Ready;
        });
        log::info!("setup complete");
        Ok(())
    }

    /// Build, prove and send the configured update
    ///
    /// Only accepted in [`Phase::Ready`]. Whatever happens, the orchestrator
    /// is back in [`Phase::Ready`] afterwards.
    ///
    /// # Returns
    /// The transaction hash reported by the wallet.
    pub async fn submit_update(&mut self) -> Result<String, SubmitError> {
        let phase = self.state.phase;
        let Some(public_key) = self.state.public_key.clone().filter(|_| phase == Phase::Ready)
        else {
            return Err(SubmitError::NotReady(phase));
        };
        self.update(|state| state.creating_transaction = true);

        match self.run_submit(&public_key).await {
            Ok(hash) => {
                log::info!("transaction sent: {}", self.config.transaction_link(&hash));
                let recorded = hash.clone();
                self.update(|state| {
                    state.last_transaction_hash = Some(recorded);
                    state.phase = Phase::Submitted;
                });
                self.update(|state| {
                    state.creating_transaction = false;
                    state.phase = Phase::Ready;
                });
                Ok(hash)
            }
            Err(e) => {
                log::error!("submission failed while {}: {e}", self.state.phase);
                self.update(|state| {
                    state.creating_transaction = false;
                    state.phase = Phase::Ready;
                });
                Err(e)
            }
        }
    }

    async fn run_submit(&mut self, public_key: &PublicKey) -> Result<String, SubmitError> {
        self.enter(Phase::BuildingTx);
        self.client
            .fetch_account(public_key)
            .await
            .map_err(submit_step(Phase::BuildingTx))?;
        self.client
            .build_update(self.config.transaction.update)
            .await
            .map_err(submit_step(Phase::BuildingTx))?;

        self.enter(Phase::ProvingTx);
        self.client
            .prove_transaction()
            .await
            .map_err(submit_step(Phase::ProvingTx))?;

        self.enter(Phase::Submitting);
        let transaction = self
            .client
            .serialize_transaction()
            .await
            .map_err(submit_step(Phase::Submitting))?;
        Ok(self.send(transaction).await?)
    }
}
