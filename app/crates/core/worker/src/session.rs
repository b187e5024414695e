//! Session state owned by the runtime
//!
//! Created when the runtime starts, mutated only by operation handlers, dropped
//! with the runtime. The precondition accessors are how handlers enforce the
//! load → compile → init ordering: each returns a `precondition` failure when
//! the step it depends on has not happened.

use prover::{CompiledContract, ContractClass, ContractInstance, Transaction};
use types::Failure;

/// Where the contract class is in its lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContractSlot {
    /// Nothing loaded yet
    #[default]
    Empty,
    /// Resolved from the registry, not compiled
    Loaded(ContractClass),
    /// Compiled, ready to be instantiated
    Compiled(CompiledContract),
}

impl ContractSlot {
    /// Name of the class in the slot, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            ContractSlot::Empty => None,
            ContractSlot::Loaded(class) => Some(&class.name),
            ContractSlot::Compiled(compiled) => Some(&compiled.class.name),
        }
    }
}

/// A ledger client bound to the endpoint it was opened for
#[derive(Debug)]
struct Network<N> {
    endpoint: String,
    ledger: N,
}

/// Mutable state of one contract session
#[derive(Debug)]
pub struct Session<N> {
    library_ready: bool,
    network: Option<Network<N>>,
    contract: ContractSlot,
    instance: Option<ContractInstance>,
    transaction: Option<Transaction>,
}

impl<N> Default for Session<N> {
    fn default() -> Self {
        Self {
            library_ready: false,
            network: None,
            contract: ContractSlot::Empty,
            instance: None,
            transaction: None,
        }
    }
}

impl<N> Session<N> {
    /// A fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the proving library reported ready
    pub fn is_library_ready(&self) -> bool {
        self.library_ready
    }

    /// Endpoint of the bound network
    pub fn endpoint(&self) -> Option<&str> {
        self.network.as_ref().map(|n| n.endpoint.as_str())
    }

    /// The contract slot
    pub fn contract(&self) -> &ContractSlot {
        &self.contract
    }

    /// The live contract instance
    pub fn instance(&self) -> Option<&ContractInstance> {
        self.instance.as_ref()
    }

    /// The staged transaction
    pub fn pending_transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    pub(crate) fn mark_library_ready(&mut self) {
        self.library_ready = true;
    }

    pub(crate) fn bind_network(&mut self, endpoint: String, ledger: N) {
        if let Some(previous) = &self.network {
            log::info!("rebinding network {} -> {endpoint}", previous.endpoint);
        }
        self.network = Some(Network { endpoint, ledger });
    }

    /// Replace the contract; whatever was built on the old one goes with it
    pub(crate) fn set_contract(&mut self, slot: ContractSlot) {
        if matches!(slot, ContractSlot::Loaded(_)) {
            self.instance = None;
            self.transaction = None;
        }
        self.contract = slot;
    }

    pub(crate) fn set_instance(&mut self, instance: ContractInstance) {
        self.instance = Some(instance);
    }

    /// Stage `transaction`, replacing any pending one
    pub(crate) fn stage(&mut self, transaction: Transaction) {
        if self.transaction.is_some() {
            log::debug!("replacing pending transaction");
        }
        self.transaction = Some(transaction);
    }

    pub(crate) fn require_library(&self) -> Result<(), Failure> {
        if self.library_ready {
            Ok(())
        } else {
            Err(Failure::precondition("proving library not initialized"))
        }
    }

    pub(crate) fn ledger(&self) -> Result<&N, Failure> {
        self.network
            .as_ref()
            .map(|n| &n.ledger)
            .ok_or_else(|| Failure::precondition("no network selected"))
    }

    pub(crate) fn compiled(&self) -> Result<&CompiledContract, Failure> {
        match &self.contract {
            ContractSlot::Compiled(compiled) => Ok(compiled),
            ContractSlot::Loaded(class) => Err(Failure::precondition(format!(
                "contract `{}` loaded but not compiled",
                class.name
            ))),
            ContractSlot::Empty => Err(Failure::precondition("no contract loaded")),
        }
    }

    pub(crate) fn require_instance(&self) -> Result<&ContractInstance, Failure> {
        self.instance
            .as_ref()
            .ok_or_else(|| Failure::precondition("contract instance not initialized"))
    }

    pub(crate) fn require_transaction(&self) -> Result<&Transaction, Failure> {
        self.transaction
            .as_ref()
            .ok_or_else(|| Failure::precondition("no pending transaction"))
    }

    /// The pending transaction together with the contract it is proved against
    pub(crate) fn proving_parts(
        &mut self,
    ) -> Result<(&CompiledContract, &mut Transaction), Failure> {
        let transaction = self
            .transaction
            .as_mut()
            .ok_or_else(|| Failure::precondition("no pending transaction"))?;
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| Failure::precondition("contract instance not initialized"))?;
        Ok((instance.contract(), transaction))
    }
}
