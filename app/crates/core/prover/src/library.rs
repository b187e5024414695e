//! The proving library interface

use async_trait::async_trait;

use crate::{CompiledContract, ContractClass, ProverError, Transaction, VerificationKey};

/// Everything the worker needs from a proving/contract library
///
/// Futures are not required to be `Send`: the library lives inside the
/// worker's single execution context and is never shared.
#[async_trait(?Send)]
pub trait ProvingLibrary {
    /// Wait until the library can be used
    async fn ready(&mut self) -> Result<(), ProverError>;

    /// Resolve a contract class by name
    fn resolve(&self, name: &str) -> Result<ContractClass, ProverError>;

    /// Compile a class, returning its verification key
    async fn compile(&mut self, class: &ContractClass) -> Result<VerificationKey, ProverError>;

    /// Prove every account update of `transaction` in place
    async fn prove(
        &mut self,
        contract: &CompiledContract,
        transaction: &mut Transaction,
    ) -> Result<(), ProverError>;
}
