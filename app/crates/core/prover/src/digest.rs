//! Digest-based proving backend
//!
//! Keys and proofs are SHA-256 digests with domain separation:
//!
//! ```text
//! verification key = SHA-256("vk"    || class name || (method name || arity)*)
//! proof            = SHA-256("proof" || verification key || address || method || args*)
//! ```
//!
//! This gives every stage of the pipeline a deterministic, checkable output
//! without a circuit backend. It proves nothing about execution.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{
    AccountUpdate, CompiledContract, ContractClass, ContractRegistry, Proof, ProverError,
    ProvingLibrary, Transaction, VerificationKey,
};

const VK_DOMAIN: &[u8] = b"vk";
const PROOF_DOMAIN: &[u8] = b"proof";

/// Proving backend built on SHA-256
#[derive(Clone, Debug, Default)]
pub struct DigestProver {
    registry: ContractRegistry,
    ready: bool,
}

impl DigestProver {
    /// Backend resolving classes from `registry`
    pub fn new(registry: ContractRegistry) -> Self {
        Self {
            registry,
            ready: false,
        }
    }

    /// Check that every account update carries the proof this backend would produce
    pub fn verify(contract: &CompiledContract, transaction: &Transaction) -> bool {
        transaction.is_proved()
            && transaction.account_updates.iter().all(|update| {
                update.proof.as_ref() == Some(&statement_proof(&contract.verification_key, update))
            })
    }

    fn ensure_ready(&self) -> Result<(), ProverError> {
        if self.ready {
            Ok(())
        } else {
            Err(ProverError::NotReady)
        }
    }
}

/// Verification key for a class
fn class_key(class: &ContractClass) -> VerificationKey {
    let mut hasher = Sha256::new();
    hasher.update(VK_DOMAIN);
    hasher.update(class.name.as_bytes());
    for method in &class.methods {
        hasher.update(method.name.as_bytes());
        hasher.update(method.arity.to_le_bytes());
    }
    VerificationKey(hex::encode(hasher.finalize()))
}

/// Proof for one account update under a verification key
fn statement_proof(key: &VerificationKey, update: &AccountUpdate) -> Proof {
    let mut hasher = Sha256::new();
    hasher.update(PROOF_DOMAIN);
    hasher.update(key.0.as_bytes());
    hasher.update(update.address.as_str().as_bytes());
    hasher.update(update.method.as_bytes());
    for arg in &update.args {
        hasher.update(arg.value().to_le_bytes());
    }
    Proof(hex::encode(hasher.finalize()))
}

#[async_trait(?Send)]
impl ProvingLibrary for DigestProver {
    async fn ready(&mut self) -> Result<(), ProverError> {
        self.ready = true;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<ContractClass, ProverError> {
        self.ensure_ready()?;
        self.registry.resolve(name)
    }

    async fn compile(&mut self, class: &ContractClass) -> Result<VerificationKey, ProverError> {
        self.ensure_ready()?;
        let key = class_key(class);
        log::debug!("compiled {} -> vk {}", class.name, key.0);
        Ok(key)
    }

    async fn prove(
        &mut self,
        contract: &CompiledContract,
        transaction: &mut Transaction,
    ) -> Result<(), ProverError> {
        self.ensure_ready()?;
        for update in &mut transaction.account_updates {
            if update.contract != contract.class.name {
                return Err(ProverError::ContractMismatch {
                    expected: contract.class.name.clone(),
                    actual: update.contract.clone(),
                });
            }
            update.proof = Some(statement_proof(&contract.verification_key, update));
        }
        Ok(())
    }
}
