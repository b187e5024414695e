//! Proving/contract library seam
//!
//! The worker never talks to a proving system directly. It goes through
//! [`ProvingLibrary`], which covers the four things a session needs:
//! - waiting for the library to be ready
//! - resolving a contract class by name (the registry replaces late imports)
//! - compiling a class into a verification key
//! - proving a staged transaction in place
//!
//! # Architecture
//! ```text
//! ContractRegistry ──resolve──▶ ContractClass ──compile──▶ CompiledContract
//!                                                              │
//!                                  ContractInstance::new ◀─────┘
//!                                          │ call(method, args)
//!                                          ▼
//!                                     Transaction ──prove──▶ proved Transaction ──to_json──▶ String
//! ```
//!
//! [`DigestProver`] is the built-in backend. It derives keys and proofs as
//! SHA-256 digests, which is enough to run and test the whole pipeline; a real
//! proving backend plugs in behind the same trait.

pub mod contract;
pub mod digest;
pub mod error;
pub mod library;
pub mod transaction;

pub use contract::{
    CREDIT_HISTORY, CompiledContract, ContractClass, ContractInstance, ContractRegistry,
    MethodSpec, VerificationKey,
};
pub use digest::DigestProver;
pub use error::ProverError;
pub use library::ProvingLibrary;
pub use transaction::{AccountUpdate, Proof, Transaction};
