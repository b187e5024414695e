//! Contract classes, the class registry, compiled contracts and instances

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use types::{Field, PublicKey};

use crate::{AccountUpdate, ProverError, Transaction};

/// Name of the built-in credit history contract
pub const CREDIT_HISTORY: &str = "CreditHistory";

/// Signature of one contract method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    /// Method name
    pub name: String,
    /// Number of field elements the method takes
    pub arity: usize,
}

impl MethodSpec {
    /// Build a method signature
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: String::from(name),
            arity,
        }
    }
}

/// A contract class definition, before compilation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractClass {
    /// Class name, also the registry key
    pub name: String,
    /// Callable methods
    pub methods: Vec<MethodSpec>,
}

impl ContractClass {
    /// Build a class definition
    pub fn new(name: &str, methods: Vec<MethodSpec>) -> Self {
        Self {
            name: String::from(name),
            methods,
        }
    }

    /// The credit history contract
    ///
    /// - `initState(counter, domain)`
    /// - `setTopHistory(top)` where `top` flattens to four fields
    /// - `checkCredit()`
    pub fn credit_history() -> Self {
        Self::new(
            CREDIT_HISTORY,
            vec![
                MethodSpec::new("initState", 2),
                MethodSpec::new("setTopHistory", 4),
                MethodSpec::new("checkCredit", 0),
            ],
        )
    }

    /// Look up a method by name
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Contract classes known to the worker, keyed by name
#[derive(Clone, Debug)]
pub struct ContractRegistry {
    classes: BTreeMap<String, ContractClass>,
}

impl ContractRegistry {
    /// A registry with no classes
    pub fn empty() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    /// Add or replace a class
    pub fn register(&mut self, class: ContractClass) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Look up a class by name
    pub fn resolve(&self, name: &str) -> Result<ContractClass, ProverError> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| ProverError::UnknownContract(String::from(name)))
    }

    /// Names of every registered class
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }
}

impl Default for ContractRegistry {
    /// Registry holding the built-in credit history contract
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ContractClass::credit_history());
        registry
    }
}

/// Verification key produced by compilation, hex encoded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationKey(pub String);

/// A class together with the artifacts of its compilation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    /// The compiled class
    pub class: ContractClass,
    /// Key proofs are checked against
    pub verification_key: VerificationKey,
}

/// A contract deployed at an address
///
/// Only a [`CompiledContract`] can be instantiated, so an instance always
/// carries the key its transactions will be proved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractInstance {
    address: PublicKey,
    contract: CompiledContract,
}

impl ContractInstance {
    /// Bind a compiled contract to an address
    pub fn new(address: PublicKey, contract: &CompiledContract) -> Self {
        Self {
            address,
            contract: contract.clone(),
        }
    }

    /// Address the instance is bound to
    pub fn address(&self) -> &PublicKey {
        &self.address
    }

    /// The compiled contract behind the instance
    pub fn contract(&self) -> &CompiledContract {
        &self.contract
    }

    /// Stage an unproved transaction that invokes `method` with `args`
    pub fn call(&self, method: &str, args: Vec<Field>) -> Result<Transaction, ProverError> {
        let class = &self.contract.class;
        let spec = class
            .method(method)
            .ok_or_else(|| ProverError::UnknownMethod {
                contract: class.name.clone(),
                method: String::from(method),
            })?;
        if spec.arity != args.len() {
            return Err(ProverError::Arity {
                method: String::from(method),
                expected: spec.arity,
                actual: args.len(),
            });
        }
        Ok(Transaction::new(vec![AccountUpdate {
            address: self.address.clone(),
            contract: class.name.clone(),
            method: String::from(method),
            args,
            proof: None,
        }]))
    }
}
