//! Operation handlers
//!
//! One function per catalog entry. Each decodes its arguments, checks the
//! session preconditions it needs, and returns the JSON value carried back in
//! the response. `null` arguments decode as `{}`.

use ledger::{Connector, Ledger};
use prover::{CompiledContract, ContractInstance, ProverError, ProvingLibrary};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use types::{AccountStatus, Failure, FailureKind, Field, History, Operation, PublicKey, TopHistory};

use crate::session::{ContractSlot, Session};

/// Counter value the instance is initialized with when none is given
pub const INITIAL_COUNTER: u64 = 22;
/// Domain value the instance is initialized with when none is given
pub const INITIAL_DOMAIN: u64 = 100;
/// Top history written by a history update when none is given
pub const DEFAULT_TOP_HISTORY: TopHistory = TopHistory {
    top: [History::new(34, 100), History::new(88, 100)],
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectNetworkArgs {
    #[serde(default = "default_endpoint")]
    endpoint: String,
}

fn default_endpoint() -> String {
    String::from(ledger::DEFAULT_ENDPOINT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchAccountArgs {
    public_key: PublicKey,
}

#[derive(Deserialize)]
struct ContractArgs {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitInstanceArgs {
    public_key: PublicKey,
    #[serde(default = "default_counter")]
    counter: Field,
    #[serde(default = "default_domain")]
    domain: Field,
}

fn default_counter() -> Field {
    Field::new(INITIAL_COUNTER)
}

fn default_domain() -> Field {
    Field::new(INITIAL_DOMAIN)
}

#[derive(Deserialize)]
struct HistoryUpdateArgs {
    #[serde(default)]
    top: Option<[[Field; 2]; 2]>,
}

impl HistoryUpdateArgs {
    fn top(&self) -> TopHistory {
        match self.top {
            Some([first, second]) => TopHistory {
                top: [History { history: first }, History { history: second }],
            },
            None => DEFAULT_TOP_HISTORY,
        }
    }
}

fn parse<T: DeserializeOwned>(operation: Operation, args: Value) -> Result<T, Failure> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(args)
        .map_err(|e| Failure::new(FailureKind::InvalidArguments, format!("{operation}: {e}")))
}

fn library_failure(e: ProverError) -> Failure {
    match e {
        ProverError::Serialization(e) => Failure::new(FailureKind::Serialization, e.to_string()),
        other => Failure::new(FailureKind::Library, other.to_string()),
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, Failure> {
    serde_json::to_value(value).map_err(|e| Failure::new(FailureKind::Serialization, e.to_string()))
}

pub(crate) async fn init_library<P: ProvingLibrary, N>(
    library: &mut P,
    session: &mut Session<N>,
) -> Result<Value, Failure> {
    library.ready().await.map_err(library_failure)?;
    session.mark_library_ready();
    Ok(Value::Null)
}

pub(crate) fn select_network<C: Connector>(
    connector: &C,
    session: &mut Session<C::Ledger>,
    args: Value,
) -> Result<Value, Failure> {
    let SelectNetworkArgs { endpoint } = parse(Operation::SelectNetwork, args)?;
    let ledger = connector
        .connect(&endpoint)
        .map_err(|e| Failure::new(FailureKind::Network, e.to_string()))?;
    session.bind_network(endpoint, ledger);
    Ok(Value::Null)
}

pub(crate) async fn fetch_account<N: Ledger>(
    session: &Session<N>,
    args: Value,
) -> Result<Value, Failure> {
    let FetchAccountArgs { public_key } = parse(Operation::FetchAccount, args)?;
    let account = session
        .ledger()?
        .fetch_account(&public_key)
        .await
        .map_err(|e| Failure::new(FailureKind::Network, e.to_string()))?;
    log::debug!(
        "account {public_key} {}",
        if account.is_some() { "found" } else { "not found" }
    );
    encode(&AccountStatus::from(account))
}

pub(crate) fn load_contract<P: ProvingLibrary, N>(
    library: &P,
    session: &mut Session<N>,
    args: Value,
) -> Result<Value, Failure> {
    let ContractArgs { name } = parse(Operation::LoadContract, args)?;
    session.require_library()?;
    let name = name.unwrap_or_else(|| String::from(prover::CREDIT_HISTORY));
    let class = library.resolve(&name).map_err(library_failure)?;
    let handle = encode(&class)?;
    session.set_contract(ContractSlot::Loaded(class));
    Ok(handle)
}

pub(crate) async fn compile_contract<P: ProvingLibrary, N>(
    library: &mut P,
    session: &mut Session<N>,
    args: Value,
) -> Result<Value, Failure> {
    let ContractArgs { name } = parse(Operation::CompileContract, args)?;
    let loaded = session.contract().name().map(String::from);
    match (&name, &loaded) {
        (_, None) => return Err(Failure::precondition("no contract loaded")),
        (Some(wanted), Some(loaded)) if wanted != loaded => {
            return Err(Failure::precondition(format!(
                "contract `{wanted}` is not loaded (loaded: `{loaded}`)"
            )));
        }
        _ => {}
    }

    let compiled = match session.contract().clone() {
        ContractSlot::Compiled(compiled) => {
            log::debug!("contract `{}` already compiled", compiled.class.name);
            compiled
        }
        ContractSlot::Loaded(class) => {
            let verification_key = library.compile(&class).await.map_err(library_failure)?;
            let compiled = CompiledContract {
                class,
                verification_key,
            };
            session.set_contract(ContractSlot::Compiled(compiled.clone()));
            compiled
        }
        ContractSlot::Empty => return Err(Failure::precondition("no contract loaded")),
    };
    Ok(json!({
        "name": compiled.class.name,
        "verificationKey": compiled.verification_key,
    }))
}

pub(crate) fn init_instance<N>(session: &mut Session<N>, args: Value) -> Result<Value, Failure> {
    let InitInstanceArgs {
        public_key,
        counter,
        domain,
    } = parse(Operation::InitInstance, args)?;
    let compiled = session.compiled()?;
    let instance = match session.instance() {
        Some(existing)
            if existing.address() == &public_key && existing.contract() == compiled =>
        {
            existing.clone()
        }
        _ => ContractInstance::new(public_key, compiled),
    };
    let transaction = instance
        .call("initState", vec![counter, domain])
        .map_err(library_failure)?;
    session.set_instance(instance);
    session.stage(transaction);
    Ok(Value::Null)
}

pub(crate) fn build_history_update<N>(
    session: &mut Session<N>,
    args: Value,
) -> Result<Value, Failure> {
    let args: HistoryUpdateArgs = parse(Operation::BuildHistoryUpdate, args)?;
    let transaction = session
        .require_instance()?
        .call("setTopHistory", args.top().to_fields().to_vec())
        .map_err(library_failure)?;
    session.stage(transaction);
    Ok(Value::Null)
}

pub(crate) fn build_credit_check<N>(session: &mut Session<N>) -> Result<Value, Failure> {
    let transaction = session
        .require_instance()?
        .call("checkCredit", Vec::new())
        .map_err(library_failure)?;
    session.stage(transaction);
    Ok(Value::Null)
}

pub(crate) async fn prove_transaction<P: ProvingLibrary, N>(
    library: &mut P,
    session: &mut Session<N>,
) -> Result<Value, Failure> {
    let (contract, transaction) = session.proving_parts()?;
    library
        .prove(contract, transaction)
        .await
        .map_err(library_failure)?;
    let proof = transaction
        .account_updates
        .first()
        .and_then(|update| update.proof.clone());
    Ok(json!({ "proof": proof }))
}

pub(crate) fn serialize_transaction<N>(session: &Session<N>) -> Result<Value, Failure> {
    let text = session
        .require_transaction()?
        .to_json()
        .map_err(library_failure)?;
    Ok(Value::String(text))
}
