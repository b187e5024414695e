//! GraphQL ledger client
//!
//! One query is needed:
//! ```graphql
//! query Account($publicKey: PublicKey!) {
//!   account(publicKey: $publicKey) { publicKey nonce balance { total } }
//! }
//! ```
//! `data.account == null` means the account does not exist yet. Numbers come
//! back as strings.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use types::{Account, PublicKey};

use crate::{Connector, Ledger, LedgerError};

const ACCOUNT_QUERY: &str = "query Account($publicKey: PublicKey!) { account(publicKey: $publicKey) { publicKey nonce balance { total } } }";

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    public_key: &'a str,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<AccountData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct AccountData {
    account: Option<AccountNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountNode {
    public_key: PublicKey,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    nonce: u64,
    balance: Balance,
}

#[derive(Deserialize)]
struct Balance {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    total: u64,
}

/// Decode the body of an account query
pub fn parse_account_response(body: &str) -> Result<Option<Account>, LedgerError> {
    let response: GraphqlResponse = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        return Err(LedgerError::Graphql(
            response.errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    Ok(response
        .data
        .and_then(|data| data.account)
        .map(|node| Account {
            public_key: node.public_key,
            nonce: node.nonce,
            balance: node.balance.total,
        }))
}

/// Ledger client for one GraphQL endpoint
#[derive(Clone, Debug)]
pub struct GraphqlLedger {
    client: Client,
    endpoint: Url,
}

impl GraphqlLedger {
    /// Endpoint the client queries
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl Ledger for GraphqlLedger {
    async fn fetch_account(&self, key: &PublicKey) -> Result<Option<Account>, LedgerError> {
        log::debug!("querying account {key} at {}", self.endpoint);
        let request = GraphqlRequest {
            query: ACCOUNT_QUERY,
            variables: Variables {
                public_key: key.as_str(),
            },
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_account_response(&body)
    }
}

/// Opens [`GraphqlLedger`]s sharing one HTTP client
#[derive(Clone, Debug, Default)]
pub struct GraphqlConnector {
    client: Client,
}

impl Connector for GraphqlConnector {
    type Ledger = GraphqlLedger;

    fn connect(&self, endpoint: &str) -> Result<GraphqlLedger, LedgerError> {
        let url = Url::parse(endpoint).map_err(|e| LedgerError::InvalidEndpoint {
            endpoint: String::from(endpoint),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LedgerError::InvalidEndpoint {
                endpoint: String::from(endpoint),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }
        Ok(GraphqlLedger {
            client: self.client.clone(),
            endpoint: url,
        })
    }
}
