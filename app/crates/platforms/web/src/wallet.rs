//! `window.mina` wallet adapter

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect};
use lifecycle::{SendTransaction, SentTransaction, Wallet, WalletError};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// The browser extension wallet injected as `window.mina`
pub struct BrowserWallet {
    provider: JsValue,
}

impl BrowserWallet {
    /// The injected wallet, or `None` when no extension is installed
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let provider = Reflect::get(&window, &JsValue::from_str("mina")).ok()?;
        if provider.is_undefined() || provider.is_null() {
            return None;
        }
        Some(Self { provider })
    }

    async fn call(&self, method: &str, arg: Option<JsValue>) -> Result<JsValue, WalletError> {
        let function: Function = Reflect::get(&self.provider, &JsValue::from_str(method))
            .map_err(|e| WalletError::Malformed(describe(&e)))?
            .dyn_into()
            .map_err(|_| WalletError::Malformed(format!("`mina.{method}` is not a function")))?;
        let returned = match arg {
            Some(arg) => function.call1(&self.provider, &arg),
            None => function.call0(&self.provider),
        }
        .map_err(|e| WalletError::Rejected(describe(&e)))?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| WalletError::Rejected(describe(&e)))
    }
}

#[async_trait(?Send)]
impl Wallet for BrowserWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let accounts = self.call("requestAccounts", None).await?;
        if !Array::is_array(&accounts) {
            return Err(WalletError::Malformed(String::from(
                "requestAccounts did not return an array",
            )));
        }
        Array::from(&accounts)
            .iter()
            .map(|account| {
                account
                    .as_string()
                    .ok_or_else(|| WalletError::Malformed(String::from("account is not a string")))
            })
            .collect()
    }

    async fn send_transaction(
        &self,
        request: &SendTransaction,
    ) -> Result<SentTransaction, WalletError> {
        let arg = serde_wasm_bindgen::to_value(request)
            .map_err(|e| WalletError::Malformed(e.to_string()))?;
        let receipt = self.call("sendTransaction", Some(arg)).await?;
        let hash = Reflect::get(&receipt, &JsValue::from_str("hash"))
            .ok()
            .and_then(|hash| hash.as_string())
            .ok_or_else(|| WalletError::Malformed(String::from("receipt has no hash")))?;
        Ok(SentTransaction { hash })
    }
}
