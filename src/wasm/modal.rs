//! JsWalletModal: a web3modal-style JS object behind `WalletModal`.
//!
//! Expected surface:
//! - `connect()` → `Promise<provider>`, prompts the user
//! - `connectTo(id)` → `Promise<provider>`, optional, reconnects a known connector
//! - `cachedProvider` → connector id chosen by the last `connect()`, optional

use super::provider::Eip1193Provider;
use super::{js_get, js_message, js_method, log};
use crate::config::{ConnectorBackend, ProviderOptions};
use crate::error::ConnectError;
use crate::provider::{SelectedProvider, WalletModal};
use async_trait::async_trait;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// EIP-1193 "user rejected request"
const USER_REJECTED: f64 = 4001.0;

pub struct JsWalletModal {
    modal: JsValue,
    receipt_poll_interval_ms: u64,
}

impl JsWalletModal {
    pub fn new(modal: JsValue, receipt_poll_interval_ms: u64) -> Self {
        Self { modal, receipt_poll_interval_ms }
    }

    async fn open(&self, cached: Option<ConnectorBackend>) -> Result<JsValue, ConnectError> {
        let call = match (cached, js_method(&self.modal, "connectTo")) {
            (Some(backend), Some(connect_to)) => {
                connect_to.call1(&self.modal, &JsValue::from_str(backend.as_str()))
            }
            _ => {
                let connect = js_method(&self.modal, "connect")
                    .ok_or_else(|| ConnectError::Failed("modal has no connect()".into()))?;
                connect.call0(&self.modal)
            }
        };
        let result = call.map_err(|e| dismissal(&e))?;
        if result.has_type::<js_sys::Promise>() {
            JsFuture::from(result.unchecked_into::<js_sys::Promise>())
                .await
                .map_err(|e| dismissal(&e))
        } else {
            Ok(result)
        }
    }
}

#[async_trait(?Send)]
impl WalletModal for JsWalletModal {
    async fn select(
        &self,
        options: &ProviderOptions,
        cached: Option<ConnectorBackend>,
    ) -> Result<SelectedProvider, ConnectError> {
        let raw = self.open(cached.filter(|b| options.supports(*b))).await?;
        if raw.is_null() || raw.is_undefined() {
            return Err(ConnectError::UserCancelled);
        }

        let backend = js_get(&self.modal, "cachedProvider")
            .as_string()
            .and_then(|id| ConnectorBackend::from_str(&id))
            .or(cached)
            .unwrap_or(ConnectorBackend::Injected);

        let relay_session = if backend.is_relay() {
            serde_wasm_bindgen::from_value::<serde_json::Value>(js_get(&raw, "session"))
                .ok()
                .filter(|v| !v.is_null())
        } else {
            None
        };

        let provider = Eip1193Provider::connect(raw, self.receipt_poll_interval_ms)
            .await
            .map_err(|e| ConnectError::Failed(e.to_string()))?;
        log!("[MintApp] connected via {}", backend.as_str());

        Ok(SelectedProvider { backend, provider: Rc::new(provider), relay_session })
    }
}

/// Closing the modal or rejecting the wallet prompt is a cancellation.
fn dismissal(err: &JsValue) -> ConnectError {
    let message = js_message(err);
    let rejected = js_get(err, "code").as_f64() == Some(USER_REJECTED);
    if rejected || message.to_ascii_lowercase().contains("closed by user") {
        ConnectError::UserCancelled
    } else {
        ConnectError::Failed(message)
    }
}
