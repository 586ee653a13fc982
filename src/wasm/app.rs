//! WasmMintApp: `MintApp` exposed to JavaScript
//!
//! ```js
//! const app = new MintApp({ contractAddress: "0x...", defaultChainId: 1 }, web3Modal);
//! app.onChange((state) => render(state));
//! await app.restore();
//! await app.connect();
//! await app.mint("0xRecipient...", "ipfs://token");
//! ```

use super::log;
use super::modal::JsWalletModal;
use super::storage::LocalStorage;
use crate::app::MintApp;
use crate::config::AppConfig;
use crate::provider::ProviderGateway;
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(js_name = "MintApp")]
pub struct WasmMintApp {
    app: MintApp,
}

#[wasm_bindgen(js_class = "MintApp")]
impl WasmMintApp {
    /// `config` is an `AppConfig` object (camelCase); `null` takes the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, modal: JsValue) -> Result<WasmMintApp, JsValue> {
        let config: AppConfig = if config.is_null() || config.is_undefined() {
            AppConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let storage = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let modal = JsWalletModal::new(modal, config.receipt_poll_interval_ms);
        let gateway = ProviderGateway::new(&config, Rc::new(modal), Rc::new(storage));

        log!("[MintApp] contract {} on chain {}", config.contract_address, config.default_chain_id);
        Ok(Self { app: MintApp::new(&config, gateway) })
    }

    /// Reconnect silently when a cached session exists. Resolves to whether it did.
    pub async fn restore(&self) -> Result<bool, JsValue> {
        self.app.restore().await.map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub async fn connect(&self) -> Result<(), JsValue> {
        self.app.connect().await.map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn reset(&self) {
        self.app.reset();
    }

    /// Resolves to the receipt once the mint is confirmed.
    pub async fn mint(&self, address_to: String, uri: String) -> Result<JsValue, JsValue> {
        let receipt = self
            .app
            .mint(&address_to, &uri)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&receipt)
    }

    /// Mint with the current form fields.
    #[wasm_bindgen(js_name = "mintFromForm")]
    pub async fn mint_from_form(&self) -> Result<JsValue, JsValue> {
        let receipt = self
            .app
            .mint_from_form()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&receipt)
    }

    #[wasm_bindgen(js_name = "setAddressTo")]
    pub fn set_address_to(&self, value: String) {
        self.app.set_address_to(value);
    }

    #[wasm_bindgen(js_name = "setUri")]
    pub fn set_uri(&self, value: String) {
        self.app.set_uri(value);
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.app.snapshot())
    }

    /// Call `callback(state)` after every state change.
    #[wasm_bindgen(js_name = "onChange")]
    pub fn on_change(&self, callback: js_sys::Function) {
        let rx = self.app.watch();

        wasm_bindgen_futures::spawn_local(async move {
            use futures::StreamExt;
            let mut rx = rx;
            while let Some(snapshot) = rx.next().await {
                let Ok(value) = to_js(&snapshot) else { continue };
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log!("[MintApp] onChange callback error: {:?}", e);
                }
            }
        });
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| JsValue::from_str(&e.to_string()))
}
