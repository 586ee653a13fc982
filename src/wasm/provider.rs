//! Eip1193Provider: a JS provider object (`window.ethereum`, WalletConnect
//! provider, ...) behind `WalletProvider`.
//!
//! Calls go through `provider.request({ method, params })`. Rejections carrying
//! `{ code, message }` map to `ProviderError::Rejected`.

use super::{js_get, js_message, js_method, log};
use crate::contract::{TransactionReceipt, TransactionRequest};
use crate::core::keys::rpc as methods;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::rpc::{parse_hash, parse_quantity, parse_receipt, string_list};
use crate::provider::{EventKind, EventSink, EventSource, ListenerId, ProviderEvent, ProviderEvents, WalletProvider};
use alloy_primitives::TxHash;
use async_trait::async_trait;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

type Accounts = Rc<RefCell<Vec<String>>>;

pub struct Eip1193Provider {
    inner: JsValue,
    accounts: Accounts,
    events: Option<Rc<JsEventSource>>,
    poll_interval_ms: i32,
}

impl Eip1193Provider {
    /// Wrap `inner` and load its authorized accounts.
    pub async fn connect(inner: JsValue, poll_interval_ms: u64) -> ProviderResult<Self> {
        let provider = Self::wrap(inner, poll_interval_ms);
        if provider.accounts.borrow().is_empty() {
            let listed = provider.request(methods::ACCOUNTS, js_sys::Array::new().into()).await?;
            *provider.accounts.borrow_mut() = js_strings(&listed);
        }
        Ok(provider)
    }

    pub fn wrap(inner: JsValue, poll_interval_ms: u64) -> Self {
        let accounts: Accounts = Rc::new(RefCell::new(js_strings(&js_get(&inner, "accounts"))));
        let events = js_method(&inner, "on")
            .map(|_| Rc::new(JsEventSource::new(inner.clone(), accounts.clone())));
        Self {
            inner,
            accounts,
            events,
            poll_interval_ms: i32::try_from(poll_interval_ms).unwrap_or(i32::MAX),
        }
    }

    async fn request(&self, method: &str, params: JsValue) -> ProviderResult<JsValue> {
        let request = js_method(&self.inner, "request").ok_or(ProviderError::Unsupported("request"))?;

        let args = js_sys::Object::new();
        js_sys::Reflect::set(&args, &"method".into(), &JsValue::from_str(method))
            .map_err(|e| ProviderError::Rpc(js_message(&e)))?;
        js_sys::Reflect::set(&args, &"params".into(), &params)
            .map_err(|e| ProviderError::Rpc(js_message(&e)))?;

        let result = request.call1(&self.inner, &args).map_err(|e| rejection(&e))?;
        if result.has_type::<js_sys::Promise>() {
            let promise = result.unchecked_into::<js_sys::Promise>();
            JsFuture::from(promise).await.map_err(|e| rejection(&e))
        } else {
            Ok(result)
        }
    }

    async fn sleep(&self) {
        let delay = self.poll_interval_ms;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}

#[async_trait(?Send)]
impl WalletProvider for Eip1193Provider {
    fn selected_address(&self) -> Option<String> {
        js_get(&self.inner, "selectedAddress").as_string()
    }

    fn accounts(&self) -> Vec<String> {
        self.accounts.borrow().clone()
    }

    fn events(&self) -> ProviderEvents {
        match &self.events {
            Some(source) => ProviderEvents::Capable(source.clone()),
            None => ProviderEvents::Incapable,
        }
    }

    async fn chain_id(&self) -> ProviderResult<u64> {
        let value = self.request(methods::CHAIN_ID, js_sys::Array::new().into()).await?;
        js_quantity(&value)
            .ok_or_else(|| ProviderError::InvalidResponse(format!("chain id {:?}", value)))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> ProviderResult<TxHash> {
        let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
        let params = [request]
            .serialize(&serializer)
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;
        let hash = self.request(methods::SEND_TRANSACTION, params).await?;
        let hash = hash
            .as_string()
            .ok_or_else(|| ProviderError::InvalidResponse(format!("transaction hash {:?}", hash)))?;
        parse_hash(&hash)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ProviderResult<TransactionReceipt> {
        let params: JsValue = js_sys::Array::of1(&JsValue::from_str(&hash.to_string())).into();
        loop {
            let raw = self.request(methods::TRANSACTION_RECEIPT, params.clone()).await?;
            let value: serde_json::Value = if raw.is_null() || raw.is_undefined() {
                serde_json::Value::Null
            } else {
                serde_wasm_bindgen::from_value(raw).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?
            };
            if let Some(receipt) = parse_receipt(&value)? {
                return Ok(receipt);
            }
            self.sleep().await;
        }
    }
}

/// Listener registry over the provider's `on` / `removeListener`.
pub struct JsEventSource {
    target: JsValue,
    accounts: Accounts,
    listeners: RefCell<HashMap<u64, Listener>>,
    next_id: Cell<u64>,
}

struct Listener {
    kind: EventKind,
    // Taken on unsubscribe so the pump sees its stream end.
    sink: Rc<RefCell<Option<EventSink>>>,
    callback: Closure<dyn FnMut(JsValue)>,
}

impl JsEventSource {
    fn new(target: JsValue, accounts: Accounts) -> Self {
        Self { target, accounts, listeners: RefCell::new(HashMap::new()), next_id: Cell::new(1) }
    }
}

impl EventSource for JsEventSource {
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> ListenerId {
        let sink = Rc::new(RefCell::new(Some(sink)));
        let slot = sink.clone();
        let accounts = self.accounts.clone();

        let callback = Closure::wrap(Box::new(move |payload: JsValue| {
            let event = match kind {
                EventKind::AccountsChanged => {
                    let list = js_strings(&payload);
                    *accounts.borrow_mut() = list.clone();
                    ProviderEvent::AccountsChanged(list)
                }
                EventKind::NetworkChanged => ProviderEvent::NetworkChanged(js_quantity(&payload).unwrap_or_default()),
                EventKind::Closed => ProviderEvent::Closed,
            };
            if let Some(sink) = slot.borrow().as_ref() {
                let _ = sink.unbounded_send(event);
            }
        }) as Box<dyn FnMut(JsValue)>);

        if let Some(on) = js_method(&self.target, "on") {
            if let Err(e) = on.call2(&self.target, &JsValue::from_str(kind.as_str()), callback.as_ref()) {
                log!("[Eip1193Provider] on({}) failed: {}", kind.as_str(), js_message(&e));
            }
        }

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().insert(id, Listener { kind, sink, callback });
        ListenerId(id)
    }

    fn unsubscribe(&self, kind: EventKind, listener: ListenerId) {
        let Some(entry) = self.listeners.borrow_mut().remove(&listener.0) else {
            return;
        };
        debug_assert_eq!(entry.kind, kind);
        entry.sink.borrow_mut().take();

        let off = js_method(&self.target, "removeListener").or_else(|| js_method(&self.target, "off"));
        match off {
            Some(off) => {
                let _ = off.call2(&self.target, &JsValue::from_str(kind.as_str()), entry.callback.as_ref());
            }
            // The provider keeps calling it; with the sink gone it is inert.
            None => entry.callback.forget(),
        }
    }
}

fn js_strings(value: &JsValue) -> Vec<String> {
    serde_wasm_bindgen::from_value::<serde_json::Value>(value.clone())
        .map(|list| string_list(&list))
        .unwrap_or_default()
}

fn js_quantity(value: &JsValue) -> Option<u64> {
    value
        .as_string()
        .and_then(|s| parse_quantity(&s))
        .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
}

fn rejection(err: &JsValue) -> ProviderError {
    let message = js_message(err);
    match js_get(err, "code").as_f64() {
        Some(code) => ProviderError::Rejected { code: code as i64, message },
        None => ProviderError::Rpc(message),
    }
}
