//! Shared fixtures: scripted wallet provider, scripted modal, wiring helpers

#![allow(dead_code)]

use alloy_primitives::{address, Address, TxHash};
use async_trait::async_trait;
use futures::channel::oneshot;
use nft_minter::{
    AppConfig, ConnectError, ConnectorBackend, EventKind, EventSink, EventSource, ListenerId,
    MemoryStorage, Minter, ProviderError, ProviderEvent, ProviderEvents, ProviderGateway,
    ProviderOptions, SelectedProvider, SessionController, SessionStore, TransactionReceipt,
    TransactionRequest, WalletModal, WalletProvider,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub const CONTRACT: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
pub const RECIPIENT: &str = "0x0000000000000000000000000000000000000DEF";
pub const TX_HASH: TxHash = TxHash::with_last_byte(0x42);

/// Listener registry standing in for the provider's `on` / `removeListener`
#[derive(Default)]
pub struct MockEvents {
    listeners: RefCell<HashMap<u64, (EventKind, EventSink)>>,
    next_id: Cell<u64>,
}

impl MockEvents {
    /// Deliver `event` to every listener of its kind.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        let kind = event.kind();
        self.listeners
            .borrow()
            .values()
            .filter(|(k, _)| *k == kind)
            .filter(|(_, sink)| sink.unbounded_send(event.clone()).is_ok())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl EventSource for MockEvents {
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> ListenerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().insert(id, (kind, sink));
        ListenerId(id)
    }

    fn unsubscribe(&self, _kind: EventKind, listener: ListenerId) {
        self.listeners.borrow_mut().remove(&listener.0);
    }
}

/// Scripted wallet provider
pub struct MockProvider {
    accounts: RefCell<Vec<String>>,
    chain: Cell<u64>,
    chain_unavailable: Cell<bool>,
    events: Option<Rc<MockEvents>>,
    send_error: RefCell<Option<ProviderError>>,
    receipt_status: Cell<bool>,
    held_receipt: RefCell<Option<oneshot::Receiver<bool>>>,
    sent: RefCell<Vec<TransactionRequest>>,
}

impl MockProvider {
    pub fn new(account: &str, chain_id: u64) -> Self {
        Self {
            accounts: RefCell::new(vec![account.to_string()]),
            chain: Cell::new(chain_id),
            chain_unavailable: Cell::new(false),
            events: Some(Rc::new(MockEvents::default())),
            send_error: RefCell::new(None),
            receipt_status: Cell::new(true),
            held_receipt: RefCell::new(None),
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Provider without lifecycle events
    pub fn incapable(account: &str, chain_id: u64) -> Self {
        Self { events: None, ..Self::new(account, chain_id) }
    }

    pub fn without_accounts(chain_id: u64) -> Self {
        let provider = Self::new("", chain_id);
        provider.accounts.borrow_mut().clear();
        provider
    }

    pub fn events_handle(&self) -> Rc<MockEvents> {
        self.events.clone().expect("event-capable provider")
    }

    pub fn emit(&self, event: ProviderEvent) -> usize {
        self.events_handle().emit(event)
    }

    pub fn listener_count(&self) -> usize {
        self.events.as_ref().map_or(0, |e| e.listener_count())
    }

    /// What the wallet reports from now on; the event is emitted separately.
    pub fn switch_chain(&self, chain_id: u64) {
        self.chain.set(chain_id);
    }

    /// Make every chain id query fail from now on.
    pub fn lose_network(&self) {
        self.chain_unavailable.set(true);
    }

    pub fn fail_send(&self, error: ProviderError) {
        *self.send_error.borrow_mut() = Some(error);
    }

    pub fn revert_receipts(&self) {
        self.receipt_status.set(false);
    }

    /// Keep the next receipt pending until the returned sender fires with its status.
    pub fn hold_receipt(&self) -> oneshot::Sender<bool> {
        let (tx, rx) = oneshot::channel();
        *self.held_receipt.borrow_mut() = Some(rx);
        tx
    }

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.borrow().clone()
    }
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    fn accounts(&self) -> Vec<String> {
        self.accounts.borrow().clone()
    }

    fn events(&self) -> ProviderEvents {
        match &self.events {
            Some(events) => ProviderEvents::Capable(events.clone()),
            None => ProviderEvents::Incapable,
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        if self.chain_unavailable.get() {
            return Err(ProviderError::Rpc("network unreachable".into()));
        }
        Ok(self.chain.get())
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<TxHash, ProviderError> {
        if let Some(error) = self.send_error.borrow().clone() {
            return Err(error);
        }
        self.sent.borrow_mut().push(request.clone());
        Ok(TX_HASH)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ProviderError> {
        let held = self.held_receipt.borrow_mut().take();
        let status = match held {
            Some(rx) => rx.await.map_err(|_| ProviderError::Rpc("receipt dropped".into()))?,
            None => self.receipt_status.get(),
        };
        Ok(TransactionReceipt { transaction_hash: hash, status, block_number: Some(7) })
    }
}

pub enum ModalOutcome {
    Select(ConnectorBackend),
    Cancel,
    Fail(String),
}

/// Scripted wallet selection UI
pub struct MockModal {
    provider: Rc<MockProvider>,
    outcome: RefCell<ModalOutcome>,
    relay_session: Option<serde_json::Value>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    pub opened: Cell<u32>,
    pub hints: RefCell<Vec<Option<ConnectorBackend>>>,
}

impl MockModal {
    pub fn new(provider: Rc<MockProvider>) -> Self {
        Self {
            provider,
            outcome: RefCell::new(ModalOutcome::Select(ConnectorBackend::Injected)),
            relay_session: None,
            gate: RefCell::new(None),
            opened: Cell::new(0),
            hints: RefCell::new(Vec::new()),
        }
    }

    pub fn with_relay_session(mut self, session: serde_json::Value) -> Self {
        self.relay_session = Some(session);
        self
    }

    pub fn script(&self, outcome: ModalOutcome) {
        *self.outcome.borrow_mut() = outcome;
    }

    /// Keep the next selection open until the returned sender fires.
    pub fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.borrow_mut() = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl WalletModal for MockModal {
    async fn select(
        &self,
        _options: &ProviderOptions,
        cached: Option<ConnectorBackend>,
    ) -> Result<SelectedProvider, ConnectError> {
        self.opened.set(self.opened.get() + 1);
        self.hints.borrow_mut().push(cached);
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match &*self.outcome.borrow() {
            ModalOutcome::Select(backend) => Ok(SelectedProvider {
                backend: *backend,
                provider: self.provider.clone(),
                relay_session: self.relay_session.clone(),
            }),
            ModalOutcome::Cancel => Err(ConnectError::UserCancelled),
            ModalOutcome::Fail(reason) => Err(ConnectError::Failed(reason.clone())),
        }
    }
}

/// One independent session wired to scripted collaborators
pub struct Harness {
    pub config: AppConfig,
    pub provider: Rc<MockProvider>,
    pub modal: Rc<MockModal>,
    pub storage: MemoryStorage,
    pub store: SessionStore,
    pub controller: SessionController,
    pub minter: Minter,
}

pub fn config() -> AppConfig {
    AppConfig::new(CONTRACT).with_default_chain(1).with_walletconnect("test-infura-id")
}

pub fn harness(provider: MockProvider) -> Harness {
    let provider = Rc::new(provider);
    let modal = Rc::new(MockModal::new(provider.clone()));
    harness_with(provider, modal)
}

pub fn harness_with(provider: Rc<MockProvider>, modal: Rc<MockModal>) -> Harness {
    let config = config();
    let storage = MemoryStorage::new();
    let gateway = ProviderGateway::new(&config, modal.clone(), Rc::new(storage.clone()));
    let store = SessionStore::new(config.default_chain_id);
    let controller = SessionController::new(store.clone(), gateway, config.contract_address);
    let minter = Minter::new(store.clone());
    Harness { config, provider, modal, storage, store, controller, minter }
}
