//! Provider Gateway - the externally supplied wallet provider and its events
//!
//! # Architecture
//!
//! ```text
//! ProviderGateway ── open() ──► WalletModal (external selection UI)
//!       │                             │
//!       │ cached markers              ▼
//!       ▼                     Rc<dyn WalletProvider>
//!  KeyValueStorage                    │
//!                      ┌──────────────┼──────────────────┐
//!                      ▼              ▼                  ▼
//!                  accounts()     Library           events()
//!                                (chain id,     Capable(EventSource)
//!                                 tx submit)    | Incapable
//! ```
//!
//! Events are delivered into an unbounded channel (`EventSink`); the session
//! controller owns the receiving end.

pub mod gateway;
pub mod rpc;

pub use gateway::{ProviderGateway, SelectedProvider, WalletModal};

use crate::contract::{TransactionReceipt, TransactionRequest};
use crate::core::keys::events;
use crate::error::ProviderResult;
use alloy_primitives::TxHash;
use async_trait::async_trait;
use futures::channel::mpsc;
use std::cell::Cell;
use std::rc::Rc;

/// Lifecycle event kinds a provider may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccountsChanged,
    NetworkChanged,
    Closed,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::AccountsChanged, EventKind::NetworkChanged, EventKind::Closed];

    /// Name used with the provider's `on`/`removeListener`
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AccountsChanged => events::ACCOUNTS_CHANGED,
            EventKind::NetworkChanged => events::NETWORK_CHANGED,
            EventKind::Closed => events::CLOSE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Empty list: the wallet locked or dropped every account
    AccountsChanged(Vec<String>),
    /// Raw payload only; the chain id re-queried from a rebuilt library is authoritative
    NetworkChanged(u64),
    Closed,
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            ProviderEvent::NetworkChanged(_) => EventKind::NetworkChanged,
            ProviderEvent::Closed => EventKind::Closed,
        }
    }
}

pub type EventSink = mpsc::UnboundedSender<ProviderEvent>;
pub type EventStream = mpsc::UnboundedReceiver<ProviderEvent>;

/// Handle returned by `EventSource::subscribe`, required to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Event registration surface of an event-capable provider
pub trait EventSource {
    fn subscribe(&self, kind: EventKind, sink: EventSink) -> ListenerId;
    /// Unknown listeners are ignored.
    fn unsubscribe(&self, kind: EventKind, listener: ListenerId);
}

/// Whether a provider can emit lifecycle events
#[derive(Clone)]
pub enum ProviderEvents {
    Capable(Rc<dyn EventSource>),
    Incapable,
}

/// A connected wallet as handed over by the selection UI
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Account the wallet currently has selected, when it exposes one
    fn selected_address(&self) -> Option<String> {
        None
    }

    /// Accounts authorized for this connection, selected first
    fn accounts(&self) -> Vec<String>;

    fn events(&self) -> ProviderEvents;

    async fn chain_id(&self) -> ProviderResult<u64>;

    /// Sign and broadcast; resolves with the hash before confirmation.
    async fn send_transaction(&self, request: &TransactionRequest) -> ProviderResult<TxHash>;

    /// Resolves once the transaction is mined.
    async fn transaction_receipt(&self, hash: TxHash) -> ProviderResult<TransactionReceipt>;
}

/// `selected_address` when present, else the first authorized account.
pub fn active_account(provider: &dyn WalletProvider) -> Option<String> {
    provider
        .selected_address()
        .filter(|a| !a.is_empty())
        .or_else(|| provider.accounts().into_iter().find(|a| !a.is_empty()))
}

/// Read handle over the raw provider.
///
/// Caches the detected network, so it must be rebuilt after a network change.
#[derive(Clone)]
pub struct Library {
    provider: Rc<dyn WalletProvider>,
    network: Rc<Cell<Option<u64>>>,
}

impl Library {
    pub fn new(provider: Rc<dyn WalletProvider>) -> Self {
        Self { provider, network: Rc::new(Cell::new(None)) }
    }

    pub fn provider(&self) -> &Rc<dyn WalletProvider> {
        &self.provider
    }

    /// Fresh handle over the same provider, with an empty network cache.
    pub fn rebuild(&self) -> Self {
        Self::new(self.provider.clone())
    }

    pub async fn chain_id(&self) -> ProviderResult<u64> {
        if let Some(id) = self.network.get() {
            return Ok(id);
        }
        let id = self.provider.chain_id().await?;
        self.network.set(Some(id));
        Ok(id)
    }
}
