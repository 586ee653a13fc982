//! SessionController - wallet session lifecycle
//!
//! ```text
//!                connect()                commit + subscribe
//! Disconnected ───────────► Connecting ─────────────────────► Connected
//!      ▲                        │ open/chain query fails          │
//!      └────────────────────────┘                                 │
//!      ▲   reset() | close | accountsChanged([])                  │
//!      └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Provider events reach the controller through an `EventPump` bound to the
//! epoch of the connection that subscribed them. Events carrying a stale epoch,
//! or arriving while disconnected, are dropped.

use super::store::{Session, SessionPhase, SessionStore};
use crate::contract::MintContract;
use crate::error::SessionError;
use crate::provider::{
    active_account, EventKind, EventSource, EventStream, ListenerId, Library, ProviderEvent,
    ProviderEvents, ProviderGateway, WalletProvider,
};
use alloy_primitives::Address;
use futures::channel::mpsc;
use futures::StreamExt;
use std::cell::RefCell;
use std::rc::Rc;

/// Listeners registered on an event-capable provider
struct Subscription {
    source: Rc<dyn EventSource>,
    listeners: Vec<(EventKind, ListenerId)>,
}

impl Subscription {
    fn cancel(self) {
        for (kind, id) in self.listeners {
            self.source.unsubscribe(kind, id);
        }
    }
}

/// The raw provider of the current connection
struct ProviderLink {
    provider: Rc<dyn WalletProvider>,
    subscription: Option<Subscription>,
}

#[derive(Clone)]
pub struct SessionController {
    store: SessionStore,
    gateway: ProviderGateway,
    contract_address: Address,
    link: Rc<RefCell<Option<ProviderLink>>>,
}

impl SessionController {
    pub fn new(store: SessionStore, gateway: ProviderGateway, contract_address: Address) -> Self {
        Self { store, gateway, contract_address, link: Rc::new(RefCell::new(None)) }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// Provider of the live connection, if any
    pub fn provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.link.borrow().as_ref().map(|link| link.provider.clone())
    }

    pub fn is_subscribed(&self) -> bool {
        self.link.borrow().as_ref().is_some_and(|link| link.subscription.is_some())
    }

    /// Reconnect without prompting when a previous session was cached.
    pub async fn restore(&self) -> Result<Option<EventPump>, SessionError> {
        if !self.gateway.has_cached_session() {
            return Ok(None);
        }
        tracing::info!("cached wallet session found, reconnecting");
        self.connect().await.map(Some)
    }

    /// Open a wallet and establish the session.
    ///
    /// On failure the session stays `Disconnected` with its fields untouched.
    pub async fn connect(&self) -> Result<EventPump, SessionError> {
        let started = self.store.read(|s| match s.session.phase {
            SessionPhase::Connected => Err(SessionError::AlreadyConnected),
            SessionPhase::Connecting => Err(SessionError::ConnectInProgress),
            SessionPhase::Disconnected => Ok(s.epoch),
        })?;
        self.store.update(|s| s.session.phase = SessionPhase::Connecting);

        match self.establish(started).await {
            Ok(pump) => Ok(pump),
            Err(e) => {
                self.store.update(|s| {
                    if s.epoch == started && s.session.phase == SessionPhase::Connecting {
                        s.session.phase = SessionPhase::Disconnected;
                    }
                });
                match &e {
                    SessionError::UserCancelled => tracing::debug!("wallet selection dismissed"),
                    other => tracing::warn!("connect failed: {}", other),
                }
                Err(e)
            }
        }
    }

    async fn establish(&self, started: u64) -> Result<EventPump, SessionError> {
        let selected = self.gateway.open().await?;
        let provider = selected.provider.clone();
        let address = active_account(provider.as_ref())
            .ok_or_else(|| SessionError::ConnectionFailed("wallet returned no accounts".into()))?;
        let library = Library::new(provider.clone());
        let chain_id = library
            .chain_id()
            .await
            .map_err(|e| SessionError::ConnectionFailed(e.to_string()))?;
        let mint_contract = MintContract::new(self.contract_address, library.clone(), address.clone());

        let session = Session {
            phase: SessionPhase::Connected,
            connected: true,
            address: address.clone(),
            chain_id,
            library: Some(library),
            mint_contract: Some(mint_contract),
        };
        let committed = self.store.update(|s| {
            // A reset while we were suspended wins.
            if s.epoch != started || s.session.phase != SessionPhase::Connecting {
                return None;
            }
            s.session = session;
            s.epoch += 1;
            Some(s.epoch)
        });
        let epoch = committed.ok_or_else(|| SessionError::ConnectionFailed("superseded by reset".into()))?;
        // Only an established session is cached for the next load.
        self.gateway.remember(&selected);

        let (sink, events) = mpsc::unbounded();
        let subscription = match provider.events() {
            ProviderEvents::Capable(source) => {
                let listeners = EventKind::ALL
                    .iter()
                    .map(|&kind| (kind, source.subscribe(kind, sink.clone())))
                    .collect();
                Some(Subscription { source, listeners })
            }
            ProviderEvents::Incapable => {
                tracing::debug!("provider emits no lifecycle events");
                None
            }
        };
        let previous = self.link.borrow_mut().replace(ProviderLink { provider, subscription });
        if let Some(subscription) = previous.and_then(|link| link.subscription) {
            subscription.cancel();
        }

        tracing::info!("wallet connected: {} on chain {}", address, chain_id);
        Ok(EventPump { controller: self.clone(), epoch, events })
    }

    /// Tear the session down from any state. Never fails; safe to repeat.
    pub fn reset(&self) {
        self.gateway.clear_cached_session();
        let link = self.link.borrow_mut().take();
        if let Some(subscription) = link.and_then(|link| link.subscription) {
            subscription.cancel();
        }
        let epoch = self.store.reset();
        tracing::info!("session reset (epoch {})", epoch);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.store.read(|s| s.session.connected && s.epoch == epoch)
    }

    /// Apply one provider event delivered for connection `epoch`.
    pub async fn handle_event(&self, epoch: u64, event: ProviderEvent) {
        if !self.is_current(epoch) {
            tracing::debug!("dropping stale {} event", event.kind().as_str());
            return;
        }
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts),
            ProviderEvent::NetworkChanged(chain_id) => self.on_network_changed(epoch, chain_id).await,
            ProviderEvent::Closed => {
                tracing::info!("provider closed the connection");
                self.reset();
            }
        }
    }

    fn on_accounts_changed(&self, accounts: Vec<String>) {
        let Some(account) = accounts.into_iter().find(|a| !a.is_empty()) else {
            tracing::info!("wallet locked or dropped all accounts");
            self.reset();
            return;
        };
        let contract_address = self.contract_address;
        self.store.update(|s| {
            s.session.mint_contract = s
                .session
                .library
                .as_ref()
                .map(|library| MintContract::new(contract_address, library.clone(), account.clone()));
            s.session.address = account;
        });
        tracing::info!("active account changed");
    }

    async fn on_network_changed(&self, epoch: u64, announced: u64) {
        let Some(library) = self.store.read(|s| s.session.library.clone()) else {
            return;
        };
        let library = library.rebuild();
        let chain_id = match library.chain_id().await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("network change to {} could not be confirmed: {}", announced, e);
                return;
            }
        };
        if chain_id != announced {
            tracing::debug!("provider announced chain {}, library reports {}", announced, chain_id);
        }
        let contract_address = self.contract_address;
        let applied = self.store.update(|s| {
            if !s.session.connected || s.epoch != epoch {
                return false;
            }
            s.session.mint_contract =
                Some(MintContract::new(contract_address, library.clone(), s.session.address.clone()));
            s.session.library = Some(library);
            s.session.chain_id = chain_id;
            true
        });
        if applied {
            tracing::info!("network changed to chain {}", chain_id);
        }
    }
}

/// Delivers the provider events of one connection to the controller.
pub struct EventPump {
    controller: SessionController,
    epoch: u64,
    events: EventStream,
}

impl EventPump {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Process events until the provider drops its listeners.
    pub async fn run(mut self) {
        while let Some(event) = self.events.next().await {
            self.controller.handle_event(self.epoch, event).await;
        }
        tracing::debug!("event pump for epoch {} finished", self.epoch);
    }

    /// Process only the events already queued. Returns how many were handled.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(Some(event)) = self.events.try_next() {
            self.controller.handle_event(self.epoch, event).await;
            handled += 1;
        }
        handled
    }
}
