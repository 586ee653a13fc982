//! MintApp - the command surface consumed by the render layer
//!
//! | Command | Effect |
//! |---------|--------|
//! | `snapshot()` / `watch()` | read session + mint state |
//! | `restore()` | reconnect when a cached session marker exists |
//! | `connect()` | open a wallet, start the event pump |
//! | `reset()` | tear the session down |
//! | `mint(to, uri)` / `mint_from_form()` | submit one `safeMint` |
//! | `set_address_to()` / `set_uri()` | form fields |

use crate::config::AppConfig;
use crate::contract::TransactionReceipt;
use crate::error::{MintError, SessionError};
use crate::provider::ProviderGateway;
use crate::runtime;
use crate::session::{EventPump, Minter, SessionController, SessionSnapshot, SessionStore};
use futures::channel::mpsc;

#[derive(Clone)]
pub struct MintApp {
    store: SessionStore,
    controller: SessionController,
    minter: Minter,
}

impl MintApp {
    pub fn new(config: &AppConfig, gateway: ProviderGateway) -> Self {
        let store = SessionStore::new(config.default_chain_id);
        let controller = SessionController::new(store.clone(), gateway, config.contract_address);
        let minter = Minter::new(store.clone());
        Self { store, controller, minter }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn watch(&self) -> mpsc::UnboundedReceiver<SessionSnapshot> {
        self.store.watch()
    }

    /// Auto-connect on startup. Returns whether a session was restored.
    ///
    /// # Panics
    ///
    /// Natively, when called outside a tokio `LocalSet` (the event pump is a
    /// local task). Hosts without one drive `controller().restore()` and run
    /// the returned `EventPump` themselves.
    pub async fn restore(&self) -> Result<bool, SessionError> {
        match self.controller.restore().await {
            Ok(Some(pump)) => {
                Self::spawn_pump(pump);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(SessionError::UserCancelled) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Prompt for a wallet. A dismissed prompt is not an error.
    ///
    /// # Panics
    ///
    /// Natively, when a session is established outside a tokio `LocalSet`.
    /// Use `controller().connect()` and run the `EventPump` directly there.
    pub async fn connect(&self) -> Result<(), SessionError> {
        match self.controller.connect().await {
            Ok(pump) => {
                Self::spawn_pump(pump);
                Ok(())
            }
            Err(SessionError::UserCancelled) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn spawn_pump(pump: EventPump) {
        runtime::spawn_local(pump.run());
    }

    pub fn reset(&self) {
        self.controller.reset();
    }

    pub async fn mint(&self, address_to: &str, uri: &str) -> Result<TransactionReceipt, MintError> {
        self.minter.mint(address_to, uri).await
    }

    pub async fn mint_from_form(&self) -> Result<TransactionReceipt, MintError> {
        self.minter.mint_from_form().await
    }

    pub fn set_address_to(&self, value: impl Into<String>) {
        self.store.set_address_to(value);
    }

    pub fn set_uri(&self, value: impl Into<String>) {
        self.store.set_uri(value);
    }
}
