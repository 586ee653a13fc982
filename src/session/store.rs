//! SessionStore - the single shared mutable session state
//!
//! One writer role (controller + minter), many readers (render layer).
//! Every transition goes through `update`, which applies the mutation in one
//! non-suspending step and then broadcasts a snapshot to watchers.

use crate::contract::MintContract;
use crate::provider::Library;
use alloy_primitives::TxHash;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Outcome of the most recent mint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    #[default]
    None,
    Success,
    Failure,
}

/// Connected-wallet context
#[derive(Clone)]
pub(crate) struct Session {
    pub phase: SessionPhase,
    pub connected: bool,
    pub address: String,
    pub chain_id: u64,
    pub library: Option<Library>,
    pub mint_contract: Option<MintContract>,
}

impl Session {
    fn initial(default_chain_id: u64) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            connected: false,
            address: String::new(),
            chain_id: default_chain_id,
            library: None,
            mint_contract: None,
        }
    }
}

/// The (single) mint operation plus the form inputs feeding it
#[derive(Debug, Clone, Default)]
pub(crate) struct MintState {
    /// Operation token of the mint owning `pending`; 0 when none ran
    pub id: u64,
    pub pending: bool,
    pub address_to: String,
    pub uri: String,
    pub transaction_hash: Option<TxHash>,
    pub result: MintStatus,
    pub error: Option<String>,
}

pub(crate) struct StoreState {
    pub session: Session,
    pub mint: MintState,
    /// Bumped on every connect commit and every reset; never reset itself
    pub epoch: u64,
    /// Last issued mint operation token
    pub mint_seq: u64,
}

/// Read-only view consumed by the render layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub connected: bool,
    pub address: String,
    pub chain_id: u64,
    pub pending: bool,
    pub address_to: String,
    pub uri: String,
    pub transaction_hash: Option<TxHash>,
    pub result: MintStatus,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Rc<RefCell<StoreState>>,
    watchers: Rc<RefCell<Vec<mpsc::UnboundedSender<SessionSnapshot>>>>,
    default_chain_id: u64,
}

impl SessionStore {
    pub fn new(default_chain_id: u64) -> Self {
        Self {
            state: Rc::new(RefCell::new(StoreState {
                session: Session::initial(default_chain_id),
                mint: MintState::default(),
                epoch: 0,
                mint_seq: 0,
            })),
            watchers: Rc::new(RefCell::new(Vec::new())),
            default_chain_id,
        }
    }

    pub fn default_chain_id(&self) -> u64 {
        self.default_chain_id
    }

    /// Snapshot of a freshly started (or reset) session
    pub fn initial_snapshot(&self) -> SessionSnapshot {
        Self::view(&Session::initial(self.default_chain_id), &MintState::default())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        Self::view(&state.session, &state.mint)
    }

    fn view(session: &Session, mint: &MintState) -> SessionSnapshot {
        SessionSnapshot {
            phase: session.phase,
            connected: session.connected,
            address: session.address.clone(),
            chain_id: session.chain_id,
            pending: mint.pending,
            address_to: mint.address_to.clone(),
            uri: mint.uri.clone(),
            transaction_hash: mint.transaction_hash,
            result: mint.result,
            error: mint.error.clone(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().session.connected
    }

    pub fn has_mint_contract(&self) -> bool {
        self.state.borrow().session.mint_contract.is_some()
    }

    pub fn epoch(&self) -> u64 {
        self.state.borrow().epoch
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Apply one atomic transition, then notify watchers.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let out = f(&mut self.state.borrow_mut());
        self.notify();
        out
    }

    /// Restore every session and mint field to its initial value.
    /// Returns the new epoch.
    pub(crate) fn reset(&self) -> u64 {
        let default_chain_id = self.default_chain_id;
        self.update(|state| {
            state.session = Session::initial(default_chain_id);
            state.mint = MintState::default();
            state.epoch += 1;
            state.epoch
        })
    }

    pub fn set_address_to(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|state| state.mint.address_to = value);
    }

    pub fn set_uri(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(|state| state.mint.uri = value);
    }

    /// Receive a snapshot after every transition.
    pub fn watch(&self) -> mpsc::UnboundedReceiver<SessionSnapshot> {
        let (tx, rx) = mpsc::unbounded();
        self.watchers.borrow_mut().push(tx);
        rx
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.watchers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }
}
