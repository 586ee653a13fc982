//! nft-minter: wallet session lifecycle + single-flight NFT minting.
//!
//! # Architecture
//!
//! ```text
//! MintApp (render-layer commands)
//!   │
//!   ├── SessionController ── connect / reset / provider events
//!   │     │
//!   │     └── ProviderGateway ── WalletModal (external UI) + cached markers
//!   │                 │
//!   │                 └── WalletProvider ── Library ── MintContract (safeMint)
//!   │
//!   ├── Minter ── one pending mint, guarded by an operation token
//!   │
//!   └── SessionStore ── single writer, snapshots to watchers
//! ```
//!
//! # Lifecycle
//!
//! | Trigger | Transition |
//! |---------|------------|
//! | `connect()` | Disconnected → Connecting → Connected |
//! | `accountsChanged([a, ..])` | address = a, contract re-bound |
//! | `accountsChanged([])` | reset |
//! | `networkChanged(_)` | library rebuilt, chain id re-queried |
//! | `close` / `reset()` | → Disconnected, cached markers cleared |
//!
//! # Features
//!
//! - `native` - tokio local tasks, tracing-subscriber output (default)
//! - `wasm` - browser adapters: localStorage, EIP-1193 provider, JS modal, `MintApp` bindings
//!
//! # Usage
//!
//! ```ignore
//! use nft_minter::{AppConfig, MemoryStorage, MintApp, ProviderGateway};
//! use std::rc::Rc;
//!
//! let config = AppConfig::from_env()?;
//! let gateway = ProviderGateway::new(&config, modal, Rc::new(MemoryStorage::new()));
//! let app = MintApp::new(&config, gateway);
//!
//! app.restore().await?;
//! app.connect().await?;
//! let receipt = app.mint("0x5FbDB2315678afecb367f032d93F642f64180aa3", "ipfs://token-1").await?;
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod contract;
pub mod core;
pub mod error;
pub mod provider;
pub mod session;
pub mod storage;

#[cfg(any(feature = "native", feature = "wasm"))]
pub mod app;
#[cfg(any(feature = "native", feature = "wasm"))]
pub mod runtime;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use config::{AppConfig, ConnectorBackend, ProviderOptions, WalletConnectOptions};
pub use contract::{MintContract, PendingMint, TransactionReceipt, TransactionRequest};
pub use error::{ConfigError, ConnectError, MintError, ProviderError, SessionError, StorageError};
pub use provider::{
    EventKind, EventSink, EventSource, Library, ListenerId, ProviderEvent, ProviderEvents,
    ProviderGateway, SelectedProvider, WalletModal, WalletProvider,
};
pub use session::{EventPump, MintStatus, Minter, SessionController, SessionPhase, SessionSnapshot, SessionStore};
pub use storage::{KeyValueStorage, MemoryStorage};

#[cfg(any(feature = "native", feature = "wasm"))]
pub use app::MintApp;

#[cfg(feature = "native")]
pub use logging::init_logging;

#[cfg(feature = "wasm")]
pub use wasm::{LocalStorage, WasmMintApp};
