//! Storage keys, provider event names and connector names
//!
//! Centralized registry so the gateway, the browser adapters and the
//! tests agree on the exact strings.

/// Persisted session markers (browser `localStorage`)
pub mod storage {
    /// Generic marker: JSON-encoded name of the last connector backend.
    pub const CACHED_PROVIDER_KEY: &str = "WEB3_CONNECT_CACHED_PROVIDER";
    /// Relay-backend session record.
    pub const WALLETCONNECT_KEY: &str = "walletconnect";

    pub const ALL: &[&str] = &[CACHED_PROVIDER_KEY, WALLETCONNECT_KEY];
}

/// Provider lifecycle event names (EIP-1193 style `on`/`removeListener`)
pub mod events {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const NETWORK_CHANGED: &str = "networkChanged";
    pub const CLOSE: &str = "close";
}

/// Connector backend names, as used in provider options and the cached marker
pub mod connectors {
    pub const INJECTED: &str = "injected";
    pub const WALLETCONNECT: &str = "walletconnect";
}

/// JSON-RPC methods issued against the wallet provider
pub mod rpc {
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}
