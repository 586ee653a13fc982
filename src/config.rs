//! App configuration - read once at startup, immutable afterwards

use crate::core::keys::connectors;
use crate::error::ConfigError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 4_000;

/// Connector backends the wallet modal can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorBackend {
    /// Browser-injected wallet (`window.ethereum`)
    Injected,
    /// Remote session relay
    WalletConnect,
}

impl ConnectorBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorBackend::Injected => connectors::INJECTED,
            ConnectorBackend::WalletConnect => connectors::WALLETCONNECT,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            connectors::INJECTED => Some(ConnectorBackend::Injected),
            connectors::WALLETCONNECT => Some(ConnectorBackend::WalletConnect),
            _ => None,
        }
    }

    /// Backends that keep their own persisted session record.
    pub fn is_relay(&self) -> bool {
        matches!(self, ConnectorBackend::WalletConnect)
    }
}

/// Sub-options of the relay backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectOptions {
    pub infura_id: String,
    #[serde(default)]
    pub bridge: Option<String>,
}

/// Connector backends offered to the user, each keyed by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderOptions {
    pub injected: bool,
    pub walletconnect: Option<WalletConnectOptions>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self { injected: true, walletconnect: None }
    }
}

impl ProviderOptions {
    pub fn backends(&self) -> Vec<ConnectorBackend> {
        let mut out = Vec::new();
        if self.injected {
            out.push(ConnectorBackend::Injected);
        }
        if self.walletconnect.is_some() {
            out.push(ConnectorBackend::WalletConnect);
        }
        out
    }

    pub fn supports(&self, backend: ConnectorBackend) -> bool {
        self.backends().contains(&backend)
    }
}

/// Application configuration. Higher layers construct this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Chain shown while disconnected
    pub default_chain_id: u64,
    /// Deployed collection contract
    pub contract_address: Address,
    /// Persist the chosen connector so the next load reconnects silently
    pub cache_provider: bool,
    pub provider_options: ProviderOptions,
    pub receipt_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_chain_id: DEFAULT_CHAIN_ID,
            contract_address: Address::ZERO,
            cache_provider: true,
            provider_options: ProviderOptions::default(),
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    pub fn new(contract_address: Address) -> Self {
        Self { contract_address, ..Default::default() }
    }
    pub fn with_default_chain(mut self, chain_id: u64) -> Self { self.default_chain_id = chain_id; self }
    pub fn with_cache_provider(mut self, enabled: bool) -> Self { self.cache_provider = enabled; self }
    pub fn with_walletconnect(mut self, infura_id: impl Into<String>) -> Self {
        self.provider_options.walletconnect = Some(WalletConnectOptions { infura_id: infura_id.into(), bridge: None });
        self
    }
    pub fn with_receipt_poll_interval(mut self, ms: u64) -> Self { self.receipt_poll_interval_ms = ms; self }

    /// Build from `NFT_MINTER_*` environment variables on top of the defaults.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `NFT_MINTER_CHAIN_ID` | `default_chain_id` |
    /// | `NFT_MINTER_CONTRACT` | `contract_address` |
    /// | `NFT_MINTER_INFURA_ID` | enables the walletconnect backend |
    /// | `NFT_MINTER_CACHE_PROVIDER` | `cache_provider` (`1`/`0`, `true`/`false`) |
    #[cfg(feature = "native")]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("NFT_MINTER_CHAIN_ID") {
            config.default_chain_id = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid("NFT_MINTER_CHAIN_ID", &raw, e.to_string()))?;
        }
        if let Some(raw) = lookup("NFT_MINTER_CONTRACT") {
            config.contract_address = raw
                .trim()
                .parse::<Address>()
                .map_err(|e| invalid("NFT_MINTER_CONTRACT", &raw, e.to_string()))?;
        }
        if let Some(raw) = lookup("NFT_MINTER_INFURA_ID") {
            if !raw.trim().is_empty() {
                config = config.with_walletconnect(raw.trim());
            }
        }
        if let Some(raw) = lookup("NFT_MINTER_CACHE_PROVIDER") {
            config.cache_provider = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid("NFT_MINTER_CACHE_PROVIDER", &raw, "expected a boolean".into())),
            };
        }
        Ok(config)
    }
}

fn invalid(key: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::Invalid { key: key.into(), value: value.into(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_target_mainnet_with_injected_only() {
        let config = AppConfig::default();
        assert_eq!(config.default_chain_id, 1);
        assert!(config.cache_provider);
        assert_eq!(config.provider_options.backends(), vec![ConnectorBackend::Injected]);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("NFT_MINTER_CHAIN_ID", "4"),
            ("NFT_MINTER_CONTRACT", "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            ("NFT_MINTER_INFURA_ID", "abc123"),
            ("NFT_MINTER_CACHE_PROVIDER", "off"),
        ]))
        .unwrap();
        assert_eq!(config.default_chain_id, 4);
        assert_ne!(config.contract_address, Address::ZERO);
        assert!(!config.cache_provider);
        assert!(config.provider_options.supports(ConnectorBackend::WalletConnect));
        assert_eq!(config.provider_options.walletconnect.unwrap().infura_id, "abc123");
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("NFT_MINTER_CHAIN_ID", "mainnet")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "NFT_MINTER_CHAIN_ID"));
        assert!(AppConfig::from_lookup(lookup(&[("NFT_MINTER_CONTRACT", "0x12")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("NFT_MINTER_CACHE_PROVIDER", "maybe")])).is_err());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"defaultChainId": 5, "providerOptions": {"walletconnect": {"infuraId": "k"}}}"#,
        )
        .unwrap();
        assert_eq!(config.default_chain_id, 5);
        assert!(config.provider_options.injected);
        assert_eq!(config.receipt_poll_interval_ms, DEFAULT_RECEIPT_POLL_INTERVAL_MS);
        assert_eq!(ConnectorBackend::from_str(" WalletConnect "), Some(ConnectorBackend::WalletConnect));
    }
}
