//! ProviderGateway - opens wallet connections and owns the cached-session markers

use super::WalletProvider;
use crate::config::{AppConfig, ConnectorBackend, ProviderOptions};
use crate::core::keys::storage as keys;
use crate::error::ConnectError;
use crate::storage::KeyValueStorage;
use async_trait::async_trait;
use std::rc::Rc;

/// Outcome of a successful wallet selection
pub struct SelectedProvider {
    pub backend: ConnectorBackend,
    pub provider: Rc<dyn WalletProvider>,
    /// Session record kept by relay backends, persisted under `walletconnect`
    pub relay_session: Option<serde_json::Value>,
}

/// External wallet selection UI.
///
/// `cached` carries the connector remembered from a previous load so the
/// modal can reconnect without prompting.
#[async_trait(?Send)]
pub trait WalletModal {
    async fn select(
        &self,
        options: &ProviderOptions,
        cached: Option<ConnectorBackend>,
    ) -> Result<SelectedProvider, ConnectError>;
}

#[derive(Clone)]
pub struct ProviderGateway {
    modal: Rc<dyn WalletModal>,
    storage: Rc<dyn KeyValueStorage>,
    options: ProviderOptions,
    cache_provider: bool,
}

impl ProviderGateway {
    pub fn new(config: &AppConfig, modal: Rc<dyn WalletModal>, storage: Rc<dyn KeyValueStorage>) -> Self {
        Self {
            modal,
            storage,
            options: config.provider_options.clone(),
            cache_provider: config.cache_provider,
        }
    }

    /// Prompt for a wallet. Nothing is persisted until `remember`.
    pub async fn open(&self) -> Result<SelectedProvider, ConnectError> {
        let cached = self.cached_connector();
        let selected = self.modal.select(&self.options, cached).await?;
        if !self.options.supports(selected.backend) {
            return Err(ConnectError::Failed(format!(
                "connector '{}' is not enabled",
                selected.backend.as_str()
            )));
        }
        tracing::debug!("wallet opened via {}", selected.backend.as_str());
        Ok(selected)
    }

    /// Cache the connector of an established session so the next load reconnects.
    pub fn remember(&self, selected: &SelectedProvider) {
        if self.cache_provider {
            self.persist(selected);
        }
    }

    fn persist(&self, selected: &SelectedProvider) {
        // The generic marker holds the JSON-encoded connector name.
        let marker = serde_json::Value::from(selected.backend.as_str()).to_string();
        if let Err(e) = self.storage.set(keys::CACHED_PROVIDER_KEY, &marker) {
            tracing::warn!("could not cache connector: {}", e);
        }
        if selected.backend.is_relay() {
            if let Some(session) = &selected.relay_session {
                if let Err(e) = self.storage.set(keys::WALLETCONNECT_KEY, &session.to_string()) {
                    tracing::warn!("could not cache relay session: {}", e);
                }
            }
        }
    }

    /// Connector recorded by a previous successful `open()`
    pub fn cached_connector(&self) -> Option<ConnectorBackend> {
        let raw = self.storage.get(keys::CACHED_PROVIDER_KEY).ok().flatten()?;
        let name = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        ConnectorBackend::from_str(&name)
    }

    /// True when either persisted marker is present.
    pub fn has_cached_session(&self) -> bool {
        keys::ALL.iter().any(|key| self.storage.contains(key).unwrap_or(false))
    }

    /// Remove both markers. Idempotent.
    pub fn clear_cached_session(&self) {
        for key in keys::ALL {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("could not clear {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{TransactionReceipt, TransactionRequest};
    use crate::error::{ProviderError, ProviderResult};
    use crate::provider::ProviderEvents;
    use crate::storage::MemoryStorage;
    use alloy_primitives::TxHash;
    use serde_json::json;
    use std::cell::RefCell;

    struct NullProvider;

    #[async_trait(?Send)]
    impl WalletProvider for NullProvider {
        fn accounts(&self) -> Vec<String> { vec!["0xabc".into()] }
        fn events(&self) -> ProviderEvents { ProviderEvents::Incapable }
        async fn chain_id(&self) -> ProviderResult<u64> { Ok(1) }
        async fn send_transaction(&self, _: &TransactionRequest) -> ProviderResult<TxHash> {
            Err(ProviderError::Unsupported("send_transaction"))
        }
        async fn transaction_receipt(&self, _: TxHash) -> ProviderResult<TransactionReceipt> {
            Err(ProviderError::Unsupported("transaction_receipt"))
        }
    }

    struct ScriptedModal {
        backend: ConnectorBackend,
        cancel: bool,
        hints: RefCell<Vec<Option<ConnectorBackend>>>,
    }

    #[async_trait(?Send)]
    impl WalletModal for ScriptedModal {
        async fn select(
            &self,
            _: &ProviderOptions,
            cached: Option<ConnectorBackend>,
        ) -> Result<SelectedProvider, ConnectError> {
            self.hints.borrow_mut().push(cached);
            if self.cancel {
                return Err(ConnectError::UserCancelled);
            }
            Ok(SelectedProvider {
                backend: self.backend,
                provider: Rc::new(NullProvider),
                relay_session: Some(json!({"connected": true, "accounts": ["0xabc"]})),
            })
        }
    }

    fn gateway(config: &AppConfig, backend: ConnectorBackend, cancel: bool) -> (ProviderGateway, MemoryStorage, Rc<ScriptedModal>) {
        let storage = MemoryStorage::new();
        let modal = Rc::new(ScriptedModal { backend, cancel, hints: RefCell::new(Vec::new()) });
        (ProviderGateway::new(config, modal.clone(), Rc::new(storage.clone())), storage, modal)
    }

    #[tokio::test]
    async fn remember_persists_generic_marker_after_open() {
        let (gw, storage, modal) = gateway(&AppConfig::default(), ConnectorBackend::Injected, false);
        assert!(!gw.has_cached_session());
        let selected = gw.open().await.unwrap();
        assert!(storage.is_empty());
        gw.remember(&selected);
        assert_eq!(storage.get(keys::CACHED_PROVIDER_KEY).unwrap().as_deref(), Some("\"injected\""));
        assert!(storage.get(keys::WALLETCONNECT_KEY).unwrap().is_none());
        assert_eq!(gw.cached_connector(), Some(ConnectorBackend::Injected));

        gw.open().await.unwrap();
        assert_eq!(*modal.hints.borrow(), vec![None, Some(ConnectorBackend::Injected)]);
    }

    #[tokio::test]
    async fn relay_backend_writes_both_markers_and_clear_removes_them() {
        let config = AppConfig::default().with_walletconnect("infura-key");
        let (gw, storage, _) = gateway(&config, ConnectorBackend::WalletConnect, false);
        let selected = gw.open().await.unwrap();
        gw.remember(&selected);
        assert!(storage.contains(keys::WALLETCONNECT_KEY).unwrap());
        assert!(gw.has_cached_session());

        gw.clear_cached_session();
        gw.clear_cached_session();
        assert!(storage.is_empty());
        assert!(!gw.has_cached_session());
    }

    #[tokio::test]
    async fn disabled_backend_and_cancellation_leave_storage_untouched() {
        let (gw, storage, _) = gateway(&AppConfig::default(), ConnectorBackend::WalletConnect, false);
        assert!(matches!(gw.open().await, Err(ConnectError::Failed(_))));
        assert!(storage.is_empty());

        let (gw, storage, _) = gateway(&AppConfig::default(), ConnectorBackend::Injected, true);
        assert!(matches!(gw.open().await, Err(ConnectError::UserCancelled)));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn caching_can_be_disabled() {
        let config = AppConfig::default().with_cache_provider(false);
        let (gw, storage, _) = gateway(&config, ConnectorBackend::Injected, false);
        let selected = gw.open().await.unwrap();
        gw.remember(&selected);
        assert!(storage.is_empty());
    }
}
