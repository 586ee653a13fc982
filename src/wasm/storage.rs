//! LocalStorage: `window.localStorage` behind `KeyValueStorage`

use super::js_message;
use crate::error::StorageError;
use crate::storage::KeyValueStorage;

#[derive(Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError(js_message(&e)))?
            .ok_or_else(|| StorageError("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError(js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|e| StorageError(js_message(&e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(|e| StorageError(js_message(&e)))
    }
}
