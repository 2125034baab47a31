//! `localStorage` backend for the engine's key/value persistence.
use lifegoal_game::KeyValueStore;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::dom::{js_error_message, local_storage};

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<JsValue> for WebStorageError {
    fn from(value: JsValue) -> Self {
        Self::Storage(js_error_message(&value))
    }
}

/// Browser `localStorage`. Values written here are visible to every tab on
/// the same origin; the last write wins.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// # Errors
    ///
    /// Returns an error when `localStorage` is not available.
    pub fn new() -> Result<Self, WebStorageError> {
        Ok(Self {
            storage: local_storage()?,
        })
    }

    #[must_use]
    pub const fn from_storage(storage: Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for LocalStorageStore {
    type Error = WebStorageError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.storage.get_item(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        Ok(self.storage.set_item(key, value)?)
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        Ok(self.storage.remove_item(key)?)
    }
}
