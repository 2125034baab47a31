//! Key/value persistence shaped like browser `localStorage`.
//!
//! One JSON document per feature per user, keyed `lifegoal.<feature>.<user>`.
//! Reads never fail the caller: missing or malformed documents fall back to
//! defaults with a warning. There is no schema versioning and no cross-tab
//! coordination; the last writer wins.
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use crate::constants::STORAGE_PREFIX;

/// Platform-specific string store. Implementations use interior
/// mutability, matching the browser API.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (quota, access).
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot remove the key.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFeature {
    Currency,
    Gold,
    RewardLog,
    LuckyRoll,
    Pomodoro,
    Journal,
    Wheel,
    Campaign,
}

impl StorageFeature {
    pub const ALL: [Self; 8] = [
        Self::Currency,
        Self::Gold,
        Self::RewardLog,
        Self::LuckyRoll,
        Self::Pomodoro,
        Self::Journal,
        Self::Wheel,
        Self::Campaign,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Gold => "gold",
            Self::RewardLog => "reward-log",
            Self::LuckyRoll => "lucky-roll",
            Self::Pomodoro => "pomodoro",
            Self::Journal => "journal",
            Self::Wheel => "wheel",
            Self::Campaign => "campaign",
        }
    }
}

impl fmt::Display for StorageFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn storage_key(feature: StorageFeature, user_id: &str) -> String {
    format!("{STORAGE_PREFIX}.{feature}.{}", user_id.trim())
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load a document, falling back to `fallback()` on any failure.
pub fn load_or_else<S, T, F>(store: &S, key: &str, fallback: F) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.get_item(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("discarding malformed document {key}: {err}");
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(err) => {
            warn!("could not read {key}: {err}");
            fallback()
        }
    }
}

pub fn load_or_default<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore,
    T: DeserializeOwned + Default,
{
    load_or_else(store, key, T::default)
}

/// Serialize and write a document.
///
/// # Errors
///
/// Returns a [`StorageError`] when serialization or the backend write fails.
pub fn save<S, T>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store
        .set_item(key, &json)
        .map_err(|err| StorageError::Backend(err.to_string()))
}

/// [`save`] that logs failures instead of returning them.
pub fn save_quietly<S, T>(store: &S, key: &str, value: &T)
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    if let Err(err) = save(store, key, value) {
        warn!("could not persist {key}: {err}");
    }
}

/// In-memory store for native use and tests. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
