//! Client-side key/value persistence.
//!
//! The browser build backs `KeyValueStore` with `localStorage`; tests and the
//! backend use `MemoryStore`. Reads and writes of JSON documents go through
//! `load_json` / `save_json`, which log and swallow failures: losing a saved
//! preference must never block the dashboard.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DashboardError;

/// Minimal string store with the semantics of the Web Storage API.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashboardError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError>;
    fn remove(&self, key: &str) -> Result<(), DashboardError>;
}

/// In-process store used by tests and non-browser callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DashboardError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DashboardError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, DashboardError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DashboardError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DashboardError> {
        (**self).remove(key)
    }
}

/// Reads and deserializes `key`. Missing, unreadable or malformed entries
/// all yield `None`.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("failed to read {}: {}", key, err);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("discarding malformed {}: {}", key, err);
            None
        }
    }
}

/// Serializes and writes `value` under `key`, logging any failure.
pub fn save_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) {
    let written = serde_json::to_string(value)
        .map_err(|e| DashboardError::Storage(e.to_string()))
        .and_then(|raw| store.set(key, &raw));
    if let Err(err) = written {
        warn!("failed to save {}: {}", key, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_entries_load_as_none() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        assert_eq!(load_json::<Vec<u8>>(&store, "k"), None);
        assert_eq!(load_json::<Vec<u8>>(&store, "missing"), None);
    }

    #[test]
    fn json_round_trips_through_the_store() {
        let store = MemoryStore::new();
        save_json(&store, "k", &vec![1u8, 2, 3]);
        assert_eq!(load_json::<Vec<u8>>(&store, "k"), Some(vec![1, 2, 3]));
    }
}
