//! Persistent configuration store
//!
//! `ConfigStore` is a typed CRUD facade over a [`StorageMedium`]: payloads go
//! in and come out as serde types, the medium only ever sees JSON strings.
//! Every operation is fail-soft - a medium fault degrades to `false` /
//! `None` / no-op with a diagnostic log, and never reaches the caller as an
//! error. A broken disk must not take the setup UI down with it.

mod medium;
mod value;

pub use medium::{
    default_store_path, store_path_in, FileMedium, MediumError, MemoryMedium, StorageMedium,
};
pub use value::StoredValue;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Store key for the API key entry
pub const KEY_API_KEY: &str = "apiKey";
/// Store key for the selected model entry
pub const KEY_MODEL: &str = "model";

pub struct ConfigStore<M> {
    medium: M,
}

impl<M: StorageMedium> ConfigStore<M> {
    pub fn new(medium: M) -> Self {
        Self { medium }
    }

    /// True iff the medium holds a value for `key`. A lookup fault reads as
    /// absent.
    pub fn has(&self, key: &str) -> bool {
        match self.medium.get(key) {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                tracing::warn!("Lookup for '{}' failed, treating as absent: {}", key, e);
                false
            }
        }
    }

    /// Serialize `value` and write it under `key`, overwriting any previous
    /// entry. On serialization or write fault the operation is abandoned and
    /// the previous entry is left untouched.
    pub fn create<T: Serialize>(&mut self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize value for '{}': {}", key, e);
                return;
            }
        };
        if let Err(e) = self.medium.set(key, &raw) {
            tracing::warn!("Failed to write '{}': {}", key, e);
        }
    }

    /// Read and deserialize the entry under `key`. Missing key, medium fault,
    /// and malformed payload all read as `None`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read '{}': {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Stored entry for '{}' is malformed: {}", key, e);
                None
            }
        }
    }

    /// Patch the existing entry under `key`. Returns false if the key is
    /// absent - update never creates. Record patches over record entries
    /// merge shallowly; any other shape pairing replaces the entry (see
    /// [`StoredValue::apply`]).
    pub fn update<T: Serialize>(&mut self, key: &str, partial: &T) -> bool {
        let current: Value = match self.read(key) {
            Some(value) => value,
            None => return false,
        };
        let patch = match serde_json::to_value(partial) {
            Ok(patch) => patch,
            Err(e) => {
                tracing::warn!("Failed to serialize patch for '{}': {}", key, e);
                return false;
            }
        };
        let merged = StoredValue::classify(current).apply(StoredValue::classify(patch));
        let raw = match serde_json::to_string(&merged) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to serialize merged value for '{}': {}", key, e);
                return false;
            }
        };
        match self.medium.set(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to write '{}': {}", key, e);
                false
            }
        }
    }

    /// Remove `key`. Removing an absent key is a no-op, not an error.
    pub fn delete(&mut self, key: &str) {
        if let Err(e) = self.medium.remove(key) {
            tracing::warn!("Failed to remove '{}': {}", key, e);
        }
    }

    /// Remove every entry from the medium
    pub fn clear(&mut self) {
        if let Err(e) = self.medium.clear() {
            tracing::warn!("Failed to clear store: {}", e);
        }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }
}
