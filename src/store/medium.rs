//! Storage mediums - where serialized configuration actually lives
//!
//! A medium is a synchronous, string-keyed map of opaque strings. The JSON
//! encoding of payloads is `ConfigStore`'s business, not the medium's.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

use crate::error::{Result, SetupError};

const CONFIG_DIR: &str = "eleven-setup";
const STORE_FILE: &str = "store.json";

#[derive(Error, Debug)]
pub enum MediumError {
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Synchronous key-value access to a persistent medium.
///
/// Implementations report faults; they never swallow them. Degrading a fault
/// to a safe default is the caller's contract (`ConfigStore`), so the same
/// medium stays usable behind stricter callers.
pub trait StorageMedium {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, MediumError>;
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), MediumError>;
    fn remove(&mut self, key: &str) -> std::result::Result<(), MediumError>;
    fn clear(&mut self) -> std::result::Result<(), MediumError>;
}

/// Resolve the default on-disk store path under the platform config dir
pub fn default_store_path() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(CONFIG_DIR).join(STORE_FILE))
        .ok_or(SetupError::ConfigDirUnavailable)
}

/// Store path inside an explicitly chosen config directory
pub fn store_path_in(dir: &Path) -> PathBuf {
    dir.join(STORE_FILE)
}

/// File-backed medium: a single JSON object file, key -> raw entry string.
///
/// Every operation round-trips the whole file. That is deliberate: the store
/// is tiny and shared across short-lived processes, so rereading on each
/// access keeps concurrent writers at plain last-write-wins without any
/// cached state going stale.
pub struct FileMedium {
    path: PathBuf,
}

impl FileMedium {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> std::result::Result<BTreeMap<String, String>, MediumError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn persist(
        &self,
        entries: &BTreeMap<String, String>,
    ) -> std::result::Result<(), MediumError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl StorageMedium for FileMedium {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, MediumError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), MediumError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), MediumError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> std::result::Result<(), MediumError> {
        if self.path.exists() {
            self.persist(&BTreeMap::new())?;
        }
        Ok(())
    }
}

/// In-process medium for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryMedium {
    entries: BTreeMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries, for assertions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageMedium for MemoryMedium {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, MediumError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), MediumError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), MediumError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> std::result::Result<(), MediumError> {
        self.entries.clear();
        Ok(())
    }
}
