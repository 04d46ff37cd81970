//! Whole-node snapshot persistence under a single key.
//!
//! `KVStore` is a trait so the chain-lock-holding caller does not depend on
//! `sled` directly; `SledStore` is the embedded-database implementation used
//! in production, matching the storage engine used elsewhere in this
//! codebase.

use crate::error::{NodeError, Result};

pub mod sled_store;

pub use sled_store::SledStore;

/// Minimal key-value contract the node needs from its storage engine.
pub trait KVStore: Send + Sync {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
pub struct InMemoryStore {
    inner: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            inner: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[cfg(test)]
impl KVStore for InMemoryStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.inner
            .lock()
            .map_err(|e| NodeError::PersistenceFailure(e.to_string()))?
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .inner
            .lock()
            .map_err(|e| NodeError::PersistenceFailure(e.to_string()))?
            .get(key)
            .cloned())
    }
}
