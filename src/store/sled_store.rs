use crate::error::{NodeError, Result};
use crate::store::KVStore;

/// An embedded `sled`-backed key-value store. Opened once at a configured
/// path and kept open for the node's lifetime.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self> {
        let db = sled::open(path).map_err(|e| NodeError::PersistenceFailure(e.to_string()))?;
        Ok(SledStore { db })
    }
}

impl KVStore for SledStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.db
            .insert(key, bytes)
            .map_err(|e| NodeError::PersistenceFailure(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| NodeError::PersistenceFailure(e.to_string()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map(|opt| opt.map(|ivec| ivec.to_vec()))
            .map_err(|e| NodeError::PersistenceFailure(e.to_string()))
    }
}
