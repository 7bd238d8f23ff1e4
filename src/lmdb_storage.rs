use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::error::StorageError;
use crate::storage::DurableStorage;

/// LMDB-backed durable storage. Each storage key is one LMDB key in the
/// unnamed database of an environment living in `<name>.lmdb`.
pub struct LmdbStorage {
    env: Option<Environment>,
    db: Database,
    path: PathBuf,
}

impl LmdbStorage {
    pub fn init(name: &str, map_size: usize) -> Result<Self, StorageError> {
        let path = PathBuf::from(format!("{name}.lmdb"));
        std::fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_map_size(map_size)
            .set_max_dbs(1)
            .open(&path)?;
        let db = env.create_db(None, DatabaseFlags::empty())?;

        info!("LMDB environment opened at {}", path.display());
        Ok(Self {
            env: Some(env),
            db,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn env(&self) -> Result<&Environment, StorageError> {
        self.env.as_ref().ok_or(StorageError::Unavailable)
    }

    /// Removes every key from the environment.
    pub fn clear_all_records(&mut self) -> Result<(), StorageError> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.clear_db(self.db)?;
        txn.commit()?;
        Ok(())
    }

    /// Flushes to disk and releases the environment. Later operations fail
    /// with [`StorageError::Unavailable`].
    pub fn close_database(&mut self) -> Result<(), StorageError> {
        match self.env.take() {
            Some(env) => {
                if let Err(e) = env.sync(true) {
                    warn!("LMDB sync before close failed: {e}");
                }
                info!("LMDB environment at {} closed", self.path.display());
                Ok(())
            }
            None => {
                debug!("LMDB environment at {} already closed", self.path.display());
                Ok(())
            }
        }
    }
}

impl DurableStorage for LmdbStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let env = self.env()?;
        let txn = env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8(bytes.to_vec())?),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }
}

impl Drop for LmdbStorage {
    fn drop(&mut self) {
        if let Err(e) = self.close_database() {
            warn!("Failed to close LMDB environment: {e}");
        }
    }
}
