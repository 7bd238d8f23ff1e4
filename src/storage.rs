//! Durable key/value storage used by the content store.
//!
//! The store only needs the three operations a browser's local storage
//! offers, so backends implement [`DurableStorage`]:
//!
//! - [`LmdbStorage`](crate::lmdb_storage::LmdbStorage) keeps the data in an
//!   LMDB environment on disk.
//! - [`MemoryStorage`] keeps it in a shared in-memory map. Clones share the
//!   same map, the way two tabs share one origin's storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

pub trait DurableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: DurableStorage + ?Sized> DurableStorage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Default)]
struct MemoryArea {
    items: HashMap<String, String>,
    quota: Option<usize>,
    unavailable: bool,
}

impl MemoryArea {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    area: Arc<Mutex<MemoryArea>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::default();
        storage.set_quota(Some(bytes));
        storage
    }

    pub fn set_quota(&self, bytes: Option<usize>) {
        if let Ok(mut area) = self.area.lock() {
            area.quota = bytes;
        }
    }

    /// Simulates storage being switched off (private browsing, disabled
    /// storage): every operation fails with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut area) = self.area.lock() {
            area.unavailable = unavailable;
        }
    }

    pub fn len(&self) -> usize {
        self.area.lock().map(|area| area.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let area = self.area.lock().map_err(|_| StorageError::Unavailable)?;
        if area.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(area.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut area = self.area.lock().map_err(|_| StorageError::Unavailable)?;
        if area.unavailable {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = area.quota {
            if area.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        area.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut area = self.area.lock().map_err(|_| StorageError::Unavailable)?;
        if area.unavailable {
            return Err(StorageError::Unavailable);
        }
        area.items.remove(key);
        Ok(())
    }
}
