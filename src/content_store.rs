//! The content store: single source of truth for page content overrides,
//! their change history, and the edit-mode flag.
//!
//! Every mutation re-serializes both maps and writes them back to durable
//! storage immediately. Storage failures are logged and remembered in
//! [`ContentStore::last_storage_error`]; they never surface as errors from
//! reads or writes, and the in-memory state stays authoritative.
//!
//! ```rust
//! use callistra_content_core::content_model::ContentPayload;
//! use callistra_content_core::content_store::ContentStore;
//!
//! let mut store = ContentStore::in_memory();
//! store.update_content("hero-title", ContentPayload::Text("Hello".into()), "hero")?;
//! store.update_content("hero-title", ContentPayload::Text("World".into()), "hero")?;
//!
//! let history = store.get_history(Some("hero-title"));
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].previous_content, ContentPayload::Text("Hello".into()));
//! # Ok::<(), callistra_content_core::error::ContentError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::content_model::{ContentHistory, ContentPayload, ContentType, EditableContent, HistoryAction};
use crate::error::{ContentError, StorageError};
use crate::history::HistoryLog;
use crate::lmdb_storage::LmdbStorage;
use crate::storage::{DurableStorage, MemoryStorage};

pub struct ContentStore {
    storage: Box<dyn DurableStorage>,
    config: StoreConfig,
    content: BTreeMap<String, EditableContent>,
    history: HistoryLog,
    edit_mode: bool,
    last_storage_error: Option<StorageError>,
}

impl ContentStore {
    /// Creates a store over `storage` and loads whatever it already holds.
    pub fn open<S: DurableStorage + 'static>(storage: S, config: StoreConfig) -> Self {
        let history = HistoryLog::with_capacity(config.history_capacity);
        let mut store = Self {
            storage: Box::new(storage),
            config,
            content: BTreeMap::new(),
            history,
            edit_mode: false,
            last_storage_error: None,
        };
        store.load_content();
        store
    }

    /// Opens (or creates) the LMDB environment named by `config.name`, sized
    /// by [`StoreConfig::lmdb_map_size`].
    pub fn open_lmdb(config: StoreConfig) -> Result<Self, StorageError> {
        let storage = LmdbStorage::init(&config.name, config.lmdb_map_size())?;
        Ok(Self::open(storage, config))
    }

    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new(), StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn get_content(&self, id: &str) -> Option<&EditableContent> {
        self.content.get(id)
    }

    /// Writes `content` as the new value of `id`.
    ///
    /// When `id` already has a value, a history record capturing the previous
    /// and new payloads is pushed first; the first write to a fresh id is not
    /// recorded. The entry is then overwritten and both maps are persisted.
    ///
    /// An empty `id` or `section` is refused up front as a caller precondition;
    /// it is the only input this method rejects.
    pub fn update_content(&mut self, id: &str, content: ContentPayload, section: &str) -> Result<(), ContentError> {
        if id.is_empty() {
            return Err(ContentError::EmptyId);
        }
        if section.is_empty() {
            return Err(ContentError::EmptySection);
        }

        let now = Utc::now();
        let kind = content.kind();

        if let Some(existing) = self.content.get(id) {
            let record = ContentHistory {
                id: Uuid::new_v4().to_string(),
                content_id: id.to_string(),
                kind,
                section: section.to_string(),
                action: HistoryAction::Update,
                previous_kind: existing.kind,
                previous_content: existing.content.clone(),
                new_content: content.clone(),
                timestamp: now,
                modified_by: self.config.modified_by.clone(),
            };
            self.history.push(record);
        }

        self.content.insert(
            id.to_string(),
            EditableContent {
                id: id.to_string(),
                kind,
                section: section.to_string(),
                content,
                last_modified: now,
                modified_by: self.config.modified_by.clone(),
            },
        );
        debug!("Content '{}' updated ({}, section '{}')", id, kind, section);

        self.save_changes();
        Ok(())
    }

    /// Untyped entry point: decodes `value` as `kind` (text when omitted)
    /// before delegating to [`update_content`](Self::update_content).
    pub fn update_content_value(
        &mut self,
        id: &str,
        value: JsonValue,
        section: &str,
        kind: Option<ContentType>,
    ) -> Result<(), ContentError> {
        let kind = kind.unwrap_or_default();
        let payload = ContentPayload::from_value(kind, value).inspect_err(|e| {
            warn!("Rejected update for '{}': {}", id, e);
        })?;
        self.update_content(id, payload, section)
    }

    /// Full history when `content_id` is `None`, otherwise the records of that
    /// id. Newest first in both cases.
    pub fn get_history(&self, content_id: Option<&str>) -> Vec<&ContentHistory> {
        match content_id {
            Some(content_id) => self.history.for_content(content_id).collect(),
            None => self.history.iter().collect(),
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn find_history_record(&self, record_id: &str) -> Option<&ContentHistory> {
        self.history.find(record_id)
    }

    /// Switches bindings between static and editable rendering. Writes are
    /// accepted in either mode.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        if self.edit_mode != enabled {
            info!("Edit mode {}", if enabled { "enabled" } else { "disabled" });
        }
        self.edit_mode = enabled;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Serializes the content map as `[id, entry]` pairs and the history as a
    /// plain array, then writes both keys.
    pub fn save_changes(&mut self) {
        let entries: Vec<(&String, &EditableContent)> = self.content.iter().collect();
        let content_json = serde_json::to_string(&entries);
        let history_json = serde_json::to_string(&self.history);

        let mut failure = None;
        match content_json {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(&self.config.content_key, &json) {
                    error!("Failed to save content to '{}': {}", self.config.content_key, e);
                    failure = Some(e);
                }
            }
            Err(e) => error!("Failed to serialize content: {}", e),
        }
        match history_json {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(&self.config.history_key, &json) {
                    error!("Failed to save history to '{}': {}", self.config.history_key, e);
                    failure = Some(e);
                }
            }
            Err(e) => error!("Failed to serialize history: {}", e),
        }
        self.last_storage_error = failure;
    }

    /// Re-reads both keys from durable storage. A key that is missing,
    /// unreadable or unparseable leaves its part of the in-memory state as it
    /// was (empty on a fresh store).
    pub fn load_content(&mut self) {
        self.last_storage_error = None;
        let content_key = self.config.content_key.clone();
        let history_key = self.config.history_key.clone();

        if let Some(json) = self.read_key(&content_key) {
            match serde_json::from_str::<Vec<(String, EditableContent)>>(&json) {
                Ok(entries) => {
                    self.content = entries.into_iter().collect();
                    info!("Loaded {} content entries", self.content.len());
                }
                Err(e) => error!("Failed to parse stored content: {}", e),
            }
        }

        if let Some(json) = self.read_key(&history_key) {
            match serde_json::from_str::<Vec<ContentHistory>>(&json) {
                Ok(records) => {
                    self.history = HistoryLog::from_records(records, self.config.history_capacity);
                    info!("Loaded {} history records", self.history.len());
                }
                Err(e) => error!("Failed to parse stored history: {}", e),
            }
        }
    }

    fn read_key(&mut self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to read '{}': {}", key, e);
                self.last_storage_error = Some(e);
                None
            }
        }
    }

    /// Deletes both keys and drops all in-memory content and history, so
    /// every binding falls back to its default.
    pub fn reset(&mut self) {
        let keys = [self.config.content_key.clone(), self.config.history_key.clone()];
        self.last_storage_error = None;
        for key in &keys {
            if let Err(e) = self.storage.remove_item(key) {
                error!("Failed to remove '{}': {}", key, e);
                self.last_storage_error = Some(e);
            }
        }
        self.content.clear();
        self.history.clear();
        self.edit_mode = false;
        info!("Content store reset");
    }

    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    pub fn entries(&self) -> impl Iterator<Item = &EditableContent> {
        self.content.values()
    }

    pub fn content_ids(&self) -> impl Iterator<Item = &str> {
        self.content.keys().map(String::as_str)
    }

    pub fn sections(&self) -> BTreeSet<&str> {
        self.content.values().map(|entry| entry.section.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Hands the backend back, e.g. to reopen it as after a page reload.
    pub fn into_storage(self) -> Box<dyn DurableStorage> {
        self.storage
    }
}
