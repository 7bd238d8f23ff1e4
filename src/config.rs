use serde::{Deserialize, Serialize};

pub const CONTENT_KEY: &str = "callistra-content";
pub const HISTORY_KEY: &str = "callistra-content-history";
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_MODIFIED_BY: &str = "user";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Room for the JSON fields around one stored payload.
const ENTRY_OVERHEAD_BYTES: usize = 1024;

/// Settings for a [`ContentStore`](crate::content_store::ContentStore) and its
/// LMDB backend. Every field has a default, so a partial JSON document is
/// enough:
///
/// ```rust
/// use callistra_content_core::config::StoreConfig;
///
/// let config = StoreConfig::from_json(r#"{"name": "landing", "historyCapacity": 20}"#)?;
/// assert_eq!(config.history_capacity, 20);
/// assert_eq!(config.content_key, "callistra-content");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Path stem of the LMDB environment; the directory is `<name>.lmdb`.
    pub name: String,
    pub content_key: String,
    pub history_key: String,
    pub history_capacity: usize,
    /// Actor recorded in `modifiedBy`. There is no authentication behind it.
    pub modified_by: String,
    /// Lower bound for the LMDB map size; see [`StoreConfig::lmdb_map_size`].
    pub map_size: usize,
    pub max_image_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "callistra_content".to_string(),
            content_key: CONTENT_KEY.to_string(),
            history_key: HISTORY_KEY.to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            modified_by: DEFAULT_MODIFIED_BY.to_string(),
            map_size: DEFAULT_MAP_SIZE,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl StoreConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// LMDB map size that fits the worst case: every history record holding
    /// two maximum-size images as base64 plus the live entry, twice over
    /// because LMDB keeps the old pages of a key until its write commits.
    /// Never below `map_size`.
    pub fn lmdb_map_size(&self) -> usize {
        let encoded_image = self.max_image_bytes.div_ceil(3).saturating_mul(4) + ENTRY_OVERHEAD_BYTES;
        let images = self.history_capacity.saturating_mul(2).saturating_add(1);
        let needed = encoded_image.saturating_mul(images).saturating_mul(2);
        self.map_size.max(needed)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
