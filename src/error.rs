use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;

use crate::content_model::ContentType;

/// Failures of the durable storage layer.
///
/// These never reach callers of [`ContentStore`](crate::content_store::ContentStore)
/// mutations: the store logs them at the save/load boundary and keeps its
/// in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend cannot be reached at all.
    Unavailable,
    /// Writing would exceed the backend's capacity.
    QuotaExceeded,
    Backend(String),
    Io(String),
    /// Stored bytes are not valid UTF-8.
    Corrupt(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Storage unavailable"),
            StorageError::QuotaExceeded => write!(f, "Storage quota exceeded"),
            StorageError::Backend(msg) => write!(f, "Storage backend error: {}", msg),
            StorageError::Io(msg) => write!(f, "Storage IO error: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "Corrupt stored data: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<LmdbError> for StorageError {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::MapFull => StorageError::QuotaExceeded,
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for StorageError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

/// Rejections at the store boundary: caller contract and payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    EmptyId,
    EmptySection,
    UnknownType(String),
    ShapeMismatch { kind: ContentType, reason: String },
}

impl Display for ContentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::EmptyId => write!(f, "Content id must not be empty"),
            ContentError::EmptySection => write!(f, "Section must not be empty"),
            ContentError::UnknownType(name) => write!(f, "Unknown content type '{}'", name),
            ContentError::ShapeMismatch { kind, reason } => {
                write!(f, "Payload does not match type '{}': {}", kind, reason)
            }
        }
    }
}

impl std::error::Error for ContentError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// Editing was requested while the store is not in edit mode.
    EditModeOff,
    /// Commit or draft operation without an active edit.
    NotEditing,
    InvalidSelection { start: usize, end: usize },
    ItemNotFound(String),
    IndexOutOfRange(usize),
    InvalidImage(String),
    Content(ContentError),
}

impl Display for BindingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingError::EditModeOff => write!(f, "Edit mode is not active"),
            BindingError::NotEditing => write!(f, "No edit in progress"),
            BindingError::InvalidSelection { start, end } => {
                write!(f, "Invalid selection {}..{}", start, end)
            }
            BindingError::ItemNotFound(id) => write!(f, "No item with id '{}' in draft", id),
            BindingError::IndexOutOfRange(index) => write!(f, "Index {} out of range", index),
            BindingError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            BindingError::Content(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for BindingError {}

impl From<ContentError> for BindingError {
    fn from(err: ContentError) -> Self {
        BindingError::Content(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateId { id: String, first_section: String },
    Content(ContentError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateId { id, first_section } => write!(
                f,
                "Content id '{}' is already bound in section '{}'",
                id, first_section
            ),
            RegistryError::Content(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<ContentError> for RegistryError {
    fn from(err: ContentError) -> Self {
        RegistryError::Content(err)
    }
}

#[derive(Debug)]
pub enum AuditError {
    RecordNotFound(String),
    Content(ContentError),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::RecordNotFound(id) => write!(f, "No history record with id '{}'", id),
            AuditError::Content(err) => write!(f, "{}", err),
            AuditError::Serialization(err) => write!(f, "Export serialization error: {}", err),
            AuditError::Io(err) => write!(f, "Export IO error: {}", err),
        }
    }
}

impl std::error::Error for AuditError {}

impl From<ContentError> for AuditError {
    fn from(err: ContentError) -> Self {
        AuditError::Content(err)
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization(err)
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err)
    }
}
