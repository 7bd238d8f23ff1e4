//! # Callistra Content Core
//!
//! The content-editing core of the Callistra landing page: a store of
//! per-region content overrides with a bounded change history, persisted in
//! LMDB, plus the editable bindings and audit views built on top of it.
//!
//! ## Features
//!
//! - **Content store**: one override per content id, falling back to the
//!   default authored in the page when absent
//! - **Change history**: newest-first, bounded (100 records by default),
//!   filterable per content id, exportable and revertible
//! - **Typed payloads**: text, rich text, images, pricing plans, testimonials,
//!   statistics and contact methods, shape-checked when stored
//! - **Best-effort durability**: storage failures are logged, never thrown
//! - **FFI surface**: C-compatible functions answering with JSON envelopes
//!
//! ## Quick Start
//!
//! ```rust
//! use callistra_content_core::binding::TextBinding;
//! use callistra_content_core::binding::View;
//! use callistra_content_core::content_store::ContentStore;
//!
//! let mut store = ContentStore::in_memory();
//! let mut title = TextBinding::new("hero-title", "hero", "Gestão jurídica".to_string());
//!
//! store.set_edit_mode(true);
//! title.start_edit(&store)?;
//! title.set_text("Gestão jurídica simplificada")?;
//! title.commit(&mut store)?;
//!
//! store.set_edit_mode(false);
//! assert_eq!(title.view(&store), View::Static("Gestão jurídica simplificada".to_string()));
//! # Ok::<(), callistra_content_core::error::BindingError>(())
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] / [`create_store_with_config`] - Open a store
//! - [`get_content`] - Current value of a content id
//! - [`update_content`] - Write a value (`{"id","section","type","content"}`)
//! - [`get_history`] - History, optionally for one content id
//! - [`set_edit_mode`] / [`is_edit_mode`] - Edit mode flag
//! - [`save_changes`] / [`load_content`] - Explicit persistence and re-sync
//! - [`export_history`] - Write the history export file
//! - [`revert_change`] - Re-apply the previous value of a history record
//! - [`reset_store`] - Remove all stored content and history
//! - [`close_store`] - Release the store
//! - [`free_response`] - Release a string returned by this library

pub mod app_response;
pub mod audit;
pub mod binding;
pub mod collection;
pub mod config;
pub mod content_model;
pub mod content_store;
pub mod error;
pub mod history;
pub mod image;
pub mod lmdb_storage;
pub mod registry;
pub mod rich_text;
pub mod storage;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;

use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::content_model::ContentType;
use crate::content_store::ContentStore;

/// Body accepted by [`update_content`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest {
    id: String,
    section: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    content: JsonValue,
}

/// Opens a store backed by the LMDB environment `<name>.lmdb`, loading any
/// content already saved there.
///
/// Returns a null pointer when `name` is null or not UTF-8, or when the
/// environment cannot be opened. The pointer must be released with
/// [`close_store`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use callistra_content_core::create_store;
///
/// let name = CString::new("landing_content").unwrap();
/// let store = create_store(name.as_ptr());
/// assert!(!store.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut ContentStore {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_store(StoreConfig::named(name_str))
}

/// Like [`create_store`], with a JSON [`StoreConfig`] document.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store_with_config(config_ptr: *const c_char) -> *mut ContentStore {
    if config_ptr.is_null() {
        warn!("Null config pointer passed to create_store_with_config");
        return std::ptr::null_mut();
    }

    let config_str = match unsafe { CStr::from_ptr(config_ptr).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match StoreConfig::from_json(config_str) {
        Ok(config) => open_store(config),
        Err(e) => {
            warn!("Invalid store config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_store(config: StoreConfig) -> *mut ContentStore {
    info!("Opening content store at: {}.lmdb", config.name);
    match ContentStore::open_lmdb(config) {
        Ok(store) => {
            info!("Content store opened with {} entries", store.len());
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("Failed to open content store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns the stored [`EditableContent`](content_model::EditableContent)
/// for `id` as JSON, or `NotFound` when the region still uses its default.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_content(store: *mut ContentStore, id: *const c_char) -> *const c_char {
    let store = match store_ref(store, "get_content") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match store.get_content(&id_str) {
        Some(entry) => response_to_c_string(&AppResponse::json(entry)),
        None => {
            let not_found = AppResponse::NotFound(format!("No content stored for id: {id_str}"));
            response_to_c_string(&not_found)
        }
    }
}

/// Writes a value. Expected JSON:
///
/// ```json
/// { "id": "hero-title", "section": "hero", "type": "text", "content": "Hello" }
/// ```
///
/// `type` defaults to `text`. A payload that does not match `type` is
/// answered with `ValidationError` and nothing is written.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_content(store: *mut ContentStore, json_ptr: *const c_char) -> *const c_char {
    let store = match store_mut(store, "update_content") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(error_ptr) => return error_ptr,
    };

    let request: UpdateRequest = match serde_json::from_str(&json_str) {
        Ok(request) => request,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let kind = match request.kind.as_deref().map(str::parse::<ContentType>).transpose() {
        Ok(kind) => kind,
        Err(e) => return response_to_c_string(&AppResponse::from(e)),
    };

    if let Err(e) = store.update_content_value(&request.id, request.content, &request.section, kind) {
        return response_to_c_string(&AppResponse::from(e));
    }

    match store.get_content(&request.id) {
        Some(entry) => response_to_c_string(&AppResponse::json(entry)),
        None => response_to_c_string(&AppResponse::success("Content updated")),
    }
}

/// History as a JSON array, newest first. A null `content_id` returns the
/// whole log.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_history(store: *mut ContentStore, content_id: *const c_char) -> *const c_char {
    let store = match store_ref(store, "get_history") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    let filter = if content_id.is_null() {
        None
    } else {
        match c_ptr_to_string(content_id, "content_id") {
            Ok(id) => Some(id),
            Err(error_ptr) => return error_ptr,
        }
    };

    let records = store.get_history(filter.as_deref());
    response_to_c_string(&AppResponse::json(&records))
}

/// Switches bindings between static and editable rendering.
///
/// # Parameters
///
/// * `store` - Pointer returned by [`create_store`]
/// * `enabled` - New edit-mode flag; setting the current value again is a no-op
///
/// # Returns
///
/// `Ok("Edit mode: <enabled>")`, or `BadRequest` for a null store. The flag is
/// not persisted and starts `false` on every open.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use callistra_content_core::{create_store, free_response, is_edit_mode, set_edit_mode};
///
/// let name = CString::new("landing_content").unwrap();
/// let store = create_store(name.as_ptr());
/// free_response(set_edit_mode(store, true));
/// assert!(is_edit_mode(store));
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn set_edit_mode(store: *mut ContentStore, enabled: bool) -> *const c_char {
    let store = match store_mut(store, "set_edit_mode") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    store.set_edit_mode(enabled);
    response_to_c_string(&AppResponse::success(format!("Edit mode: {enabled}")))
}

/// `false` for a null store.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn is_edit_mode(store: *mut ContentStore) -> bool {
    match unsafe { store.as_ref() } {
        Some(store) => store.is_edit_mode(),
        None => false,
    }
}

/// Persists both maps. Answers `DatabaseError` when the write failed; the
/// in-memory state is unaffected either way.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_changes(store: *mut ContentStore) -> *const c_char {
    let store = match store_mut(store, "save_changes") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    store.save_changes();
    match store.last_storage_error() {
        Some(e) => response_to_c_string(&AppResponse::from(e.clone())),
        None => response_to_c_string(&AppResponse::success("Changes saved")),
    }
}

/// Re-reads content and history from LMDB into the store.
///
/// # Parameters
///
/// * `store` - Pointer returned by [`create_store`]
///
/// # Returns
///
/// `Ok("Loaded <n> entries")`, or `DatabaseError` when a key could not be
/// read. A key that is missing or does not parse leaves that part of the
/// in-memory state unchanged.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_content(store: *mut ContentStore) -> *const c_char {
    let store = match store_mut(store, "load_content") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    store.load_content();
    match store.last_storage_error() {
        Some(e) => response_to_c_string(&AppResponse::from(e.clone())),
        None => response_to_c_string(&AppResponse::success(format!("Loaded {} entries", store.len()))),
    }
}

/// Writes `callistra-content-<date>.json` into `dir_ptr` and answers with the
/// file path.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_history(store: *mut ContentStore, dir_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(store, "export_history") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    let dir = match c_ptr_to_string(dir_ptr, "directory") {
        Ok(dir) => dir,
        Err(error_ptr) => return error_ptr,
    };

    let written = audit::export_history(store, Utc::now()).and_then(|export| export.write_to(Path::new(&dir)));
    match written {
        Ok(path) => response_to_c_string(&AppResponse::success(path.display().to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Writes the previous content of a history record back as a new update.
///
/// # Parameters
///
/// * `store` - Pointer returned by [`create_store`]
/// * `record_id` - Null-terminated id of a [`ContentHistory`](content_model::ContentHistory) record
///
/// # Returns
///
/// `Ok` when the value was re-applied (the revert is itself recorded in the
/// history), `NotFound` for an unknown record id, `BadRequest` for null or
/// non UTF-8 input.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn revert_change(store: *mut ContentStore, record_id: *const c_char) -> *const c_char {
    let store = match store_mut(store, "revert_change") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    let record_id = match c_ptr_to_string(record_id, "record_id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match audit::revert(store, &record_id) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!("Reverted record {record_id}"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes both storage keys and clears the store, returning every region to
/// its default.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_store(store: *mut ContentStore) -> *const c_char {
    let store = match store_mut(store, "reset_store") {
        Ok(store) => store,
        Err(error_ptr) => return error_ptr,
    };

    store.reset();
    match store.last_storage_error() {
        Some(e) => response_to_c_string(&AppResponse::from(e.clone())),
        None => response_to_c_string(&AppResponse::success("Content store reset")),
    }
}

/// Releases a store created by [`create_store`]. The pointer must not be used
/// afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(store: *mut ContentStore) -> *const c_char {
    if store.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let store = unsafe { Box::from_raw(store) };
    drop(store);
    response_to_c_string(&AppResponse::success("Content store closed"))
}

/// Releases a string returned by any function of this library.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

fn store_ref<'a>(store: *mut ContentStore, operation: &str) -> Result<&'a ContentStore, *const c_char> {
    match unsafe { store.as_ref() } {
        Some(store) => Ok(store),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {operation}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn store_mut<'a>(store: *mut ContentStore, operation: &str) -> Result<&'a mut ContentStore, *const c_char> {
    match unsafe { store.as_mut() } {
        Some(store) => Ok(store),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {operation}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
