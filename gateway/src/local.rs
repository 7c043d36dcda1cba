//! Writable local map storage for static mode.
//!
//! Maps live in a flat key/value store: one JSON document per map under
//! `tileboard_map_{id}`, plus a listing under `tileboard_maps_list` kept
//! sorted by `metadata.modified`, newest first. The backing store is a
//! [`KeyValueStore`]: in memory, a directory of files, or the browser's
//! `localStorage`.

use std::cell::RefCell;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use canvas::doc::{MapDocument, MapListEntry};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clock::not_before;
use crate::error::StoreError;

pub const MAP_KEY_PREFIX: &str = "tileboard_map_";
pub const MAPS_LIST_KEY: &str = "tileboard_maps_list";

#[must_use]
pub fn map_key(id: &str) -> String {
    format!("{MAP_KEY_PREFIX}{id}")
}

// =============================================================================
// KeyValueStore
// =============================================================================

/// Synchronous string key/value storage.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Backend-specific read failure.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Backend-specific write failure.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Backend-specific write failure.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Process-local store. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `{key}.json` file per key in a directory. Writes go through a
/// temporary file and a rename so a crash never leaves a torn value.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    /// The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)?) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// `window.localStorage`.
#[cfg(feature = "web")]
#[derive(Debug, Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

#[cfg(feature = "web")]
impl BrowserStore {
    /// # Errors
    ///
    /// [`StoreError::Browser`] when there is no window or storage is disabled.
    pub fn from_window() -> Result<Self, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Browser("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Browser("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

#[cfg(feature = "web")]
fn js_error(value: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Browser(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

#[cfg(feature = "web")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

// =============================================================================
// LocalMapStore
// =============================================================================

/// Map documents and their listing on top of a [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct LocalMapStore<S> {
    store: S,
}

impl<S: KeyValueStore> LocalMapStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every listed map, newest first.
    ///
    /// # Errors
    ///
    /// Store read failure or a corrupt listing.
    pub fn entries(&self) -> Result<Vec<MapListEntry>, StoreError> {
        Ok(self.read_json(MAPS_LIST_KEY)?.unwrap_or_default())
    }

    /// Listed maps authored by `username`, newest first.
    ///
    /// # Errors
    ///
    /// Store read failure or a corrupt listing.
    pub fn user_entries(&self, username: &str) -> Result<Vec<MapListEntry>, StoreError> {
        Ok(self.entries()?.into_iter().filter(|e| e.is_authored_by(username)).collect())
    }

    /// The stored document `id`, only if `username` authored it.
    ///
    /// # Errors
    ///
    /// Store read failure or a corrupt document.
    pub fn get(&self, username: &str, id: &str) -> Result<Option<MapDocument>, StoreError> {
        let doc: Option<MapDocument> = self.read_json(&map_key(id))?;
        Ok(doc.filter(|d| d.is_authored_by(username)))
    }

    /// Save `doc` for `username`.
    ///
    /// Assigns an id from `fresh_id` when the document has none, stamps the
    /// author and sets `modified` to `now` (never earlier than the stored or
    /// supplied value). `created` is taken from the stored copy when there is
    /// one, else from `doc`, else `modified`. Returns the stored document.
    ///
    /// # Errors
    ///
    /// Store read/write failure.
    pub fn save(
        &self,
        username: &str,
        mut doc: MapDocument,
        now: String,
        fresh_id: impl FnOnce() -> String,
    ) -> Result<MapDocument, StoreError> {
        let id = match doc.id.take().filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => fresh_id(),
        };
        let stored: Option<MapDocument> = self.read_json(&map_key(&id))?;
        let (stored_created, stored_modified) = match stored {
            Some(d) => (d.metadata.created, d.metadata.modified),
            None => (None, None),
        };

        let modified = not_before(not_before(now, doc.metadata.modified.as_deref()), stored_modified.as_deref());
        doc.id = Some(id.clone());
        doc.metadata.author = Some(username.to_owned());
        doc.metadata.created = stored_created.or(doc.metadata.created.take()).or_else(|| Some(modified.clone()));
        doc.metadata.modified = Some(modified);

        self.write_json(&map_key(&id), &doc)?;

        let entry = MapListEntry { id: id.clone(), name: doc.name.clone(), metadata: doc.metadata.clone() };
        let mut list = self.entries()?;
        match list.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => list.push(entry),
        }
        list.sort_by(|a, b| b.modified().cmp(a.modified()));
        self.write_json(MAPS_LIST_KEY, &list)?;

        Ok(doc)
    }

    /// Remove `id` if `username` authored it. `false` when there was nothing
    /// of theirs to delete.
    ///
    /// # Errors
    ///
    /// Store read/write failure.
    pub fn delete(&self, username: &str, id: &str) -> Result<bool, StoreError> {
        if self.get(username, id)?.is_none() {
            return Ok(false);
        }
        self.store.remove(&map_key(id))?;
        let mut list = self.entries()?;
        list.retain(|e| e.id != id);
        self.write_json(MAPS_LIST_KEY, &list)?;
        Ok(true)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).map_err(|source| StoreError::Json { key: key.to_owned(), source })
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json { key: key.to_owned(), source })?;
        self.store.set(key, &raw)
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
