//! Map service: one JSON file per map under each user's directory.
//!
//! DESIGN
//! ======
//! `{users_dir}/{user}/maps/{id}.json`. The file stem is authoritative for
//! the id, so a document whose `id` field drifted is still listed under the
//! name it is stored as. Writes go through a temporary file and a rename.
//!
//! ERROR HANDLING
//! ==============
//! Unreadable or malformed files are skipped (and logged) when listing, but
//! surface as errors when addressed directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::consts::MAP_ID_PREFIX;
use canvas::doc::MapDocument;
use gateway::catalog::is_plain_segment;
use gateway::clock::{Clock, SystemClock, not_before, timestamp};
use tracing::{info, warn};

const MAPS_SUBDIR: &str = "maps";
const MAP_ID_HEX_LEN: usize = 12;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map not found: {0}")]
    NotFound(String),
    /// A user name or map id that cannot be used as a path segment.
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),
    #[error("map storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("map file is not a valid document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct MapStore {
    users_dir: PathBuf,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl std::fmt::Debug for MapStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapStore").field("users_dir", &self.users_dir).finish_non_exhaustive()
    }
}

impl MapStore {
    #[must_use]
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self { users_dir: users_dir.into(), clock: Arc::new(SystemClock) }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Every map of `username`, newest first.
    ///
    /// # Errors
    ///
    /// Invalid user name, or the maps directory exists but cannot be listed.
    pub async fn list(&self, username: &str) -> Result<Vec<MapDocument>, MapError> {
        let dir = self.maps_dir(username)?;
        let mut maps = read_maps_dir(&dir).await?;
        sort_newest_first(&mut maps);
        Ok(maps)
    }

    /// Every map of every user, newest first.
    ///
    /// # Errors
    ///
    /// The users directory exists but cannot be listed.
    pub async fn list_all(&self) -> Result<Vec<MapDocument>, MapError> {
        let mut maps = Vec::new();
        for user_dir in list_dirs(&self.users_dir).await? {
            maps.extend(read_maps_dir(&user_dir.join(MAPS_SUBDIR)).await?);
        }
        sort_newest_first(&mut maps);
        Ok(maps)
    }

    /// # Errors
    ///
    /// [`MapError::NotFound`] when the file does not exist.
    pub async fn get(&self, username: &str, id: &str) -> Result<MapDocument, MapError> {
        let path = self.map_path(username, id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(MapError::NotFound(id.to_owned())),
            Err(e) => return Err(e.into()),
        };
        let mut doc: MapDocument = serde_json::from_str(&raw)?;
        doc.id = Some(id.to_owned());
        Ok(doc)
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Store a new map. Keeps a usable supplied id, otherwise assigns
    /// `map_{12 hex}`. Stamps author, `created` and `modified`.
    ///
    /// # Errors
    ///
    /// Invalid user name or supplied id, or a write failure.
    pub async fn create(&self, username: &str, mut doc: MapDocument) -> Result<MapDocument, MapError> {
        let id = match doc.id.take().filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => new_map_id(),
        };
        let path = self.map_path(username, &id)?;
        let now = timestamp(self.clock.now());

        doc.id = Some(id.clone());
        doc.metadata.author = Some(username.to_owned());
        doc.metadata.created = Some(now.clone());
        doc.metadata.modified = Some(now);

        write_doc(&path, &doc).await?;
        info!(user = %username, map_id = %id, "map created");
        Ok(doc)
    }

    /// Replace an existing map's content. The stored metadata is kept
    /// (including `created`); `modified` and `author` are refreshed.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`] when there is no such map, or a write failure.
    pub async fn update(&self, username: &str, id: &str, mut doc: MapDocument) -> Result<MapDocument, MapError> {
        let existing = self.get(username, id).await?;
        let path = self.map_path(username, id)?;
        let now = timestamp(self.clock.now());

        doc.id = Some(id.to_owned());
        doc.metadata = existing.metadata;
        doc.metadata.modified = Some(not_before(now, doc.metadata.modified.as_deref()));
        doc.metadata.author = Some(username.to_owned());

        write_doc(&path, &doc).await?;
        Ok(doc)
    }

    /// # Errors
    ///
    /// [`MapError::NotFound`] when there is no such map.
    pub async fn delete(&self, username: &str, id: &str) -> Result<(), MapError> {
        let path = self.map_path(username, id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(user = %username, map_id = %id, "map deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MapError::NotFound(id.to_owned())),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // PATHS
    // =========================================================================

    fn maps_dir(&self, username: &str) -> Result<PathBuf, MapError> {
        if !is_plain_segment(username) {
            return Err(MapError::InvalidSegment(username.to_owned()));
        }
        Ok(self.users_dir.join(username).join(MAPS_SUBDIR))
    }

    fn map_path(&self, username: &str, id: &str) -> Result<PathBuf, MapError> {
        if !is_plain_segment(id) {
            return Err(MapError::InvalidSegment(id.to_owned()));
        }
        Ok(self.maps_dir(username)?.join(format!("{id}.json")))
    }
}

/// `map_` followed by the first 12 hex digits of a v4 UUID.
#[must_use]
pub fn new_map_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{MAP_ID_PREFIX}_{}", &hex[..MAP_ID_HEX_LEN])
}

fn sort_newest_first(maps: &mut [MapDocument]) {
    maps.sort_by(|a, b| {
        let modified = |d: &MapDocument| d.metadata.modified.clone().unwrap_or_default();
        modified(b).cmp(&modified(a))
    });
}

/// Non-hidden subdirectories of `dir`; empty when `dir` does not exist.
pub(crate) async fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

async fn read_maps_dir(dir: &Path) -> Result<Vec<MapDocument>, MapError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut maps = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_none_or(|e| e != "json") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        match read_doc(&path).await {
            Ok(mut doc) => {
                doc.id = Some(stem);
                maps.push(doc);
            }
            Err(e) => warn!(error = %e, path = %path.display(), "skipping unreadable map file"),
        }
    }
    Ok(maps)
}

async fn read_doc(path: &Path) -> Result<MapDocument, MapError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn write_doc(path: &Path, doc: &MapDocument) -> Result<(), MapError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_string_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
