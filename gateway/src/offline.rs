//! Static-mode gateway: pre-generated indexes plus a writable local store.
//!
//! Reads merge two origins. Published content comes from a read-only
//! [`StaticSource`] (`packs-index.json`, `maps-index.json`, `maps/{id}.json`);
//! anything the user saves lands in a [`LocalMapStore`] and shadows the
//! published copy with the same id.
//!
//! Index reads degrade instead of failing: an unreachable or malformed index
//! is logged and treated as empty, and is not cached, so the next call tries
//! again.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use canvas::consts::MAP_ID_PREFIX;
use canvas::doc::{MapDocument, MapListEntry};
use canvas::ids::{IdGenerator, TimestampIds};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::catalog::{PackAssets, PackDetail, PackSummary};
use crate::clock::{Clock, SystemClock, timestamp};
use crate::config::{DEFAULT_MAPS_DIR, DEFAULT_MAPS_INDEX, DEFAULT_PACKS_INDEX};
use crate::error::GatewayError;
use crate::index::{IndexCache, MapsIndex, PacksIndex};
use crate::local::{KeyValueStore, LocalMapStore, MemoryStore};
use crate::source::StaticSource;

/// The user every deployment knows about.
pub const DEFAULT_USER: &str = "temp";

/// Where the index files live relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub packs_index: String,
    pub maps_index: String,
    pub maps_dir: String,
}

impl Default for StaticPaths {
    fn default() -> Self {
        Self {
            packs_index: DEFAULT_PACKS_INDEX.to_owned(),
            maps_index: DEFAULT_MAPS_INDEX.to_owned(),
            maps_dir: DEFAULT_MAPS_DIR.to_owned(),
        }
    }
}

pub struct StaticGateway {
    source: Box<dyn StaticSource>,
    local: LocalMapStore<Box<dyn KeyValueStore>>,
    paths: StaticPaths,
    packs: IndexCache<PacksIndex>,
    maps: IndexCache<MapsIndex>,
    clock: Box<dyn Clock>,
    ids: RefCell<Box<dyn IdGenerator>>,
}

impl std::fmt::Debug for StaticGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticGateway")
            .field("paths", &self.paths)
            .field("packs_loaded", &self.packs.is_loaded())
            .field("maps_loaded", &self.maps.is_loaded())
            .finish_non_exhaustive()
    }
}

impl StaticGateway {
    /// Gateway over `source` with an in-memory local store, the system clock
    /// and timestamp ids.
    pub fn new(source: impl StaticSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            local: LocalMapStore::new(Box::new(MemoryStore::new())),
            paths: StaticPaths::default(),
            packs: IndexCache::default(),
            maps: IndexCache::default(),
            clock: Box::new(SystemClock),
            ids: RefCell::new(Box::new(TimestampIds::new())),
        }
    }

    #[must_use]
    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.local = LocalMapStore::new(Box::new(store));
        self
    }

    #[must_use]
    pub fn with_paths(mut self, paths: StaticPaths) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = RefCell::new(Box::new(ids));
        self
    }

    pub fn local(&self) -> &LocalMapStore<Box<dyn KeyValueStore>> {
        &self.local
    }

    /// Drop both cached indexes.
    pub fn invalidate(&self) {
        self.packs.invalidate();
        self.maps.invalidate();
    }

    // -- maps -----------------------------------------------------------------

    /// Published maps by `username` not shadowed locally, then the local ones.
    ///
    /// # Errors
    ///
    /// Local store read failure.
    pub async fn list_maps(&self, username: &str) -> Result<Vec<MapListEntry>, GatewayError> {
        let index = self.maps_index().await;
        let local = self.local.user_entries(username)?;
        let local_ids: BTreeSet<&str> = local.iter().map(|e| e.id.as_str()).collect();

        let mut merged: Vec<MapListEntry> = index
            .maps
            .iter()
            .filter(|e| e.is_authored_by(username) && !local_ids.contains(e.id.as_str()))
            .cloned()
            .collect();
        merged.extend(local);
        Ok(merged)
    }

    /// The local copy when `username` saved one, otherwise the published
    /// `{maps_dir}/{id}.json`.
    ///
    /// # Errors
    ///
    /// Local store read failure. A missing or broken published file is `None`.
    pub async fn load_map(&self, username: &str, id: &str) -> Result<Option<MapDocument>, GatewayError> {
        if let Some(doc) = self.local.get(username, id)? {
            return Ok(Some(doc.normalized()));
        }
        let path = format!("{}/{id}.json", self.paths.maps_dir);
        Ok(self.read_json::<MapDocument>(&path).await.map(MapDocument::normalized))
    }

    /// # Errors
    ///
    /// Local store write failure.
    pub fn create_map(&self, username: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        self.save_local(username, doc.clone())
    }

    /// # Errors
    ///
    /// Local store write failure.
    pub fn update_map(&self, username: &str, id: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        let mut doc = doc.clone();
        doc.id = Some(id.to_owned());
        self.save_local(username, doc)
    }

    /// Only local maps can be deleted; published ones are read-only.
    ///
    /// # Errors
    ///
    /// Local store write failure.
    pub fn delete_map(&self, username: &str, id: &str) -> Result<bool, GatewayError> {
        Ok(self.local.delete(username, id)?)
    }

    /// Every published map plus every local one, newest first.
    ///
    /// # Errors
    ///
    /// Local store read failure.
    pub async fn public_maps(&self) -> Result<Vec<MapListEntry>, GatewayError> {
        let index = self.maps_index().await;
        let local = self.local.entries()?;
        let local_ids: BTreeSet<&str> = local.iter().map(|e| e.id.as_str()).collect();

        let mut all: Vec<MapListEntry> =
            index.maps.iter().filter(|e| !local_ids.contains(e.id.as_str())).cloned().collect();
        all.extend(local);
        all.sort_by(|a, b| b.modified().cmp(a.modified()));
        Ok(all)
    }

    // -- packs ----------------------------------------------------------------

    pub async fn list_packs(&self) -> Vec<PackSummary> {
        self.packs_index().await.packs.iter().map(|p| p.summary.clone()).collect()
    }

    pub async fn get_pack(&self, id: &str) -> Option<PackDetail> {
        self.packs_index().await.find(id).map(crate::index::IndexedPack::detail)
    }

    pub async fn get_pack_assets(&self, id: &str) -> PackAssets {
        self.packs_index().await.find(id).map(|p| p.assets.clone()).unwrap_or_default()
    }

    // -- users ----------------------------------------------------------------

    /// `temp` plus every author seen in the index or the local store.
    ///
    /// # Errors
    ///
    /// Local store read failure.
    pub async fn list_users(&self) -> Result<Vec<String>, GatewayError> {
        let index = self.maps_index().await;
        let local = self.local.entries()?;
        let mut users: BTreeSet<String> = BTreeSet::from([DEFAULT_USER.to_owned()]);
        users.extend(index.maps.iter().chain(local.iter()).filter_map(|e| e.metadata.author.clone()));
        Ok(users.into_iter().collect())
    }

    /// Users exist implicitly through their maps; this only validates.
    ///
    /// # Errors
    ///
    /// [`GatewayError::InvalidRequest`] for an empty name.
    pub fn create_user(&self, username: &str) -> Result<(), GatewayError> {
        if username.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("username is required".into()));
        }
        Ok(())
    }

    // -- internals ------------------------------------------------------------

    fn save_local(&self, username: &str, doc: MapDocument) -> Result<MapDocument, GatewayError> {
        let now = timestamp(self.clock.now());
        let saved = self.local.save(username, doc, now, || self.ids.borrow_mut().next_id(MAP_ID_PREFIX))?;
        Ok(saved)
    }

    async fn packs_index(&self) -> Rc<PacksIndex> {
        if let Some(index) = self.packs.get() {
            return index;
        }
        match self.read_json::<PacksIndex>(&self.paths.packs_index).await {
            Some(index) => self.packs.set(index),
            None => Rc::new(PacksIndex::default()),
        }
    }

    async fn maps_index(&self) -> Rc<MapsIndex> {
        if let Some(index) = self.maps.get() {
            return index;
        }
        match self.read_json::<MapsIndex>(&self.paths.maps_index).await {
            Some(index) => self.maps.set(index),
            None => Rc::new(MapsIndex::default()),
        }
    }

    /// Fetch and parse `path`; every failure is logged and becomes `None`.
    async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let raw = match self.source.read(path).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(path, "static file not found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, path, "static file read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, path, "static file is not valid JSON");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "offline_test.rs"]
mod tests;
