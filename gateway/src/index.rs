//! Pre-generated static indexes and their per-gateway cache.

use std::cell::RefCell;
use std::rc::Rc;

use canvas::doc::MapListEntry;
use serde::{Deserialize, Serialize};

use crate::catalog::{Pack, PackAssets, PackDetail, PackSummary};

/// One pack in `packs-index.json`, with every asset inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPack {
    #[serde(flatten)]
    pub summary: PackSummary,
    #[serde(default)]
    pub assets: PackAssets,
}

impl IndexedPack {
    #[must_use]
    pub fn detail(&self) -> PackDetail {
        PackDetail { summary: self.summary.clone(), categories: self.assets.keys().cloned().collect() }
    }
}

impl From<Pack> for IndexedPack {
    fn from(pack: Pack) -> Self {
        Self { assets: pack.assets(), summary: pack.summary }
    }
}

/// `packs-index.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacksIndex {
    #[serde(default)]
    pub packs: Vec<IndexedPack>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl PacksIndex {
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&IndexedPack> {
        self.packs.iter().find(|p| p.summary.id == id)
    }
}

/// `maps-index.json`: listing entries for every published map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapsIndex {
    #[serde(default)]
    pub maps: Vec<MapListEntry>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Lazily filled, shareable slot for one parsed index.
///
/// Owned by a single gateway; [`IndexCache::invalidate`] forces the next
/// read to fetch again.
#[derive(Debug)]
pub struct IndexCache<T> {
    slot: RefCell<Option<Rc<T>>>,
}

impl<T> Default for IndexCache<T> {
    fn default() -> Self {
        Self { slot: RefCell::new(None) }
    }
}

impl<T> IndexCache<T> {
    #[must_use]
    pub fn get(&self) -> Option<Rc<T>> {
        self.slot.borrow().clone()
    }

    pub fn set(&self, value: T) -> Rc<T> {
        let value = Rc::new(value);
        *self.slot.borrow_mut() = Some(Rc::clone(&value));
        value
    }

    pub fn invalidate(&self) {
        self.slot.borrow_mut().take();
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.borrow().is_some()
    }
}
