//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the map store and the assets root; everything else lives on
//! disk, so there is no in-memory cache to keep coherent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::maps::MapStore;

/// Clone is required by Axum; the fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub maps: MapStore,
    pub assets_dir: Arc<PathBuf>,
}

impl AppState {
    #[must_use]
    pub fn new(maps: MapStore, assets_dir: impl Into<PathBuf>) -> Self {
        Self { maps, assets_dir: Arc::new(assets_dir.into()) }
    }

    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(MapStore::new(&config.data_dir), &config.assets_dir)
    }

    #[must_use]
    pub fn users_dir(&self) -> &Path {
        self.maps.users_dir()
    }
}
