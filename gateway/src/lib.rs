//! Persistence gateway for the tile-map editor.
//!
//! One contract, two backings, chosen once at startup from
//! [`config::GatewayConfig`]:
//!
//! - **Live**: the tileboard REST server ([`live::LiveGateway`]).
//! - **Static**: pre-generated JSON indexes served as plain files, with
//!   user saves kept in a local key/value store ([`offline::StaticGateway`]).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment-driven gateway configuration |
//! | [`live`] | REST client |
//! | [`offline`] | Static index + local store gateway |
//! | [`source`] | Read-only static file sources (HTTP, directory) |
//! | [`local`] | Writable key/value stores and the local map store |
//! | [`index`] | Static index file formats and their cache |
//! | [`catalog`] | Pack types and the on-disk pack scanner |
//! | [`clock`] | Time source and metadata timestamp format |
//! | [`error`] | Error types |

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod index;
pub mod live;
pub mod local;
pub mod offline;
pub mod source;

use canvas::doc::{MapDocument, MapListEntry};
use canvas::model::MapModel;

use crate::catalog::{PackAssets, PackDetail, PackSummary};
use crate::config::{GatewayConfig, Mode};
use crate::error::GatewayError;
use crate::live::LiveGateway;
use crate::local::{KeyValueStore, MemoryStore};
use crate::offline::{StaticGateway, StaticPaths};
use crate::source::{HttpSource, StaticSource};

/// The persistence gateway the editor talks to.
#[derive(Debug)]
pub enum Gateway {
    Live(LiveGateway),
    Static(StaticGateway),
}

impl Gateway {
    /// Build the variant `config.mode` names.
    ///
    /// # Errors
    ///
    /// Invalid base URL, an HTTP client that cannot be built, or (browser
    /// builds) unavailable local storage.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        match config.mode {
            Mode::Live => {
                tracing::debug!(base = %config.api_base_url, "using live gateway");
                Ok(Self::Live(LiveGateway::new(&config.api_base_url, config.timeouts)?))
            }
            Mode::Static => {
                tracing::debug!(root = %config.static_root, "using static gateway");
                let paths = StaticPaths {
                    packs_index: config.packs_index.clone(),
                    maps_index: config.maps_index.clone(),
                    maps_dir: config.maps_dir.clone(),
                };
                let gateway = StaticGateway::new(static_source(config)?)
                    .with_store(local_store(config)?)
                    .with_paths(paths);
                Ok(Self::Static(gateway))
            }
        }
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn list_maps(&self, username: &str) -> Result<Vec<MapListEntry>, GatewayError> {
        match self {
            Self::Live(g) => g.list_maps(username).await,
            Self::Static(g) => g.list_maps(username).await,
        }
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn load_map(&self, username: &str, id: &str) -> Result<Option<MapDocument>, GatewayError> {
        match self {
            Self::Live(g) => g.load_map(username, id).await,
            Self::Static(g) => g.load_map(username, id).await,
        }
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn create_map(&self, username: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        match self {
            Self::Live(g) => g.create_map(username, doc).await,
            Self::Static(g) => g.create_map(username, doc),
        }
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn update_map(&self, username: &str, id: &str, doc: &MapDocument) -> Result<MapDocument, GatewayError> {
        match self {
            Self::Live(g) => g.update_map(username, id, doc).await,
            Self::Static(g) => g.update_map(username, id, doc),
        }
    }

    /// `false` when there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn delete_map(&self, username: &str, id: &str) -> Result<bool, GatewayError> {
        match self {
            Self::Live(g) => g.delete_map(username, id).await,
            Self::Static(g) => g.delete_map(username, id),
        }
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn public_maps(&self) -> Result<Vec<MapListEntry>, GatewayError> {
        match self {
            Self::Live(g) => g.public_maps().await,
            Self::Static(g) => g.public_maps().await,
        }
    }

    /// # Errors
    ///
    /// Live transport failure. Static mode never fails.
    pub async fn list_packs(&self) -> Result<Vec<PackSummary>, GatewayError> {
        match self {
            Self::Live(g) => g.list_packs().await,
            Self::Static(g) => Ok(g.list_packs().await),
        }
    }

    /// # Errors
    ///
    /// Live transport failure. Static mode never fails.
    pub async fn get_pack(&self, id: &str) -> Result<Option<PackDetail>, GatewayError> {
        match self {
            Self::Live(g) => g.get_pack(id).await,
            Self::Static(g) => Ok(g.get_pack(id).await),
        }
    }

    /// # Errors
    ///
    /// Live transport failure. Static mode never fails.
    pub async fn get_pack_assets(&self, id: &str) -> Result<PackAssets, GatewayError> {
        match self {
            Self::Live(g) => g.get_pack_assets(id).await,
            Self::Static(g) => Ok(g.get_pack_assets(id).await),
        }
    }

    /// # Errors
    ///
    /// Transport or local store failure.
    pub async fn list_users(&self) -> Result<Vec<String>, GatewayError> {
        match self {
            Self::Live(g) => g.list_users().await,
            Self::Static(g) => g.list_users().await,
        }
    }

    /// # Errors
    ///
    /// Empty username, or transport failure.
    pub async fn create_user(&self, username: &str) -> Result<(), GatewayError> {
        match self {
            Self::Live(g) => g.create_user(username).await,
            Self::Static(g) => g.create_user(username),
        }
    }

    /// Persist the model's document: create when it has no id yet, update
    /// otherwise. On success the model adopts the stored id and metadata and
    /// is marked clean.
    ///
    /// # Errors
    ///
    /// Any save failure; the model is left untouched and still unsaved.
    pub async fn save_model(&self, username: &str, model: &mut MapModel) -> Result<MapDocument, GatewayError> {
        let doc = model.to_document();
        let saved = match doc.id.as_deref() {
            Some(id) => self.update_map(username, id, &doc).await?,
            None => self.create_map(username, &doc).await?,
        };
        model.mark_saved(&saved);
        Ok(saved)
    }

    /// Forget cached indexes. A no-op for the live gateway.
    pub fn invalidate(&self) {
        if let Self::Static(g) = self {
            g.invalidate();
        }
    }
}

fn static_source(config: &GatewayConfig) -> Result<Box<dyn StaticSource>, GatewayError> {
    if config.static_root_is_url() {
        return Ok(Box::new(HttpSource::new(&config.static_root, config.timeouts)?));
    }
    local_source(config)
}

#[cfg(not(target_arch = "wasm32"))]
fn local_source(config: &GatewayConfig) -> Result<Box<dyn StaticSource>, GatewayError> {
    Ok(Box::new(crate::source::DirSource::new(&config.static_root)))
}

/// Browsers can only fetch; a directory root is a configuration error there.
#[cfg(target_arch = "wasm32")]
fn local_source(config: &GatewayConfig) -> Result<Box<dyn StaticSource>, GatewayError> {
    Err(GatewayError::InvalidBaseUrl(config.static_root.clone()))
}

#[cfg(not(target_arch = "wasm32"))]
fn local_store(config: &GatewayConfig) -> Result<Box<dyn KeyValueStore>, GatewayError> {
    let store: Box<dyn KeyValueStore> = match &config.local_store_dir {
        Some(dir) => Box::new(crate::local::FileStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };
    Ok(store)
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
fn local_store(_config: &GatewayConfig) -> Result<Box<dyn KeyValueStore>, GatewayError> {
    Ok(Box::new(crate::local::BrowserStore::from_window()?))
}

#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
fn local_store(_config: &GatewayConfig) -> Result<Box<dyn KeyValueStore>, GatewayError> {
    Ok(Box::new(MemoryStore::new()))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
