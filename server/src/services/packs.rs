//! Pack catalog over the configured assets directory.
//!
//! Scanning walks the filesystem synchronously, so every call runs on the
//! blocking pool. Nothing is cached: a pack dropped into the assets
//! directory shows up on the next request.

use std::path::{Path, PathBuf};

use gateway::catalog::{self, Pack, PackSummary};

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("pack scan failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("pack scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// # Errors
///
/// The assets directory exists but cannot be listed.
pub async fn list_packs(assets_dir: &Path) -> Result<Vec<PackSummary>, PackError> {
    let root = assets_dir.to_path_buf();
    let packs = tokio::task::spawn_blocking(move || catalog::scan_catalog(&root)).await??;
    Ok(packs.into_iter().map(|pack| pack.summary).collect())
}

/// `None` when there is no pack directory named `id`.
///
/// # Errors
///
/// The pack directory exists but cannot be read.
pub async fn load_pack(assets_dir: &Path, id: &str) -> Result<Option<Pack>, PackError> {
    let root: PathBuf = assets_dir.to_path_buf();
    let id = id.to_owned();
    Ok(tokio::task::spawn_blocking(move || catalog::load_pack(&root, &id)).await??)
}
