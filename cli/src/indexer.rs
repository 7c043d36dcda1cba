//! Static index generation for Static-mode deployments.
//!
//! `packs-index.json` inlines every pack's assets; `maps-index.json` lists
//! every user's maps and the map files themselves are copied flat into a
//! `maps/` directory next to it.

use std::fs;
use std::path::{Path, PathBuf};

use canvas::doc::MapDocument;
use gateway::catalog::scan_catalog;
use gateway::index::{IndexedPack, MapsIndex, PacksIndex};
use serde::Serialize;
use tracing::{info, warn};

use crate::CliError;

/// Scan `assets_dir` into a packs index.
///
/// # Errors
///
/// The assets directory exists but cannot be listed.
pub fn build_packs_index(assets_dir: &Path, generated_at: String) -> Result<PacksIndex, CliError> {
    let packs = scan_catalog(assets_dir).map_err(|source| CliError::Io { path: assets_dir.to_path_buf(), source })?;
    info!(count = packs.len(), "packs indexed");
    Ok(PacksIndex { packs: packs.into_iter().map(IndexedPack::from).collect(), generated_at: Some(generated_at) })
}

/// Every map file below `{users_dir}/{user}/maps/`, newest first.
///
/// Unreadable files are skipped with a warning.
///
/// # Errors
///
/// A directory that exists but cannot be listed.
pub fn collect_map_files(users_dir: &Path) -> Result<Vec<(PathBuf, MapDocument)>, CliError> {
    let mut found = Vec::new();
    for user_dir in sorted_dirs(users_dir)? {
        let maps_dir = user_dir.join("maps");
        if !maps_dir.is_dir() {
            continue;
        }
        for path in read_dir_sorted(&maps_dir)? {
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<MapDocument>(&raw).map_err(|e| e.to_string()));
            match parsed {
                Ok(mut doc) => {
                    doc.id = Some(stem);
                    found.push((path, doc));
                }
                Err(e) => warn!(error = %e, path = %path.display(), "skipping unreadable map file"),
            }
        }
    }
    found.sort_by(|(_, a), (_, b)| modified(b).cmp(modified(a)));
    Ok(found)
}

/// Build the maps index and copy each map file into `maps_out_dir`.
///
/// # Errors
///
/// Listing the users directory, or creating or copying into the output
/// directory, failed.
pub fn build_maps_index(users_dir: &Path, maps_out_dir: &Path, generated_at: String) -> Result<MapsIndex, CliError> {
    let files = collect_map_files(users_dir)?;
    fs::create_dir_all(maps_out_dir).map_err(|source| CliError::Io { path: maps_out_dir.to_path_buf(), source })?;

    let mut maps = Vec::with_capacity(files.len());
    for (path, doc) in files {
        let Some(entry) = doc.list_entry() else {
            continue;
        };
        let dest = maps_out_dir.join(format!("{}.json", entry.id));
        fs::copy(&path, &dest).map_err(|source| CliError::Io { path: dest.clone(), source })?;
        maps.push(entry);
    }
    info!(count = maps.len(), out = %maps_out_dir.display(), "maps indexed");
    Ok(MapsIndex { maps, generated_at: Some(generated_at) })
}

/// Pretty-print `value` to `path`, creating parent directories.
///
/// # Errors
///
/// Serialization or write failure.
pub fn write_index<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CliError::Io { path: parent.to_path_buf(), source })?;
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(|source| CliError::Io { path: path.to_path_buf(), source })
}

fn modified(doc: &MapDocument) -> &str {
    doc.metadata.modified.as_deref().unwrap_or("")
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_dir() && !p.file_name().is_some_and(|n| n.to_string_lossy().starts_with('.')))
        .collect())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let io_err = |source| CliError::Io { path: dir.to_path_buf(), source };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn packs_index_inlines_assets() {
        let root = tempfile::tempdir().unwrap();
        let pack = root.path().join("G-Zombicide-Base");
        write(&pack.join("cfg"), "name=Base\n");
        write(&pack.join("01.tiles/cfg"), "name=Tiles\n");
        write(&pack.join("01.tiles/1V.png"), "");

        let index = build_packs_index(root.path(), "2025-01-01T00:00:00.000Z".into()).unwrap();
        assert_eq!(index.packs.len(), 1);
        assert_eq!(index.packs[0].summary.name, "Base");
        assert_eq!(index.packs[0].assets["01.tiles"][0].name, "1V.png");
        assert_eq!(index.generated_at.as_deref(), Some("2025-01-01T00:00:00.000Z"));
    }

    #[test]
    fn maps_index_lists_newest_first_and_copies_files() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(
            &data.path().join("alice/maps/map_a.json"),
            r#"{"name": "A", "metadata": {"author": "alice", "modified": "2025-01-01T00:00:00.000Z"}}"#,
        );
        write(
            &data.path().join("bob/maps/map_b.json"),
            r#"{"name": "B", "metadata": {"author": "bob", "modified": "2025-02-01T00:00:00.000Z"}}"#,
        );
        write(&data.path().join("bob/maps/broken.json"), "{");
        write(&data.path().join("bob/maps/readme.txt"), "skip");

        let maps_out = out.path().join("maps");
        let index = build_maps_index(data.path(), &maps_out, "now".into()).unwrap();
        let ids: Vec<&str> = index.maps.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["map_b", "map_a"]);
        assert!(maps_out.join("map_a.json").is_file());
        assert!(maps_out.join("map_b.json").is_file());
        assert!(!maps_out.join("broken.json").exists());
    }

    #[test]
    fn missing_users_dir_gives_empty_index() {
        let out = tempfile::tempdir().unwrap();
        let index = build_maps_index(&out.path().join("absent"), &out.path().join("maps"), "now".into()).unwrap();
        assert!(index.maps.is_empty());
    }

    #[test]
    fn write_index_creates_parent_dirs() {
        let out = tempfile::tempdir().unwrap();
        let path = out.path().join("public/maps-index.json");
        write_index(&path, &MapsIndex::default()).unwrap();
        let parsed: MapsIndex = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(parsed.maps.is_empty());
    }
}
