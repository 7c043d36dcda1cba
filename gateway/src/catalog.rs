//! Asset pack catalog.
//!
//! A pack is a directory of categorised images described by small `cfg`
//! files (`key=value` lines). This module scans packs from disk for the
//! server and the index generator, and defines the pack types both gateway
//! variants hand back to callers.
//!
//! ```text
//! assets/
//!   G-Zombicide-Base/
//!     cfg                 name=Base, image=cover.png, align=25
//!     01.tiles/
//!       cfg               name=Tiles, max=1V.png:1, pairs=1V.png:1R.png
//!       1V.png
//!       1V/r_0.png r_90.png r_thumb.png
//!       2R/r_0.png        (directory asset)
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const ROOT_CFG: &str = "cfg";
pub const DEFAULT_PACK_IMAGE: &str = "guillotine.png";
pub const DEFAULT_PACK_ALIGN: i64 = 25;
pub const PACK_DIR_PREFIX: &str = "G-Zombicide-";
pub const ROTATION_ANGLES: [u16; 4] = [0, 90, 180, 270];
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const MAIN_ROTATION_FILE: &str = "r_0.png";
const THUMBNAIL_FILE: &str = "r_thumb.png";

// =============================================================================
// Types
// =============================================================================

/// Listing projection of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_align")]
    pub align: i64,
}

/// A pack plus the keys of its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackDetail {
    #[serde(flatten)]
    pub summary: PackSummary,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// One placeable image in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File or directory name, the key used by `max` and `pairs`.
    pub name: String,
    /// Main image, relative to the assets root with `/` separators.
    pub path: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Pre-rotated variants keyed by angle.
    #[serde(default)]
    pub rotations: BTreeMap<u16, String>,
    /// How many copies a map may hold, when limited.
    #[serde(default)]
    pub max: Option<u32>,
    /// Name of the companion asset, if any.
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub category: String,
}

/// Assets grouped by category key.
pub type PackAssets = BTreeMap<String, Vec<Asset>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub z_index: i64,
    pub align: i64,
    pub max: String,
    pub pairs: String,
    pub assets: Vec<Asset>,
}

/// A fully scanned pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    pub summary: PackSummary,
    pub categories: BTreeMap<String, Category>,
}

impl Pack {
    #[must_use]
    pub fn detail(&self) -> PackDetail {
        PackDetail { summary: self.summary.clone(), categories: self.categories.keys().cloned().collect() }
    }

    #[must_use]
    pub fn assets(&self) -> PackAssets {
        self.categories.iter().map(|(key, cat)| (key.clone(), cat.assets.clone())).collect()
    }
}

fn default_align() -> i64 {
    DEFAULT_PACK_ALIGN
}

// =============================================================================
// cfg parsing
// =============================================================================

/// Parse `key=value` lines. Blank lines, lines without `=` and `#` comments
/// are skipped; keys and values are trimmed; later keys win.
#[must_use]
pub fn parse_cfg(text: &str) -> HashMap<String, String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect()
}

/// Parse `a.png:1;b.png:2`. Entries without a count, or with a count that
/// is not a number, map to `None`.
#[must_use]
pub fn parse_max(raw: &str) -> HashMap<String, Option<u32>> {
    raw.split(';')
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once(':') {
            Some((name, count)) => (name.to_owned(), count.trim().parse().ok()),
            None => (item.to_owned(), None),
        })
        .collect()
}

/// Parse `a.png:b.png;c.png:d.png` into a symmetric lookup.
#[must_use]
pub fn parse_pairs(raw: &str) -> HashMap<String, String> {
    let mut pairs = HashMap::new();
    for (a, b) in raw.split(';').filter_map(|pair| pair.split_once(':')) {
        pairs.insert(a.to_owned(), b.to_owned());
        pairs.insert(b.to_owned(), a.to_owned());
    }
    pairs
}

fn read_cfg(path: &Path) -> io::Result<Option<HashMap<String, String>>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse_cfg(&text))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn cfg_int(cfg: &HashMap<String, String>, key: &str, default: i64) -> i64 {
    cfg.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// =============================================================================
// Directory scanning
// =============================================================================

/// Category directory names start with digits followed by a dot or another
/// digit: `01.tiles`, `04.1.objectives`, `01B.vaults`.
#[must_use]
pub fn is_category_name(name: &str) -> bool {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    digits >= 2 || (digits == 1 && name.as_bytes().get(1) == Some(&b'.'))
}

/// Whether `dir` looks like a pack: a `G-Zombicide-*` name or a root `cfg`.
#[must_use]
pub fn is_pack_dir(dir: &Path) -> bool {
    let named = dir.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with(PACK_DIR_PREFIX));
    named || dir.join(ROOT_CFG).is_file()
}

/// Whether `id` is a single plain path segment.
#[must_use]
pub fn is_plain_segment(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\'])
        && matches!(Path::new(id).components().collect::<Vec<_>>().as_slice(), [Component::Normal(_)])
}

/// Scan every pack below `assets_root`, ordered by id.
///
/// # Errors
///
/// Returns the io error if `assets_root` exists but cannot be listed. A
/// pack that fails to scan is skipped.
pub fn scan_catalog(assets_root: &Path) -> io::Result<Vec<Pack>> {
    let mut packs = Vec::new();
    if !assets_root.is_dir() {
        return Ok(packs);
    }
    for dir in sorted_entries(assets_root)? {
        if !dir.is_dir() || is_hidden(&dir) || !is_pack_dir(&dir) {
            continue;
        }
        match scan_pack(assets_root, &dir) {
            Ok(pack) => packs.push(pack),
            Err(e) => tracing::warn!(error = %e, pack = %dir.display(), "skipping unreadable pack"),
        }
    }
    Ok(packs)
}

/// Scan the pack with id `id`, if such a directory exists.
///
/// # Errors
///
/// Returns the io error of a pack directory that exists but cannot be read.
pub fn load_pack(assets_root: &Path, id: &str) -> io::Result<Option<Pack>> {
    if !is_plain_segment(id) {
        return Ok(None);
    }
    let dir = assets_root.join(id);
    if !dir.is_dir() || !is_pack_dir(&dir) {
        return Ok(None);
    }
    scan_pack(assets_root, &dir).map(Some)
}

/// Scan one pack directory.
///
/// Without a root `cfg` the pack is named after its directory and has no
/// cover image.
///
/// # Errors
///
/// Returns the io error of an unreadable directory or cfg file.
pub fn scan_pack(assets_root: &Path, dir: &Path) -> io::Result<Pack> {
    let id = file_name(dir);
    let summary = match read_cfg(&dir.join(ROOT_CFG))? {
        Some(cfg) => PackSummary {
            name: cfg.get("name").cloned().unwrap_or_else(|| id.clone()),
            image: Some(cfg.get("image").cloned().unwrap_or_else(|| DEFAULT_PACK_IMAGE.to_owned())),
            align: cfg_int(&cfg, "align", DEFAULT_PACK_ALIGN),
            id,
        },
        None => PackSummary { name: id.clone(), id, image: None, align: DEFAULT_PACK_ALIGN },
    };

    let mut categories = BTreeMap::new();
    for cat_dir in sorted_entries(dir)? {
        let key = file_name(&cat_dir);
        if !cat_dir.is_dir() || key.starts_with('.') || !is_category_name(&key) {
            continue;
        }
        if let Some(category) = scan_category(assets_root, &cat_dir, &key)? {
            categories.insert(key, category);
        }
    }

    Ok(Pack { summary, categories })
}

fn scan_category(assets_root: &Path, dir: &Path, key: &str) -> io::Result<Option<Category>> {
    let Some(cfg) = read_cfg(&dir.join(ROOT_CFG))? else {
        return Ok(None);
    };
    let max_raw = cfg.get("max").cloned().unwrap_or_default();
    let pairs_raw = cfg.get("pairs").cloned().unwrap_or_default();
    let max = parse_max(&max_raw);
    let pairs = parse_pairs(&pairs_raw);

    let entries = sorted_entries(dir)?;
    // `1V.png` keeps its variants in `1V/`; that directory is not an asset of its own.
    let variant_dirs: HashSet<PathBuf> =
        entries.iter().filter(|e| e.is_file() && is_image(e)).map(|e| e.with_extension("")).collect();

    let mut assets = Vec::new();
    for entry in entries {
        let name = file_name(&entry);
        let found = if entry.is_file() && is_image(&entry) {
            let stem_dir = entry.with_extension("");
            Some((rel_url(assets_root, &entry), stem_dir))
        } else if entry.is_dir()
            && !name.starts_with('.')
            && !variant_dirs.contains(&entry)
            && entry.join(MAIN_ROTATION_FILE).is_file()
        {
            Some((rel_url(assets_root, &entry.join(MAIN_ROTATION_FILE)), entry.clone()))
        } else {
            None
        };
        let Some((path, variants_dir)) = found else {
            continue;
        };
        assets.push(Asset {
            path,
            thumbnail: variants_dir
                .join(THUMBNAIL_FILE)
                .is_file()
                .then(|| rel_url(assets_root, &variants_dir.join(THUMBNAIL_FILE))),
            rotations: find_rotations(assets_root, &variants_dir),
            max: max.get(&name).copied().flatten(),
            pair: pairs.get(&name).cloned(),
            category: key.to_owned(),
            name,
        });
    }

    Ok(Some(Category {
        name: cfg.get("name").cloned().unwrap_or_else(|| key.to_owned()),
        z_index: cfg_int(&cfg, "z-index", 0),
        align: cfg_int(&cfg, "align", 0),
        max: max_raw,
        pairs: pairs_raw,
        assets,
    }))
}

fn find_rotations(assets_root: &Path, dir: &Path) -> BTreeMap<u16, String> {
    ROTATION_ANGLES
        .iter()
        .filter_map(|angle| {
            let file = dir.join(format!("r_{angle}.png"));
            file.is_file().then(|| (*angle, rel_url(assets_root, &file)))
        })
        .collect()
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?.map(|e| e.map(|e| e.path())).collect::<io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn is_hidden(path: &Path) -> bool {
    file_name(path).starts_with('.')
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// `path` relative to `root`, joined with `/` whatever the platform.
fn rel_url(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
