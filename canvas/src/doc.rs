//! Document model: the serialisable map document and its entities.
//!
//! This module defines the data that is persisted and exchanged with the
//! gateway (`MapDocument`, `MapListEntry`), the two entity kinds that live on
//! the grid (`Tile`, `GameObject`), and a sparse-update type for objects
//! (`PartialGameObject`). The live, mutable state wrapping a document is
//! [`crate::model::MapModel`].
//!
//! JSON field names follow the wire format used by the persistence layer
//! (`tileSize`, `gridOffset`, `asset`).

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_MAP_NAME, DEFAULT_TILE_SIZE};

/// Identifier of a tile or game object, unique within its layer.
pub type EntityId = String;

// =============================================================
// Grid geometry
// =============================================================

/// Logical bounds of the map and pixel size of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    #[serde(default = "default_grid_width")]
    pub width: u32,
    #[serde(default = "default_grid_height")]
    pub height: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self { width: DEFAULT_GRID_WIDTH, height: DEFAULT_GRID_HEIGHT, tile_size: DEFAULT_TILE_SIZE }
    }
}

impl Grid {
    /// Whether `(x, y)` lies inside `width × height`.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return false;
        };
        x < self.width && y < self.height
    }

    /// Replace zero dimensions: a zero tile size means "unset" and falls back
    /// to the default, zero width/height become 1.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
            tile_size: if self.tile_size == 0 { DEFAULT_TILE_SIZE } else { self.tile_size },
        }
    }
}

fn default_grid_width() -> u32 {
    DEFAULT_GRID_WIDTH
}

fn default_grid_height() -> u32 {
    DEFAULT_GRID_HEIGHT
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

/// Global grid offset in world pixels, shared by both layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOffset {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

// =============================================================
// Rotation
// =============================================================

/// Quarter-turn rotation of a tile, clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// A rotation value that is not a whole multiple of 90°.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("rotation must be a multiple of 90 degrees, got {0}")]
pub struct InvalidRotation(pub f64);

impl Rotation {
    /// Angle in degrees (`0`, `90`, `180` or `270`).
    #[must_use]
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Build from any whole multiple of 90°, normalising into `[0, 360)`.
    #[must_use]
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// The next quarter turn clockwise.
    #[must_use]
    pub fn clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }
}

impl TryFrom<f64> for Rotation {
    type Error = InvalidRotation;

    #[allow(clippy::cast_possible_truncation)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let whole = value.round();
        if !value.is_finite() || (value - whole).abs() > f64::EPSILON {
            return Err(InvalidRotation(value));
        }
        Self::from_degrees(whole as i64).ok_or(InvalidRotation(value))
    }
}

impl From<Rotation> for f64 {
    fn from(value: Rotation) -> Self {
        f64::from(value.degrees())
    }
}

// =============================================================
// Entities
// =============================================================

/// A tile on the bottom layer. Multiple tiles may share a cell; later
/// entries are drawn above earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    /// Asset reference resolved by the image provider.
    pub asset: String,
    #[serde(default)]
    pub rotation: Rotation,
}

/// An object on the top layer. Unknown fields are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    /// Empty until the model assigns one.
    #[serde(default)]
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub asset: String,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameObject {
    /// A new object without an id; the model assigns one on insertion.
    #[must_use]
    pub fn new(x: i32, y: i32, asset: impl Into<String>) -> Self {
        Self { id: EntityId::new(), x, y, asset: asset.into(), rotation: 0.0, extra: serde_json::Map::new() }
    }

    /// Merge a sparse update: supplied fields overwrite, others are kept.
    /// The id is never changed.
    pub fn apply(&mut self, partial: &PartialGameObject) {
        if let Some(x) = partial.x {
            self.x = x;
        }
        if let Some(y) = partial.y {
            self.y = y;
        }
        if let Some(ref asset) = partial.asset {
            self.asset.clone_from(asset);
        }
        if let Some(rotation) = partial.rotation {
            self.rotation = rotation;
        }
        for (k, v) in &partial.extra {
            if k == "id" {
                continue;
            }
            self.extra.insert(k.clone(), v.clone());
        }
    }
}

/// Sparse update for a game object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialGameObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Any other fields to merge into the object's extra data.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Which of the two layers an entity lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Tiles,
    Objects,
}

/// A reference to one entity in one layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub layer: LayerKind,
    pub id: EntityId,
}

impl EntityRef {
    #[must_use]
    pub fn tile(id: impl Into<EntityId>) -> Self {
        Self { layer: LayerKind::Tiles, id: id.into() }
    }

    #[must_use]
    pub fn object(id: impl Into<EntityId>) -> Self {
        Self { layer: LayerKind::Objects, id: id.into() }
    }
}

/// The two ordered entity collections. Array order is draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layers {
    #[serde(default)]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub objects: Vec<GameObject>,
}

// =============================================================
// Document
// =============================================================

/// Authoring metadata. Timestamps are ISO-8601 UTC strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Set once, on first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Updated on every successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A complete map as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    /// `None` until the document has been saved once.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_map_name")]
    pub name: String,
    /// Asset pack the map was built with.
    #[serde(default)]
    pub pack: Option<String>,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default, rename = "gridOffset")]
    pub grid_offset: GridOffset,
    #[serde(default)]
    pub layers: Layers,
    #[serde(default)]
    pub metadata: MapMetadata,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self {
            id: None,
            name: default_map_name(),
            pack: None,
            grid: Grid::default(),
            grid_offset: GridOffset::default(),
            layers: Layers::default(),
            metadata: MapMetadata::default(),
        }
    }
}

impl MapDocument {
    /// Fill in defaults for values that deserialise but mean "missing":
    /// empty id, empty name, zero grid dimensions.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.id.as_deref().is_some_and(str::is_empty) {
            self.id = None;
        }
        if self.name.trim().is_empty() {
            self.name = default_map_name();
        }
        self.grid = self.grid.normalized();
        self
    }

    /// The lightweight listing projection, if the document has an id.
    #[must_use]
    pub fn list_entry(&self) -> Option<MapListEntry> {
        let id = self.id.clone()?;
        Some(MapListEntry { id, name: self.name.clone(), metadata: self.metadata.clone() })
    }

    /// Whether the document is attributed to `username`.
    #[must_use]
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.metadata.author.as_deref() == Some(username)
    }
}

fn default_map_name() -> String {
    DEFAULT_MAP_NAME.to_owned()
}

/// Listing projection of a map. Also deserialises from a full document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapListEntry {
    pub id: String,
    #[serde(default = "default_map_name")]
    pub name: String,
    #[serde(default)]
    pub metadata: MapMetadata,
}

impl MapListEntry {
    #[must_use]
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.metadata.author.as_deref() == Some(username)
    }

    /// `metadata.modified`, or the empty string when unset.
    #[must_use]
    pub fn modified(&self) -> &str {
        self.metadata.modified.as_deref().unwrap_or("")
    }
}
