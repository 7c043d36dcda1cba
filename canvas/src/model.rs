//! `MapModel`: the single mutable owner of the document being edited.
//!
//! Every mutation is synchronous, completes before observers run, and flips
//! the dirty flag, except `load_document` and `mark_saved` which clear it.
//! Selection changes are view state and leave the dirty flag alone.
//!
//! Tiles are immutable once placed apart from their rotation; objects accept
//! sparse merges through [`PartialGameObject`]. Overlap is allowed on both
//! layers and array order is draw order.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::HashSet;
use std::fmt;

use crate::consts::{DEFAULT_MAP_NAME, OBJECT_ID_PREFIX, TILE_ID_PREFIX};
use crate::doc::{EntityId, EntityRef, GameObject, Grid, GridOffset, LayerKind, MapDocument, PartialGameObject, Rotation, Tile};
use crate::ids::{IdGenerator, TimestampIds};

/// What happens when an entity is placed outside `width × height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Any cell is accepted, including negative ones.
    #[default]
    Unbounded,
    /// Out-of-grid placement fails with [`PlacementError::OutOfBounds`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { x: i32, y: i32, width: u32, height: u32 },
}

/// Change notification delivered to subscribers after a mutation completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Grid size, tile size or grid offset changed.
    GridChanged,
    /// Name or pack changed.
    MetadataChanged,
    TileAdded(EntityId),
    /// Also implies the selection was cleared if it pointed at this tile.
    TileRemoved(EntityId),
    TileRotated(EntityId),
    ObjectAdded(EntityId),
    /// Also implies the selection was cleared if it pointed at this object.
    ObjectRemoved(EntityId),
    ObjectUpdated(EntityId),
    SelectionChanged(Option<EntityRef>),
    Loaded,
    Cleared,
    Saved,
}

/// Handle returned by [`MapModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ModelEvent)>;

/// The live document plus selection, dirty flag and observers.
pub struct MapModel {
    doc: MapDocument,
    selection: Option<EntityRef>,
    /// Ids removed since the document was loaded; never handed out again.
    retired: HashSet<EntityRef>,
    unsaved: bool,
    bounds: BoundsPolicy,
    ids: Box<dyn IdGenerator>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for MapModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapModel")
            .field("doc", &self.doc)
            .field("selection", &self.selection)
            .field("unsaved", &self.unsaved)
            .field("bounds", &self.bounds)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for MapModel {
    fn default() -> Self {
        Self {
            doc: MapDocument::default(),
            selection: None,
            retired: HashSet::new(),
            unsaved: false,
            bounds: BoundsPolicy::default(),
            ids: Box::new(TimestampIds::new()),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl MapModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the id generator.
    #[must_use]
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &MapDocument {
        &self.doc
    }

    /// Persisted id, `None` until the first save.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.doc.id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.doc.name
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.doc.grid
    }

    #[must_use]
    pub fn grid_offset(&self) -> GridOffset {
        self.doc.grid_offset
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.doc.layers.tiles
    }

    #[must_use]
    pub fn objects(&self) -> &[GameObject] {
        &self.doc.layers.objects
    }

    #[must_use]
    pub fn tile(&self, id: &str) -> Option<&Tile> {
        self.doc.layers.tiles.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&GameObject> {
        self.doc.layers.objects.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    #[must_use]
    pub fn bounds(&self) -> BoundsPolicy {
        self.bounds
    }

    // --- Grid and metadata ---

    /// Resize the logical grid. Zero is clamped to 1. Existing entities are kept.
    pub fn set_grid(&mut self, width: u32, height: u32) {
        self.doc.grid.width = width.max(1);
        self.doc.grid.height = height.max(1);
        self.touch(ModelEvent::GridChanged);
    }

    pub fn set_tile_size(&mut self, size: u32) {
        self.doc.grid.tile_size = size.max(1);
        self.touch(ModelEvent::GridChanged);
    }

    pub fn set_grid_offset(&mut self, x: i32, y: i32) {
        self.doc.grid_offset = GridOffset { x, y };
        self.touch(ModelEvent::GridChanged);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.doc.name = name.into();
        self.touch(ModelEvent::MetadataChanged);
    }

    pub fn set_pack(&mut self, pack: Option<String>) {
        self.doc.pack = pack;
        self.touch(ModelEvent::MetadataChanged);
    }

    // --- Tiles ---

    /// Append a tile at `(x, y)` with a fresh id. Cells may hold any number
    /// of tiles; the new one draws above the others.
    ///
    /// # Errors
    ///
    /// [`PlacementError::OutOfBounds`] under [`BoundsPolicy::Reject`].
    pub fn add_tile(&mut self, x: i32, y: i32, asset: impl Into<String>, rotation: Rotation) -> Result<EntityId, PlacementError> {
        self.check_bounds(x, y)?;
        let id = self.fresh_id(LayerKind::Tiles);
        self.doc.layers.tiles.push(Tile { id: id.clone(), x, y, asset: asset.into(), rotation });
        self.touch(ModelEvent::TileAdded(id.clone()));
        Ok(id)
    }

    /// Remove a tile. Returns `false`, without marking dirty, if absent.
    pub fn remove_tile(&mut self, id: &str) -> bool {
        let before = self.doc.layers.tiles.len();
        self.doc.layers.tiles.retain(|t| t.id != id);
        if self.doc.layers.tiles.len() == before {
            return false;
        }
        self.retired.insert(EntityRef::tile(id));
        self.drop_selection_of(LayerKind::Tiles, id);
        self.touch(ModelEvent::TileRemoved(id.to_owned()));
        true
    }

    /// Set a tile's rotation. Returns `false` if absent.
    pub fn rotate_tile(&mut self, id: &str, rotation: Rotation) -> bool {
        let Some(tile) = self.doc.layers.tiles.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        tile.rotation = rotation;
        self.touch(ModelEvent::TileRotated(id.to_owned()));
        true
    }

    // --- Objects ---

    /// Append an object. An empty id, or one already used in this document
    /// (including by a removed object), is replaced with a fresh one; the id
    /// actually stored is returned.
    ///
    /// # Errors
    ///
    /// [`PlacementError::OutOfBounds`] under [`BoundsPolicy::Reject`].
    pub fn add_object(&mut self, mut object: GameObject) -> Result<EntityId, PlacementError> {
        self.check_bounds(object.x, object.y)?;
        if object.id.is_empty() || self.id_taken(LayerKind::Objects, &object.id) {
            object.id = self.fresh_id(LayerKind::Objects);
        }
        let id = object.id.clone();
        self.doc.layers.objects.push(object);
        self.touch(ModelEvent::ObjectAdded(id.clone()));
        Ok(id)
    }

    /// Remove an object. Returns `false`, without marking dirty, if absent.
    pub fn remove_object(&mut self, id: &str) -> bool {
        let before = self.doc.layers.objects.len();
        self.doc.layers.objects.retain(|o| o.id != id);
        if self.doc.layers.objects.len() == before {
            return false;
        }
        self.retired.insert(EntityRef::object(id));
        self.drop_selection_of(LayerKind::Objects, id);
        self.touch(ModelEvent::ObjectRemoved(id.to_owned()));
        true
    }

    /// Merge `partial` into an object. `Ok(false)` if absent.
    ///
    /// # Errors
    ///
    /// [`PlacementError::OutOfBounds`] under [`BoundsPolicy::Reject`] when
    /// the merged position leaves the grid; the object is left unchanged.
    pub fn update_object(&mut self, id: &str, partial: &PartialGameObject) -> Result<bool, PlacementError> {
        let Some(current) = self.object(id) else {
            return Ok(false);
        };
        self.check_bounds(partial.x.unwrap_or(current.x), partial.y.unwrap_or(current.y))?;
        if let Some(object) = self.doc.layers.objects.iter_mut().find(|o| o.id == id) {
            object.apply(partial);
        }
        self.touch(ModelEvent::ObjectUpdated(id.to_owned()));
        Ok(true)
    }

    // --- Selection ---

    /// Select the entity with `id`, looking in the tile layer first.
    /// Unknown ids leave the selection unchanged and return `false`.
    pub fn select(&mut self, id: &str) -> bool {
        let target = if self.tile(id).is_some() {
            EntityRef::tile(id)
        } else if self.object(id).is_some() {
            EntityRef::object(id)
        } else {
            return false;
        };
        self.set_selection(Some(target));
        true
    }

    /// Select a specific entity. `false` if it does not exist.
    pub fn select_entity(&mut self, entity: &EntityRef) -> bool {
        let exists = match entity.layer {
            LayerKind::Tiles => self.tile(&entity.id).is_some(),
            LayerKind::Objects => self.object(&entity.id).is_some(),
        };
        if exists {
            self.set_selection(Some(entity.clone()));
        }
        exists
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    // --- Whole-document operations ---

    /// Replace the document. Defaults are applied, the selection is
    /// cleared, and the model is clean afterwards.
    pub fn load_document(&mut self, doc: MapDocument) {
        self.doc = doc.normalized();
        self.selection = None;
        self.retired.clear();
        self.unsaved = false;
        self.emit(&ModelEvent::Loaded);
    }

    /// Start a fresh unsaved document, keeping grid size and pack. The grid
    /// offset is reset.
    pub fn clear(&mut self) {
        self.doc = MapDocument {
            name: DEFAULT_MAP_NAME.to_owned(),
            pack: self.doc.pack.take(),
            grid: self.doc.grid,
            ..MapDocument::default()
        };
        self.selection = None;
        self.retired.clear();
        self.touch(ModelEvent::Cleared);
    }

    /// Serialisable snapshot of the current document.
    #[must_use]
    pub fn to_document(&self) -> MapDocument {
        self.doc.clone()
    }

    /// Adopt the id and metadata assigned by a successful save.
    pub fn mark_saved(&mut self, saved: &MapDocument) {
        self.doc.id.clone_from(&saved.id);
        self.doc.metadata.clone_from(&saved.metadata);
        self.unsaved = false;
        self.emit(&ModelEvent::Saved);
    }

    // --- Observers ---

    /// Register a callback run after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&ModelEvent) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a callback. `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    // --- Internals ---

    fn touch(&mut self, event: ModelEvent) {
        self.unsaved = true;
        self.emit(&event);
    }

    fn emit(&mut self, event: &ModelEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    fn set_selection(&mut self, selection: Option<EntityRef>) {
        if self.selection == selection {
            return;
        }
        self.selection.clone_from(&selection);
        self.emit(&ModelEvent::SelectionChanged(selection));
    }

    fn drop_selection_of(&mut self, layer: LayerKind, id: &str) {
        if self.selection.as_ref().is_some_and(|s| s.layer == layer && s.id == id) {
            self.selection = None;
        }
    }

    fn check_bounds(&self, x: i32, y: i32) -> Result<(), PlacementError> {
        let grid = self.doc.grid;
        if self.bounds == BoundsPolicy::Reject && !grid.contains(x, y) {
            return Err(PlacementError::OutOfBounds { x, y, width: grid.width, height: grid.height });
        }
        Ok(())
    }

    fn fresh_id(&mut self, layer: LayerKind) -> EntityId {
        loop {
            let id = match layer {
                LayerKind::Tiles => self.ids.next_id(TILE_ID_PREFIX),
                LayerKind::Objects => self.ids.next_id(OBJECT_ID_PREFIX),
            };
            if !self.id_taken(layer, &id) {
                return id;
            }
        }
    }

    fn id_taken(&self, layer: LayerKind, id: &str) -> bool {
        let live = match layer {
            LayerKind::Tiles => self.tile(id).is_some(),
            LayerKind::Objects => self.object(id).is_some(),
        };
        live || self.retired.contains(&EntityRef { layer, id: id.to_owned() })
    }
}
