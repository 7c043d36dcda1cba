#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Cell;
use crate::doc::{EntityRef, MapDocument};

/// Every entity occupying `cell`, bottom first: tiles in array order, then
/// objects in array order.
#[must_use]
pub fn entities_at(doc: &MapDocument, cell: Cell) -> Vec<EntityRef> {
    let tiles = doc
        .layers
        .tiles
        .iter()
        .filter(|t| t.x == cell.x && t.y == cell.y)
        .map(|t| EntityRef::tile(t.id.clone()));
    let objects = doc
        .layers
        .objects
        .iter()
        .filter(|o| o.x == cell.x && o.y == cell.y)
        .map(|o| EntityRef::object(o.id.clone()));
    tiles.chain(objects).collect()
}

/// The entity drawn on top at `cell`, if any. Objects beat tiles; within a
/// layer the later entry wins.
#[must_use]
pub fn topmost_at(doc: &MapDocument, cell: Cell) -> Option<EntityRef> {
    if let Some(obj) = doc.layers.objects.iter().rev().find(|o| o.x == cell.x && o.y == cell.y) {
        return Some(EntityRef::object(obj.id.clone()));
    }
    doc.layers
        .tiles
        .iter()
        .rev()
        .find(|t| t.x == cell.x && t.y == cell.y)
        .map(|t| EntityRef::tile(t.id.clone()))
}
