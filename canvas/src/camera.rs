//! Pan/zoom camera and the screen ⇄ world ⇄ grid conversions.
//!
//! Three coordinate spaces are involved in every pointer interaction:
//!
//! - **screen**: CSS pixels as reported by pointer events;
//! - **world**: pixels after removing the surface origin, pan, zoom and the
//!   document's grid offset;
//! - **grid**: integer cell indices, `world / tile_size`.
//!
//! Every function here is pure. The same [`Viewport`] must be used for
//! placement and for rendering so that a click lands in the cell that is
//! drawn under the cursor.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{ZOOM_MAX, ZOOM_MIN};
use crate::doc::{GridOffset, MapDocument};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a region, in whichever space the caller is working in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Camera state for pan/zoom.
///
/// `pan_x` / `pan_y` are in CSS pixels relative to the surface origin.
/// `zoom` is a scale factor (1.0 = no zoom) and must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a surface-local point (CSS pixels) to camera space.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a camera-space point back to surface-local CSS pixels.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the world point under `anchor`
    /// (surface-local) fixed on screen. The result is clamped to
    /// `[ZOOM_MIN, ZOOM_MAX]`.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) {
        let before = self.screen_to_world(anchor);
        self.zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan_x = anchor.x - before.x * self.zoom;
        self.pan_y = anchor.y - before.y * self.zoom;
    }
}

/// Everything needed to map a pointer position onto the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the drawing surface in screen space.
    pub origin: Point,
    pub camera: Camera,
    /// Global grid offset in world pixels.
    pub grid_offset: Point,
    /// Edge length of one cell in world pixels.
    pub tile_size: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(origin: Point, camera: Camera, grid_offset: GridOffset, tile_size: u32) -> Self {
        Self {
            origin,
            camera,
            grid_offset: Point::new(f64::from(grid_offset.x), f64::from(grid_offset.y)),
            tile_size: f64::from(tile_size),
        }
    }

    /// Viewport using the grid geometry of `doc`.
    #[must_use]
    pub fn for_document(origin: Point, camera: Camera, doc: &MapDocument) -> Self {
        Self::new(origin, camera, doc.grid_offset, doc.grid.tile_size)
    }
}

/// A grid cell index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rounded cell index together with its pixel-snapped world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnappedCell {
    pub x: i32,
    pub y: i32,
    pub world_x: f64,
    pub world_y: f64,
}

impl SnappedCell {
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

/// Screen pointer → world: `(pointer - origin - pan) / zoom - grid_offset`.
#[must_use]
pub fn screen_to_world(pointer: Point, viewport: &Viewport) -> Point {
    let local = Point::new(pointer.x - viewport.origin.x, pointer.y - viewport.origin.y);
    let cam = viewport.camera.screen_to_world(local);
    Point::new(cam.x - viewport.grid_offset.x, cam.y - viewport.grid_offset.y)
}

/// World → screen pointer. Inverse of [`screen_to_world`].
#[must_use]
pub fn world_to_screen(world: Point, viewport: &Viewport) -> Point {
    let cam = Point::new(world.x + viewport.grid_offset.x, world.y + viewport.grid_offset.y);
    let local = viewport.camera.world_to_screen(cam);
    Point::new(local.x + viewport.origin.x, local.y + viewport.origin.y)
}

/// The cell containing the pointer (floor semantics). Used for click-to-place.
///
/// No bounds clamping: the cell may lie outside the document's grid.
#[must_use]
pub fn screen_to_grid(pointer: Point, viewport: &Viewport) -> Cell {
    let world = screen_to_world(pointer, viewport);
    Cell {
        x: to_index((world.x / viewport.tile_size).floor()),
        y: to_index((world.y / viewport.tile_size).floor()),
    }
}

/// The nearest cell corner to the pointer (round semantics). Used while
/// dragging so that movement snaps to the closest cell instead of truncating.
///
/// Ties round towards positive infinity (`-0.5 → 0`, `0.5 → 1`).
#[must_use]
pub fn screen_to_grid_snapped(pointer: Point, viewport: &Viewport) -> SnappedCell {
    let world = screen_to_world(pointer, viewport);
    let gx = round_half_up(world.x / viewport.tile_size);
    let gy = round_half_up(world.y / viewport.tile_size);
    SnappedCell {
        x: to_index(gx),
        y: to_index(gy),
        world_x: gx * viewport.tile_size,
        world_y: gy * viewport.tile_size,
    }
}

/// Top-left corner of `cell` in world space.
#[must_use]
pub fn cell_to_world(cell: Cell, tile_size: f64) -> Point {
    Point::new(f64::from(cell.x) * tile_size, f64::from(cell.y) * tile_size)
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[allow(clippy::cast_possible_truncation)]
fn to_index(v: f64) -> i32 {
    // Saturating float → int conversion; NaN maps to 0.
    v as i32
}
