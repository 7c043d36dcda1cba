//! Rendering: draws the grid, tiles, objects and selection to a 2D surface.
//!
//! The pipeline is written against the [`Surface`] trait so it can be driven
//! by a recording surface in tests; the browser implementation is
//! [`web_sys::CanvasRenderingContext2d`]. Nothing here mutates application
//! state.
//!
//! Draw order is fixed: grid, then tiles in array order, then objects in
//! array order, then the selection outline. Entities whose image has not
//! loaded are skipped without error.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::{Point, Size, Viewport};
use crate::consts::{GRID_LINE_WIDTH, GRID_STROKE, SELECTION_LINE_WIDTH, SELECTION_STROKE};
use crate::doc::{EntityRef, GameObject, LayerKind, MapDocument, Tile};

/// The subset of the Canvas 2D API the pipeline needs.
pub trait Surface {
    type Image;
    type Error;

    fn save(&self);
    fn restore(&self);
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64);

    /// # Errors
    ///
    /// Surface-specific transform failure.
    fn translate(&self, x: f64, y: f64) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Surface-specific transform failure.
    fn rotate(&self, radians: f64) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Surface-specific transform failure.
    fn scale(&self, x: f64, y: f64) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// The image could not be drawn (e.g. it is in a broken state).
    fn draw_image(&self, image: &Self::Image, x: f64, y: f64, w: f64, h: f64) -> Result<(), Self::Error>;

    fn set_stroke_style(&self, style: &str);
    fn set_line_width(&self, width: f64);
    fn begin_path(&self);
    fn move_to(&self, x: f64, y: f64);
    fn line_to(&self, x: f64, y: f64);
    fn stroke(&self);
}

impl Surface for CanvasRenderingContext2d {
    type Image = HtmlImageElement;
    type Error = JsValue;

    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }

    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, w, h);
    }

    fn translate(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::translate(self, x, y)
    }

    fn rotate(&self, radians: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::rotate(self, radians)
    }

    fn scale(&self, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::scale(self, x, y)
    }

    fn draw_image(&self, image: &HtmlImageElement, x: f64, y: f64, w: f64, h: f64) -> Result<(), JsValue> {
        self.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, w, h)
    }

    fn set_stroke_style(&self, style: &str) {
        self.set_stroke_style_str(style);
    }

    fn set_line_width(&self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn begin_path(&self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn stroke(&self) {
        CanvasRenderingContext2d::stroke(self);
    }
}

/// Asset reference → loaded image.
pub trait ImageSource<I> {
    /// The image for `asset`, or `None` if it is not (yet) available.
    fn image(&self, asset: &str) -> Option<&I>;
}

impl<I> ImageSource<I> for HashMap<String, I> {
    fn image(&self, asset: &str) -> Option<&I> {
        self.get(asset)
    }
}

// =============================================================
// Scene
// =============================================================

/// Draw the full scene. `size` is the surface size in CSS pixels.
///
/// # Errors
///
/// Propagates the first surface error. The context is restored either way.
pub fn draw_scene<S, M>(
    surface: &S,
    images: &M,
    doc: &MapDocument,
    viewport: &Viewport,
    size: Size,
    selection: Option<&EntityRef>,
) -> Result<(), S::Error>
where
    S: Surface,
    M: ImageSource<S::Image>,
{
    surface.clear_rect(0.0, 0.0, size.width, size.height);
    surface.save();
    let result = draw_layers(surface, images, doc, viewport, size, selection);
    surface.restore();
    result
}

fn draw_layers<S, M>(
    surface: &S,
    images: &M,
    doc: &MapDocument,
    viewport: &Viewport,
    size: Size,
    selection: Option<&EntityRef>,
) -> Result<(), S::Error>
where
    S: Surface,
    M: ImageSource<S::Image>,
{
    let camera = viewport.camera;
    surface.translate(camera.pan_x, camera.pan_y)?;
    surface.scale(camera.zoom, camera.zoom)?;
    surface.translate(viewport.grid_offset.x, viewport.grid_offset.y)?;

    // Visible region in world space.
    let top_left = camera.screen_to_world(Point::new(0.0, 0.0));
    let start = Point::new(top_left.x - viewport.grid_offset.x, top_left.y - viewport.grid_offset.y);
    let visible = Size::new(camera.screen_dist_to_world(size.width), camera.screen_dist_to_world(size.height));
    draw_grid(surface, doc.grid.tile_size, start, visible);

    let ts = f64::from(doc.grid.tile_size);
    for tile in &doc.layers.tiles {
        draw_tile(surface, images.image(&tile.asset), tile, ts)?;
    }
    for obj in &doc.layers.objects {
        draw_object(surface, images.image(&obj.asset), obj, ts)?;
    }

    if let Some(selected) = selection {
        draw_selection(surface, doc, selected, ts);
    }
    Ok(())
}

// =============================================================
// Grid
// =============================================================

/// Stroke every cell boundary covering `start .. start + size` (world space),
/// extended outward to whole cells.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_grid<S: Surface>(surface: &S, tile_size: u32, start: Point, size: Size) {
    if tile_size == 0 {
        return;
    }
    let ts = f64::from(tile_size);
    let first_col = (start.x / ts).floor() as i64;
    let last_col = ((start.x + size.width) / ts).ceil() as i64;
    let first_row = (start.y / ts).floor() as i64;
    let last_row = ((start.y + size.height) / ts).ceil() as i64;

    let left = line_pos(first_col, ts);
    let right = line_pos(last_col, ts);
    let top = line_pos(first_row, ts);
    let bottom = line_pos(last_row, ts);

    surface.set_stroke_style(GRID_STROKE);
    surface.set_line_width(GRID_LINE_WIDTH);
    surface.begin_path();
    for col in first_col..=last_col {
        let x = line_pos(col, ts);
        surface.move_to(x, top);
        surface.line_to(x, bottom);
    }
    for row in first_row..=last_row {
        let y = line_pos(row, ts);
        surface.move_to(left, y);
        surface.line_to(right, y);
    }
    surface.stroke();
}

#[allow(clippy::cast_precision_loss)]
fn line_pos(index: i64, ts: f64) -> f64 {
    index as f64 * ts
}

// =============================================================
// Entities
// =============================================================

/// Draw a tile scaled to one cell and rotated about the cell centre.
///
/// # Errors
///
/// Propagates surface errors.
pub fn draw_tile<S: Surface>(surface: &S, image: Option<&S::Image>, tile: &Tile, tile_size: f64) -> Result<(), S::Error> {
    let Some(image) = image else {
        return Ok(());
    };
    draw_cell_image(surface, image, tile.x, tile.y, f64::from(tile.rotation.degrees()), tile_size)
}

/// Same as [`draw_tile`] for objects, which carry free-form degrees.
///
/// # Errors
///
/// Propagates surface errors.
pub fn draw_object<S: Surface>(surface: &S, image: Option<&S::Image>, obj: &GameObject, tile_size: f64) -> Result<(), S::Error> {
    let Some(image) = image else {
        return Ok(());
    };
    draw_cell_image(surface, image, obj.x, obj.y, obj.rotation, tile_size)
}

fn draw_cell_image<S: Surface>(surface: &S, image: &S::Image, x: i32, y: i32, degrees: f64, ts: f64) -> Result<(), S::Error> {
    surface.save();
    let result = place_cell_image(surface, image, x, y, degrees, ts);
    surface.restore();
    result
}

fn place_cell_image<S: Surface>(surface: &S, image: &S::Image, x: i32, y: i32, degrees: f64, ts: f64) -> Result<(), S::Error> {
    let half = ts / 2.0;
    surface.translate(f64::from(x) * ts + half, f64::from(y) * ts + half)?;
    surface.rotate(degrees.to_radians())?;
    surface.draw_image(image, -half, -half, ts, ts)
}

fn draw_selection<S: Surface>(surface: &S, doc: &MapDocument, selected: &EntityRef, ts: f64) {
    let cell = match selected.layer {
        LayerKind::Tiles => doc.layers.tiles.iter().find(|t| t.id == selected.id).map(|t| (t.x, t.y)),
        LayerKind::Objects => doc.layers.objects.iter().find(|o| o.id == selected.id).map(|o| (o.x, o.y)),
    };
    let Some((x, y)) = cell else {
        return;
    };
    let left = f64::from(x) * ts;
    let top = f64::from(y) * ts;

    surface.set_stroke_style(SELECTION_STROKE);
    surface.set_line_width(SELECTION_LINE_WIDTH);
    surface.begin_path();
    surface.move_to(left, top);
    surface.line_to(left + ts, top);
    surface.line_to(left + ts, top + ts);
    surface.line_to(left, top + ts);
    surface.line_to(left, top);
    surface.stroke();
}
