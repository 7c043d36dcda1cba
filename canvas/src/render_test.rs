#![allow(clippy::float_cmp)]

use std::cell::RefCell;

use super::*;
use crate::camera::Camera;
use crate::doc::{GridOffset, Rotation};

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Save,
    Restore,
    Clear(f64, f64, f64, f64),
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Image(&'static str, f64, f64, f64, f64),
    StrokeStyle(String),
    LineWidth(f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
}

#[derive(Default)]
struct RecordingSurface {
    ops: RefCell<Vec<Op>>,
    fail_on_image: Option<&'static str>,
}

impl RecordingSurface {
    fn push(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn images(&self) -> Vec<&'static str> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Image(name, ..) => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    type Image = &'static str;
    type Error = String;

    fn save(&self) {
        self.push(Op::Save);
    }
    fn restore(&self) {
        self.push(Op::Restore);
    }
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::Clear(x, y, w, h));
    }
    fn translate(&self, x: f64, y: f64) -> Result<(), String> {
        self.push(Op::Translate(x, y));
        Ok(())
    }
    fn rotate(&self, radians: f64) -> Result<(), String> {
        self.push(Op::Rotate(radians));
        Ok(())
    }
    fn scale(&self, x: f64, y: f64) -> Result<(), String> {
        self.push(Op::Scale(x, y));
        Ok(())
    }
    fn draw_image(&self, image: &&'static str, x: f64, y: f64, w: f64, h: f64) -> Result<(), String> {
        if self.fail_on_image == Some(*image) {
            return Err(format!("broken image {image}"));
        }
        self.push(Op::Image(image, x, y, w, h));
        Ok(())
    }
    fn set_stroke_style(&self, style: &str) {
        self.push(Op::StrokeStyle(style.to_owned()));
    }
    fn set_line_width(&self, width: f64) {
        self.push(Op::LineWidth(width));
    }
    fn begin_path(&self) {
        self.push(Op::BeginPath);
    }
    fn move_to(&self, x: f64, y: f64) {
        self.push(Op::MoveTo(x, y));
    }
    fn line_to(&self, x: f64, y: f64) {
        self.push(Op::LineTo(x, y));
    }
    fn stroke(&self) {
        self.push(Op::Stroke);
    }
}

fn images() -> HashMap<String, &'static str> {
    ["A", "B", "C", "D"].into_iter().map(|k| (k.to_owned(), k)).collect()
}

fn tile(id: &str, x: i32, y: i32, asset: &str, rotation: Rotation) -> Tile {
    Tile { id: id.into(), x, y, asset: asset.into(), rotation }
}

fn object(id: &str, x: i32, y: i32, asset: &str) -> GameObject {
    GameObject { id: id.into(), ..GameObject::new(x, y, asset) }
}

fn plain_viewport(doc: &MapDocument) -> Viewport {
    Viewport::for_document(Point::new(0.0, 0.0), Camera::default(), doc)
}

// =============================================================
// Grid
// =============================================================

#[test]
fn grid_style_matches_constants() {
    let s = RecordingSurface::default();
    draw_grid(&s, 32, Point::new(0.0, 0.0), Size::new(64.0, 64.0));
    let ops = s.ops();
    assert_eq!(ops[0], Op::StrokeStyle("rgba(0, 0, 0, 0.2)".into()));
    assert_eq!(ops[1], Op::LineWidth(1.0));
    assert_eq!(ops.last(), Some(&Op::Stroke));
}

#[test]
fn grid_extends_to_whole_cells() {
    let s = RecordingSurface::default();
    draw_grid(&s, 32, Point::new(-10.0, 5.0), Size::new(50.0, 20.0));
    // columns floor(-10/32)=-1 .. ceil(40/32)=2, rows 0 .. ceil(25/32)=1
    let verticals: Vec<f64> = s
        .ops()
        .windows(2)
        .filter_map(|w| match (&w[0], &w[1]) {
            (Op::MoveTo(x0, _), Op::LineTo(x1, _)) if x0 == x1 => Some(*x0),
            _ => None,
        })
        .collect();
    assert_eq!(verticals, vec![-32.0, 0.0, 32.0, 64.0]);
    assert!(s.ops().contains(&Op::MoveTo(-32.0, 0.0)));
    assert!(s.ops().contains(&Op::LineTo(64.0, 32.0)));
}

#[test]
fn grid_with_zero_tile_size_draws_nothing() {
    let s = RecordingSurface::default();
    draw_grid(&s, 0, Point::new(0.0, 0.0), Size::new(100.0, 100.0));
    assert!(s.ops().is_empty());
}

// =============================================================
// Entities
// =============================================================

#[test]
fn tile_is_centred_rotated_and_scaled() {
    let s = RecordingSurface::default();
    let t = tile("t", 2, 1, "A", Rotation::Deg90);
    draw_tile(&s, Some(&"A"), &t, 32.0).unwrap();
    assert_eq!(
        s.ops(),
        vec![
            Op::Save,
            Op::Translate(80.0, 48.0),
            Op::Rotate(90f64.to_radians()),
            Op::Image("A", -16.0, -16.0, 32.0, 32.0),
            Op::Restore,
        ]
    );
}

#[test]
fn missing_image_is_silently_skipped() {
    let s = RecordingSurface::default();
    let t = tile("t", 0, 0, "nope", Rotation::Deg0);
    assert!(draw_tile(&s, None, &t, 32.0).is_ok());
    assert!(draw_object(&s, None, &object("o", 0, 0, "nope"), 32.0).is_ok());
    assert!(s.ops().is_empty());
}

#[test]
fn object_uses_free_rotation() {
    let s = RecordingSurface::default();
    let mut o = object("o", 0, 0, "B");
    o.rotation = 45.0;
    draw_object(&s, Some(&"B"), &o, 10.0).unwrap();
    assert!(s.ops().contains(&Op::Rotate(45f64.to_radians())));
}

#[test]
fn failed_draw_still_restores() {
    let s = RecordingSurface { fail_on_image: Some("A"), ..RecordingSurface::default() };
    let t = tile("t", 0, 0, "A", Rotation::Deg0);
    assert!(draw_tile(&s, Some(&"A"), &t, 32.0).is_err());
    assert_eq!(s.ops().last(), Some(&Op::Restore));
}

// =============================================================
// Scene
// =============================================================

#[test]
fn scene_draws_tiles_then_objects_in_array_order() {
    let mut doc = MapDocument::default();
    doc.layers.tiles = vec![tile("t1", 3, 4, "A", Rotation::Deg0), tile("t2", 3, 4, "B", Rotation::Deg0)];
    doc.layers.objects = vec![object("o1", 0, 0, "D"), object("o2", 0, 0, "C")];
    let s = RecordingSurface::default();
    draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(320.0, 320.0), None).unwrap();
    assert_eq!(s.images(), vec!["A", "B", "D", "C"]);
}

#[test]
fn scene_grid_comes_before_entities() {
    let mut doc = MapDocument::default();
    doc.layers.tiles = vec![tile("t1", 0, 0, "A", Rotation::Deg0)];
    let s = RecordingSurface::default();
    draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(64.0, 64.0), None).unwrap();
    let ops = s.ops();
    let grid = ops.iter().position(|op| *op == Op::StrokeStyle(GRID_STROKE.into())).unwrap();
    let image = ops.iter().position(|op| matches!(op, Op::Image(..))).unwrap();
    assert!(grid < image);
}

#[test]
fn scene_applies_pan_zoom_then_offset() {
    let mut doc = MapDocument::default();
    doc.grid_offset = GridOffset { x: 5, y: 6 };
    let vp = Viewport::for_document(Point::new(0.0, 0.0), Camera { pan_x: 10.0, pan_y: 20.0, zoom: 2.0 }, &doc);
    let s = RecordingSurface::default();
    draw_scene(&s, &images(), &doc, &vp, Size::new(100.0, 50.0), None).unwrap();
    let ops = s.ops();
    assert_eq!(
        &ops[..5],
        &[
            Op::Clear(0.0, 0.0, 100.0, 50.0),
            Op::Save,
            Op::Translate(10.0, 20.0),
            Op::Scale(2.0, 2.0),
            Op::Translate(5.0, 6.0),
        ]
    );
    assert_eq!(ops.last(), Some(&Op::Restore));
}

#[test]
fn scene_skips_unloaded_assets() {
    let mut doc = MapDocument::default();
    doc.layers.tiles = vec![tile("t1", 0, 0, "missing", Rotation::Deg0), tile("t2", 1, 0, "A", Rotation::Deg0)];
    let s = RecordingSurface::default();
    draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(64.0, 64.0), None).unwrap();
    assert_eq!(s.images(), vec!["A"]);
}

#[test]
fn scene_outlines_selection_last() {
    let mut doc = MapDocument::default();
    doc.layers.objects = vec![object("o1", 1, 2, "C")];
    let s = RecordingSurface::default();
    let selected = EntityRef::object("o1");
    draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(64.0, 64.0), Some(&selected)).unwrap();
    let ops = s.ops();
    let sel = ops.iter().position(|op| *op == Op::StrokeStyle(SELECTION_STROKE.into())).unwrap();
    let image = ops.iter().position(|op| matches!(op, Op::Image(..))).unwrap();
    assert!(image < sel);
    assert!(ops.contains(&Op::MoveTo(32.0, 64.0)));
}

#[test]
fn scene_ignores_dangling_selection() {
    let doc = MapDocument::default();
    let s = RecordingSurface::default();
    let selected = EntityRef::tile("gone");
    draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(32.0, 32.0), Some(&selected)).unwrap();
    assert!(!s.ops().contains(&Op::StrokeStyle(SELECTION_STROKE.into())));
}

#[test]
fn scene_error_propagates_and_restores() {
    let mut doc = MapDocument::default();
    doc.layers.tiles = vec![tile("t1", 0, 0, "A", Rotation::Deg0), tile("t2", 0, 0, "B", Rotation::Deg0)];
    let s = RecordingSurface { fail_on_image: Some("A"), ..RecordingSurface::default() };
    let err = draw_scene(&s, &images(), &doc, &plain_viewport(&doc), Size::new(32.0, 32.0), None).unwrap_err();
    assert_eq!(err, "broken image A");
    assert!(s.images().is_empty());
    let ops = s.ops();
    assert_eq!(&ops[ops.len() - 2..], &[Op::Restore, Op::Restore]);
}
