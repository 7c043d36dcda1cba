#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn viewport(origin: (f64, f64), pan: (f64, f64), zoom: f64, offset: (i32, i32), tile: u32) -> Viewport {
    Viewport::new(
        Point::new(origin.0, origin.1),
        Camera { pan_x: pan.0, pan_y: pan.1, zoom },
        GridOffset { x: offset.0, y: offset.1 },
        tile,
    )
}

fn plain(tile: u32) -> Viewport {
    viewport((0.0, 0.0), (0.0, 0.0), 1.0, (0, 0), tile)
}

// --- Camera ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

#[test]
fn camera_screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(60.0, 30.0));
    assert!(point_approx_eq(world, Point::new(20.0, 10.0)));
}

#[test]
fn camera_round_trip_fractional_zoom() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = Point::new(333.3, -999.9);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(point_approx_eq(world, back));
}

#[test]
fn camera_screen_dist_ignores_pan() {
    let cam = Camera { pan_x: 999.0, pan_y: -999.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

#[test]
fn camera_pan_by_accumulates() {
    let mut cam = Camera::default();
    cam.pan_by(5.0, -3.0);
    cam.pan_by(1.0, 1.0);
    assert!(approx_eq(cam.pan_x, 6.0));
    assert!(approx_eq(cam.pan_y, -2.0));
}

#[test]
fn camera_zoom_about_keeps_anchor_fixed() {
    let mut cam = Camera { pan_x: 40.0, pan_y: -10.0, zoom: 1.5 };
    let anchor = Point::new(200.0, 120.0);
    let before = cam.screen_to_world(anchor);
    cam.zoom_about(anchor, 2.0);
    assert!(approx_eq(cam.zoom, 3.0));
    assert!(point_approx_eq(cam.screen_to_world(anchor), before));
}

#[test]
fn camera_zoom_about_clamps() {
    let mut cam = Camera::default();
    cam.zoom_about(Point::new(0.0, 0.0), 1000.0);
    assert!(approx_eq(cam.zoom, ZOOM_MAX));
    cam.zoom_about(Point::new(0.0, 0.0), 1e-9);
    assert!(approx_eq(cam.zoom, ZOOM_MIN));
}

// --- screen_to_world ---

#[test]
fn screen_to_world_subtracts_origin_pan_and_offset() {
    let vp = viewport((10.0, 20.0), (30.0, 40.0), 2.0, (5, 7), 32);
    // (110 - 10 - 30) / 2 - 5 = 30, (220 - 20 - 40) / 2 - 7 = 73
    let world = screen_to_world(Point::new(110.0, 220.0), &vp);
    assert!(point_approx_eq(world, Point::new(30.0, 73.0)));
}

#[test]
fn world_to_screen_inverts_screen_to_world() {
    let vp = viewport((12.5, -4.0), (-30.0, 18.0), 0.6, (-3, 11), 24);
    let screen = Point::new(321.0, 87.5);
    let back = world_to_screen(screen_to_world(screen, &vp), &vp);
    assert!(point_approx_eq(screen, back));
}

// --- screen_to_grid ---

#[test]
fn screen_to_grid_documented_scenario() {
    let vp = plain(32);
    assert_eq!(screen_to_grid(Point::new(48.0, 80.0), &vp), Cell::new(1, 2));
}

#[test]
fn screen_to_grid_floors_negative_world() {
    let vp = plain(32);
    assert_eq!(screen_to_grid(Point::new(-1.0, -33.0), &vp), Cell::new(-1, -2));
}

#[test]
fn screen_to_grid_accounts_for_zoom() {
    let vp = viewport((0.0, 0.0), (0.0, 0.0), 2.0, (0, 0), 32);
    // world = (130, 70) / 2 = (65, 35) -> cell (2, 1)
    assert_eq!(screen_to_grid(Point::new(130.0, 70.0), &vp), Cell::new(2, 1));
}

#[test]
fn screen_to_grid_accounts_for_grid_offset() {
    let vp = viewport((0.0, 0.0), (0.0, 0.0), 1.0, (16, 16), 32);
    // world = (40 - 16, 40 - 16) = (24, 24) -> cell (0, 0)
    assert_eq!(screen_to_grid(Point::new(40.0, 40.0), &vp), Cell::new(0, 0));
    // world = (10 - 16) = -6 -> cell -1
    assert_eq!(screen_to_grid(Point::new(10.0, 10.0), &vp), Cell::new(-1, -1));
}

#[test]
fn screen_to_grid_does_not_clamp() {
    let vp = plain(32);
    assert_eq!(screen_to_grid(Point::new(10_000.0, 64.0), &vp), Cell::new(312, 2));
}

// --- screen_to_grid_snapped ---

#[test]
fn snapped_rounds_to_nearest_corner() {
    let vp = plain(32);
    let snapped = screen_to_grid_snapped(Point::new(48.0, 79.0), &vp);
    // 48 / 32 = 1.5 -> 2, 79 / 32 = 2.47 -> 2
    assert_eq!(snapped.cell(), Cell::new(2, 2));
    assert!(approx_eq(snapped.world_x, 64.0));
    assert!(approx_eq(snapped.world_y, 64.0));
}

#[test]
fn snapped_ties_round_towards_positive_infinity() {
    let vp = plain(10);
    let snapped = screen_to_grid_snapped(Point::new(-5.0, 5.0), &vp);
    assert_eq!(snapped.cell(), Cell::new(0, 1));
}

#[test]
fn snapped_and_floor_agree_on_exact_boundaries() {
    let configs = [
        viewport((0.0, 0.0), (0.0, 0.0), 1.0, (0, 0), 32),
        viewport((8.0, 4.0), (20.0, -12.0), 2.0, (3, -5), 16),
        viewport((0.0, 0.0), (-7.0, 9.0), 0.5, (-10, 10), 25),
    ];
    for vp in &configs {
        for gx in -4..6 {
            for gy in -3..5 {
                let world = Point::new(f64::from(gx) * vp.tile_size, f64::from(gy) * vp.tile_size);
                let pointer = world_to_screen(world, vp);
                let floor = screen_to_grid(pointer, vp);
                let snapped = screen_to_grid_snapped(pointer, vp);
                assert_eq!(floor, Cell::new(gx, gy), "floor at {world:?}");
                assert_eq!(snapped.cell(), floor, "snapped at {world:?}");
            }
        }
    }
}

// --- cell_to_world ---

#[test]
fn cell_to_world_is_top_left_corner() {
    let p = cell_to_world(Cell::new(3, -2), 32.0);
    assert!(point_approx_eq(p, Point::new(96.0, -64.0)));
}

#[test]
fn viewport_for_document_uses_grid_geometry() {
    let mut doc = MapDocument::default();
    doc.grid.tile_size = 48;
    doc.grid_offset = GridOffset { x: -4, y: 9 };
    let vp = Viewport::for_document(Point::new(0.0, 0.0), Camera::default(), &doc);
    assert!(approx_eq(vp.tile_size, 48.0));
    assert!(point_approx_eq(vp.grid_offset, Point::new(-4.0, 9.0)));
}
