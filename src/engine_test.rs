#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn core() -> EngineCore {
    EngineCore::init().unwrap()
}

fn ok<T>(result: Result<T, JsError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => panic!("wasm surface call failed"),
    }
}

// =============================================================
// EngineCore: initialization
// =============================================================

#[test]
fn init_succeeds() {
    assert!(EngineCore::init().is_ok());
}

#[test]
fn init_leaves_no_live_blocks() {
    assert_eq!(core().live_blocks(), 0);
}

#[test]
fn instances_are_independent() {
    let mut a = core();
    let b = core();
    let block = a.allocate(4).unwrap();
    a.write_slots(block, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(a.live_blocks(), 1);
    assert_eq!(b.live_blocks(), 0);
}

// =============================================================
// EngineCore: memory protocol
// =============================================================

#[test]
fn allocate_write_read_free_round_trip() {
    let mut core = core();
    let block = core.allocate(3).unwrap();
    core.write_slots(block, &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(core.read_slots(block, 3).unwrap(), vec![1.0, 2.0, 3.0]);
    core.free(block).unwrap();
    assert_eq!(core.live_blocks(), 0);
}

#[test]
fn write_to_undersized_block_is_rejected() {
    let mut core = core();
    let block = core.allocate(2).unwrap();
    assert!(matches!(
        core.write_slots(block, &[1.0, 2.0, 3.0]),
        Err(EngineError::BlockTooSmall { .. })
    ));
}

#[test]
fn read_of_freed_block_is_rejected() {
    let mut core = core();
    let block = core.allocate(2).unwrap();
    core.free(block).unwrap();
    assert!(matches!(
        core.read_slots(block, 2),
        Err(EngineError::UnknownBlock(_))
    ));
}

// =============================================================
// EngineCore: batch transforms
// =============================================================

#[test]
fn batch_screen_to_canvas_matches_camera_math() {
    let mut core = core();
    let camera = Camera { view_x: 30.0, view_y: -12.0, zoom: 1.5 };
    let block = core.allocate(4).unwrap();
    core.write_slots(block, &[15.0, 30.0, -6.0, 9.0]).unwrap();
    core.batch_screen_to_canvas(&camera, block, 2).unwrap();

    let slots = core.read_slots(block, 4).unwrap();
    let expected_a = camera.screen_to_canvas(Point::new(15.0, 30.0));
    let expected_b = camera.screen_to_canvas(Point::new(-6.0, 9.0));
    assert!(approx_eq(slots[0], expected_a.x));
    assert!(approx_eq(slots[1], expected_a.y));
    assert!(approx_eq(slots[2], expected_b.x));
    assert!(approx_eq(slots[3], expected_b.y));
}

#[test]
fn batch_transforms_invert_each_other() {
    let mut core = core();
    let camera = Camera { view_x: 7.0, view_y: 3.0, zoom: 2.0 };
    let block = core.allocate(6).unwrap();
    let original = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    core.write_slots(block, &original).unwrap();
    core.batch_screen_to_canvas(&camera, block, 3).unwrap();
    core.batch_canvas_to_screen(&camera, block, 3).unwrap();
    for (got, want) in core.read_slots(block, 6).unwrap().iter().zip(&original) {
        assert!(approx_eq(*got, *want));
    }
}

#[test]
fn batch_over_count_is_rejected() {
    let mut core = core();
    let camera = Camera::default();
    let block = core.allocate(4).unwrap();
    assert!(matches!(
        core.batch_screen_to_canvas(&camera, block, 3),
        Err(EngineError::BlockTooSmall { .. })
    ));
}

// =============================================================
// EngineCore: smoothing
// =============================================================

#[test]
fn smooth_stroke_through_blocks_matches_direct_call() {
    let mut core = core();
    let points = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 20.0),
        Point::new(25.0, 5.0),
        Point::new(40.0, 30.0),
    ];
    let direct = smooth::smooth_stroke(&points, 0.5, 100);

    let input = core.allocate(points.len() * POINT_STRIDE).unwrap();
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    core.write_slots(input, &flat).unwrap();
    let output = core.allocate(100 * POINT_STRIDE).unwrap();

    let written = core
        .smooth_stroke(input, points.len(), 0.5, output, 100)
        .unwrap();
    assert_eq!(written, direct.len());

    let slots = core.read_slots(output, written * POINT_STRIDE).unwrap();
    for (pair, p) in slots.chunks_exact(POINT_STRIDE).zip(&direct) {
        assert!(approx_eq(pair[0], p.x));
        assert!(approx_eq(pair[1], p.y));
    }
}

#[test]
fn smooth_stroke_truncates_at_cap() {
    let mut core = core();
    let points: Vec<Point> = (0..20).map(|i| Point::new(f64::from(i), 0.0)).collect();
    let input = core.allocate(points.len() * POINT_STRIDE).unwrap();
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    core.write_slots(input, &flat).unwrap();
    let output = core.allocate(5 * POINT_STRIDE).unwrap();

    let written = core.smooth_stroke(input, 20, 0.5, output, 5).unwrap();
    assert!(written <= 5);
}

#[test]
fn smooth_stroke_rejects_undersized_output_block() {
    let mut core = core();
    let input = core.allocate(4).unwrap();
    core.write_slots(input, &[0.0, 0.0, 10.0, 10.0]).unwrap();
    let output = core.allocate(4).unwrap();
    // Caller promised 100 output points but only allocated 4 slots.
    assert!(matches!(
        core.smooth_stroke(input, 2, 0.5, output, 100),
        Err(EngineError::BlockTooSmall { .. })
    ));
}

// =============================================================
// EngineCore: spray and airbrush
// =============================================================

#[test]
fn spray_dots_through_blocks_matches_direct_call() {
    let mut core = core();
    let direct = spray::spray_dots(100.0, 100.0, 50.0, 30, 42);
    let output = core.allocate(30 * POINT_STRIDE).unwrap();
    core.spray_dots(100.0, 100.0, 50.0, 30, 42, output).unwrap();

    let slots = core.read_slots(output, 30 * POINT_STRIDE).unwrap();
    for (pair, p) in slots.chunks_exact(POINT_STRIDE).zip(&direct) {
        assert_eq!(pair[0], p.x);
        assert_eq!(pair[1], p.y);
    }
}

#[test]
fn airbrush_layers_through_blocks() {
    let mut core = core();
    let output = core.allocate(4 * LAYER_STRIDE).unwrap();
    core.airbrush_layers(40.0, 0.8, 4, output).unwrap();
    let slots = core.read_slots(output, 4 * LAYER_STRIDE).unwrap();
    assert_eq!(slots[0], 40.0);
    assert_eq!(slots[1], 0.8);
    // Second ring scaled by 3/4.
    assert!(approx_eq(slots[2], 30.0));
    assert!(approx_eq(slots[3], 0.6));
}

// =============================================================
// EngineCore: placement and eraser
// =============================================================

#[test]
fn find_placement_through_blocks_decodes_records() {
    let mut core = core();
    let zones = core.allocate(2 * ZONE_STRIDE).unwrap();
    #[rustfmt::skip]
    let zone_slots = [
        1000.0, 0.0, 200.0, 200.0, 5.0,
        0.0, 0.0, 200.0, 200.0, 1.0,
    ];
    core.write_slots(zones, &zone_slots).unwrap();
    let footprints = core.allocate(FOOTPRINT_STRIDE).unwrap();
    core.write_slots(footprints, &[900.0, 900.0, 10.0, 10.0])
        .unwrap();

    let placement = core
        .find_placement(50.0, 50.0, zones, 2, footprints, 1, 10.0, 42, 20)
        .unwrap();
    assert_eq!(placement.zone_index, 1);
    assert!(placement.x >= 0.0 && placement.x + 50.0 <= 200.0);

    core.free(zones).unwrap();
    core.free(footprints).unwrap();
    assert_eq!(core.live_blocks(), 0);
}

#[test]
fn find_placement_fallback_through_blocks() {
    let mut core = core();
    let zones = core.allocate(ZONE_STRIDE).unwrap();
    core.write_slots(zones, &[30.0, 40.0, 100.0, 100.0, 0.0])
        .unwrap();
    let footprints = core.allocate(FOOTPRINT_STRIDE).unwrap();
    core.write_slots(footprints, &[30.0, 40.0, 100.0, 100.0])
        .unwrap();

    let placement = core
        .find_placement(50.0, 50.0, zones, 1, footprints, 1, 10.0, 42, 25)
        .unwrap();
    assert_eq!(placement.zone_index, 0);
    assert_eq!(placement.x, 30.0);
    assert_eq!(placement.y, 40.0);
}

#[test]
fn eraser_through_blocks() {
    let mut core = core();
    let points = core.allocate(2 * POINT_STRIDE).unwrap();
    core.write_slots(points, &[0.0, 0.0, 100.0, 0.0]).unwrap();

    assert!(core.eraser_hits_stroke(2.0, 2.0, 5.0, points, 2).unwrap());
    // Midpoint of the segment: sampled points only, so no hit.
    assert!(!core.eraser_hits_stroke(50.0, 0.0, 10.0, points, 2).unwrap());
}

// =============================================================
// Wasm surface
// =============================================================

#[test]
fn wasm_engine_constructs() {
    assert!(Engine::new().is_ok());
}

#[test]
fn wasm_block_lifecycle() {
    let mut engine = ok(Engine::new());
    let block = ok(engine.allocate(4));
    ok(engine.load_block(block, &[1.0, 2.0, 3.0, 4.0]));
    assert_eq!(ok(engine.read_block(block, 4)), vec![1.0, 2.0, 3.0, 4.0]);
    ok(engine.free_block(block));
    assert_eq!(engine.live_blocks(), 0);
}

#[test]
fn wasm_double_free_throws() {
    let mut engine = ok(Engine::new());
    let block = ok(engine.allocate(2));
    ok(engine.free_block(block));
    assert!(engine.free_block(block).is_err());
}

#[test]
fn wasm_scalar_geometry_passthrough() {
    let engine = ok(Engine::new());
    assert!(engine.point_in_rect(5.0, 5.0, 0.0, 0.0, 10.0, 10.0, 0.0));
    assert!(engine.rect_overlaps(0.0, 0.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0));
    assert!(!engine.rect_intersects(0.0, 0.0, 10.0, 10.0, 10.0, 0.0, 10.0, 10.0));
    assert!(approx_eq(engine.distance(0.0, 0.0, 3.0, 4.0), 5.0));
}

#[test]
fn wasm_zoom_center_round_trip() {
    let mut engine = ok(Engine::new());
    let out = ok(engine.allocate(2));
    ok(engine.zoom_center(640.0, 360.0, 120.0, -80.0, 1.5, 2.25, out));
    let view = ok(engine.read_block(out, 2));

    let before = Camera { view_x: 120.0, view_y: -80.0, zoom: 1.5 }
        .screen_to_canvas(Point::new(640.0, 360.0));
    let after = Camera { view_x: view[0], view_y: view[1], zoom: 2.25 }
        .screen_to_canvas(Point::new(640.0, 360.0));
    assert!(approx_eq(before.x, after.x));
    assert!(approx_eq(before.y, after.y));
}

#[test]
fn wasm_smooth_stroke_reports_count() {
    let mut engine = ok(Engine::new());
    let input = ok(engine.allocate(6));
    ok(engine.load_block(input, &[0.0, 0.0, 10.0, 10.0, 20.0, 0.0]));
    let output = ok(engine.allocate(21 * 2));
    let written = ok(engine.smooth_stroke(input, 3, 0.5, output, 21));
    assert_eq!(written, 21);
}

#[test]
fn wasm_find_placement_writes_position_and_returns_index() {
    let mut engine = ok(Engine::new());
    let zones = ok(engine.allocate(5));
    ok(engine.load_block(zones, &[0.0, 0.0, 200.0, 200.0, 0.0]));
    let footprints = ok(engine.allocate(4));
    ok(engine.load_block(footprints, &[900.0, 900.0, 10.0, 10.0]));
    let out = ok(engine.allocate(2));

    let index = ok(engine.find_placement(50.0, 50.0, zones, 1, footprints, 1, 10.0, 42, 20, out));
    assert_eq!(index, 0);
    let pos = ok(engine.read_block(out, 2));
    assert!(pos[0] >= 0.0 && pos[0] + 50.0 <= 200.0);
    assert!(pos[1] >= 0.0 && pos[1] + 50.0 <= 200.0);
}

#[test]
fn wasm_rotated_bounding_box_writes_four_slots() {
    let mut engine = ok(Engine::new());
    let out = ok(engine.allocate(4));
    ok(engine.rotated_bounding_box(5.0, 6.0, 30.0, 20.0, 0.0, out));
    assert_eq!(ok(engine.read_block(out, 4)), vec![5.0, 6.0, 35.0, 26.0]);
}
