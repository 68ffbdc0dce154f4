//! Engine call surface: block-based operations over linear memory, the
//! one-time self-check, and the wasm export wrapper.
//!
//! `EngineCore` is plain Rust — no browser dependencies — so the whole call
//! surface is testable natively. `Engine` wraps it one-to-one for the wasm
//! boundary, with offsets and counts as `u32` and errors surfaced as thrown
//! `JsError`s. The engine holds no state between calls beyond the arena
//! itself; every operation runs to completion on the caller's thread.

use wasm_bindgen::prelude::*;

use crate::camera::{Camera, Point};
use crate::error::EngineError;
use crate::geom::{self, Rect};
use crate::hit;
use crate::mem::{
    BlockRef, FOOTPRINT_STRIDE, LAYER_STRIDE, LinearMemory, PAIR_OUTPUT_SLOTS, POINT_STRIDE,
    ZONE_STRIDE,
};
use crate::place::{self, Footprint, Placement, Zone};
use crate::rng::Lcg;
use crate::smooth;
use crate::spray;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Core engine state: the linear-memory arena behind the transfer protocol.
///
/// Separated from [`Engine`] so it can be tested without a wasm host.
pub struct EngineCore {
    memory: LinearMemory,
}

impl EngineCore {
    /// Construct the engine, running the one-time self-check.
    ///
    /// # Errors
    ///
    /// [`EngineError::InitFailed`] when the self-check does not reproduce
    /// its known answers. A failed engine is fatal for the process; callers
    /// must not retry.
    pub fn init() -> Result<Self, EngineError> {
        let mut core = Self { memory: LinearMemory::new() };
        core.self_check()?;
        Ok(core)
    }

    /// Known-answer checks across the generator, the transform pair, and
    /// one arena cycle.
    fn self_check(&mut self) -> Result<(), EngineError> {
        let (_, raw) = Lcg::new(1).step();
        if raw != 1_103_527_590 {
            return Err(EngineError::InitFailed("generator constants".to_owned()));
        }

        let camera = Camera { view_x: 17.0, view_y: -4.0, zoom: 2.5 };
        let p = Point::new(12.5, -3.25);
        let rt = camera.canvas_to_screen(camera.screen_to_canvas(p));
        if (rt.x - p.x).abs() > 1e-9 || (rt.y - p.y).abs() > 1e-9 {
            return Err(EngineError::InitFailed("transform round-trip".to_owned()));
        }

        let block = self.memory.alloc(PAIR_OUTPUT_SLOTS)?;
        self.memory.free(block)?;
        if self.memory.live_blocks() != 0 {
            return Err(EngineError::InitFailed("arena cycle leaked".to_owned()));
        }
        Ok(())
    }

    // ── Memory protocol ─────────────────────────────────────────

    /// Allocate `len` f64 slots of transfer memory.
    ///
    /// # Errors
    ///
    /// Zero-length allocations are rejected.
    pub fn allocate(&mut self, len: usize) -> Result<BlockRef, EngineError> {
        self.memory.alloc(len)
    }

    /// Release a block. Every allocation must be freed exactly once.
    ///
    /// # Errors
    ///
    /// Unknown offsets, including double frees, are rejected.
    pub fn free(&mut self, block: BlockRef) -> Result<(), EngineError> {
        self.memory.free(block)
    }

    /// Copy host data into a live block, starting at its first slot.
    ///
    /// # Errors
    ///
    /// The block must be live and at least `data.len()` slots long.
    pub fn write_slots(&mut self, block: BlockRef, data: &[f64]) -> Result<(), EngineError> {
        self.memory.slice_mut(block, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Copy `len` slots out of a live block.
    ///
    /// # Errors
    ///
    /// The block must be live and at least `len` slots long.
    pub fn read_slots(&self, block: BlockRef, len: usize) -> Result<Vec<f64>, EngineError> {
        Ok(self.memory.slice(block, len)?.to_vec())
    }

    /// Blocks allocated and not yet freed. Zero between well-behaved calls.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.memory.live_blocks()
    }

    // ── Block-based operations ──────────────────────────────────

    /// Convert `count` interleaved screen points to canvas space, in place.
    ///
    /// # Errors
    ///
    /// The block must be live and hold `count * 2` slots.
    pub fn batch_screen_to_canvas(
        &mut self,
        camera: &Camera,
        block: BlockRef,
        count: usize,
    ) -> Result<(), EngineError> {
        let coords = self.memory.slice_mut(block, count * POINT_STRIDE)?;
        camera.screen_to_canvas_in_place(coords);
        Ok(())
    }

    /// Convert `count` interleaved canvas points to screen space, in place.
    ///
    /// # Errors
    ///
    /// The block must be live and hold `count * 2` slots.
    pub fn batch_canvas_to_screen(
        &mut self,
        camera: &Camera,
        block: BlockRef,
        count: usize,
    ) -> Result<(), EngineError> {
        let coords = self.memory.slice_mut(block, count * POINT_STRIDE)?;
        camera.canvas_to_screen_in_place(coords);
        Ok(())
    }

    /// Smooth `count` stroke points from `input` into `output`, returning
    /// the number of points written — the truncate-and-report contract of
    /// [`smooth::smooth_stroke`].
    ///
    /// # Errors
    ///
    /// `input` must hold `count * 2` slots and `output` must hold
    /// `max_output_points * 2` slots.
    pub fn smooth_stroke(
        &mut self,
        input: BlockRef,
        count: usize,
        tension: f64,
        output: BlockRef,
        max_output_points: usize,
    ) -> Result<usize, EngineError> {
        let points = read_points(self.memory.slice(input, count * POINT_STRIDE)?);
        let smoothed = smooth::smooth_stroke(&points, tension, max_output_points);
        let out = self.memory.slice_mut(output, max_output_points * POINT_STRIDE)?;
        write_points(&smoothed, out);
        Ok(smoothed.len())
    }

    /// Write `density` seeded spray dots into `output`.
    ///
    /// # Errors
    ///
    /// `output` must hold `density * 2` slots.
    pub fn spray_dots(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        density: usize,
        seed: u32,
        output: BlockRef,
    ) -> Result<(), EngineError> {
        let dots = spray::spray_dots(cx, cy, radius, density, seed);
        let out = self.memory.slice_mut(output, density * POINT_STRIDE)?;
        write_points(&dots, out);
        Ok(())
    }

    /// Write `layer_count` airbrush rings into `output`, stride 2
    /// (`[radius, opacity]` per layer).
    ///
    /// # Errors
    ///
    /// `output` must hold `layer_count * 2` slots.
    pub fn airbrush_layers(
        &mut self,
        radius: f64,
        opacity: f64,
        layer_count: usize,
        output: BlockRef,
    ) -> Result<(), EngineError> {
        let layers = spray::airbrush_layers(radius, opacity, layer_count);
        let out = self.memory.slice_mut(output, layer_count * LAYER_STRIDE)?;
        for (pair, layer) in out.chunks_exact_mut(LAYER_STRIDE).zip(&layers) {
            pair[0] = layer.radius;
            pair[1] = layer.opacity;
        }
        Ok(())
    }

    /// Run the placement search over zone and footprint records in transfer
    /// memory.
    ///
    /// # Errors
    ///
    /// `zones` must hold `zone_count * 5` slots and `footprints` must hold
    /// `footprint_count * 4` slots.
    pub fn find_placement(
        &self,
        width: f64,
        height: f64,
        zones: BlockRef,
        zone_count: usize,
        footprints: BlockRef,
        footprint_count: usize,
        grid_size: f64,
        seed: u32,
        max_attempts: u32,
    ) -> Result<Placement, EngineError> {
        let zones = read_zones(self.memory.slice(zones, zone_count * ZONE_STRIDE)?);
        let footprints =
            read_footprints(self.memory.slice(footprints, footprint_count * FOOTPRINT_STRIDE)?);
        Ok(place::find_placement(
            width,
            height,
            &zones,
            &footprints,
            grid_size,
            seed,
            max_attempts,
        ))
    }

    /// Test an eraser circle against `count` stroke points in transfer
    /// memory.
    ///
    /// # Errors
    ///
    /// `points` must hold `count * 2` slots.
    pub fn eraser_hits_stroke(
        &self,
        ex: f64,
        ey: f64,
        radius: f64,
        points: BlockRef,
        count: usize,
    ) -> Result<bool, EngineError> {
        let points = read_points(self.memory.slice(points, count * POINT_STRIDE)?);
        Ok(hit::eraser_hits_stroke(ex, ey, radius, &points))
    }
}

fn read_points(slots: &[f64]) -> Vec<Point> {
    slots
        .chunks_exact(POINT_STRIDE)
        .map(|c| Point::new(c[0], c[1]))
        .collect()
}

fn write_points(points: &[Point], out: &mut [f64]) {
    for (pair, p) in out.chunks_exact_mut(POINT_STRIDE).zip(points) {
        pair[0] = p.x;
        pair[1] = p.y;
    }
}

fn read_zones(slots: &[f64]) -> Vec<Zone> {
    slots
        .chunks_exact(ZONE_STRIDE)
        .map(|c| Zone {
            x: c[0],
            y: c[1],
            width: c[2],
            height: c[3],
            priority: c[4] as i32,
        })
        .collect()
}

fn read_footprints(slots: &[f64]) -> Vec<Footprint> {
    slots
        .chunks_exact(FOOTPRINT_STRIDE)
        .map(|c| Footprint {
            x: c[0],
            y: c[1],
            width: c[2],
            height: c[3],
        })
        .collect()
}

/// The engine as exported to the wasm host. Wraps [`EngineCore`] one-to-one
/// with a flat scalar-and-offset signature per operation.
#[wasm_bindgen]
pub struct Engine {
    core: EngineCore,
}

#[wasm_bindgen]
impl Engine {
    /// Load the engine, running the one-time self-check.
    ///
    /// # Errors
    ///
    /// Throws when the self-check fails; the host records the engine as
    /// unsupported and must not retry.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Engine, JsError> {
        Ok(Engine { core: EngineCore::init()? })
    }

    /// Allocate `len` f64 slots; returns the block offset.
    ///
    /// # Errors
    ///
    /// Throws on zero-length allocations.
    pub fn allocate(&mut self, len: u32) -> Result<u32, JsError> {
        Ok(self.core.allocate(len as usize)?.0)
    }

    /// Release a block. (`free` collides with the destructor wasm-bindgen
    /// generates on the JS class, hence the longer name.)
    ///
    /// # Errors
    ///
    /// Throws on unknown offsets, including double frees.
    pub fn free_block(&mut self, offset: u32) -> Result<(), JsError> {
        self.core.free(BlockRef(offset))?;
        Ok(())
    }

    /// Copy host data into a live block.
    ///
    /// # Errors
    ///
    /// Throws when the block is unknown or too small.
    pub fn load_block(&mut self, offset: u32, data: &[f64]) -> Result<(), JsError> {
        self.core.write_slots(BlockRef(offset), data)?;
        Ok(())
    }

    /// Copy `len` slots out of a live block.
    ///
    /// # Errors
    ///
    /// Throws when the block is unknown or too small.
    pub fn read_block(&self, offset: u32, len: u32) -> Result<Vec<f64>, JsError> {
        Ok(self.core.read_slots(BlockRef(offset), len as usize)?)
    }

    /// Blocks allocated and not yet freed.
    #[must_use]
    pub fn live_blocks(&self) -> u32 {
        self.core.live_blocks() as u32
    }

    /// Convert one screen point, writing `[cx, cy]` into the 2-slot `out`
    /// block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn screen_to_canvas(
        &mut self,
        sx: f64,
        sy: f64,
        view_x: f64,
        view_y: f64,
        zoom: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let camera = Camera { view_x, view_y, zoom };
        let p = camera.screen_to_canvas(Point::new(sx, sy));
        self.core.write_slots(BlockRef(out), &[p.x, p.y])?;
        Ok(())
    }

    /// Convert one canvas point, writing `[sx, sy]` into the 2-slot `out`
    /// block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn canvas_to_screen(
        &mut self,
        cx: f64,
        cy: f64,
        view_x: f64,
        view_y: f64,
        zoom: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let camera = Camera { view_x, view_y, zoom };
        let p = camera.canvas_to_screen(Point::new(cx, cy));
        self.core.write_slots(BlockRef(out), &[p.x, p.y])?;
        Ok(())
    }

    /// Convert `count` interleaved screen points to canvas space in place.
    ///
    /// # Errors
    ///
    /// Throws when the block is unknown or too small.
    pub fn batch_screen_to_canvas(
        &mut self,
        offset: u32,
        count: u32,
        view_x: f64,
        view_y: f64,
        zoom: f64,
    ) -> Result<(), JsError> {
        let camera = Camera { view_x, view_y, zoom };
        self.core
            .batch_screen_to_canvas(&camera, BlockRef(offset), count as usize)?;
        Ok(())
    }

    /// Convert `count` interleaved canvas points to screen space in place.
    ///
    /// # Errors
    ///
    /// Throws when the block is unknown or too small.
    pub fn batch_canvas_to_screen(
        &mut self,
        offset: u32,
        count: u32,
        view_x: f64,
        view_y: f64,
        zoom: f64,
    ) -> Result<(), JsError> {
        let camera = Camera { view_x, view_y, zoom };
        self.core
            .batch_canvas_to_screen(&camera, BlockRef(offset), count as usize)?;
        Ok(())
    }

    /// Compute the view offset that keeps the canvas point under the cursor
    /// fixed across a zoom change, writing `[view_x, view_y]` into the
    /// 2-slot `out` block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn zoom_center(
        &mut self,
        mx: f64,
        my: f64,
        view_x: f64,
        view_y: f64,
        old_zoom: f64,
        new_zoom: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let camera = Camera { view_x, view_y, zoom: old_zoom };
        let next = camera.zoom_center(mx, my, new_zoom);
        self.core.write_slots(BlockRef(out), &[next.view_x, next.view_y])?;
        Ok(())
    }

    /// Smooth `count` stroke points from `input` into `output`; returns the
    /// number of points written. Hitting `max_output_points` truncates, it
    /// does not throw.
    ///
    /// # Errors
    ///
    /// Throws when either block is unknown or too small.
    pub fn smooth_stroke(
        &mut self,
        input: u32,
        count: u32,
        tension: f64,
        output: u32,
        max_output_points: u32,
    ) -> Result<u32, JsError> {
        let written = self.core.smooth_stroke(
            BlockRef(input),
            count as usize,
            tension,
            BlockRef(output),
            max_output_points as usize,
        )?;
        Ok(written as u32)
    }

    /// Write `density` seeded spray dots into `output`.
    ///
    /// # Errors
    ///
    /// Throws when `output` is unknown or too small.
    pub fn spray_dots(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        density: u32,
        seed: u32,
        output: u32,
    ) -> Result<(), JsError> {
        self.core
            .spray_dots(cx, cy, radius, density as usize, seed, BlockRef(output))?;
        Ok(())
    }

    /// Write `layer_count` airbrush rings into `output`, stride 2.
    ///
    /// # Errors
    ///
    /// Throws when `output` is unknown or too small.
    pub fn airbrush_layers(
        &mut self,
        radius: f64,
        opacity: f64,
        layer_count: u32,
        output: u32,
    ) -> Result<(), JsError> {
        self.core
            .airbrush_layers(radius, opacity, layer_count as usize, BlockRef(output))?;
        Ok(())
    }

    /// Point-in-rectangle test honoring rotation.
    #[must_use]
    pub fn point_in_rect(
        &self,
        px: f64,
        py: f64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> bool {
        hit::point_in_rect(
            Point::new(px, py),
            &Rect::with_rotation(x, y, width, height, rotation),
        )
    }

    /// Inclusive axis-aligned overlap test; touching edges count.
    #[must_use]
    pub fn rect_overlaps(
        &self,
        ax: f64,
        ay: f64,
        aw: f64,
        ah: f64,
        bx: f64,
        by: f64,
        bw: f64,
        bh: f64,
    ) -> bool {
        geom::rect_overlaps(&Rect::new(ax, ay, aw, ah), &Rect::new(bx, by, bw, bh))
    }

    /// Strict axis-aligned overlap test; touching edges do not count.
    #[must_use]
    pub fn rect_intersects(
        &self,
        ax: f64,
        ay: f64,
        aw: f64,
        ah: f64,
        bx: f64,
        by: f64,
        bw: f64,
        bh: f64,
    ) -> bool {
        geom::rect_intersects(&Rect::new(ax, ay, aw, ah), &Rect::new(bx, by, bw, bh))
    }

    /// Axis-aligned box of a rotated rectangle, written as
    /// `[min_x, min_y, max_x, max_y]` into the 4-slot `out` block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn rotated_bounding_box(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let bounds = geom::rotated_bounding_box(&Rect::with_rotation(x, y, width, height, rotation));
        self.core.write_slots(BlockRef(out), &bounds.to_slots())?;
        Ok(())
    }

    /// Axis-aligned box of a rotated, scaled rectangle, written into the
    /// 4-slot `out` block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn element_bounds(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
        scale_x: f64,
        scale_y: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let bounds = geom::element_bounds(
            &Rect::with_rotation(x, y, width, height, rotation),
            scale_x,
            scale_y,
        );
        self.core.write_slots(BlockRef(out), &bounds.to_slots())?;
        Ok(())
    }

    /// Clamp a drag position to the stage, writing `[x, y]` into the 2-slot
    /// `out` block.
    ///
    /// # Errors
    ///
    /// Throws when `out` is unknown or too small.
    pub fn clamp_drag_position(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stage_width: f64,
        stage_height: f64,
        out: u32,
    ) -> Result<(), JsError> {
        let p = geom::clamp_drag_position(x, y, width, height, stage_width, stage_height);
        self.core.write_slots(BlockRef(out), &[p.x, p.y])?;
        Ok(())
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        geom::distance(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Perpendicular distance from a point to a segment, clamped to the
    /// segment's ends.
    #[must_use]
    pub fn point_to_segment_distance(
        &self,
        px: f64,
        py: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> f64 {
        geom::point_to_segment_distance(Point::new(px, py), Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Eraser test against `count` stroke points in transfer memory.
    ///
    /// # Errors
    ///
    /// Throws when the block is unknown or too small.
    pub fn eraser_hits_stroke(
        &self,
        ex: f64,
        ey: f64,
        radius: f64,
        points: u32,
        count: u32,
    ) -> Result<bool, JsError> {
        Ok(self
            .core
            .eraser_hits_stroke(ex, ey, radius, BlockRef(points), count as usize)?)
    }

    /// Placement search over zone and footprint records in transfer memory.
    /// Writes the position `[x, y]` into the 2-slot `out` block and returns
    /// the winning zone's index.
    ///
    /// # Errors
    ///
    /// Throws when any block is unknown or too small.
    pub fn find_placement(
        &mut self,
        width: f64,
        height: f64,
        zones: u32,
        zone_count: u32,
        footprints: u32,
        footprint_count: u32,
        grid_size: f64,
        seed: u32,
        max_attempts: u32,
        out: u32,
    ) -> Result<u32, JsError> {
        let placement = self.core.find_placement(
            width,
            height,
            BlockRef(zones),
            zone_count as usize,
            BlockRef(footprints),
            footprint_count as usize,
            grid_size,
            seed,
            max_attempts,
        )?;
        self.core
            .write_slots(BlockRef(out), &[placement.x, placement.y])?;
        Ok(placement.zone_index as u32)
    }
}
