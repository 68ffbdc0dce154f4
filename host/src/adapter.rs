//! The engine host: one-time initialization, readiness gating, and typed
//! marshalling wrappers over the linear-memory transfer protocol.
//!
//! Every bulk operation follows the same bracket: allocate a block, write
//! inputs, invoke the engine, read outputs, free the block — all before the
//! next call, with the free guaranteed on error paths by a scope helper.
//! Scalar operations share the engine's readiness gate but carry their
//! arguments directly.

#[cfg(test)]
#[path = "adapter_test.rs"]
mod adapter_test;

use platecanvas::camera::{Camera, Point};
use platecanvas::engine::EngineCore;
use platecanvas::geom::{self, Bounds, Rect};
use platecanvas::hit;
use platecanvas::mem::{BlockRef, FOOTPRINT_STRIDE, LAYER_STRIDE, POINT_STRIDE, ZONE_STRIDE};
use platecanvas::place::{Footprint, Placement, Zone};
use platecanvas::spray::AirbrushLayer;
use tracing::{info, trace, warn};

use crate::error::HostError;
use crate::status::EngineStatus;
use crate::stroke::FinishedStroke;

enum EngineState {
    Active(EngineCore),
    Inactive { reason: String },
}

/// Owns the accelerated engine for the lifetime of the process.
///
/// Construction never fails: an engine that cannot initialize is recorded
/// as inactive, and every subsequent operation reports
/// [`HostError::NotReady`]. Initialization is not retried; the readiness
/// report tells the UI whether accelerated calls are permitted at all.
pub struct EngineHost {
    state: EngineState,
    status: EngineStatus,
}

impl EngineHost {
    /// Load the engine and run its self-check, once.
    #[must_use]
    pub fn init() -> Self {
        match EngineCore::init() {
            Ok(core) => {
                info!("plate engine initialized");
                Self {
                    state: EngineState::Active(core),
                    status: EngineStatus::ready(),
                }
            }
            Err(e) => {
                warn!(error = %e, "plate engine unavailable; accelerated calls disabled");
                Self {
                    state: EngineState::Inactive { reason: e.to_string() },
                    status: EngineStatus::unsupported(&e.to_string()),
                }
            }
        }
    }

    /// A host whose engine is disabled, as after a failed initialization.
    /// Used by the UI kill switch and by tests exercising the gate.
    #[must_use]
    pub fn inactive(reason: &str) -> Self {
        Self {
            state: EngineState::Inactive { reason: reason.to_owned() },
            status: EngineStatus::unsupported(reason),
        }
    }

    /// Current readiness. The UI must gate accelerated calls on `active`.
    #[must_use]
    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Readiness rendered as JSON for the UI layer.
    #[must_use]
    pub fn status_json(&self) -> String {
        // Serializing a plain bool/string struct is infallible.
        serde_json::to_string(&self.status).unwrap_or_default()
    }

    /// Transfer blocks currently allocated and not freed. Zero between
    /// calls; anything else is a marshalling leak.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        match &self.state {
            EngineState::Active(core) => core.live_blocks(),
            EngineState::Inactive { .. } => 0,
        }
    }

    fn core(&mut self) -> Result<&mut EngineCore, HostError> {
        match &mut self.state {
            EngineState::Active(core) => Ok(core),
            EngineState::Inactive { reason } => Err(HostError::NotReady { reason: reason.clone() }),
        }
    }

    fn ensure_active(&self) -> Result<(), HostError> {
        match &self.state {
            EngineState::Active(_) => Ok(()),
            EngineState::Inactive { reason } => Err(HostError::NotReady { reason: reason.clone() }),
        }
    }

    /// Run `f` against a freshly allocated block of `len` slots, freeing the
    /// block on every path. The operation's own error wins over a secondary
    /// free failure.
    fn with_block<T>(
        core: &mut EngineCore,
        len: usize,
        f: impl FnOnce(&mut EngineCore, BlockRef) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        let block = core.allocate(len)?;
        let result = f(&mut *core, block);
        let freed = core.free(block);
        match result {
            Ok(value) => {
                freed?;
                Ok(value)
            }
            Err(e) => Err(e),
        }
    }

    // ── Coordinate transform ────────────────────────────────────

    /// Convert one screen point to canvas space.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn screen_to_canvas(&self, camera: &Camera, screen: Point) -> Result<Point, HostError> {
        self.ensure_active()?;
        Ok(camera.screen_to_canvas(screen))
    }

    /// Convert one canvas point to screen space.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn canvas_to_screen(&self, camera: &Camera, canvas: Point) -> Result<Point, HostError> {
        self.ensure_active()?;
        Ok(camera.canvas_to_screen(canvas))
    }

    /// Convert a screen-space distance to canvas space.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn screen_dist_to_canvas(&self, camera: &Camera, dist: f64) -> Result<f64, HostError> {
        self.ensure_active()?;
        Ok(camera.screen_dist_to_canvas(dist))
    }

    /// Compute the camera that keeps the canvas point under the cursor fixed
    /// across a zoom change.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn zoom_center(
        &self,
        camera: &Camera,
        mx: f64,
        my: f64,
        new_zoom: f64,
    ) -> Result<Camera, HostError> {
        self.ensure_active()?;
        Ok(camera.zoom_center(mx, my, new_zoom))
    }

    /// Convert a batch of screen points to canvas space in place, through
    /// the engine's transfer memory.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn batch_screen_to_canvas(
        &mut self,
        camera: &Camera,
        points: &mut [Point],
    ) -> Result<(), HostError> {
        let core = self.core()?;
        if points.is_empty() {
            return Ok(());
        }
        trace!(count = points.len(), "batch screen->canvas");
        let camera = *camera;
        Self::with_block(core, points.len() * POINT_STRIDE, |core, block| {
            core.write_slots(block, &flatten(points))?;
            core.batch_screen_to_canvas(&camera, block, points.len())?;
            let slots = core.read_slots(block, points.len() * POINT_STRIDE)?;
            unflatten_into(&slots, points);
            Ok(())
        })
    }

    /// Convert a batch of canvas points to screen space in place, through
    /// the engine's transfer memory.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn batch_canvas_to_screen(
        &mut self,
        camera: &Camera,
        points: &mut [Point],
    ) -> Result<(), HostError> {
        let core = self.core()?;
        if points.is_empty() {
            return Ok(());
        }
        trace!(count = points.len(), "batch canvas->screen");
        let camera = *camera;
        Self::with_block(core, points.len() * POINT_STRIDE, |core, block| {
            core.write_slots(block, &flatten(points))?;
            core.batch_canvas_to_screen(&camera, block, points.len())?;
            let slots = core.read_slots(block, points.len() * POINT_STRIDE)?;
            unflatten_into(&slots, points);
            Ok(())
        })
    }

    // ── Stroke smoothing ────────────────────────────────────────

    /// Smooth a finished stroke through the engine, returning at most
    /// `max_output_points` points. Size the cap with
    /// [`platecanvas::smooth::presize_output`] when the complete curve is
    /// needed; hitting the cap truncates, it does not error.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn smooth_stroke(
        &mut self,
        stroke: &FinishedStroke,
        tension: f64,
        max_output_points: usize,
    ) -> Result<Vec<Point>, HostError> {
        let core = self.core()?;
        let raw = stroke.engine_points();
        if raw.is_empty() || max_output_points == 0 {
            return Ok(Vec::new());
        }
        trace!(points = raw.len(), max_output_points, "smooth stroke");
        Self::with_block(core, raw.len() * POINT_STRIDE, |core, input| {
            core.write_slots(input, &flatten(&raw))?;
            Self::with_block(core, max_output_points * POINT_STRIDE, |core, output| {
                let written =
                    core.smooth_stroke(input, raw.len(), tension, output, max_output_points)?;
                let slots = core.read_slots(output, written * POINT_STRIDE)?;
                Ok(unflatten(&slots))
            })
        })
    }

    // ── Spray and airbrush ──────────────────────────────────────

    /// Deterministic spray dots for one spray-can stamp.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn spray_dots(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        density: usize,
        seed: u32,
    ) -> Result<Vec<Point>, HostError> {
        let core = self.core()?;
        if density == 0 {
            return Ok(Vec::new());
        }
        Self::with_block(core, density * POINT_STRIDE, |core, output| {
            core.spray_dots(cx, cy, radius, density, seed, output)?;
            let slots = core.read_slots(output, density * POINT_STRIDE)?;
            Ok(unflatten(&slots))
        })
    }

    /// Concentric airbrush rings for layered falloff rendering.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn airbrush_layers(
        &mut self,
        radius: f64,
        opacity: f64,
        layer_count: usize,
    ) -> Result<Vec<AirbrushLayer>, HostError> {
        let core = self.core()?;
        if layer_count == 0 {
            return Ok(Vec::new());
        }
        Self::with_block(core, layer_count * LAYER_STRIDE, |core, output| {
            core.airbrush_layers(radius, opacity, layer_count, output)?;
            let slots = core.read_slots(output, layer_count * LAYER_STRIDE)?;
            Ok(slots
                .chunks_exact(LAYER_STRIDE)
                .map(|pair| AirbrushLayer { radius: pair[0], opacity: pair[1] })
                .collect())
        })
    }

    // ── Geometry ────────────────────────────────────────────────

    /// Point-in-rectangle test honoring rotation.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn point_in_rect(&self, p: Point, rect: &Rect) -> Result<bool, HostError> {
        self.ensure_active()?;
        Ok(hit::point_in_rect(p, rect))
    }

    /// Inclusive overlap test; touching edges count.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn rect_overlaps(&self, a: &Rect, b: &Rect) -> Result<bool, HostError> {
        self.ensure_active()?;
        Ok(geom::rect_overlaps(a, b))
    }

    /// Strict overlap test; touching edges do not count.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn rect_intersects(&self, a: &Rect, b: &Rect) -> Result<bool, HostError> {
        self.ensure_active()?;
        Ok(geom::rect_intersects(a, b))
    }

    /// Axis-aligned box enclosing a rotated rectangle.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn rotated_bounding_box(&self, rect: &Rect) -> Result<Bounds, HostError> {
        self.ensure_active()?;
        Ok(geom::rotated_bounding_box(rect))
    }

    /// Axis-aligned box enclosing a rotated, scaled element.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn element_bounds(
        &self,
        rect: &Rect,
        scale_x: f64,
        scale_y: f64,
    ) -> Result<Bounds, HostError> {
        self.ensure_active()?;
        Ok(geom::element_bounds(rect, scale_x, scale_y))
    }

    /// Clamp a proposed drag position so the element stays on the stage.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn clamp_drag_position(
        &self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stage_width: f64,
        stage_height: f64,
    ) -> Result<Point, HostError> {
        self.ensure_active()?;
        Ok(geom::clamp_drag_position(x, y, width, height, stage_width, stage_height))
    }

    /// Euclidean distance between two points.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn distance(&self, a: Point, b: Point) -> Result<f64, HostError> {
        self.ensure_active()?;
        Ok(geom::distance(a, b))
    }

    /// Perpendicular distance from a point to a segment, clamped to the
    /// segment's ends.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn point_to_segment_distance(
        &self,
        p: Point,
        a: Point,
        b: Point,
    ) -> Result<f64, HostError> {
        self.ensure_active()?;
        Ok(geom::point_to_segment_distance(p, a, b))
    }

    /// Padded bounds of a finished stroke, for invalidation rectangles.
    /// `None` for an empty stroke.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive.
    pub fn stroke_bounds(
        &self,
        stroke: &FinishedStroke,
        stroke_width: f64,
    ) -> Result<Option<Bounds>, HostError> {
        self.ensure_active()?;
        Ok(geom::stroke_bounds(&stroke.engine_points(), stroke_width))
    }

    // ── Placement ───────────────────────────────────────────────

    /// Deterministic placement search for a new element, through the
    /// engine's transfer memory. Never fails for geometric reasons: the
    /// engine degrades to the first zone's origin when every attempt is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn find_placement(
        &mut self,
        width: f64,
        height: f64,
        zones: &[Zone],
        footprints: &[Footprint],
        grid_size: f64,
        seed: u32,
        max_attempts: u32,
    ) -> Result<Placement, HostError> {
        let core = self.core()?;
        if zones.is_empty() {
            return Ok(Placement { x: 0.0, y: 0.0, zone_index: 0 });
        }
        trace!(
            zones = zones.len(),
            footprints = footprints.len(),
            "placement search"
        );
        // Zero-length blocks are rejected; keep one footprint slot for the
        // empty case.
        let footprint_len = footprints.len().max(1) * FOOTPRINT_STRIDE;
        Self::with_block(core, zones.len() * ZONE_STRIDE, |core, zone_block| {
            core.write_slots(zone_block, &zone_slots(zones))?;
            Self::with_block(core, footprint_len, |core, footprint_block| {
                if !footprints.is_empty() {
                    core.write_slots(footprint_block, &footprint_slots(footprints))?;
                }
                Ok(core.find_placement(
                    width,
                    height,
                    zone_block,
                    zones.len(),
                    footprint_block,
                    footprints.len(),
                    grid_size,
                    seed,
                    max_attempts,
                )?)
            })
        })
    }

    // ── Eraser ──────────────────────────────────────────────────

    /// Test an eraser circle against a finished stroke's sampled points.
    ///
    /// # Errors
    ///
    /// [`HostError::NotReady`] while the engine is inactive;
    /// [`HostError::Engine`] for protocol violations.
    pub fn eraser_hits_stroke(
        &mut self,
        ex: f64,
        ey: f64,
        radius: f64,
        stroke: &FinishedStroke,
    ) -> Result<bool, HostError> {
        let core = self.core()?;
        let raw = stroke.engine_points();
        if raw.is_empty() {
            return Ok(false);
        }
        Self::with_block(core, raw.len() * POINT_STRIDE, |core, block| {
            core.write_slots(block, &flatten(&raw))?;
            Ok(core.eraser_hits_stroke(ex, ey, radius, block, raw.len())?)
        })
    }
}

fn flatten(points: &[Point]) -> Vec<f64> {
    let mut slots = Vec::with_capacity(points.len() * POINT_STRIDE);
    for p in points {
        slots.push(p.x);
        slots.push(p.y);
    }
    slots
}

fn unflatten(slots: &[f64]) -> Vec<Point> {
    slots
        .chunks_exact(POINT_STRIDE)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect()
}

fn unflatten_into(slots: &[f64], points: &mut [Point]) {
    for (pair, p) in slots.chunks_exact(POINT_STRIDE).zip(points) {
        p.x = pair[0];
        p.y = pair[1];
    }
}

fn zone_slots(zones: &[Zone]) -> Vec<f64> {
    let mut slots = Vec::with_capacity(zones.len() * ZONE_STRIDE);
    for z in zones {
        slots.push(z.x);
        slots.push(z.y);
        slots.push(z.width);
        slots.push(z.height);
        slots.push(f64::from(z.priority));
    }
    slots
}

fn footprint_slots(footprints: &[Footprint]) -> Vec<f64> {
    let mut slots = Vec::with_capacity(footprints.len() * FOOTPRINT_STRIDE);
    for f in footprints {
        slots.push(f.x);
        slots.push(f.y);
        slots.push(f.width);
        slots.push(f.height);
    }
    slots
}
