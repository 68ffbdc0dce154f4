//! Host-side stroke capture.
//!
//! The engine only ever sees raw `x,y` pairs; pressure and timestamps live
//! on this side of the boundary so the UI can style and replay strokes
//! without round-tripping the extra channels through transfer memory.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use platecanvas::camera::Point;
use serde::{Deserialize, Serialize};

/// One sampled input point of a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Stylus pressure in `[0, 1]`; mouse input reports a constant 0.5.
    pub pressure: f64,
    /// Milliseconds since the stroke began.
    pub timestamp_ms: f64,
}

impl StrokePoint {
    #[must_use]
    pub fn new(x: f64, y: f64, pressure: f64, timestamp_ms: f64) -> Self {
        Self { x, y, pressure, timestamp_ms }
    }
}

/// A stroke being captured. Append-only while live; order is significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<StrokePoint>,
}

impl Stroke {
    /// Begin an empty stroke.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sampled point.
    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Number of points sampled so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points have been sampled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze the stroke into its immutable form. Finishing consumes the
    /// stroke; it cannot be reopened. The UI normalizes the result into a
    /// plate element.
    #[must_use]
    pub fn finish(self) -> FinishedStroke {
        FinishedStroke { points: self.points }
    }
}

/// An immutable, completed stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedStroke {
    points: Vec<StrokePoint>,
}

impl FinishedStroke {
    /// The sampled points, in capture order.
    #[must_use]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    /// Number of sampled points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` for a stroke with no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The raw `x,y` pairs the engine consumes.
    #[must_use]
    pub fn engine_points(&self) -> Vec<Point> {
        self.points.iter().map(|p| Point::new(p.x, p.y)).collect()
    }
}
