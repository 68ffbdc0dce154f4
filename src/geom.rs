//! Rectangle math: overlap tests, rotated bounds, drag clamping, distances.
//!
//! All rotations are in radians, positive turning the +x axis toward +y
//! (clockwise in screen coordinates). Bounds computation and hit-testing
//! share this convention; see [`crate::hit`].

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// A rectangle with an optional rotation about its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in radians about the rectangle's center.
    pub rotation: f64,
}

impl Rect {
    /// An axis-aligned rectangle.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height, rotation: 0.0 }
    }

    /// A rectangle rotated about its center.
    #[must_use]
    pub fn with_rotation(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self { x, y, width, height, rotation }
    }

    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// An axis-aligned enclosing box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// The `[min_x, min_y, max_x, max_y]` slot layout of a bounds output
    /// buffer.
    #[must_use]
    pub fn to_slots(self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

/// Inclusive overlap test: rectangles sharing only an edge still overlap.
///
/// Rotation is ignored; both rectangles are treated as axis-aligned. The
/// placement search uses this form so elements may sit flush against each
/// other's footprints without being accepted on top of them.
#[must_use]
pub fn rect_overlaps(a: &Rect, b: &Rect) -> bool {
    a.x <= b.x + b.width
        && a.x + a.width >= b.x
        && a.y <= b.y + b.height
        && a.y + a.height >= b.y
}

/// Strict overlap test: rectangles must share interior area. Touching edges
/// do not count.
///
/// Rotation is ignored; both rectangles are treated as axis-aligned.
#[must_use]
pub fn rect_intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width
        && a.x + a.width > b.x
        && a.y < b.y + b.height
        && a.y + a.height > b.y
}

/// Rotate the vector `(dx, dy)` by the rotation whose sine/cosine are given.
pub(crate) fn rotate_vec(dx: f64, dy: f64, sin: f64, cos: f64) -> (f64, f64) {
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

/// Axis-aligned box enclosing a rotated rectangle.
///
/// Zero rotation skips the trigonometry and returns the rectangle's own
/// edges.
#[must_use]
pub fn rotated_bounding_box(rect: &Rect) -> Bounds {
    if rect.rotation == 0.0 {
        return Bounds {
            min_x: rect.x,
            min_y: rect.y,
            max_x: rect.x + rect.width,
            max_y: rect.y + rect.height,
        };
    }
    corner_bounds(rect, rect.width / 2.0, rect.height / 2.0)
}

/// Axis-aligned box enclosing a rotated rectangle scaled about its center.
///
/// `scale_x` / `scale_y` multiply the half-extents before rotation; pass 1.0
/// for an unscaled element.
#[must_use]
pub fn element_bounds(rect: &Rect, scale_x: f64, scale_y: f64) -> Bounds {
    let hw = rect.width * scale_x / 2.0;
    let hh = rect.height * scale_y / 2.0;
    if rect.rotation == 0.0 {
        let c = rect.center();
        return Bounds {
            min_x: c.x - hw,
            min_y: c.y - hh,
            max_x: c.x + hw,
            max_y: c.y + hh,
        };
    }
    corner_bounds(rect, hw, hh)
}

/// Min/max fold over the four rotated corners of a centered box with the
/// given half-extents.
fn corner_bounds(rect: &Rect, hw: f64, hh: f64) -> Bounds {
    let c = rect.center();
    let (sin, cos) = rect.rotation.sin_cos();
    let corners = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)];

    let mut bounds = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for (dx, dy) in corners {
        let (rx, ry) = rotate_vec(dx, dy, sin, cos);
        let x = c.x + rx;
        let y = c.y + ry;
        bounds.min_x = bounds.min_x.min(x);
        bounds.min_y = bounds.min_y.min(y);
        bounds.max_x = bounds.max_x.max(x);
        bounds.max_y = bounds.max_y.max(y);
    }
    bounds
}

/// Clamp a proposed top-left position so the element's axis-aligned
/// footprint stays within `[0, stage_width] x [0, stage_height]`.
///
/// An element larger than the stage is pinned to the origin edge.
#[must_use]
pub fn clamp_drag_position(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stage_width: f64,
    stage_height: f64,
) -> Point {
    let max_x = (stage_width - width).max(0.0);
    let max_y = (stage_height - height).max(0.0);
    Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Perpendicular distance from `p` to the segment `a..b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end measure to the nearest endpoint rather than the infinite line.
#[must_use]
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}

/// Axis-aligned box over a stroke's sample points, padded by half the stroke
/// width. `None` for an empty stroke.
#[must_use]
pub fn stroke_bounds(points: &[Point], stroke_width: f64) -> Option<Bounds> {
    let first = points.first()?;
    let pad = stroke_width / 2.0;
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in &points[1..] {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    Some(Bounds {
        min_x: bounds.min_x - pad,
        min_y: bounds.min_y - pad,
        max_x: bounds.max_x + pad,
        max_y: bounds.max_y + pad,
    })
}
