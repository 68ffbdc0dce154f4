#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::geom::Rect;

/// Test whether `p` lies inside `rect`, honoring the rect's rotation.
///
/// Zero rotation takes an axis-aligned fast path with no trigonometry; the
/// two paths agree exactly for axis-aligned rectangles. Edges count as
/// inside.
#[must_use]
pub fn point_in_rect(p: Point, rect: &Rect) -> bool {
    if rect.rotation == 0.0 {
        return p.x >= rect.x
            && p.x <= rect.x + rect.width
            && p.y >= rect.y
            && p.y <= rect.y + rect.height;
    }
    point_in_rect_rotated(p, rect)
}

/// General branch: transform `p` into the rectangle's local frame via the
/// inverse rotation about its center, then test against the half-extents.
pub(crate) fn point_in_rect_rotated(p: Point, rect: &Rect) -> bool {
    let c = rect.center();
    let (sin, cos) = rect.rotation.sin_cos();
    let dx = p.x - c.x;
    let dy = p.y - c.y;
    let local_x = dx * cos + dy * sin;
    let local_y = -dx * sin + dy * cos;
    local_x.abs() <= rect.width / 2.0 && local_y.abs() <= rect.height / 2.0
}

/// Test whether an eraser circle touches any sampled point of a stroke.
///
/// Squared-distance comparison, no sqrt; the boundary counts as a hit.
/// Only the sampled points are tested: a segment passing through the circle
/// between two widely spaced samples does not register.
#[must_use]
pub fn eraser_hits_stroke(ex: f64, ey: f64, radius: f64, points: &[Point]) -> bool {
    let radius_sq = radius * radius;
    points.iter().any(|p| {
        let dx = p.x - ex;
        let dy = p.y - ey;
        dx * dx + dy * dy <= radius_sq
    })
}
