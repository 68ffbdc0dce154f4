//! Catmull-Rom resampling of freehand stroke points.
//!
//! A raw pointer trail arrives as a sparse polyline; brush rendering wants a
//! dense curve through those samples. Each consecutive segment is evaluated
//! through a Catmull-Rom spline over its four-point neighborhood, subdivided
//! into a fixed number of sub-steps. Output is capped by the caller: when
//! the cap is reached the function stops emitting and reports the count
//! actually written — never an error, never a resize.

#[cfg(test)]
#[path = "smooth_test.rs"]
mod smooth_test;

use crate::camera::Point;
use crate::consts::{CURVE_SUBSTEPS, SMOOTH_PRESIZE_FACTOR};

/// Output points a caller should presize for to guarantee a complete curve.
#[must_use]
pub fn presize_output(input_points: usize) -> usize {
    input_points * SMOOTH_PRESIZE_FACTOR
}

/// Resample `points` through a Catmull-Rom spline with the given tension.
///
/// Emits the first input point, then ten sub-steps per consecutive segment:
/// a complete curve over `n` inputs holds `(n - 1) * 10 + 1` points. At most
/// `max_output_points` are produced; truncation is reported through the
/// returned length. Fewer than two input points pass through unsmoothed.
#[must_use]
pub fn smooth_stroke(points: &[Point], tension: f64, max_output_points: usize) -> Vec<Point> {
    if points.len() < 2 {
        return points.iter().copied().take(max_output_points).collect();
    }

    let full = (points.len() - 1) * CURVE_SUBSTEPS + 1;
    let mut out = Vec::with_capacity(full.min(max_output_points));
    if max_output_points == 0 {
        return out;
    }

    out.push(points[0]);
    for i in 0..points.len() - 1 {
        // Four-point neighborhood, clamped at the ends by duplicating the
        // boundary point.
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];

        for step in 1..=CURVE_SUBSTEPS {
            if out.len() >= max_output_points {
                return out;
            }
            let u = step as f64 / CURVE_SUBSTEPS as f64;
            out.push(catmull_rom(p0, p1, p2, p3, tension, u));
        }
    }
    out
}

/// Evaluate the spline at fraction `u` of the `p1..p2` segment.
fn catmull_rom(p0: Point, p1: Point, p2: Point, p3: Point, tension: f64, u: f64) -> Point {
    let u2 = u * u;
    let u3 = u2 * u;
    Point::new(
        blend(p0.x, p1.x, p2.x, p3.x, tension, u, u2, u3),
        blend(p0.y, p1.y, p2.y, p3.y, tension, u, u2, u3),
    )
}

/// Cubic Hermite blend with tangents `(c2 - c0) * tension` and
/// `(c3 - c1) * tension`; tension 0.5 is the classic Catmull-Rom curve.
fn blend(c0: f64, c1: f64, c2: f64, c3: f64, tension: f64, u: f64, u2: f64, u3: f64) -> f64 {
    let v0 = (c2 - c0) * tension;
    let v1 = (c3 - c1) * tension;
    (2.0 * c1 - 2.0 * c2 + v0 + v1) * u3 + (-3.0 * c1 + 3.0 * c2 - 2.0 * v0 - v1) * u2 + v0 * u + c1
}
