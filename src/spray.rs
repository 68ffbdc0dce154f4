//! Spray-can dot and airbrush ring sampling.

#[cfg(test)]
#[path = "spray_test.rs"]
mod spray_test;

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::rng::Lcg;

/// Deterministically place `density` spray dots inside a circle.
///
/// Each dot draws an angle sample and then a radius sample from the seeded
/// generator, so equal seeds reproduce bit-identical patterns. Sampling is
/// uniform over angle and radius rather than over area, which concentrates
/// dots near the center — the spray-can signature the brush renders with.
#[must_use]
pub fn spray_dots(cx: f64, cy: f64, radius: f64, density: usize, seed: u32) -> Vec<Point> {
    let mut rng = Lcg::new(seed);
    let mut dots = Vec::with_capacity(density);
    for _ in 0..density {
        let (next, angle_u) = rng.step_unit();
        let (next, dist_u) = next.step_unit();
        rng = next;

        let angle = angle_u * TAU;
        let dist = dist_u * radius;
        dots.push(Point::new(cx + angle.cos() * dist, cy + angle.sin() * dist));
    }
    dots
}

/// One concentric airbrush ring: a radius and the opacity to paint it with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirbrushLayer {
    pub radius: f64,
    pub opacity: f64,
}

/// Build `layer_count` concentric rings for layered falloff rendering.
///
/// Layer `i` scales both radius and opacity by `(n - i) / n`: the first
/// layer is the full-size, full-opacity ring and the last shrinks toward
/// the center. Purely arithmetic; no randomness.
#[must_use]
pub fn airbrush_layers(radius: f64, opacity: f64, layer_count: usize) -> Vec<AirbrushLayer> {
    let mut layers = Vec::with_capacity(layer_count);
    for i in 0..layer_count {
        let scale = (layer_count - i) as f64 / layer_count as f64;
        layers.push(AirbrushLayer {
            radius: radius * scale,
            opacity: opacity * scale,
        });
    }
    layers
}
