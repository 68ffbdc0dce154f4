//! Deterministic placement search for newly spawned plate elements.
//!
//! Dropping a new element onto the plate should not bury it under existing
//! artwork, and it should land in the same spot every time for a given
//! seed — undo/redo and collaborative replay both depend on that. The
//! search walks candidate zones in priority order, proposing seeded random
//! positions snapped to the layout grid, and accepts the first position
//! whose footprint touches nothing. Exhaustion degrades to a best-effort
//! position rather than failing the call.

#[cfg(test)]
#[path = "place_test.rs"]
mod place_test;

use serde::{Deserialize, Serialize};

use crate::geom::{Rect, rect_overlaps};
use crate::rng::Lcg;

/// A candidate placement region. Lower `priority` values are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub priority: i32,
}

/// The occupied axis-aligned rectangle of an existing element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    /// The footprint as an axis-aligned rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Result of a placement search: a position plus the index of the zone it
/// landed in, in the caller's zone list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub zone_index: usize,
}

/// Search for a non-overlapping spawn position for a `width` x `height`
/// element.
///
/// Zones are visited in ascending priority (stable on ties by list order);
/// zones smaller than the element are skipped. Each zone gets up to
/// `max_attempts` seeded candidates, snapped to `grid_size` and clamped into
/// the zone, tested inclusively against every footprint. One generator
/// sequence threads through the whole search.
///
/// Never fails: when every zone and attempt is exhausted, the result is the
/// highest-priority zone's unclamped origin, which may overlap. An empty
/// zone list yields the canvas origin with zone index 0.
#[must_use]
pub fn find_placement(
    width: f64,
    height: f64,
    zones: &[Zone],
    footprints: &[Footprint],
    grid_size: f64,
    seed: u32,
    max_attempts: u32,
) -> Placement {
    debug_assert!(grid_size > 0.0);
    if zones.is_empty() {
        return Placement { x: 0.0, y: 0.0, zone_index: 0 };
    }

    let mut order: Vec<usize> = (0..zones.len()).collect();
    order.sort_by_key(|&i| zones[i].priority);

    let mut rng = Lcg::new(seed);
    for &zone_index in &order {
        let zone = &zones[zone_index];
        if zone.width < width || zone.height < height {
            continue;
        }
        for _ in 0..max_attempts {
            let (next, ux) = rng.step_unit();
            let (next, uy) = next.step_unit();
            rng = next;

            let raw_x = zone.x + ux * (zone.width - width);
            let raw_y = zone.y + uy * (zone.height - height);
            let x = snap(raw_x, grid_size).clamp(zone.x, zone.x + zone.width - width);
            let y = snap(raw_y, grid_size).clamp(zone.y, zone.y + zone.height - height);

            let candidate = Rect::new(x, y, width, height);
            let blocked = footprints.iter().any(|f| rect_overlaps(&candidate, &f.rect()));
            if !blocked {
                return Placement { x, y, zone_index };
            }
        }
    }

    // Best-effort fallback: the highest-priority zone's origin, unclamped
    // and possibly overlapping.
    let first = order[0];
    Placement {
        x: zones[first].x,
        y: zones[first].y,
        zone_index: first,
    }
}

/// Snap a coordinate to the nearest multiple of `grid_size`.
fn snap(v: f64, grid_size: f64) -> f64 {
    (v / grid_size).round() * grid_size
}
