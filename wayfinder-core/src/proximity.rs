//! Horizontal proximity evaluation
//!
//! A linear scan over the catalog, cheap enough to run every tick. The
//! selection policy is first-match-wins in catalog iteration order, NOT
//! nearest-wins; callers must not assume the numerically closest entry is
//! selected when detection radii overlap. The nearest entry is still
//! computed, but only for trace logging.

use tracing::trace;

use crate::catalog::{Catalog, Planar};

/// Tuning for the proximity scan.
#[derive(Clone, Copy, Debug)]
pub struct ProximityConfig {
    /// Detection radius for buildings, world units. No per-POI override.
    pub detection_radius: f64,
    /// Independent smaller radius for transit entrances.
    pub transit_radius: f64,
    /// Vertical threshold below which a player inside a transit entrance's
    /// radius is treated as having fallen into the well.
    pub well_floor_y: f64,
    /// Evaluate once every this many ticks. Purely a CPU saving; results
    /// are identical at divisor 1.
    pub tick_divisor: u32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            detection_radius: 12.0,
            transit_radius: 5.0,
            well_floor_y: -2.0,
            tick_divisor: 5,
        }
    }
}

/// Result of one evaluation. Ephemeral; recomputed every call, never
/// persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityResult {
    pub poi_id: String,
    /// Horizontal Euclidean distance to the selected entry
    pub distance: f64,
    pub within_radius: bool,
}

/// Classify `position` against the catalog.
///
/// Returns the first in-range POI in catalog order, falling back to the
/// transit-entrance list (with its own radius) when no building is in
/// range, or `None` when nothing is in range. Pure function of catalog and
/// position: no side effects, O(catalog size), no allocation beyond the
/// returned id.
///
/// Non-finite positions are the caller's responsibility; an empty catalog
/// always yields `None`.
pub fn evaluate(
    catalog: &Catalog,
    config: &ProximityConfig,
    position: Planar,
) -> Option<ProximityResult> {
    let mut nearest: Option<(f64, &str)> = None;
    let mut hit: Option<ProximityResult> = None;

    for poi in catalog.pois() {
        // Lenient policy: entries without coordinates are skipped.
        let Some(coords) = poi.coordinates else {
            continue;
        };
        let distance = position.distance_to(&coords);
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, poi.id.as_str()));
        }
        if hit.is_none() && distance <= config.detection_radius {
            hit = Some(ProximityResult {
                poi_id: poi.id.clone(),
                distance,
                within_radius: true,
            });
        }
    }

    if hit.is_none() {
        for entrance in catalog.transit_entrances() {
            let Some(coords) = entrance.coordinates else {
                continue;
            };
            let distance = position.distance_to(&coords);
            if distance <= config.transit_radius {
                hit = Some(ProximityResult {
                    poi_id: entrance.id.clone(),
                    distance,
                    within_radius: true,
                });
                break;
            }
        }
    }

    if let Some((distance, id)) = nearest {
        trace!(nearest = id, distance, "proximity scan");
    }

    hit
}
