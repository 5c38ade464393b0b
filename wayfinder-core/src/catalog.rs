//! Point-of-interest catalog
//!
//! Static configuration data loaded once at startup. Entries may be
//! appended at runtime (dynamically discovered transit entrances) but are
//! never mutated or removed within a session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Horizontal world-space position. Vertical position is deliberately
/// absent: proximity is a 2D computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planar {
    pub x: f64,
    pub z: f64,
}

impl Planar {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Horizontal Euclidean distance to another point.
    pub fn distance_to(&self, other: &Planar) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }
}

/// Discoverable location kind.
///
/// Affects which detail fields are relevant (height/floors vs
/// depth/platforms) and whether interacting teleports instead of opening
/// the detail view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiKind {
    Surface,
    Underground,
    Transit,
}

/// One discoverable location.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Unique stable key
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text classification
    #[serde(default)]
    pub category: String,
    pub kind: PoiKind,
    /// Missing coordinates are tolerated; such entries are skipped by the
    /// proximity scan instead of being rejected at load time.
    #[serde(default)]
    pub coordinates: Option<Planar>,
    /// Semantic attribute name -> display value, varies by kind
    #[serde(default)]
    pub detail_fields: BTreeMap<String, String>,
    /// Platform name -> handle/URL, display only
    #[serde(default)]
    pub external_links: BTreeMap<String, String>,
}

/// Append-only catalog: a primary list of buildings plus a secondary list
/// of transit entrances consulted when no building is in range.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pois: Vec<PointOfInterest>,
    #[serde(default)]
    transit_entrances: Vec<PointOfInterest>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON representation.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn add_poi(&mut self, poi: PointOfInterest) {
        self.pois.push(poi);
    }

    pub fn add_transit_entrance(&mut self, poi: PointOfInterest) {
        self.transit_entrances.push(poi);
    }

    /// Primary list, in iteration (selection) order.
    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    /// Secondary list, in iteration order.
    pub fn transit_entrances(&self) -> &[PointOfInterest] {
        &self.transit_entrances
    }

    /// Look up an entry by id across both lists.
    pub fn get(&self, id: &str) -> Option<&PointOfInterest> {
        self.pois
            .iter()
            .chain(self.transit_entrances.iter())
            .find(|poi| poi.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty() && self.transit_entrances.is_empty()
    }
}
