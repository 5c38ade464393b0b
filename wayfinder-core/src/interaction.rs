//! Interaction state machine and teleport side effects
//!
//! One `Engine` instance per session. The engine is constructed explicitly
//! with its catalog and configuration and passed to whichever component
//! drives the per-tick evaluation; there is no ambient global state.
//!
//! Phase transitions:
//!
//! ```text
//! Idle ──evaluation hit──▶ Hinting ──interact──▶ Detailed
//!  ▲                         │  │                    │
//!  └──────evaluation miss────┘  └─interact (transit)─┤ teleport
//!  ▲                                                 │
//!  └──────────────────close──────────────────────────┘
//! ```
//!
//! A separate, always-active transit-well check runs on every tick
//! regardless of phase: in range of an entrance and below the well floor
//! means an unconditional teleport back to street level.

use rand::Rng;
use tracing::debug;

use crate::catalog::{Catalog, Planar, PoiKind, PointOfInterest};
use crate::proximity::{evaluate, ProximityConfig, ProximityResult};

/// Eye height the player is returned to after a teleport.
const STREET_LEVEL_Y: f64 = 1.8;
/// Planar jitter applied around a transit entrance so repeated exits do not
/// land on the exact same spot.
const TRANSIT_JITTER: f64 = 1.5;
/// Fixed planar offset used for non-transit targets, clear of the geometry.
const SURFACE_OFFSET: f64 = 2.0;

/// Full 3D position sample from the player-position collaborator. Only the
/// horizontal components take part in proximity; `y` feeds the well check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(&self) -> Planar {
        Planar::new(self.x, self.z)
    }
}

/// Position authority collaborator (camera/controller). Instructions are
/// fire-and-forget; the engine does not verify completion.
pub trait PositionAuthority {
    /// Move the player.
    fn set_position(&mut self, position: WorldPosition);
    /// Clear any velocity/falling state the collaborator tracks.
    fn reset_motion(&mut self);
}

/// Session interaction phase.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionPhase {
    /// No nearby POI
    Idle,
    /// A POI is nearby and the detail view is closed
    Hinting(ProximityResult),
    /// Detail view open for the named POI
    Detailed(String),
}

/// The proximity/interaction engine.
pub struct Engine {
    catalog: Catalog,
    config: ProximityConfig,
    phase: InteractionPhase,
    tick_count: u32,
}

impl Engine {
    pub fn new(catalog: Catalog, config: ProximityConfig) -> Self {
        Self {
            catalog,
            config,
            phase: InteractionPhase::Idle,
            tick_count: 0,
        }
    }

    pub fn phase(&self) -> &InteractionPhase {
        &self.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runtime appends from the world collaborator (e.g. discovered transit
    /// entrances). Entries are never removed.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Current hint for the UI collaborator, if any.
    pub fn hint(&self) -> Option<&ProximityResult> {
        match &self.phase {
            InteractionPhase::Hinting(result) => Some(result),
            _ => None,
        }
    }

    /// Per-frame tick with the latest position sample.
    ///
    /// The transit-well check runs on every call, in every phase. The
    /// proximity evaluation itself is throttled to one call in
    /// `tick_divisor` and skipped entirely while a detail overlay is open.
    pub fn tick(&mut self, position: WorldPosition, authority: &mut dyn PositionAuthority) {
        if self.check_transit_well(position, authority) {
            return;
        }

        self.tick_count = self.tick_count.wrapping_add(1);
        if self.config.tick_divisor > 1 && self.tick_count % self.config.tick_divisor != 0 {
            return;
        }

        if matches!(self.phase, InteractionPhase::Detailed(_)) {
            return;
        }

        self.phase = match evaluate(&self.catalog, &self.config, position.planar()) {
            Some(result) => InteractionPhase::Hinting(result),
            None => InteractionPhase::Idle,
        };
    }

    /// Explicit interact signal from the input collaborator.
    ///
    /// Surface and underground POIs open the detail view. Transit entrances
    /// teleport instead and return to `Idle`, never entering `Detailed`.
    pub fn interact(&mut self, authority: &mut dyn PositionAuthority) {
        let poi_id = match &self.phase {
            InteractionPhase::Hinting(result) => result.poi_id.clone(),
            _ => return,
        };

        let next = match self.catalog.get(&poi_id) {
            Some(poi) if poi.kind == PoiKind::Transit => {
                teleport(poi, authority);
                InteractionPhase::Idle
            }
            Some(_) => InteractionPhase::Detailed(poi_id),
            // Hinted entry vanished from the catalog; catalogs are
            // append-only so this indicates caller misuse, but stay lenient.
            None => InteractionPhase::Idle,
        };
        self.phase = next;
    }

    /// Explicit close signal (overlay dismiss, escape, click outside).
    pub fn close(&mut self) {
        if matches!(self.phase, InteractionPhase::Detailed(_)) {
            self.phase = InteractionPhase::Idle;
        }
    }

    /// Accidental-entry side channel: below the well floor and inside an
    /// entrance's radius means an unconditional teleport, whatever the
    /// current phase.
    fn check_transit_well(
        &mut self,
        position: WorldPosition,
        authority: &mut dyn PositionAuthority,
    ) -> bool {
        if position.y > self.config.well_floor_y {
            return false;
        }
        let planar = position.planar();
        let entrance = self.catalog.transit_entrances().iter().find(|poi| {
            poi.coordinates
                .map_or(false, |c| planar.distance_to(&c) <= self.config.transit_radius)
        });
        match entrance {
            Some(entrance) => {
                debug!(entrance = %entrance.id, y = position.y, "player fell into transit well");
                teleport(entrance, authority);
                self.phase = InteractionPhase::Idle;
                true
            }
            None => false,
        }
    }
}

/// Instruct the position authority to move the player to `target` and clear
/// whatever motion state it tracks. Transit targets get a small random
/// planar jitter; everything else a fixed offset. The exact offsets are a
/// presentation detail, not a contract.
fn teleport(target: &PointOfInterest, authority: &mut dyn PositionAuthority) {
    let Some(coords) = target.coordinates else {
        return;
    };
    let (dx, dz) = match target.kind {
        PoiKind::Transit => {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(-TRANSIT_JITTER..=TRANSIT_JITTER),
                rng.gen_range(-TRANSIT_JITTER..=TRANSIT_JITTER),
            )
        }
        _ => (SURFACE_OFFSET, SURFACE_OFFSET),
    };
    authority.set_position(WorldPosition::new(coords.x + dx, STREET_LEVEL_Y, coords.z + dz));
    authority.reset_motion();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct RecordingAuthority {
        positions: Vec<WorldPosition>,
        resets: usize,
    }

    impl PositionAuthority for RecordingAuthority {
        fn set_position(&mut self, position: WorldPosition) {
            self.positions.push(position);
        }

        fn reset_motion(&mut self) {
            self.resets += 1;
        }
    }

    fn poi(id: &str, kind: PoiKind, x: f64, z: f64) -> PointOfInterest {
        PointOfInterest {
            id: id.to_string(),
            name: id.to_string(),
            category: String::new(),
            kind,
            coordinates: Some(Planar::new(x, z)),
            detail_fields: BTreeMap::new(),
            external_links: BTreeMap::new(),
        }
    }

    /// Divisor 1 so every tick evaluates.
    fn eager_config() -> ProximityConfig {
        ProximityConfig {
            tick_divisor: 1,
            ..Default::default()
        }
    }

    fn engine_with(pois: Vec<PointOfInterest>, entrances: Vec<PointOfInterest>) -> Engine {
        let mut catalog = Catalog::new();
        for p in pois {
            catalog.add_poi(p);
        }
        for e in entrances {
            catalog.add_transit_entrance(e);
        }
        Engine::new(catalog, eager_config())
    }

    #[test]
    fn test_idle_to_hinting_and_back() {
        let mut engine = engine_with(vec![poi("tower", PoiKind::Surface, 0.0, 0.0)], vec![]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(1.0, 1.8, 1.0), &mut authority);
        assert_eq!(engine.hint().unwrap().poi_id, "tower");

        engine.tick(WorldPosition::new(500.0, 1.8, 500.0), &mut authority);
        assert_eq!(*engine.phase(), InteractionPhase::Idle);
        assert!(engine.hint().is_none());
    }

    #[test]
    fn test_interact_opens_detail_for_surface_poi() {
        let mut engine = engine_with(vec![poi("tower", PoiKind::Surface, 0.0, 0.0)], vec![]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        engine.interact(&mut authority);

        assert_eq!(*engine.phase(), InteractionPhase::Detailed("tower".to_string()));
        // Opening a detail view moves nobody.
        assert!(authority.positions.is_empty());
    }

    #[test]
    fn test_interact_on_transit_teleports_and_stays_out_of_detailed() {
        let mut engine = engine_with(vec![], vec![poi("metro", PoiKind::Transit, 40.0, -10.0)]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(41.0, 1.8, -10.0), &mut authority);
        assert_eq!(engine.hint().unwrap().poi_id, "metro");

        engine.interact(&mut authority);

        assert_eq!(*engine.phase(), InteractionPhase::Idle);
        assert_eq!(authority.positions.len(), 1);
        assert_eq!(authority.resets, 1);
        let landed = authority.positions[0];
        // Jittered around the entrance, back at street level.
        assert!((landed.x - 40.0).abs() <= 1.5 + 1e-9);
        assert!((landed.z - -10.0).abs() <= 1.5 + 1e-9);
        assert!(landed.y > 0.0);
    }

    #[test]
    fn test_close_returns_to_idle() {
        let mut engine = engine_with(vec![poi("tower", PoiKind::Surface, 0.0, 0.0)], vec![]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        engine.interact(&mut authority);
        engine.close();

        assert_eq!(*engine.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn test_evaluation_skipped_while_detailed() {
        let mut engine = engine_with(vec![poi("tower", PoiKind::Surface, 0.0, 0.0)], vec![]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        engine.interact(&mut authority);

        // Walking out of range while the overlay is open must not close it.
        engine.tick(WorldPosition::new(500.0, 1.8, 500.0), &mut authority);
        assert_eq!(*engine.phase(), InteractionPhase::Detailed("tower".to_string()));
    }

    #[test]
    fn test_falling_into_well_teleports_from_any_phase() {
        let mut engine = engine_with(
            vec![poi("tower", PoiKind::Surface, 0.0, 0.0)],
            vec![poi("metro", PoiKind::Transit, 0.0, 0.0)],
        );
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        engine.interact(&mut authority);
        assert!(matches!(engine.phase(), InteractionPhase::Detailed(_)));

        // Below the well floor inside the entrance radius, even with the
        // overlay open.
        engine.tick(WorldPosition::new(0.5, -3.0, 0.5), &mut authority);

        assert_eq!(*engine.phase(), InteractionPhase::Idle);
        assert_eq!(authority.positions.len(), 1);
        assert_eq!(authority.resets, 1);
        assert!(authority.positions[0].y > 0.0);
    }

    #[test]
    fn test_above_well_floor_does_not_trigger_the_side_channel() {
        let mut engine = engine_with(vec![], vec![poi("metro", PoiKind::Transit, 0.0, 0.0)]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);

        assert!(authority.positions.is_empty());
        assert_eq!(engine.hint().unwrap().poi_id, "metro");
    }

    #[test]
    fn test_tick_divisor_throttles_evaluation() {
        let mut catalog = Catalog::new();
        catalog.add_poi(poi("tower", PoiKind::Surface, 0.0, 0.0));
        let mut engine = Engine::new(
            catalog,
            ProximityConfig {
                tick_divisor: 5,
                ..Default::default()
            },
        );
        let mut authority = RecordingAuthority::default();

        // Ticks 1-4 are skipped by the throttle.
        for _ in 0..4 {
            engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
            assert_eq!(*engine.phase(), InteractionPhase::Idle);
        }
        // Tick 5 evaluates.
        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        assert_eq!(engine.hint().unwrap().poi_id, "tower");
    }

    #[test]
    fn test_runtime_appended_entrance_is_discoverable() {
        let mut engine = engine_with(vec![], vec![]);
        let mut authority = RecordingAuthority::default();

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        assert_eq!(*engine.phase(), InteractionPhase::Idle);

        engine
            .catalog_mut()
            .add_transit_entrance(poi("metro-late", PoiKind::Transit, 0.0, 0.0));

        engine.tick(WorldPosition::new(0.0, 1.8, 0.0), &mut authority);
        assert_eq!(engine.hint().unwrap().poi_id, "metro-late");
    }
}
