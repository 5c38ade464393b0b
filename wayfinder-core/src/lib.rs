//! Wayfinder Core - proximity engine for the city exploration experience
//!
//! Classifies the player's horizontal position against a catalog of points
//! of interest each tick and drives the hint/detail interaction state for
//! the rendering host. The host owns the camera, the scene graph, and the
//! frame loop; this crate owns the catalog, the scan, the state machine,
//! and the teleport instructions it sends back to the position authority.
//!
//! ## Modules
//!
//! - **catalog**: append-only point-of-interest data, loadable from JSON
//! - **proximity**: the per-tick horizontal distance scan
//! - **interaction**: hint/detail state machine and teleport side effects
//! - **readiness**: bounded wait for the late-initializing world collaborator

pub mod catalog;
pub mod interaction;
pub mod proximity;
pub mod readiness;
pub mod types;

pub use catalog::{Catalog, Planar, PoiKind, PointOfInterest};
pub use interaction::{Engine, InteractionPhase, PositionAuthority, WorldPosition};
pub use proximity::{evaluate, ProximityConfig, ProximityResult};
pub use readiness::{WorldGate, WorldReady};
pub use types::{EngineError, Result};
