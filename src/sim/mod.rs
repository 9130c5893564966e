//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod intent;
pub mod obstacles;
pub mod physics;
pub mod state;
pub mod tick;

pub use collision::{Body, DetectorKind, aabb_overlap, detect, first_hit, sphere_overlap, swept_hit};
pub use intent::{Control, Intent, KeyState};
pub use obstacles::{Obstacle, ObstacleField, ObstaclePhase, spawn_interval};
pub use physics::{PhysicsOutcome, VehicleState, integrate};
pub use state::{GameEvent, GamePhase, GameState, SessionState};
pub use tick::{TickInput, autopilot_intent, tick};
