//! Player vehicle integrator
//!
//! Per-tick acceleration / friction / drag model. Order matters: the
//! lateral axis decays or accelerates, clamps, then drags; the longitudinal
//! axis does the same against a score-dependent cap; only then do positions
//! move.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Body;
use super::intent::Intent;
use crate::tuning::Tuning;

/// Player vehicle kinematics
///
/// `z` decreases as the vehicle drives forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub x: f32,
    pub z: f32,
    pub vx: f32,
    pub vz: f32,
    /// Position before the most recent integration (for swept collision)
    pub prev_x: f32,
    pub prev_z: f32,
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vehicle at rest at the given position
    pub fn at(x: f32, z: f32) -> Self {
        Self {
            x,
            z,
            prev_x: x,
            prev_z: z,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    pub fn prev_position(&self) -> Vec3 {
        Vec3::new(self.prev_x, 0.0, self.prev_z)
    }

    /// Collision body for this tick
    pub fn body(&self, tuning: &Tuning) -> Body {
        Body {
            prev: self.prev_position(),
            pos: self.position(),
            half_extents: Vec3::from_array(tuning.player_half_extents),
        }
    }
}

/// Side signals produced by one integration step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    /// Forward held this tick (engine audio should play)
    pub engine_active: bool,
}

/// Advance the vehicle by one tick
pub fn integrate(vehicle: &mut VehicleState, intent: &Intent, score: u64, tuning: &Tuning) -> PhysicsOutcome {
    vehicle.prev_x = vehicle.x;
    vehicle.prev_z = vehicle.z;

    // Lateral
    match intent.lateral() {
        -1 => vehicle.vx -= tuning.accel_x,
        1 => vehicle.vx += tuning.accel_x,
        _ => vehicle.vx *= tuning.friction_x,
    }
    vehicle.vx = vehicle.vx.clamp(-tuning.max_speed_x, tuning.max_speed_x) * tuning.drag_x;

    // Longitudinal
    let engine_active = intent.forward;
    if engine_active {
        vehicle.vz += tuning.accel_z;
    } else if intent.braking() {
        vehicle.vz -= tuning.accel_z * 2.0;
    } else {
        vehicle.vz *= tuning.friction_z;
    }
    vehicle.vz = vehicle.vz.clamp(0.0, tuning.speed_cap_z(score)) * tuning.drag_z;

    vehicle.x += vehicle.vx;
    vehicle.z -= vehicle.vz;

    vehicle.x = vehicle.x.clamp(-tuning.boundary_x, tuning.boundary_x);

    PhysicsOutcome { engine_active }
}
