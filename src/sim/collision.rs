//! Collision detection between the player and obstacles
//!
//! Three independent tests, any of which counts as a hit:
//! - AABB overlap with a configurable tolerance (cheap, catches overlapping frames)
//! - Sphere distance (refines the corners an AABB over-approximates)
//! - Swept sub-stepping (catches tunneling when motion per tick is large)
//!
//! Everything here is a pure function of its inputs, so pairs can be tested
//! in any order or in parallel.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::CollisionTuning;

/// A collidable body reduced to a centre and half-extents
///
/// `prev` is where the body was at the start of the tick; only the swept
/// test reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub prev: Vec3,
    pub pos: Vec3,
    pub half_extents: Vec3,
}

impl Body {
    /// A body that did not move this tick
    pub fn stationary(pos: Vec3, half_extents: Vec3) -> Self {
        Self {
            prev: pos,
            pos,
            half_extents,
        }
    }

    /// Min/max corners widened by `tolerance` on every side
    pub fn bounds(&self, tolerance: f32) -> (Vec3, Vec3) {
        let reach = self.half_extents + Vec3::splat(tolerance);
        (self.pos - reach, self.pos + reach)
    }

    /// Longitudinal distance travelled this tick
    pub fn travel_z(&self) -> f32 {
        (self.pos.z - self.prev.z).abs()
    }
}

/// Which detector reported a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectorKind {
    Aabb,
    Sphere,
    Swept,
}

impl DetectorKind {
    /// Evaluation order used by [`first_hit`]
    pub const ALL: [DetectorKind; 3] = [DetectorKind::Aabb, DetectorKind::Sphere, DetectorKind::Swept];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Aabb => "aabb",
            DetectorKind::Sphere => "sphere",
            DetectorKind::Swept => "swept",
        }
    }

    /// Run this detector against one (mover, obstacle) pair
    pub fn evaluate(&self, cfg: &CollisionTuning, mover: &Body, obstacle: &Body) -> bool {
        match self {
            DetectorKind::Aabb => aabb_overlap(mover, obstacle, cfg.aabb_tolerance),
            DetectorKind::Sphere => sphere_overlap(mover.pos, obstacle.pos, cfg.player_radius + cfg.obstacle_radius),
            DetectorKind::Swept => {
                mover.travel_z() > cfg.swept_speed_threshold
                    && swept_hit(mover, obstacle, cfg.swept_substeps, cfg.swept_distance)
            }
        }
    }
}

/// Axis-aligned overlap on all three axes
pub fn aabb_overlap(a: &Body, b: &Body, tolerance: f32) -> bool {
    let (a_min, a_max) = a.bounds(tolerance);
    let (b_min, b_max) = b.bounds(tolerance);
    a_min.cmple(b_max).all() && b_min.cmple(a_max).all()
}

/// Centre distance strictly below the radius sum
#[inline]
pub fn sphere_overlap(a: Vec3, b: Vec3, radius_sum: f32) -> bool {
    a.distance(b) < radius_sum
}

/// Interpolate both bodies from `prev` to `pos` and test centre distance
/// at each of `substeps + 1` samples (both tick endpoints included)
pub fn swept_hit(mover: &Body, obstacle: &Body, substeps: u32, threshold: f32) -> bool {
    let steps = substeps.max(1);
    (0..=steps).any(|i| {
        let t = i as f32 / steps as f32;
        let m = mover.prev.lerp(mover.pos, t);
        let o = obstacle.prev.lerp(obstacle.pos, t);
        m.distance(o) < threshold
    })
}

/// First detector (in [`DetectorKind::ALL`] order) that reports a hit
pub fn first_hit(cfg: &CollisionTuning, mover: &Body, obstacle: &Body) -> Option<DetectorKind> {
    DetectorKind::ALL
        .into_iter()
        .find(|kind| kind.evaluate(cfg, mover, obstacle))
}

/// Logical OR of every detector
pub fn detect(cfg: &CollisionTuning, mover: &Body, obstacle: &Body) -> bool {
    first_hit(cfg, mover, obstacle).is_some()
}
