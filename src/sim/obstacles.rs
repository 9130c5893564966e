//! Oncoming obstacle lifecycle
//!
//! Spawned → Advancing → Retired. The [`ObstacleField`] is the only owner of
//! the live obstacle collection; spawns append and retirement compacts in
//! place, each in its own phase of the tick.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Body;
use super::state::GameEvent;
use crate::tuning::Tuning;

/// Lifecycle stage of a live obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstaclePhase {
    /// Created this tick, not yet moved
    Spawned,
    /// Moving toward the player
    Advancing,
}

/// An oncoming vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Spawn order
    pub id: u32,
    /// Lateral offset, fixed at spawn
    pub x: f32,
    pub z: f32,
    /// `z` before the most recent advance
    pub prev_z: f32,
    /// Units per tick toward the player, fixed at spawn
    pub speed: f32,
    pub half_extents: Vec3,
    /// Ticks since spawn
    pub age: u32,
}

impl Obstacle {
    pub fn phase(&self) -> ObstaclePhase {
        if self.age == 0 {
            ObstaclePhase::Spawned
        } else {
            ObstaclePhase::Advancing
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    pub fn body(&self) -> Body {
        Body {
            prev: Vec3::new(self.x, 0.0, self.prev_z),
            pos: self.position(),
            half_extents: self.half_extents,
        }
    }

    /// Passed far enough behind the player to drop
    pub fn is_behind(&self, player_z: f32, margin: f32) -> bool {
        self.z > player_z + margin
    }
}

/// Spawn cadence for a given score, in ticks
///
/// Shrinks linearly with score and never drops below the configured floor.
pub fn spawn_interval(score: u64, tuning: &Tuning) -> u32 {
    let shaved = score as f32 * tuning.interval_per_point;
    let interval = tuning.base_spawn_interval as f32 - shaved;
    interval.max(tuning.min_spawn_interval as f32) as u32
}

/// Owned collection of live obstacles plus the RNG that places them
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    rng: Pcg32,
    next_id: u32,
}

impl ObstacleField {
    pub fn new(seed: u64) -> Self {
        Self {
            obstacles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Live obstacles in spawn order
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Drop every obstacle and reseed (restart)
    pub fn reset(&mut self, seed: u64) {
        self.obstacles.clear();
        self.rng = Pcg32::seed_from_u64(seed);
        self.next_id = 1;
    }

    /// Place an obstacle explicitly; returns its id
    pub fn spawn_at(&mut self, x: f32, z: f32, speed: f32, half_extents: Vec3) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            x,
            z,
            prev_z: z,
            speed,
            half_extents,
            age: 0,
        });
        id
    }

    /// Move every obstacle toward the player by its own speed
    pub fn advance(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.prev_z = obstacle.z;
            obstacle.z += obstacle.speed;
            obstacle.age = obstacle.age.saturating_add(1);
        }
    }

    /// Remove obstacles that have passed behind the player
    pub fn retire_behind(&mut self, player_z: f32, margin: f32, events: &mut Vec<GameEvent>) -> usize {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| {
            if o.is_behind(player_z, margin) {
                events.push(GameEvent::ObstacleRetired { id: o.id });
                false
            } else {
                true
            }
        });
        let retired = before - self.obstacles.len();
        if retired > 0 {
            log::debug!("Retired {retired} obstacle(s) behind z={player_z:.1}");
        }
        retired
    }

    /// Tick the spawn timer and release a batch once it exceeds the
    /// score-dependent interval; returns how many obstacles spawned
    pub fn update_spawner(
        &mut self,
        spawn_timer: &mut u32,
        player_z: f32,
        score: u64,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> u32 {
        *spawn_timer += 1;
        if *spawn_timer <= spawn_interval(score, tuning) {
            return 0;
        }
        *spawn_timer = 0;
        self.spawn_batch(player_z, tuning, events)
    }

    /// Spawn 1..=max_batch obstacles well ahead of the player, staggered
    /// longitudinally by `batch_gap`
    pub fn spawn_batch(&mut self, player_z: f32, tuning: &Tuning, events: &mut Vec<GameEvent>) -> u32 {
        let count = self.rng.random_range(1..=tuning.max_batch.max(1));
        let ahead = player_z - tuning.segment_length * tuning.spawn_segments_ahead;
        let half_extents = Vec3::from_array(tuning.obstacle_half_extents);

        for i in 0..count {
            let x = sample(&mut self.rng, -tuning.road_half_width, tuning.road_half_width);
            let speed = sample(&mut self.rng, tuning.obstacle_speed_min, tuning.obstacle_speed_max);
            let z = ahead - i as f32 * tuning.batch_gap;
            let id = self.spawn_at(x, z, speed, half_extents);
            events.push(GameEvent::ObstacleSpawned { id });
        }

        log::debug!("Spawned batch of {count} at z={ahead:.1} ({} live)", self.obstacles.len());
        count
    }
}

/// Uniform in `[lo, hi]`; a degenerate or inverted range yields `lo`
fn sample(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if lo < hi { rng.random_range(lo..=hi) } else { lo }
}
