//! Data-driven game balance
//!
//! Every per-tick constant the simulation uses lives here, so a session can
//! be rebalanced from a JSON file without touching the sim code. All rates
//! are expressed per tick at [`TICK_HZ`](crate::consts::TICK_HZ).

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a tuning could not be built
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
    #[error("unknown difficulty preset '{0}'")]
    UnknownPreset(String),
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Frantic => "Frantic",
        }
    }

    /// Ticks between spawn batches at score zero
    pub fn base_spawn_interval(&self) -> u32 {
        match self {
            DifficultyPreset::Relaxed => 150,
            DifficultyPreset::Normal => 100,
            DifficultyPreset::Frantic => 70,
        }
    }

    /// Densest spawn cadence the ramp may reach
    pub fn min_spawn_interval(&self) -> u32 {
        match self {
            DifficultyPreset::Relaxed => 45,
            DifficultyPreset::Normal => 30,
            DifficultyPreset::Frantic => 20,
        }
    }

    /// Oncoming speed range (units/tick)
    pub fn obstacle_speed_range(&self) -> (f32, f32) {
        match self {
            DifficultyPreset::Relaxed => (0.05, 0.2),
            DifficultyPreset::Normal => (0.1, 0.3),
            DifficultyPreset::Frantic => (0.2, 0.45),
        }
    }
}

impl FromStr for DifficultyPreset {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Ok(DifficultyPreset::Relaxed),
            "normal" | "med" => Ok(DifficultyPreset::Normal),
            "frantic" | "hard" => Ok(DifficultyPreset::Frantic),
            _ => Err(TuningError::UnknownPreset(s.to_string())),
        }
    }
}

/// Collision detector configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Slack added to every side of both AABBs
    pub aabb_tolerance: f32,
    /// Sphere radius around the player centre
    pub player_radius: f32,
    /// Sphere radius around an obstacle centre
    pub obstacle_radius: f32,
    /// Longitudinal travel per tick above which the swept test runs
    pub swept_speed_threshold: f32,
    /// Interpolation steps between previous and current positions
    pub swept_substeps: u32,
    /// Centre distance that counts as a swept hit
    pub swept_distance: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            aabb_tolerance: 0.0,
            player_radius: 0.9,
            obstacle_radius: 0.9,
            swept_speed_threshold: 0.4,
            swept_substeps: 10,
            swept_distance: 1.5,
        }
    }
}

/// All gameplay constants for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub preset: DifficultyPreset,

    // === Lateral motion ===
    pub accel_x: f32,
    pub max_speed_x: f32,
    pub friction_x: f32,
    pub drag_x: f32,
    /// Road half-width the player is clamped to
    pub boundary_x: f32,

    // === Longitudinal motion ===
    pub accel_z: f32,
    pub max_speed_z: f32,
    pub friction_z: f32,
    pub drag_z: f32,
    /// Extra top speed granted per point of score
    pub score_speed_bonus: f32,

    // === Bodies ===
    pub player_half_extents: [f32; 3],
    pub obstacle_half_extents: [f32; 3],

    // === Obstacles ===
    pub segment_length: f32,
    pub spawn_segments_ahead: f32,
    /// Longitudinal spacing between obstacles of one batch
    pub batch_gap: f32,
    pub max_batch: u32,
    /// Lateral spawn range (half-width)
    pub road_half_width: f32,
    pub obstacle_speed_min: f32,
    pub obstacle_speed_max: f32,
    /// Distance behind the player at which an obstacle retires
    pub retire_margin: f32,
    pub base_spawn_interval: u32,
    pub min_spawn_interval: u32,
    /// Ticks shaved off the spawn interval per point of score
    pub interval_per_point: f32,

    // === Scoring ===
    pub score_per_unit: f32,
    /// Ticks between score reports to the presentation layer
    pub score_report_ticks: u32,

    pub collision: CollisionTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_preset(DifficultyPreset::Normal)
    }
}

impl Tuning {
    /// Build tuning from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        let (speed_min, speed_max) = preset.obstacle_speed_range();
        Self {
            preset,

            accel_x: 0.02,
            max_speed_x: 0.3,
            friction_x: 0.9,
            drag_x: 0.98,
            boundary_x: 8.0,

            accel_z: 0.02,
            max_speed_z: 0.5,
            friction_z: 0.98,
            drag_z: 0.99,
            score_speed_bonus: 0.0001,

            player_half_extents: [1.0, 0.75, 2.0],
            obstacle_half_extents: [1.0, 0.75, 2.0],

            segment_length: 50.0,
            spawn_segments_ahead: 4.0,
            batch_gap: 12.0,
            max_batch: 3,
            road_half_width: 7.0,
            obstacle_speed_min: speed_min,
            obstacle_speed_max: speed_max,
            retire_margin: 20.0,
            base_spawn_interval: preset.base_spawn_interval(),
            min_spawn_interval: preset.min_spawn_interval(),
            interval_per_point: 0.01,

            score_per_unit: 10.0,
            score_report_ticks: 6,

            collision: CollisionTuning::default(),
        }
    }

    /// Apply a difficulty preset (updates preset-dependent fields only)
    pub fn apply_preset(&mut self, preset: DifficultyPreset) {
        let (speed_min, speed_max) = preset.obstacle_speed_range();
        self.preset = preset;
        self.base_spawn_interval = preset.base_spawn_interval();
        self.min_spawn_interval = preset.min_spawn_interval();
        self.obstacle_speed_min = speed_min;
        self.obstacle_speed_max = speed_max;
    }

    /// Top forward speed for the given score
    pub fn speed_cap_z(&self, score: u64) -> f32 {
        self.max_speed_z + self.score_bonus(score)
    }

    /// Monotone reward coupling between score and top speed
    pub fn score_bonus(&self, score: u64) -> f32 {
        score as f32 * self.score_speed_bonus
    }

    /// Check the constraints the integrator and spawner rely on
    pub fn validate(&self) -> Result<(), String> {
        let factors = [
            ("friction_x", self.friction_x),
            ("drag_x", self.drag_x),
            ("friction_z", self.friction_z),
            ("drag_z", self.drag_z),
        ];
        for (name, value) in factors {
            if !(value > 0.0 && value < 1.0) {
                return Err(format!("{name} must be in (0, 1), got {value}"));
            }
        }
        if self.max_speed_x <= 0.0 || self.max_speed_z <= 0.0 {
            return Err("max speeds must be positive".to_string());
        }
        if self.boundary_x <= 0.0 || self.road_half_width < 0.0 {
            return Err("road dimensions must be positive".to_string());
        }
        if self.obstacle_speed_min > self.obstacle_speed_max {
            return Err(format!(
                "obstacle speed range is inverted ({} > {})",
                self.obstacle_speed_min, self.obstacle_speed_max
            ));
        }
        if self.min_spawn_interval > self.base_spawn_interval {
            return Err(format!(
                "min_spawn_interval {} exceeds base_spawn_interval {}",
                self.min_spawn_interval, self.base_spawn_interval
            ));
        }
        if self.max_batch == 0 {
            return Err("max_batch must be at least 1".to_string());
        }
        if self.collision.swept_substeps == 0 {
            return Err("swept_substeps must be at least 1".to_string());
        }
        Ok(())
    }

    /// Parse and validate tuning from JSON (missing fields take their
    /// defaults)
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate().map_err(TuningError::Invalid)?;
        Ok(tuning)
    }

    /// This tuning if it validates, otherwise the defaults
    pub fn or_default_if_invalid(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(reason) => {
                log::warn!("Rejected tuning: {reason}; using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read tuning {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_json_str(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {} ({})", path.display(), tuning.preset.as_str());
                tuning
            }
            Err(e) => {
                log::warn!("Could not use tuning {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
