//! Lanefree - a lane-free endless driving game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, obstacles, session state)
//! - `driver`: Fixed-timestep scheduler that feeds frames into the sim
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard of finished sessions

pub mod driver;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use driver::Driver;
pub use highscores::HighScores;
pub use tuning::{DifficultyPreset, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Simulation rate every per-tick constant is calibrated for
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the driver will account for (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;
}
