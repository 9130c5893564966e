//! Game state and core simulation types
//!
//! A session owns at most one vehicle, the obstacle field, the score
//! bookkeeping and the queue of events for the presentation/audio hosts.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{DetectorKind, first_hit};
use super::intent::Intent;
use super::obstacles::{Obstacle, ObstacleField};
use super::physics::{PhysicsOutcome, VehicleState, integrate};
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Collision happened; nothing mutates until restart
    Over,
}

/// Signals for the presentation and audio collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Engine audio starts (true) or idles (false); sent on change only
    EngineActive(bool),
    /// Periodic score for the HUD
    ScoreUpdated(u64),
    ObstacleSpawned { id: u32 },
    ObstacleRetired { id: u32 },
    Collision { obstacle_id: u32, detector: DetectorKind },
    /// Stop engine audio
    EngineStopped,
    /// Show the end-of-session screen
    GameOver { final_score: u64 },
}

/// Score and timing bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    /// Fractional score not yet awarded
    pub score_carry: f32,
    /// Total forward distance travelled
    pub distance: f32,
    pub elapsed_ticks: u64,
    pub spawn_timer: u32,
    /// Engine signal from the latest tick
    pub engine_active: bool,
    pub phase: GamePhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            score_carry: 0.0,
            distance: 0.0,
            elapsed_ticks: 0,
            spawn_timer: 0,
            engine_active: false,
            phase: GamePhase::Running,
        }
    }
}

impl SessionState {
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// Record this tick's engine signal; true when it changed
    pub fn set_engine_active(&mut self, active: bool) -> bool {
        let changed = self.engine_active != active;
        self.engine_active = active;
        changed
    }

    /// Award score proportional to forward speed; returns points added
    pub fn award_distance(&mut self, vz: f32, score_per_unit: f32) -> u64 {
        if vz <= 0.0 || self.is_over() {
            return 0;
        }
        self.distance += vz;
        self.score_carry += vz * score_per_unit;
        let whole = self.score_carry.floor();
        self.score_carry -= whole;
        let points = whole as u64;
        self.score += points;
        points
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub session: SessionState,
    vehicle: Option<VehicleState>,
    field: ObstacleField,
    events: Vec<GameEvent>,
}

impl GameState {
    /// New running session with the vehicle at the origin; tuning that
    /// fails validation is replaced by the defaults
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::without_vehicle(seed, tuning);
        state.spawn_vehicle(VehicleState::new());
        state
    }

    /// Session whose vehicle hasn't been placed yet; ticks are no-ops
    pub fn without_vehicle(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            tuning: tuning.or_default_if_invalid(),
            session: SessionState::default(),
            vehicle: None,
            field: ObstacleField::new(seed),
            events: Vec::new(),
        }
    }

    pub fn spawn_vehicle(&mut self, vehicle: VehicleState) {
        self.vehicle = Some(vehicle);
    }

    /// Full reset: fresh vehicle, no obstacles, zeroed session
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting session (seed {seed}, previous score {})", self.session.score);
        self.seed = seed;
        self.session = SessionState::default();
        self.vehicle = Some(VehicleState::new());
        self.field.reset(seed);
        self.events.clear();
    }

    pub fn vehicle(&self) -> Option<&VehicleState> {
        self.vehicle.as_ref()
    }

    /// Integrate the vehicle for one tick; `None` when no vehicle exists
    pub(crate) fn integrate_vehicle(&mut self, intent: &Intent) -> Option<PhysicsOutcome> {
        let vehicle = self.vehicle.as_mut()?;
        Some(integrate(vehicle, intent, self.session.score, &self.tuning))
    }

    /// Live obstacles, in spawn order
    pub fn obstacles(&self) -> &[Obstacle] {
        self.field.obstacles()
    }

    pub fn field(&self) -> &ObstacleField {
        &self.field
    }

    /// Place an explicit obstacle (scripted hazards, tests); returns its id
    pub fn spawn_obstacle_at(&mut self, x: f32, z: f32, speed: f32, half_extents: Vec3) -> u32 {
        let id = self.field.spawn_at(x, z, speed, half_extents);
        self.events.push(GameEvent::ObstacleSpawned { id });
        id
    }

    /// Whether the engine signal was on during the latest tick
    pub fn engine_active(&self) -> bool {
        self.session.engine_active
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    pub fn score(&self) -> u64 {
        self.session.score
    }

    /// Run every detector against every live obstacle; the first hit in
    /// spawn order wins
    pub fn detect_collision(&self) -> Option<(u32, DetectorKind)> {
        let vehicle = self.vehicle.as_ref()?;
        let mover = vehicle.body(&self.tuning);
        self.field.obstacles().iter().find_map(|obstacle| {
            first_hit(&self.tuning.collision, &mover, &obstacle.body()).map(|kind| (obstacle.id, kind))
        })
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Split borrows for the lifecycle phase of a tick
    pub(crate) fn lifecycle_parts(
        &mut self,
    ) -> (&mut ObstacleField, &mut SessionState, &mut Vec<GameEvent>, &Tuning) {
        (&mut self.field, &mut self.session, &mut self.events, &self.tuning)
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events for the host collaborators
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_distance_keeps_fraction() {
        let mut session = SessionState::default();
        assert_eq!(session.award_distance(0.25, 10.0), 2);
        assert!((session.score_carry - 0.5).abs() < 1e-5);
        assert_eq!(session.award_distance(0.25, 10.0), 3);
        assert_eq!(session.score, 5);
        assert!((session.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_no_score_when_stopped_or_over() {
        let mut session = SessionState::default();
        assert_eq!(session.award_distance(0.0, 10.0), 0);
        session.phase = GamePhase::Over;
        assert_eq!(session.award_distance(0.5, 10.0), 0);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_obstacle_on_vehicle_hits_via_sphere() {
        let mut state = GameState::new(1, Tuning::default());
        let vehicle = *state.vehicle().expect("vehicle");
        let id = state.spawn_obstacle_at(vehicle.x, vehicle.z, 0.0, Vec3::ZERO);

        let mover = vehicle.body(&state.tuning);
        let obstacle = state.obstacles()[0].body();
        assert!(DetectorKind::Sphere.evaluate(&state.tuning.collision, &mover, &obstacle));
        assert!(state.detect_collision().is_some_and(|(hit, _)| hit == id));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = GameState::new(5, Tuning::default());
        state.spawn_obstacle_at(0.0, -50.0, 0.2, Vec3::ONE);
        state.session.score = 120;
        state.session.phase = GamePhase::Over;
        state.push_event(GameEvent::EngineStopped);

        state.restart(6);
        assert_eq!(state.seed, 6);
        assert_eq!(state.session, SessionState::default());
        assert!(state.obstacles().is_empty());
        assert!(state.events().is_empty());
        assert_eq!(state.vehicle(), Some(&VehicleState::new()));
    }

    #[test]
    fn test_engine_signal_reports_changes_only() {
        let mut session = SessionState::default();
        assert!(!session.set_engine_active(false));
        assert!(session.set_engine_active(true));
        assert!(!session.set_engine_active(true));
        assert!(session.set_engine_active(false));
    }

    #[test]
    fn test_invalid_tuning_replaced_by_defaults() {
        let mut tuning = Tuning::default();
        tuning.obstacle_speed_min = 0.5;
        tuning.obstacle_speed_max = 0.1;
        let state = GameState::new(1, tuning);
        assert_eq!(state.tuning, Tuning::default());
    }

    #[test]
    fn test_without_vehicle_detects_nothing() {
        let mut state = GameState::without_vehicle(3, Tuning::default());
        state.spawn_obstacle_at(0.0, 0.0, 0.0, Vec3::ONE);
        assert!(state.vehicle().is_none());
        assert_eq!(state.detect_collision(), None);
    }
}
