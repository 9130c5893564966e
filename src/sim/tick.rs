//! Fixed timestep simulation tick
//!
//! One call advances a session by exactly one tick, in a fixed phase order:
//! integrate → detect → (latch Over) → advance/retire/spawn → score.

use std::cmp::Ordering;

use super::intent::Intent;
use super::state::{GameEvent, GamePhase, GameState};

/// How far ahead the autopilot looks for obstacles
const AUTOPILOT_LOOKAHEAD: f32 = 80.0;
/// Extra lateral margin the autopilot keeps around obstacles
const AUTOPILOT_MARGIN: f32 = 1.0;
/// Lateral dead zone when drifting back to the road centre
const AUTOPILOT_CENTER_BAND: f32 = 0.5;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Intent read from the host's key state
    pub intent: Intent,
    /// Idle/demo mode - autopilot drives
    pub idle_mode: bool,
}

impl TickInput {
    pub fn from_intent(intent: Intent) -> Self {
        Self {
            intent,
            idle_mode: false,
        }
    }

    pub fn idle() -> Self {
        Self {
            intent: Intent::default(),
            idle_mode: true,
        }
    }
}

/// Advance the session by one tick
///
/// No-op once the session is over or while no vehicle exists.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase() == GamePhase::Over || state.vehicle().is_none() {
        return;
    }

    let intent = if input.idle_mode {
        autopilot_intent(state)
    } else {
        input.intent
    };

    state.session.elapsed_ticks += 1;

    let Some(outcome) = state.integrate_vehicle(&intent) else {
        return;
    };
    if state.session.set_engine_active(outcome.engine_active) {
        state.push_event(GameEvent::EngineActive(outcome.engine_active));
    }

    if let Some((obstacle_id, detector)) = state.detect_collision() {
        let final_score = state.score();
        state.session.phase = GamePhase::Over;
        state.session.engine_active = false;
        state.push_event(GameEvent::Collision { obstacle_id, detector });
        state.push_event(GameEvent::EngineStopped);
        state.push_event(GameEvent::GameOver { final_score });
        log::info!(
            "Collision with obstacle {obstacle_id} ({}) after {} ticks, final score {final_score}",
            detector.as_str(),
            state.session.elapsed_ticks
        );
        return;
    }

    let Some(&vehicle) = state.vehicle() else {
        return;
    };

    let (field, session, events, tuning) = state.lifecycle_parts();
    field.advance();
    field.retire_behind(vehicle.z, tuning.retire_margin, events);
    field.update_spawner(&mut session.spawn_timer, vehicle.z, session.score, tuning, events);

    session.award_distance(vehicle.vz, tuning.score_per_unit);
    if tuning.score_report_ticks > 0 && session.elapsed_ticks % tuning.score_report_ticks as u64 == 0 {
        events.push(GameEvent::ScoreUpdated(session.score));
    }
}

/// Demo driver: hold forward, dodge the nearest obstacle in our path, and
/// drift back to the centre once the road ahead is empty
pub fn autopilot_intent(state: &GameState) -> Intent {
    let Some(vehicle) = state.vehicle() else {
        return Intent::default();
    };
    let tuning = &state.tuning;
    let clearance = tuning.player_half_extents[0] + tuning.obstacle_half_extents[0] + AUTOPILOT_MARGIN;
    // Keep tracking an obstacle until it is fully behind us
    let reach_z = tuning.player_half_extents[2] + tuning.obstacle_half_extents[2] + AUTOPILOT_MARGIN;

    let mut ahead = state
        .obstacles()
        .iter()
        .filter(|o| o.z < vehicle.z + reach_z && vehicle.z - o.z < AUTOPILOT_LOOKAHEAD)
        .peekable();
    let road_clear = ahead.peek().is_none();

    // Nearest = largest z among those still ahead
    let threat = ahead
        .filter(|o| (o.x - vehicle.x).abs() < clearance)
        .max_by(|a, b| a.z.partial_cmp(&b.z).unwrap_or(Ordering::Equal));

    let mut intent = Intent {
        forward: true,
        ..Default::default()
    };

    if let Some(obstacle) = threat {
        let room_left = vehicle.x + tuning.boundary_x;
        let room_right = tuning.boundary_x - vehicle.x;
        let dodge_left = if obstacle.x >= vehicle.x {
            room_left >= clearance
        } else {
            room_right < clearance
        };
        if dodge_left {
            intent.left = true;
        } else {
            intent.right = true;
        }
    } else if road_clear {
        if vehicle.x > AUTOPILOT_CENTER_BAND {
            intent.left = true;
        } else if vehicle.x < -AUTOPILOT_CENTER_BAND {
            intent.right = true;
        }
    }

    intent
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::sim::physics::VehicleState;
    use crate::tuning::Tuning;

    fn forward() -> TickInput {
        TickInput::from_intent(Intent {
            forward: true,
            ..Default::default()
        })
    }

    /// Tuning with the spawner effectively switched off
    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.base_spawn_interval = 100_000;
        tuning.min_spawn_interval = 100_000;
        tuning
    }

    #[test]
    fn test_forward_from_rest_for_fifty_ticks() {
        let mut state = GameState::new(12345, Tuning::default());
        let max_speed_z = state.tuning.max_speed_z;

        for i in 0..50 {
            let z_before = state.vehicle().expect("vehicle").z;
            tick(&mut state, &forward());
            let vehicle = state.vehicle().expect("vehicle");
            if vehicle.vz > 0.0 {
                assert!(vehicle.z < z_before, "tick {i}");
            }
            if i >= 40 {
                assert!((vehicle.vz - max_speed_z).abs() < 0.05, "tick {i}: vz={}", vehicle.vz);
            }
        }
        assert!(state.obstacles().is_empty());
        assert_eq!(state.phase(), GamePhase::Running);
        assert!(state.score() > 0);
    }

    #[test]
    fn test_collision_ends_session() {
        let mut state = GameState::new(1, quiet_tuning());
        let vehicle = *state.vehicle().expect("vehicle");
        let id = state.spawn_obstacle_at(vehicle.x, vehicle.z, 0.0, Vec3::ONE);

        tick(&mut state, &TickInput::default());
        assert!(state.is_over());

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Collision { obstacle_id, .. } if *obstacle_id == id)));
        assert!(events.contains(&GameEvent::EngineStopped));
        assert!(events.contains(&GameEvent::GameOver { final_score: 0 }));
    }

    #[test]
    fn test_over_is_idempotent() {
        let mut state = GameState::new(9, quiet_tuning());
        for _ in 0..20 {
            tick(&mut state, &forward());
        }
        let vehicle = *state.vehicle().expect("vehicle");
        state.spawn_obstacle_at(vehicle.x, vehicle.z - 1.0, 0.0, Vec3::ONE);
        tick(&mut state, &forward());
        assert!(state.is_over());
        state.drain_events();

        let session = state.session.clone();
        let vehicle = *state.vehicle().expect("vehicle");
        let obstacles = state.obstacles().to_vec();
        for _ in 0..30 {
            tick(&mut state, &forward());
            tick(&mut state, &TickInput::idle());
        }
        assert_eq!(state.session, session);
        assert_eq!(state.vehicle(), Some(&vehicle));
        assert_eq!(state.obstacles(), obstacles.as_slice());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_tick_without_vehicle_is_noop() {
        let mut state = GameState::without_vehicle(4, Tuning::default());
        for _ in 0..500 {
            tick(&mut state, &forward());
        }
        assert_eq!(state.session.elapsed_ticks, 0);
        assert!(state.obstacles().is_empty());
        assert!(state.events().is_empty());

        state.spawn_vehicle(VehicleState::new());
        tick(&mut state, &forward());
        assert_eq!(state.session.elapsed_ticks, 1);
    }

    #[test]
    fn test_engine_events_follow_transitions() {
        let mut state = GameState::new(2, quiet_tuning());
        for _ in 0..10 {
            tick(&mut state, &forward());
        }
        assert!(state.engine_active());
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.engine_active());

        let engine: Vec<bool> = state
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::EngineActive(active) => Some(*active),
                _ => None,
            })
            .collect();
        assert_eq!(engine, vec![true, false]);
    }

    #[test]
    fn test_inverted_speed_range_from_json_never_reaches_spawner() {
        let parsed = Tuning::from_json_str(r#"{ "obstacle_speed_min": 0.5, "obstacle_speed_max": 0.1 }"#);
        assert!(parsed.is_err());

        let mut tuning = Tuning::default();
        tuning.obstacle_speed_min = 0.5;
        tuning.obstacle_speed_max = 0.1;
        let mut state = GameState::new(8, tuning);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.obstacles().is_empty());
    }

    #[test]
    fn test_spawner_survives_inverted_ranges_set_after_construction() {
        let mut state = GameState::new(8, Tuning::default());
        state.tuning.obstacle_speed_min = 0.5;
        state.tuning.obstacle_speed_max = 0.1;
        state.tuning.road_half_width = -3.0;
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.obstacles().is_empty());
        assert!(state.obstacles().iter().all(|o| o.speed == 0.5 && o.x == 3.0));
    }

    #[test]
    fn test_no_score_while_stationary() {
        let mut state = GameState::new(2, quiet_tuning());
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.score(), 0);
        assert!(state.events().iter().all(|e| !matches!(e, GameEvent::EngineActive(true))));
    }

    #[test]
    fn test_score_reported_periodically() {
        let mut state = GameState::new(2, quiet_tuning());
        let report = state.tuning.score_report_ticks as usize;
        for _ in 0..report * 3 {
            tick(&mut state, &forward());
        }
        let reports: Vec<u64> = state
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::ScoreUpdated(score) => Some(*score),
                _ => None,
            })
            .collect();
        assert_eq!(reports.len(), 3);
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reports.last().expect("report"), state.score());
    }

    #[test]
    fn test_obstacle_retires_after_passing() {
        let mut state = GameState::new(3, quiet_tuning());
        let id = state.spawn_obstacle_at(6.0, -10.0, 0.5, Vec3::ONE);

        for _ in 0..80 {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.is_over());
        assert!(state.obstacles().is_empty());
        assert!(state.events().contains(&GameEvent::ObstacleRetired { id }));
    }

    #[test]
    fn test_spawner_populates_road() {
        let mut state = GameState::new(77, Tuning::default());
        let interval = state.tuning.base_spawn_interval as usize;
        for _ in 0..=interval {
            tick(&mut state, &TickInput::default());
        }
        assert!(!state.obstacles().is_empty());
        assert_eq!(state.session.spawn_timer, 0);
        let ahead = -state.tuning.segment_length * state.tuning.spawn_segments_ahead;
        assert!(state.obstacles().iter().all(|o| o.z <= ahead));
    }

    #[test]
    fn test_autopilot_dodges_away_from_obstacle() {
        let mut state = GameState::new(5, quiet_tuning());
        state.spawn_obstacle_at(0.5, -60.0, 0.3, Vec3::ONE);
        let intent = autopilot_intent(&state);
        assert!(intent.forward && intent.left && !intent.right);

        let mut state = GameState::new(5, quiet_tuning());
        state.spawn_obstacle_at(-0.5, -60.0, 0.3, Vec3::ONE);
        let intent = autopilot_intent(&state);
        assert!(intent.right && !intent.left);
    }

    #[test]
    fn test_autopilot_survives_single_obstacle() {
        let mut state = GameState::new(5, quiet_tuning());
        let id = state.spawn_obstacle_at(0.5, -60.0, 0.3, Vec3::ONE);
        for _ in 0..300 {
            tick(&mut state, &TickInput::idle());
        }
        assert!(!state.is_over());
        assert!(state.events().contains(&GameEvent::ObstacleRetired { id }));
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());

        let inputs = [
            forward(),
            TickInput::idle(),
            TickInput::from_intent(Intent {
                forward: true,
                left: true,
                ..Default::default()
            }),
            TickInput::default(),
        ];

        for i in 0..2000 {
            let input = &inputs[(i / 50) % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.session, state2.session);
        assert_eq!(state1.vehicle(), state2.vehicle());
        assert_eq!(state1.obstacles(), state2.obstacles());
        assert_eq!(state1.events(), state2.events());
    }
}
