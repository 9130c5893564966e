//! Tick-driven scheduler
//!
//! Hosts hand the driver wall-clock frame times; it converts them into whole
//! fixed-rate ticks so the sim never sees a variable timestep. Tests can skip
//! the clock entirely and call [`Driver::step`].

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::{HighScoreEntry, HighScores};
use crate::sim::{GameEvent, GameState, KeyState, TickInput, tick};
use crate::tuning::Tuning;

/// Owns a session plus the host-facing input and leaderboard state
#[derive(Debug, Clone)]
pub struct Driver {
    state: GameState,
    keys: KeyState,
    /// Autopilot drives instead of the key state
    pub idle_mode: bool,
    accumulator: f32,
    high_scores: HighScores,
    /// Finished session already written to the leaderboard
    recorded: bool,
}

impl Driver {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        log::info!("Session started with seed {seed} ({})", tuning.preset.as_str());
        Self {
            state: GameState::new(seed, tuning),
            keys: KeyState::new(),
            idle_mode: false,
            accumulator: 0.0,
            high_scores: HighScores::new(),
            recorded: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn set_high_scores(&mut self, high_scores: HighScores) {
        self.high_scores = high_scores;
    }

    fn input(&self) -> TickInput {
        TickInput {
            intent: self.keys.intent(),
            idle_mode: self.idle_mode,
        }
    }

    /// Run exactly one tick; returns false once the session is over
    pub fn step(&mut self) -> bool {
        if self.state.is_over() {
            return false;
        }
        let input = self.input();
        tick(&mut self.state, &input);
        self.record_if_over();
        !self.state.is_over()
    }

    /// Account for a frame of wall-clock time; returns ticks run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if self.state.is_over() {
            self.accumulator = 0.0;
            return 0;
        }
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            if !self.step() {
                self.accumulator = 0.0;
                break;
            }
        }
        substeps
    }

    /// Drive ticks until the session ends or `max_ticks` elapse; returns
    /// ticks run
    pub fn run_until_over(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && !self.state.is_over() {
            self.step();
            ran += 1;
        }
        ran
    }

    /// Fresh session; keys are released and the leaderboard kept
    pub fn restart(&mut self, seed: u64) {
        self.state.restart(seed);
        self.keys.clear();
        self.accumulator = 0.0;
        self.recorded = false;
    }

    /// Take pending events for the presentation/audio hosts
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    fn record_if_over(&mut self) {
        if self.recorded || !self.state.is_over() {
            return;
        }
        self.recorded = true;

        let session = &self.state.session;
        let entry = HighScoreEntry {
            score: session.score,
            distance: session.distance,
            ticks: session.elapsed_ticks,
            seed: self.state.seed,
        };
        match self.high_scores.add(entry) {
            Some(rank) => log::info!("Score {} ranked #{rank}", session.score),
            None => log::info!("Score {} did not place", session.score),
        }
    }
}
