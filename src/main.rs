//! Lanefree entry point
//!
//! Headless native runner: plays autopilot sessions and prints the
//! leaderboard. Usage: `lanefree [seed] [preset | tuning.json] [sessions]`

use lanefree::consts::TICK_HZ;
use lanefree::sim::GameEvent;
use lanefree::{DifficultyPreset, Driver, Tuning};

/// Stop a session after ten simulated minutes even if nothing hit us
const MAX_SESSION_TICKS: u64 = 10 * 60 * TICK_HZ as u64;
/// Ticks between event drains (one simulated second)
const DRAIN_TICKS: u64 = TICK_HZ as u64;

fn main() {
    env_logger::init();
    log::info!("Lanefree (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x1a7e_f7ee);
    let tuning = match args.next() {
        Some(arg) => match arg.parse::<DifficultyPreset>() {
            Ok(preset) => Tuning::from_preset(preset),
            Err(_) => Tuning::load(&arg),
        },
        None => Tuning::default(),
    };
    let sessions = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(3);

    let mut driver = Driver::new(seed, tuning);
    driver.idle_mode = true;

    for session in 0..sessions {
        if session > 0 {
            driver.restart(seed.wrapping_add(session));
        }
        let mut ticks = 0;
        let mut spawned = 0;
        let mut outcome = "survived".to_string();
        while ticks < MAX_SESSION_TICKS && !driver.state().is_over() {
            ticks += driver.run_until_over(DRAIN_TICKS.min(MAX_SESSION_TICKS - ticks));
            for event in driver.drain_events() {
                match event {
                    GameEvent::ObstacleSpawned { .. } => spawned += 1,
                    GameEvent::Collision { detector, .. } => {
                        outcome = format!("crashed ({})", detector.as_str());
                    }
                    _ => {}
                }
            }
        }

        let state = driver.state();

        println!(
            "session {}: seed {} score {} distance {:.1} ticks {} obstacles {} - {}",
            session + 1,
            state.seed,
            state.score(),
            state.session.distance,
            ticks,
            spawned,
            outcome
        );
    }

    match driver.high_scores().to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize high scores: {e}"),
    }
}
