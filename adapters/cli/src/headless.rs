//! Fixed-step run without a window, for smoke tests and tuning sessions.

use std::{fmt, time::Duration};

use tower_mini_core::{Event, RunPhase};
use tower_mini_system_simulation::Simulation;
use tower_mini_world::query;
use tracing::debug;

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) simulated: Duration,
    pub(crate) phase: RunPhase,
    pub(crate) level: u32,
    pub(crate) max_level: u32,
    pub(crate) base_hit_points: u32,
    pub(crate) gold: u32,
    pub(crate) kills: u32,
    pub(crate) breaches: u32,
    pub(crate) waves_cleared: u32,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} after {:.1}s: level {}/{}, HP {}, gold {}, {} kills, {} breaches, {} waves cleared",
            self.phase,
            self.simulated.as_secs_f32(),
            self.level,
            self.max_level,
            self.base_hit_points,
            self.gold,
            self.kills,
            self.breaches,
            self.waves_cleared,
        )
    }
}

/// Plays from `level` with only the default towers until `duration` of
/// simulated time has passed or the run ends.
pub(crate) fn run(
    mut simulation: Simulation,
    level: u32,
    duration: Duration,
    step: Duration,
) -> RunSummary {
    simulation.start_at_level(level);

    let mut simulated = Duration::ZERO;
    let mut kills = 0;
    let mut breaches = 0;
    let mut waves_cleared = 0;
    loop {
        for event in simulation.drain_events() {
            match event {
                Event::EnemyKilled { .. } => kills += 1,
                Event::BaseDamaged { .. } => breaches += 1,
                Event::WaveCleared { level } => {
                    debug!(level, elapsed = simulated.as_secs_f32(), "wave cleared");
                    waves_cleared += 1;
                }
                _ => {}
            }
        }

        let phase = query::phase(simulation.world());
        if simulated >= duration || phase.is_terminal() {
            break;
        }
        simulation.update(step);
        simulated += step;
    }

    let world = simulation.world();
    RunSummary {
        simulated,
        phase: query::phase(world),
        level: query::level(world),
        max_level: query::rules(world).max_level,
        base_hit_points: query::base_hit_points(world),
        gold: query::gold(world),
        kills,
        breaches,
        waves_cleared,
    }
}
