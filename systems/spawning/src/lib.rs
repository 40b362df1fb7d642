#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use tower_mini_core::{Command, RunPhase, WaveRules, WaveSnapshot};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    waves: WaveRules,
}

impl Config {
    /// Creates a new configuration from the wave composition rules.
    #[must_use]
    pub const fn new(waves: WaveRules) -> Self {
        Self { waves }
    }
}

/// Pure system that emits at most one spawn per tick while a wave is active.
#[derive(Debug)]
pub struct Spawning {
    waves: WaveRules,
}

impl Spawning {
    /// Creates a new spawning system.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            waves: config.waves,
        }
    }

    /// Emits `Command::SpawnEnemy` once the wave's spawn timer ran out.
    ///
    /// The world's tick has already counted the timer down, so the system
    /// only decides whether a spawn is due and what it should look like.
    pub fn handle(&mut self, phase: RunPhase, wave: &WaveSnapshot, out: &mut Vec<Command>) {
        if phase != RunPhase::WaveActive {
            return;
        }

        if !wave.has_pending_spawns() || wave.spawn_timer > 0.0 {
            return;
        }

        let kind = self.waves.kind_for_ordinal(wave.spawned);
        let scaling = self.waves.scaling(kind);
        out.push(Command::SpawnEnemy {
            kind,
            speed: scaling.speed_at(wave.level),
            hit_points: scaling.hit_points_at(wave.level),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_mini_core::EnemyKind;

    fn wave(spawned: u32, spawn_timer: f32) -> WaveSnapshot {
        WaveSnapshot {
            level: 5,
            spawned,
            to_spawn: 16,
            spawn_timer,
        }
    }

    #[test]
    fn waits_for_timer_to_expire() {
        let mut spawning = Spawning::new(Config::new(WaveRules::default()));
        let mut commands = Vec::new();
        spawning.handle(RunPhase::WaveActive, &wave(0, 0.1), &mut commands);
        assert!(commands.is_empty());

        spawning.handle(RunPhase::WaveActive, &wave(0, 0.0), &mut commands);
        assert_eq!(
            commands,
            vec![Command::SpawnEnemy {
                kind: EnemyKind::Fast,
                speed: 140.0,
                hit_points: 60.0,
            }]
        );
    }

    #[test]
    fn fourth_spawn_is_a_scaled_tank() {
        let mut spawning = Spawning::new(Config::new(WaveRules::default()));
        let mut commands = Vec::new();
        spawning.handle(RunPhase::WaveActive, &wave(3, -0.2), &mut commands);
        assert_eq!(
            commands,
            vec![Command::SpawnEnemy {
                kind: EnemyKind::Tank,
                speed: 80.0,
                hit_points: 140.0,
            }]
        );
    }

    #[test]
    fn stays_silent_outside_active_waves() {
        let mut spawning = Spawning::new(Config::new(WaveRules::default()));
        let mut commands = Vec::new();
        for phase in [
            RunPhase::Idle,
            RunPhase::Intermission,
            RunPhase::GameOver,
            RunPhase::GameWin,
        ] {
            spawning.handle(phase, &wave(0, -1.0), &mut commands);
        }
        spawning.handle(RunPhase::WaveActive, &wave(16, -1.0), &mut commands);
        assert!(commands.is_empty());
    }
}
