#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits bullet firing commands from targeting data.

use tower_mini_core::{Command, RunPhase, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Configuration parameters required to construct the combat system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    bullet_speed: f32,
}

impl Config {
    /// Creates a configuration using the provided bullet travel speed.
    #[must_use]
    pub const fn new(bullet_speed: f32) -> Self {
        Self { bullet_speed }
    }
}

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug)]
pub struct TowerCombat {
    bullet_speed: f32,
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            bullet_speed: config.bullet_speed,
            scratch: Vec::new(),
        }
    }

    /// Emits `Command::FireBullet` entries for ready towers holding a target.
    ///
    /// Bullets head for the target's position at the moment of firing. A
    /// target standing exactly on the tower yields a stationary bullet.
    pub fn handle(
        &mut self,
        phase: RunPhase,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != RunPhase::WaveActive {
            return;
        }

        if tower_targets.is_empty() {
            return;
        }

        let snapshots: Vec<TowerSnapshot> = towers.iter().copied().collect();
        if snapshots.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(snapshot) = find_tower(&snapshots, target.tower) else {
                continue;
            };
            if !snapshot.is_ready() {
                continue;
            }

            let direction = target
                .tower_position
                .to(target.enemy_position)
                .normalized_or_zero();
            self.scratch.push(Command::FireBullet {
                tower: target.tower,
                target: target.enemy,
                velocity: direction.scaled(self.bullet_speed),
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(towers: &[TowerSnapshot], tower: TowerId) -> Option<&TowerSnapshot> {
    towers
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| &towers[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_mini_core::{EnemyId, Point};

    #[test]
    fn inactive_phases_are_silent() {
        let mut system = TowerCombat::new(Config::new(320.0));
        let towers = TowerView::from_snapshots(vec![snapshot(1, 0.0)]);
        let targets = vec![target(1, 7, Point::new(10.0, 0.0))];
        let mut out = Vec::new();

        system.handle(RunPhase::Intermission, &towers, &targets, &mut out);
        system.handle(RunPhase::GameOver, &towers, &targets, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn bullets_travel_toward_target_at_bullet_speed() {
        let mut system = TowerCombat::new(Config::new(320.0));
        let towers = TowerView::from_snapshots(vec![snapshot(2, 0.0), snapshot(5, -1.5)]);
        let targets = vec![
            target(2, 4, Point::new(30.0, 40.0)),
            target(5, 1, Point::new(0.0, -10.0)),
        ];
        let mut out = Vec::new();

        system.handle(RunPhase::WaveActive, &towers, &targets, &mut out);

        assert_eq!(out.len(), 2);
        let velocities: Vec<(TowerId, EnemyId, Point)> = out
            .iter()
            .map(|command| match command {
                Command::FireBullet {
                    tower,
                    target,
                    velocity,
                } => (*tower, *target, *velocity),
                other => panic!("unexpected command emitted: {other:?}"),
            })
            .collect();
        assert_eq!(velocities[0].0, TowerId::new(2));
        assert_eq!(velocities[0].1, EnemyId::new(4));
        assert!((velocities[0].2.x - 192.0).abs() < 1e-3);
        assert!((velocities[0].2.y - 256.0).abs() < 1e-3);
        assert_eq!(velocities[1].0, TowerId::new(5));
        assert_eq!(velocities[1].2, Point::new(0.0, -320.0));
    }

    #[test]
    fn non_ready_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new(Config::new(320.0));
        let towers = TowerView::from_snapshots(vec![snapshot(3, 0.25), snapshot(8, 0.0)]);
        let targets = vec![
            target(3, 9, Point::new(1.0, 0.0)),
            target(8, 2, Point::new(0.0, 0.0)),
            target(42, 3, Point::new(1.0, 0.0)),
        ];
        let mut out = Vec::new();

        system.handle(RunPhase::WaveActive, &towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireBullet {
                tower: TowerId::new(8),
                target: EnemyId::new(2),
                velocity: Point::ZERO,
            }],
        );
    }

    fn snapshot(tower: u32, cooldown: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(tower),
            position: Point::ZERO,
            range: 180.0,
            cooldown,
        }
    }

    fn target(tower: u32, enemy: u32, enemy_position: Point) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
            tower_position: Point::ZERO,
            enemy_position,
        }
    }
}
