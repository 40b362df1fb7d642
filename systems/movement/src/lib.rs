#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along the waypoint path.

use std::time::Duration;

use tower_mini_core::{Command, EnemySnapshot, EnemyView, Event, Point, RunPhase};

/// Distance below which an enemy is considered to stand on its next waypoint.
const SNAP_DISTANCE: f32 = 1.0;

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    arrival_radius: f32,
}

impl Config {
    /// Creates a configuration using the distance at which waypoints count as reached.
    #[must_use]
    pub const fn new(arrival_radius: f32) -> Self {
        Self { arrival_radius }
    }
}

/// Pure system that reacts to elapsed time and emits movement commands.
#[derive(Debug)]
pub struct Movement {
    arrival_radius_sq: f32,
}

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            arrival_radius_sq: config.arrival_radius * config.arrival_radius,
        }
    }

    /// Consumes the tick's events and the enemy view to emit movement commands.
    ///
    /// Enemies that already stand on the final waypoint breach the base
    /// instead of moving.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RunPhase,
        enemies: &EnemyView,
        path: &[Point],
        out: &mut Vec<Command>,
    ) {
        if phase != RunPhase::WaveActive {
            return;
        }

        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();

        let seconds = elapsed.as_secs_f32();
        out.reserve(enemies.len());
        for enemy in enemies.iter() {
            out.push(self.step(enemy, path, seconds));
        }
    }

    fn step(&self, enemy: &EnemySnapshot, path: &[Point], seconds: f32) -> Command {
        let Some(&next) = path.get(enemy.waypoint + 1) else {
            return Command::BreachBase { enemy: enemy.id };
        };

        let heading = enemy.position.to(next);
        let distance = heading.length();
        if distance < SNAP_DISTANCE {
            return Command::MoveEnemy {
                enemy: enemy.id,
                position: enemy.position,
                waypoint: enemy.waypoint + 1,
            };
        }

        let position = enemy
            .position
            .translated(heading.scaled(enemy.speed * seconds / distance));
        let waypoint = if position.distance_squared(next) < self.arrival_radius_sq {
            enemy.waypoint + 1
        } else {
            enemy.waypoint
        };

        Command::MoveEnemy {
            enemy: enemy.id,
            position,
            waypoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_mini_core::{EnemyId, EnemyKind};

    fn enemy(position: Point, waypoint: usize) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(0),
            kind: EnemyKind::Fast,
            position,
            waypoint,
            speed: 100.0,
            hit_points: 30.0,
        }
    }

    fn tick(millis: u64) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }]
    }

    const PATH: [Point; 3] = [
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
    ];

    #[test]
    fn walks_toward_next_waypoint() {
        let mut movement = Movement::new(Config::new(9.0));
        let view = EnemyView::from_snapshots(vec![enemy(PATH[0], 0)]);
        let mut commands = Vec::new();
        movement.handle(&tick(500), RunPhase::WaveActive, &view, &PATH, &mut commands);
        assert_eq!(
            commands,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(0),
                position: Point::new(50.0, 0.0),
                waypoint: 0,
            }]
        );
    }

    #[test]
    fn arriving_within_radius_advances_waypoint() {
        let mut movement = Movement::new(Config::new(9.0));
        let view = EnemyView::from_snapshots(vec![enemy(Point::new(5.0, 0.0), 0)]);
        let mut commands = Vec::new();
        movement.handle(&tick(900), RunPhase::WaveActive, &view, &PATH, &mut commands);
        assert!(matches!(
            commands[0],
            Command::MoveEnemy { waypoint: 1, .. }
        ));
    }

    #[test]
    fn snaps_when_already_on_waypoint() {
        let mut movement = Movement::new(Config::new(9.0));
        let view = EnemyView::from_snapshots(vec![enemy(Point::new(99.5, 0.0), 0)]);
        let mut commands = Vec::new();
        movement.handle(&tick(100), RunPhase::WaveActive, &view, &PATH, &mut commands);
        assert_eq!(
            commands,
            vec![Command::MoveEnemy {
                enemy: EnemyId::new(0),
                position: Point::new(99.5, 0.0),
                waypoint: 1,
            }]
        );
    }

    #[test]
    fn final_waypoint_breaches_base() {
        let mut movement = Movement::new(Config::new(9.0));
        let view = EnemyView::from_snapshots(vec![enemy(PATH[2], 2)]);
        let mut commands = Vec::new();
        movement.handle(&tick(16), RunPhase::WaveActive, &view, &PATH, &mut commands);
        assert_eq!(
            commands,
            vec![Command::BreachBase {
                enemy: EnemyId::new(0)
            }]
        );
    }

    #[test]
    fn zero_length_frame_still_breaches_and_snaps() {
        let mut movement = Movement::new(Config::new(9.0));
        let mut at_base = enemy(PATH[2], 2);
        at_base.id = EnemyId::new(1);
        let view = EnemyView::from_snapshots(vec![enemy(Point::new(99.5, 0.0), 0), at_base]);
        let mut commands = Vec::new();
        movement.handle(&tick(0), RunPhase::WaveActive, &view, &PATH, &mut commands);
        assert_eq!(
            commands,
            vec![
                Command::MoveEnemy {
                    enemy: EnemyId::new(0),
                    position: Point::new(99.5, 0.0),
                    waypoint: 1,
                },
                Command::BreachBase {
                    enemy: EnemyId::new(1)
                },
            ]
        );
    }

    #[test]
    fn idle_outside_active_wave() {
        let mut movement = Movement::new(Config::new(9.0));
        let view = EnemyView::from_snapshots(vec![enemy(PATH[0], 0)]);
        let mut commands = Vec::new();
        movement.handle(&tick(16), RunPhase::Intermission, &view, &PATH, &mut commands);
        movement.handle(&tick(16), RunPhase::Idle, &view, &PATH, &mut commands);
        assert!(commands.is_empty());
    }
}
