#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances bullets and resolves their impacts.
//!
//! Bullets are resolved in firing order against enemies in spawn order. Hit
//! points already removed by earlier bullets of the same tick are tracked in
//! a scratch workspace, so an enemy killed by one bullet cannot absorb the
//! next one.

use std::time::Duration;

use tower_mini_core::{
    BulletOutcome, BulletView, Command, EnemyId, EnemyView, Event, PlayArea, Point, RunPhase,
};

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    play_area: PlayArea,
    bounds_margin: f32,
    hit_radius: f32,
}

impl Config {
    /// Creates a configuration from the play area and the collision tuning.
    #[must_use]
    pub const fn new(play_area: PlayArea, bounds_margin: f32, hit_radius: f32) -> Self {
        Self {
            play_area,
            bounds_margin,
            hit_radius,
        }
    }
}

/// Projectile system that reuses its candidate workspace between ticks.
#[derive(Debug)]
pub struct Projectiles {
    config: Config,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl Projectiles {
    /// Creates a new projectile system with an empty workspace.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            enemy_workspace: Vec::new(),
        }
    }

    /// Emits one `Command::ResolveBullet` per live bullet.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RunPhase,
        bullets: &BulletView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if phase != RunPhase::WaveActive || bullets.is_empty() {
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

        self.prepare_enemy_workspace(enemies);
        let hit_radius_sq = self.config.hit_radius * self.config.hit_radius;

        out.reserve(bullets.len());
        for bullet in bullets.iter() {
            let position = bullet.position.translated(bullet.velocity.scaled(seconds));

            let outcome = if !self
                .config
                .play_area
                .contains_with_margin(position, self.config.bounds_margin)
            {
                BulletOutcome::Expired
            } else {
                match self.enemy_workspace.iter_mut().find(|enemy| {
                    enemy.hit_points > 0.0
                        && enemy.position.distance_squared(position) <= hit_radius_sq
                }) {
                    Some(enemy) => {
                        enemy.hit_points -= bullet.damage;
                        BulletOutcome::Hit { enemy: enemy.id }
                    }
                    None => BulletOutcome::InFlight,
                }
            };

            out.push(Command::ResolveBullet {
                bullet: bullet.id,
                position,
                outcome,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                hit_points: snapshot.hit_points,
            }));
    }
}

#[derive(Clone, Copy, Debug)]
struct EnemyCandidate {
    id: EnemyId,
    position: Point,
    hit_points: f32,
}
