#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tower Mini.
//!
//! The world owns every piece of mutable run state: the economy, the base,
//! the current path and all live entities. It changes only through
//! [`apply`], which executes one [`Command`] and reports the consequences as
//! [`Event`] values. Read access is provided by the [`query`] module.

mod towers;

use tower_mini_core::{
    Banner, BannerMessage, BulletId, BulletOutcome, Command, EnemyId, EnemyKind, Event,
    PlacementError, Point, Rules, RunPhase,
};
use tower_mini_system_level_generation::{build_path, default_tower_sites};
use tracing::{debug, info};

use towers::TowerRegistry;

/// Represents the state of the world.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    phase: RunPhase,
    level: u32,
    path: Vec<Point>,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    bullets: Vec<Bullet>,
    wave: Wave,
    intermission: f32,
    base_hit_points: u32,
    gold: u32,
    banner: Option<Banner>,
    next_enemy_id: u32,
    next_bullet_id: u32,
}

impl World {
    /// Creates a new idle world governed by the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(Rules::default())
    }

    /// Creates a new idle world governed by the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        Self {
            rules,
            phase: RunPhase::Idle,
            level: 0,
            path: Vec::new(),
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            bullets: Vec::new(),
            wave: Wave::default(),
            intermission: 0.0,
            base_hit_points: rules.base_hit_points,
            gold: rules.starting_gold,
            banner: None,
            next_enemy_id: 0,
            next_bullet_id: 0,
        }
    }

    fn show_banner(&mut self, message: BannerMessage, out_events: &mut Vec<Event>) {
        self.banner = Some(Banner::new(message));
        out_events.push(Event::BannerShown { message });
    }

    fn start_next_level(&mut self, out_events: &mut Vec<Event>) {
        if self.level >= self.rules.max_level {
            self.win(out_events);
            return;
        }

        self.level += 1;
        self.phase = RunPhase::WaveActive;
        self.path = build_path(self.level, &self.rules.play_area);
        self.wave = Wave {
            to_spawn: self.rules.waves.wave_size(self.level),
            spawned: 0,
            spawn_timer: self.rules.initial_spawn_delay,
        };
        self.enemies.clear();
        self.bullets.clear();
        self.gold = self.gold.saturating_add(self.rules.level_bonus);
        debug!(
            level = self.level,
            to_spawn = self.wave.to_spawn,
            gold = self.gold,
            "level started"
        );
        out_events.push(Event::LevelStarted {
            level: self.level,
            to_spawn: self.wave.to_spawn,
        });

        self.towers.clear();
        for position in default_tower_sites(&self.path) {
            let tower = self.towers.insert(position);
            out_events.push(Event::TowerPlaced {
                tower,
                position,
                cost: 0,
            });
        }

        self.show_banner(BannerMessage::LevelBegins { level: self.level }, out_events);
    }

    fn win(&mut self, out_events: &mut Vec<Event>) {
        self.phase = RunPhase::GameWin;
        info!(level = self.level, gold = self.gold, "all levels cleared");
        out_events.push(Event::GameWon);
        self.show_banner(BannerMessage::Victory, out_events);
    }

    fn place_tower(&mut self, position: Point, out_events: &mut Vec<Event>) {
        let rejection = if self.phase == RunPhase::Idle || self.phase.is_terminal() {
            Some(PlacementError::RunInactive)
        } else if self.towers.crowds(position, self.rules.placement_spacing) {
            Some(PlacementError::TooClose)
        } else if self.gold < self.rules.tower_cost {
            Some(PlacementError::InsufficientGold)
        } else {
            None
        };

        if let Some(reason) = rejection {
            debug!(x = position.x, y = position.y, %reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { position, reason });
            if reason != PlacementError::RunInactive {
                self.show_banner(BannerMessage::PlacementRejected { reason }, out_events);
            }
            return;
        }

        let cost = self.rules.tower_cost;
        self.gold -= cost;
        let tower = self.towers.insert(position);
        out_events.push(Event::TowerPlaced {
            tower,
            position,
            cost,
        });
        self.show_banner(BannerMessage::TowerPlaced { cost }, out_events);
    }

    fn advance_clock(&mut self, seconds: f32, out_events: &mut Vec<Event>) {
        if let Some(banner) = self.banner.as_mut() {
            banner.elapse(seconds);
            if !banner.is_visible() {
                self.banner = None;
            }
        }

        match self.phase {
            RunPhase::Intermission => {
                self.intermission -= seconds;
                if self.intermission <= 0.0 {
                    self.start_next_level(out_events);
                }
            }
            RunPhase::WaveActive => {
                if self.wave.spawned < self.wave.to_spawn {
                    self.wave.spawn_timer -= seconds;
                }
                self.towers.cool_down(seconds);
            }
            RunPhase::Idle | RunPhase::GameOver | RunPhase::GameWin => {}
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, speed: f32, hit_points: f32, out: &mut Vec<Event>) {
        let Some(&entrance) = self.path.first() else {
            return;
        };

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies.push(Enemy {
            id,
            kind,
            position: entrance,
            waypoint: 0,
            speed,
            hit_points,
            alive: true,
        });
        self.wave.spawned += 1;
        self.wave.spawn_timer = self.rules.waves.spawn_interval(self.level);
        out.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn breach_base(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(intruder) = self.live_enemy_mut(enemy) else {
            return;
        };
        intruder.alive = false;

        self.base_hit_points = self.base_hit_points.saturating_sub(1);
        out_events.push(Event::BaseDamaged {
            enemy,
            remaining: self.base_hit_points,
        });

        if self.base_hit_points == 0 && self.phase != RunPhase::GameOver {
            self.phase = RunPhase::GameOver;
            info!(level = self.level, "base destroyed");
            out_events.push(Event::GameOver { level: self.level });
            self.show_banner(BannerMessage::GameOver, out_events);
        }
    }

    fn fire_bullet(
        &mut self,
        tower: towers::TowerState,
        target: EnemyId,
        velocity: Point,
        out_events: &mut Vec<Event>,
    ) {
        let id = BulletId::new(self.next_bullet_id);
        self.next_bullet_id = self.next_bullet_id.saturating_add(1);
        self.bullets.push(Bullet {
            id,
            position: tower.position,
            velocity,
            damage: self.rules.bullet_damage,
            alive: true,
        });
        out_events.push(Event::BulletFired {
            bullet: id,
            tower: tower.id,
            target,
        });
    }

    fn resolve_bullet(
        &mut self,
        bullet: BulletId,
        position: Point,
        outcome: BulletOutcome,
        out_events: &mut Vec<Event>,
    ) {
        let Some(index) = self
            .bullets
            .iter()
            .position(|candidate| candidate.id == bullet && candidate.alive)
        else {
            return;
        };
        let damage = self.bullets[index].damage;
        self.bullets[index].position = position;

        match outcome {
            BulletOutcome::InFlight => {}
            BulletOutcome::Expired => {
                self.bullets[index].alive = false;
                out_events.push(Event::BulletExpired { bullet });
            }
            BulletOutcome::Hit { enemy } => {
                self.bullets[index].alive = false;
                let Some(victim) = self.live_enemy_mut(enemy) else {
                    return;
                };
                victim.hit_points -= damage;
                let remaining_hit_points = victim.hit_points;
                let killed = remaining_hit_points <= 0.0;
                if killed {
                    victim.alive = false;
                }

                out_events.push(Event::EnemyHit {
                    bullet,
                    enemy,
                    remaining_hit_points,
                });
                if killed {
                    let reward = self.rules.kill_gold;
                    self.gold = self.gold.saturating_add(reward);
                    out_events.push(Event::EnemyKilled { enemy, reward });
                }
            }
        }
    }

    fn conclude_tick(&mut self, out_events: &mut Vec<Event>) {
        self.enemies.retain(|enemy| enemy.alive);
        self.bullets.retain(|bullet| bullet.alive);

        if self.phase != RunPhase::WaveActive {
            return;
        }
        if self.wave.spawned < self.wave.to_spawn || !self.enemies.is_empty() {
            return;
        }

        out_events.push(Event::WaveCleared { level: self.level });
        if self.level >= self.rules.max_level {
            self.win(out_events);
        } else {
            self.phase = RunPhase::Intermission;
            self.intermission = self.rules.intermission_seconds;
            debug!(level = self.level, gold = self.gold, "wave cleared");
            self.show_banner(BannerMessage::LevelCleared { level: self.level }, out_events);
        }
    }

    fn live_enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut Enemy> {
        self.enemies
            .iter_mut()
            .find(|candidate| candidate.id == enemy && candidate.alive)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartAtLevel { level } => {
            let level = level.min(world.rules.max_level).max(1);
            info!(level, "starting run");
            world.phase = RunPhase::Idle;
            world.base_hit_points = world.rules.base_hit_points;
            world.level = level - 1;
            world.start_next_level(out_events);
        }
        Command::PlaceTower { position } => world.place_tower(position, out_events),
        Command::Tick { dt } => {
            if !world.phase.advances() {
                return;
            }
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_clock(dt.as_secs_f32(), out_events);
        }
        Command::SpawnEnemy {
            kind,
            speed,
            hit_points,
        } => {
            if world.phase != RunPhase::WaveActive || world.wave.spawned >= world.wave.to_spawn {
                return;
            }
            world.spawn_enemy(kind, speed, hit_points, out_events);
        }
        Command::MoveEnemy {
            enemy,
            position,
            waypoint,
        } => {
            if let Some(walker) = world.live_enemy_mut(enemy) {
                walker.position = position;
                walker.waypoint = waypoint;
            }
        }
        Command::BreachBase { enemy } => world.breach_base(enemy, out_events),
        Command::FireBullet {
            tower,
            target,
            velocity,
        } => {
            if world.phase != RunPhase::WaveActive {
                return;
            }
            let fire_interval = world.rules.fire_interval;
            let Some(state) = world.towers.get_mut(tower) else {
                return;
            };
            state.cooldown = fire_interval;
            let state = state.clone();
            world.fire_bullet(state, target, velocity, out_events);
        }
        Command::ResolveBullet {
            bullet,
            position,
            outcome,
        } => world.resolve_bullet(bullet, position, outcome, out_events),
        Command::ConcludeTick => world.conclude_tick(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tower_mini_core::{
        Banner, BulletSnapshot, BulletView, EnemySnapshot, EnemyView, Point, Rules, RunPhase,
        TowerSnapshot, TowerView, WaveSnapshot,
    };

    /// Rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Current lifecycle phase of the run.
    #[must_use]
    pub fn phase(world: &World) -> RunPhase {
        world.phase
    }

    /// Level currently being played, or zero before the first start.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Gold available for tower purchases.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Hit points the base has left.
    #[must_use]
    pub fn base_hit_points(world: &World) -> u32 {
        world.base_hit_points
    }

    /// Waypoints of the current level's path.
    #[must_use]
    pub fn path(world: &World) -> &[Point] {
        &world.path
    }

    /// Seconds left in the current intermission, if one is running.
    #[must_use]
    pub fn intermission_remaining(world: &World) -> Option<f32> {
        (world.phase == RunPhase::Intermission).then_some(world.intermission)
    }

    /// Banner currently visible to the player.
    #[must_use]
    pub fn banner(world: &World) -> Option<&Banner> {
        world.banner.as_ref()
    }

    /// Progress of the current level's wave.
    #[must_use]
    pub fn wave(world: &World) -> WaveSnapshot {
        WaveSnapshot {
            level: world.level,
            spawned: world.wave.spawned,
            to_spawn: world.wave.to_spawn,
            spawn_timer: world.wave.spawn_timer,
        }
    }

    /// Captures a read-only view of the live enemies in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .filter(|enemy| enemy.alive)
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    kind: enemy.kind,
                    position: enemy.position,
                    waypoint: enemy.waypoint,
                    speed: enemy.speed,
                    hit_points: enemy.hit_points,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers in placement order.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let range = world.rules.tower_range;
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| TowerSnapshot {
                    id: tower.id,
                    position: tower.position,
                    range,
                    cooldown: tower.cooldown,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the bullets in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(
            world
                .bullets
                .iter()
                .filter(|bullet| bullet.alive)
                .map(|bullet| BulletSnapshot {
                    id: bullet.id,
                    position: bullet.position,
                    velocity: bullet.velocity,
                    damage: bullet.damage,
                })
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Wave {
    to_spawn: u32,
    spawned: u32,
    spawn_timer: f32,
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Point,
    waypoint: usize,
    speed: f32,
    hit_points: f32,
    alive: bool,
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    position: Point,
    velocity: Point,
    damage: f32,
    alive: bool,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn started(rules: Rules, level: u32) -> (World, Vec<Event>) {
        let mut world = World::with_rules(rules);
        let mut events = Vec::new();
        apply(&mut world, Command::StartAtLevel { level }, &mut events);
        (world, events)
    }

    fn spawn_fast(world: &mut World, events: &mut Vec<Event>) -> EnemyId {
        apply(
            world,
            Command::SpawnEnemy {
                kind: EnemyKind::Fast,
                speed: 100.0,
                hit_points: 30.0,
            },
            events,
        );
        match events.last() {
            Some(Event::EnemySpawned { enemy, .. }) => *enemy,
            other => panic!("expected spawn event, got {other:?}"),
        }
    }

    #[test]
    fn new_world_is_idle_with_starting_resources() {
        let world = World::new();
        assert_eq!(query::phase(&world), RunPhase::Idle);
        assert_eq!(query::level(&world), 0);
        assert_eq!(query::gold(&world), 100);
        assert_eq!(query::base_hit_points(&world), 10);
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn start_at_level_builds_wave_and_default_towers() {
        let (world, events) = started(Rules::default(), 3);
        assert_eq!(query::phase(&world), RunPhase::WaveActive);
        assert_eq!(query::level(&world), 3);
        assert_eq!(query::gold(&world), 120);
        assert_eq!(query::wave(&world).to_spawn, 12);
        assert_eq!(query::wave(&world).spawn_timer, 0.7);
        assert_eq!(query::tower_view(&world).len(), 2);
        assert!(events.contains(&Event::LevelStarted {
            level: 3,
            to_spawn: 12
        }));
        assert_eq!(
            query::banner(&world).map(Banner::message),
            Some(BannerMessage::LevelBegins { level: 3 })
        );
    }

    #[test]
    fn start_at_level_clamps_out_of_range_requests() {
        let (world, _) = started(Rules::default(), 99);
        assert_eq!(query::level(&world), 30);
        let (world, _) = started(Rules::default(), 0);
        assert_eq!(query::level(&world), 1);
    }

    #[test]
    fn placement_checks_spacing_before_gold() {
        let rules = Rules {
            starting_gold: 0,
            level_bonus: 0,
            ..Rules::default()
        };
        let (mut world, _) = started(rules, 1);
        let occupied = query::tower_view(&world)
            .iter()
            .next()
            .map(|tower| tower.position)
            .expect("default tower");

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                position: occupied.translated(Point::new(10.0, 0.0)),
            },
            &mut events,
        );
        assert!(matches!(
            events[0],
            Event::TowerPlacementRejected {
                reason: PlacementError::TooClose,
                ..
            }
        ));

        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                position: Point::new(640.0, 40.0),
            },
            &mut events,
        );
        assert!(matches!(
            events[0],
            Event::TowerPlacementRejected {
                reason: PlacementError::InsufficientGold,
                ..
            }
        ));
        assert_eq!(query::gold(&world), 0);
    }

    #[test]
    fn placement_is_rejected_without_a_running_level() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                position: Point::new(100.0, 100.0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                position: Point::new(100.0, 100.0),
                reason: PlacementError::RunInactive,
            }]
        );
        assert_eq!(query::gold(&world), 100);
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn tick_counts_down_spawn_timer_and_banner() {
        let (mut world, _) = started(Rules::default(), 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        assert!((query::wave(&world).spawn_timer - 0.2).abs() < 1e-6);
        assert!(query::banner(&world).is_some());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1600),
            },
            &mut events,
        );
        assert!(query::banner(&world).is_none());
    }

    #[test]
    fn spawned_enemy_enters_at_first_waypoint() {
        let (mut world, _) = started(Rules::default(), 1);
        let mut events = Vec::new();
        let enemy = spawn_fast(&mut world, &mut events);
        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("enemy present");
        assert_eq!(snapshot.id, enemy);
        assert_eq!(snapshot.position, query::path(&world)[0]);
        assert_eq!(query::wave(&world).spawned, 1);
        assert!((query::wave(&world).spawn_timer - 0.79).abs() < 1e-6);
    }

    #[test]
    fn breaches_clamp_base_at_zero_and_end_the_run() {
        let rules = Rules {
            base_hit_points: 1,
            ..Rules::default()
        };
        let (mut world, _) = started(rules, 1);
        let mut events = Vec::new();
        let first = spawn_fast(&mut world, &mut events);
        let second = spawn_fast(&mut world, &mut events);

        events.clear();
        apply(&mut world, Command::BreachBase { enemy: first }, &mut events);
        apply(&mut world, Command::BreachBase { enemy: second }, &mut events);

        assert_eq!(query::phase(&world), RunPhase::GameOver);
        assert_eq!(query::base_hit_points(&world), 0);
        let game_overs = events
            .iter()
            .filter(|event| matches!(event, Event::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(
            query::banner(&world).map(Banner::message),
            Some(BannerMessage::GameOver)
        );
    }

    #[test]
    fn lethal_hit_awards_kill_gold() {
        let (mut world, _) = started(Rules::default(), 1);
        let mut events = Vec::new();
        let enemy = spawn_fast(&mut world, &mut events);
        let tower = query::tower_view(&world)
            .iter()
            .next()
            .map(|tower| tower.id)
            .expect("default tower");

        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
                velocity: Point::new(320.0, 0.0),
            },
            &mut events,
        );
        let bullet = query::bullet_view(&world)
            .iter()
            .next()
            .map(|bullet| bullet.id)
            .expect("bullet in flight");
        assert_eq!(
            query::tower_view(&world)
                .iter()
                .next()
                .map(|tower| tower.cooldown),
            Some(0.6)
        );

        events.clear();
        apply(
            &mut world,
            Command::ResolveBullet {
                bullet,
                position: Point::ZERO,
                outcome: BulletOutcome::Hit { enemy },
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::EnemyHit {
                bullet,
                enemy,
                remaining_hit_points: 12.0,
            }]
        );

        apply(
            &mut world,
            Command::FireBullet {
                tower,
                target: enemy,
                velocity: Point::new(320.0, 0.0),
            },
            &mut events,
        );
        let second = BulletId::new(bullet.get() + 1);
        events.clear();
        apply(
            &mut world,
            Command::ResolveBullet {
                bullet: second,
                position: Point::ZERO,
                outcome: BulletOutcome::Hit { enemy },
            },
            &mut events,
        );
        assert!(events.contains(&Event::EnemyKilled { enemy, reward: 5 }));
        assert_eq!(query::gold(&world), 125);
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn cleared_wave_enters_intermission_then_next_level() {
        let rules = Rules {
            waves: tower_mini_core::WaveRules {
                base_size: 1,
                growth_per_level: 0,
                ..Default::default()
            },
            ..Rules::default()
        };
        let (mut world, _) = started(rules, 1);
        let mut events = Vec::new();
        let enemy = spawn_fast(&mut world, &mut events);
        apply(&mut world, Command::BreachBase { enemy }, &mut events);

        events.clear();
        apply(&mut world, Command::ConcludeTick, &mut events);
        assert_eq!(query::phase(&world), RunPhase::Intermission);
        assert_eq!(query::intermission_remaining(&world), Some(3.0));
        assert!(events.contains(&Event::WaveCleared { level: 1 }));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(3),
            },
            &mut events,
        );
        assert_eq!(query::phase(&world), RunPhase::WaveActive);
        assert_eq!(query::level(&world), 2);
    }

    #[test]
    fn clearing_the_final_level_wins() {
        let rules = Rules {
            max_level: 2,
            waves: tower_mini_core::WaveRules {
                base_size: 1,
                growth_per_level: 0,
                ..Default::default()
            },
            ..Rules::default()
        };
        let (mut world, _) = started(rules, 2);
        let mut events = Vec::new();
        let enemy = spawn_fast(&mut world, &mut events);
        apply(&mut world, Command::BreachBase { enemy }, &mut events);
        apply(&mut world, Command::ConcludeTick, &mut events);

        assert_eq!(query::phase(&world), RunPhase::GameWin);
        assert!(events.contains(&Event::GameWon));
        assert_eq!(
            query::banner(&world).map(Banner::message),
            Some(BannerMessage::Victory)
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
