use std::time::Duration;

use tower_mini_core::{Command, EnemyKind, Event, RunPhase};
use tower_mini_system_spawning::{Config, Spawning};
use tower_mini_world::{self as world, query, World};

fn tick(world: &mut World, dt: Duration, events: &mut Vec<Event>) {
    world::apply(world, Command::Tick { dt }, events);
}

#[test]
fn first_spawn_waits_for_initial_delay() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartAtLevel { level: 1 }, &mut events);

    let mut spawning = Spawning::new(Config::new(query::rules(&world).waves));
    let mut commands = Vec::new();

    tick(&mut world, Duration::from_millis(600), &mut events);
    spawning.handle(query::phase(&world), &query::wave(&world), &mut commands);
    assert!(commands.is_empty(), "no spawn before the initial delay");

    tick(&mut world, Duration::from_millis(150), &mut events);
    spawning.handle(query::phase(&world), &query::wave(&world), &mut commands);
    assert_eq!(commands.len(), 1, "spawn once the delay elapsed");

    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }
    let enemies = query::enemy_view(&world);
    let enemy = enemies.iter().next().expect("enemy spawned");
    assert_eq!(enemy.position, query::path(&world)[0]);
    assert_eq!(enemy.kind, EnemyKind::Fast);
}

#[test]
fn large_frames_still_spawn_one_enemy_per_tick() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartAtLevel { level: 1 }, &mut events);
    let mut spawning = Spawning::new(Config::new(query::rules(&world).waves));
    let mut commands = Vec::new();

    tick(&mut world, Duration::from_secs(10), &mut events);
    spawning.handle(query::phase(&world), &query::wave(&world), &mut commands);
    assert_eq!(commands.len(), 1);
}

#[test]
fn full_wave_follows_tank_cadence() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartAtLevel { level: 1 }, &mut events);
    let mut spawning = Spawning::new(Config::new(query::rules(&world).waves));
    let mut commands = Vec::new();

    for _ in 0..64 {
        tick(&mut world, Duration::from_secs(1), &mut events);
        spawning.handle(query::phase(&world), &query::wave(&world), &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }

    let kinds: Vec<EnemyKind> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds.len(), 8, "level one spawns 6 + 2 enemies");
    assert_eq!(
        kinds,
        vec![
            EnemyKind::Fast,
            EnemyKind::Fast,
            EnemyKind::Fast,
            EnemyKind::Tank,
            EnemyKind::Fast,
            EnemyKind::Fast,
            EnemyKind::Fast,
            EnemyKind::Tank,
        ]
    );
    assert_eq!(query::phase(&world), RunPhase::WaveActive);
}
