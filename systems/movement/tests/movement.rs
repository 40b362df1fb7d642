use std::time::Duration;

use tower_mini_core::{Command, EnemyKind, Event, RunPhase};
use tower_mini_system_movement::{Config, Movement};
use tower_mini_world::{self as world, query, World};

fn spawn_fast(world: &mut World, events: &mut Vec<Event>) {
    world::apply(
        world,
        Command::SpawnEnemy {
            kind: EnemyKind::Fast,
            speed: 400.0,
            hit_points: 30.0,
        },
        events,
    );
}

fn pump(world: &mut World, movement: &mut Movement, dt: Duration) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        query::phase(world),
        &query::enemy_view(world),
        query::path(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    world::apply(world, Command::ConcludeTick, &mut events);
    events
}

#[test]
fn enemies_walk_the_whole_path_and_breach_the_base() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartAtLevel { level: 1 }, &mut events);
    spawn_fast(&mut world, &mut events);

    let mut movement = Movement::new(Config::new(query::rules(&world).arrival_radius));
    let mut reached = Vec::new();
    let mut breached = false;
    for _ in 0..2_000 {
        let tick_events = pump(&mut world, &mut movement, Duration::from_millis(16));
        if let Some(enemy) = query::enemy_view(&world).iter().next() {
            reached.push(enemy.waypoint);
        }
        if tick_events
            .iter()
            .any(|event| matches!(event, Event::BaseDamaged { remaining: 9, .. }))
        {
            breached = true;
            break;
        }
    }

    assert!(breached, "enemy should reach the base");
    assert!(
        reached.windows(2).all(|pair| pair[0] <= pair[1]),
        "waypoint index never decreases"
    );
    assert_eq!(
        reached.last().copied(),
        Some(query::path(&world).len() - 1)
    );
    assert_eq!(query::base_hit_points(&world), 9);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn identical_runs_produce_identical_positions() {
    let run = || {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartAtLevel { level: 4 }, &mut events);
        spawn_fast(&mut world, &mut events);
        let mut movement = Movement::new(Config::new(9.0));
        for _ in 0..120 {
            let _ = pump(&mut world, &mut movement, Duration::from_millis(16));
        }
        query::enemy_view(&world).into_vec()
    };

    assert_eq!(run(), run());
}

#[test]
fn movement_pauses_once_the_run_is_over() {
    let rules = tower_mini_core::Rules {
        base_hit_points: 1,
        ..Default::default()
    };
    let mut world = World::with_rules(rules);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartAtLevel { level: 1 }, &mut events);
    spawn_fast(&mut world, &mut events);
    spawn_fast(&mut world, &mut events);

    let mut movement = Movement::new(Config::new(9.0));
    for _ in 0..2_000 {
        let _ = pump(&mut world, &mut movement, Duration::from_millis(16));
        if query::phase(&world) == RunPhase::GameOver {
            break;
        }
    }
    assert_eq!(query::phase(&world), RunPhase::GameOver);

    let before = query::enemy_view(&world).into_vec();
    let events = pump(&mut world, &mut movement, Duration::from_millis(16));
    assert!(events.is_empty());
    assert_eq!(query::enemy_view(&world).into_vec(), before);
}
