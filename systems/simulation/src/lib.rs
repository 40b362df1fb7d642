#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver that runs the world and every system in a fixed order.
//!
//! A frame advances the clock, then lets spawning, movement, targeting,
//! combat and projectiles react in that order. Each stage sees the world as
//! left by the previous one, so an enemy spawned this frame already walks
//! and a bullet fired this frame already flies. Dead entities are compacted
//! and the wave-clear check runs last.

use std::time::Duration;

use tower_mini_core::{Command, Event, Point, Rules, RunPhase, TowerTarget};
use tower_mini_system_builder::{self as builder, Builder, BuilderInput, PlacementPreview};
use tower_mini_system_movement::{self as movement, Movement};
use tower_mini_system_projectiles::{self as projectiles, Projectiles};
use tower_mini_system_spawning::{self as spawning, Spawning};
use tower_mini_system_tower_combat::{self as tower_combat, TowerCombat};
use tower_mini_system_tower_targeting::TowerTargeting;
use tower_mini_world::{self as world, query, World};
use tracing::trace_span;

/// Owns the world together with the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    builder: Builder,
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    max_frame_dt: Option<Duration>,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
    tick_events: Vec<Event>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an idle simulation governed by `rules`.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self {
            world: World::with_rules(rules),
            builder: Builder::new(builder::Config::new(
                rules.placement_spacing,
                rules.tower_cost,
            )),
            spawning: Spawning::new(spawning::Config::new(rules.waves)),
            movement: Movement::new(movement::Config::new(rules.arrival_radius)),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(tower_combat::Config::new(rules.bullet_speed)),
            projectiles: Projectiles::new(projectiles::Config::new(
                rules.play_area,
                rules.bullet_bounds_margin,
                rules.hit_radius,
            )),
            max_frame_dt: rules
                .max_frame_dt
                .and_then(|limit| Duration::try_from_secs_f32(limit).ok()),
            commands: Vec::new(),
            targets: Vec::new(),
            tick_events: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events produced since the last call to [`Simulation::drain_events`].
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Removes and yields the events produced so far.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, Event> {
        self.events.drain(..)
    }

    /// Clears the run outcome and begins play at `level`.
    pub fn start_at_level(&mut self, level: u32) {
        world::apply(
            &mut self.world,
            Command::StartAtLevel { level },
            &mut self.events,
        );
    }

    /// Forwards a player click to the builder.
    ///
    /// Clicks made while no level accepts towers are dropped silently.
    pub fn handle_click(&mut self, position: Point) {
        self.builder.handle(
            query::phase(&self.world),
            BuilderInput::new(Some(position)),
            &mut self.commands,
        );
        self.apply_commands_into_events();
    }

    /// Predicts whether a click at `position` would place a tower.
    #[must_use]
    pub fn preview(&self, position: Point) -> PlacementPreview {
        self.builder.preview(
            query::phase(&self.world),
            position,
            &query::tower_view(&self.world),
            query::gold(&self.world),
        )
    }

    /// Advances the simulation by one frame of `dt`.
    ///
    /// Frames are ignored before the first level starts and after the run
    /// ended, so a finished run stays frozen.
    pub fn update(&mut self, dt: Duration) {
        let phase = query::phase(&self.world);
        if !phase.advances() {
            return;
        }

        let dt = match self.max_frame_dt {
            Some(limit) => dt.min(limit),
            None => dt,
        };
        let span = trace_span!("tick", level = query::level(&self.world), ?phase);
        let _entered = span.enter();

        self.tick_events.clear();
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.tick_events);

        if phase == RunPhase::WaveActive {
            self.run_systems();
        }

        self.events.append(&mut self.tick_events);
    }

    fn run_systems(&mut self) {
        self.spawning.handle(
            query::phase(&self.world),
            &query::wave(&self.world),
            &mut self.commands,
        );
        self.apply_commands();

        self.movement.handle(
            &self.tick_events,
            query::phase(&self.world),
            &query::enemy_view(&self.world),
            query::path(&self.world),
            &mut self.commands,
        );
        self.apply_commands();

        self.targeting.handle(
            query::phase(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.combat.handle(
            query::phase(&self.world),
            &query::tower_view(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.apply_commands();

        self.projectiles.handle(
            &self.tick_events,
            query::phase(&self.world),
            &query::bullet_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.commands,
        );
        self.apply_commands();

        world::apply(&mut self.world, Command::ConcludeTick, &mut self.tick_events);
    }

    fn apply_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.tick_events);
        }
    }

    fn apply_commands_into_events(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}
