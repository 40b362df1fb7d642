//! Level-select and playing screens wired to the simulation.

use std::time::Duration;

use glam::Vec2;
use tower_mini_core::{Event, PlacementError, Point};
use tower_mini_rendering::{
    FrameInput, HudStatus, LevelSelectGrid, PlacementIndicator, Scene, SceneEnemy, SceneTower,
    Screen,
};
use tower_mini_system_simulation::Simulation;
use tower_mini_world::query;
use tracing::{debug, info};

/// Drives the simulation from window input and mirrors it into the scene.
#[derive(Debug)]
pub(crate) struct Host {
    simulation: Simulation,
    grid: LevelSelectGrid,
    screen: Screen,
}

impl Host {
    pub(crate) fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            grid: LevelSelectGrid::standard(),
            screen: Screen::LevelSelect,
        }
    }

    /// Leaves the level-select screen and begins play at `level`.
    pub(crate) fn start(&mut self, level: u32) {
        info!(level, "level selected");
        self.simulation.start_at_level(level);
        self.screen = Screen::Playing;
    }

    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        match self.screen {
            Screen::LevelSelect => {
                if let Some(level) = input.click.and_then(|click| self.grid.button_at(click)) {
                    self.start(level);
                }
            }
            Screen::Playing => {
                if input.return_to_menu {
                    debug!("returning to level select");
                    self.screen = Screen::LevelSelect;
                } else {
                    if let Some(click) = input.click {
                        self.simulation.handle_click(to_point(click));
                    }
                    self.simulation.update(dt);
                }
            }
        }

        for event in self.simulation.drain_events() {
            match event {
                Event::WaveCleared { level } => debug!(level, "wave cleared"),
                Event::GameOver { level } => debug!(level, "base destroyed"),
                Event::GameWon => debug!("run won"),
                _ => {}
            }
        }
        match self.screen {
            Screen::LevelSelect => scene.show_level_select(),
            Screen::Playing => populate_scene(scene, &self.simulation, input.cursor),
        }
    }
}

/// Rebuilds the playing-field scene from the current world state.
pub(crate) fn populate_scene(scene: &mut Scene, simulation: &Simulation, cursor: Option<Vec2>) {
    let world = simulation.world();
    let rules = query::rules(world);

    scene.screen = Screen::Playing;

    scene.path.clear();
    scene
        .path
        .extend(query::path(world).iter().copied().map(to_vec2));

    scene.enemies.clear();
    scene.enemies.extend(
        query::enemy_view(world)
            .iter()
            .map(|enemy| SceneEnemy::new(to_vec2(enemy.position), enemy.kind)),
    );

    scene.towers.clear();
    scene.towers.extend(
        query::tower_view(world)
            .iter()
            .map(|tower| SceneTower::new(to_vec2(tower.position), tower.range)),
    );

    scene.bullets.clear();
    scene.bullets.extend(
        query::bullet_view(world)
            .iter()
            .map(|bullet| to_vec2(bullet.position)),
    );

    scene.placement_preview = cursor.and_then(|cursor| {
        let preview = simulation.preview(to_point(cursor));
        (preview.rejection != Some(PlacementError::RunInactive)).then_some(PlacementIndicator {
            position: cursor,
            placeable: preview.placeable(),
        })
    });

    scene.hud = HudStatus {
        hit_points: query::base_hit_points(world),
        level: query::level(world),
        max_level: rules.max_level,
        gold: query::gold(world),
        next_level_in: query::intermission_remaining(world),
    }
    .to_string();

    scene.banner = query::banner(world)
        .filter(|banner| banner.is_visible())
        .map(|banner| banner.message().to_string());
}

fn to_point(position: Vec2) -> Point {
    Point::new(position.x, position.y)
}

fn to_vec2(point: Point) -> Vec2 {
    Vec2::new(point.x, point.y)
}
