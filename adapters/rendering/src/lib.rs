#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tower Mini adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{fmt, time::Duration};
use tower_mini_core::EnemyKind;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fixed colors used by every backend.
pub mod palette {
    use super::Color;

    /// Background of the playing field when no backdrop sprite is available.
    pub const FIELD: Color = Color::from_rgb_u8(28, 43, 58);
    /// Background of the level-select screen.
    pub const MENU: Color = Color::from_rgb_u8(32, 46, 68);
    /// Polyline joining the waypoints.
    pub const PATH: Color = Color::from_rgba_u8(200, 220, 255, 235);
    /// Fallback body of a fast enemy.
    pub const FAST_ENEMY: Color = Color::from_rgb_u8(240, 90, 90);
    /// Fallback body of a tank enemy.
    pub const TANK_ENEMY: Color = Color::from_rgb_u8(255, 156, 60);
    /// Fallback body of a tower.
    pub const TOWER: Color = Color::from_rgb_u8(90, 180, 255);
    /// Dots outlining a tower's range.
    pub const RANGE_RING: Color = Color::from_rgba_u8(60, 100, 140, 70);
    /// Bullets in flight.
    pub const BULLET: Color = Color::from_rgb_u8(255, 230, 80);
    /// Status line at the top of the field.
    pub const HUD: Color = Color::from_rgb_u8(230, 230, 230);
    /// Transient and persistent banner text.
    pub const BANNER: Color = Color::from_rgb_u8(255, 230, 100);
    /// Fill of a level-select button.
    pub const BUTTON_FILL: Color = Color::from_rgb_u8(70, 90, 120);
    /// Outline of a level-select button.
    pub const BUTTON_OUTLINE: Color = Color::from_rgb_u8(130, 160, 200);
    /// Number printed on a level-select button.
    pub const BUTTON_LABEL: Color = Color::from_rgb_u8(255, 255, 255);
    /// Level-select title.
    pub const MENU_TITLE: Color = Color::from_rgb_u8(240, 240, 240);
    /// Level-select footer hint.
    pub const MENU_TIP: Color = Color::from_rgb_u8(200, 200, 200);
    /// Placement preview over a free, affordable spot.
    pub const PREVIEW_OK: Color = Color::from_rgba_u8(90, 180, 255, 90);
    /// Placement preview over a spot the world would reject.
    pub const PREVIEW_BLOCKED: Color = Color::from_rgba_u8(240, 90, 90, 90);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position in window pixels, when the cursor is over the window.
    pub cursor: Option<Vec2>,
    /// Position of a left click registered on this frame.
    pub click: Option<Vec2>,
    /// Whether the player asked to leave the level for the level-select screen.
    pub return_to_menu: bool,
}

/// Screen currently shown by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    /// Grid of level buttons shown before a run.
    #[default]
    LevelSelect,
    /// Live playing field.
    Playing,
}

/// Enemy placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Centre of the enemy in window pixels.
    pub position: Vec2,
    /// Kind deciding the sprite or fallback shape.
    pub kind: EnemyKind,
}

impl SceneEnemy {
    /// Creates a new scene enemy descriptor.
    #[must_use]
    pub const fn new(position: Vec2, kind: EnemyKind) -> Self {
        Self { position, kind }
    }

    /// Radius of the fallback circle drawn when no sprite is loaded.
    #[must_use]
    pub const fn fallback_radius(&self) -> f32 {
        match self.kind {
            EnemyKind::Fast => 10.0,
            EnemyKind::Tank => 12.0,
        }
    }

    /// Color of the fallback circle drawn when no sprite is loaded.
    #[must_use]
    pub const fn fallback_color(&self) -> Color {
        match self.kind {
            EnemyKind::Fast => palette::FAST_ENEMY,
            EnemyKind::Tank => palette::TANK_ENEMY,
        }
    }

    /// Edge length of the square sprite drawn for this enemy.
    #[must_use]
    pub const fn sprite_size(&self) -> f32 {
        match self.kind {
            EnemyKind::Fast => 32.0,
            EnemyKind::Tank => 40.0,
        }
    }
}

/// Tower placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Centre of the tower in window pixels.
    pub position: Vec2,
    /// Radius of the range ring drawn around the tower.
    pub range: f32,
}

impl SceneTower {
    /// Radius of the fallback circle drawn when no sprite is loaded.
    pub const FALLBACK_RADIUS: f32 = 14.0;
    /// Edge length of the square tower sprite.
    pub const SPRITE_SIZE: f32 = 48.0;

    /// Creates a new scene tower descriptor.
    #[must_use]
    pub const fn new(position: Vec2, range: f32) -> Self {
        Self { position, range }
    }

    /// Points of the dotted range ring, one every four degrees.
    pub fn range_ring(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..360u16).step_by(4).map(move |degrees| {
            let radians = f32::from(degrees).to_radians();
            self.position + Vec2::new(radians.cos(), radians.sin()) * self.range
        })
    }
}

/// Ghost drawn under the cursor to predict a placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementIndicator {
    /// Cursor position in window pixels.
    pub position: Vec2,
    /// Whether a click here would place a tower.
    pub placeable: bool,
}

/// Declarative description of everything a backend draws in one frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Screen the host is showing.
    pub screen: Screen,
    /// Waypoints of the current level.
    pub path: Vec<Vec2>,
    /// Live enemies in spawn order.
    pub enemies: Vec<SceneEnemy>,
    /// Towers in placement order.
    pub towers: Vec<SceneTower>,
    /// Bullets in flight.
    pub bullets: Vec<Vec2>,
    /// Placement preview under the cursor, if any.
    pub placement_preview: Option<PlacementIndicator>,
    /// Status line drawn at the top of the field.
    pub hud: String,
    /// Banner text drawn across the middle of the field.
    pub banner: Option<String>,
}

impl Scene {
    /// Side length of a bullet square.
    pub const BULLET_SIZE: f32 = 4.0;
    /// Vertical position of the status line.
    pub const HUD_Y: f32 = 10.0;
    /// Vertical position of the banner.
    pub const BANNER_Y: f32 = 320.0;

    /// Creates an empty scene showing the level-select screen.
    #[must_use]
    pub fn level_select() -> Self {
        Self::default()
    }

    /// Drops every gameplay element and switches to the level-select screen.
    pub fn show_level_select(&mut self) {
        *self = Self::level_select();
    }
}

/// Values printed in the status line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudStatus {
    /// Remaining base hit points.
    pub hit_points: u32,
    /// Current level.
    pub level: u32,
    /// Final level of the run.
    pub max_level: u32,
    /// Gold available for towers.
    pub gold: u32,
    /// Seconds left before the next level while resting between waves.
    pub next_level_in: Option<f32>,
}

impl fmt::Display for HudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.next_level_in {
            Some(seconds) => write!(
                f,
                "HP: {}   Level: {}/{} (rest)   Gold: {}   Next level in {:.1}s",
                self.hit_points, self.level, self.max_level, self.gold, seconds
            ),
            None => write!(
                f,
                "HP: {}   Level: {}/{}   Gold: {}",
                self.hit_points, self.level, self.max_level, self.gold
            ),
        }
    }
}

/// Axis-aligned rectangle in window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains_inclusive(&self, point: Vec2) -> bool {
        let end = self.origin + self.size;
        point.x >= self.origin.x && point.x <= end.x && point.y >= self.origin.y && point.y <= end.y
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }
}

/// Layout of the level-select buttons.
///
/// Buttons are numbered row-major from one. Hit-testing includes the
/// right and bottom edges, so a click on a shared edge of two buttons
/// selects the one scanned first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSelectGrid {
    columns: u32,
    rows: u32,
    origin: Vec2,
    button_size: Vec2,
    gap: f32,
}

impl LevelSelectGrid {
    /// Title printed above the grid.
    pub const TITLE: &'static str = "Select Level (1-30)";
    /// Position of the title.
    pub const TITLE_POSITION: Vec2 = Vec2::new(470.0, 40.0);
    /// Hint printed below the grid.
    pub const TIP: &'static str = "Tip: BACKSPACE to return menu during game";
    /// Position of the hint.
    pub const TIP_POSITION: Vec2 = Vec2::new(320.0, 650.0);

    /// The six by five grid of thirty level buttons.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            columns: 6,
            rows: 5,
            origin: Vec2::new(80.0, 120.0),
            button_size: Vec2::new(160.0, 80.0),
            gap: 20.0,
        }
    }

    /// Number of buttons in the grid.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.columns * self.rows
    }

    /// Whether the grid holds no buttons. Always false for a constructed grid.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rectangle of the button for `level`, if the grid has one.
    #[must_use]
    pub fn button(&self, level: u32) -> Option<Rect> {
        if level == 0 || level > self.len() {
            return None;
        }
        let index = level - 1;
        let column = (index % self.columns) as f32;
        let row = (index / self.columns) as f32;
        let stride = self.button_size + Vec2::splat(self.gap);
        Some(Rect {
            origin: self.origin + Vec2::new(column * stride.x, row * stride.y),
            size: self.button_size,
        })
    }

    /// Buttons in row-major order, paired with their level number.
    pub fn buttons(&self) -> impl Iterator<Item = (u32, Rect)> + '_ {
        (1..=self.len()).filter_map(move |level| self.button(level).map(|rect| (level, rect)))
    }

    /// Level whose button contains `point`.
    #[must_use]
    pub fn button_at(&self, point: Vec2) -> Option<u32> {
        self.buttons()
            .find(|(_, rect)| rect.contains_inclusive(point))
            .map(|(level, _)| level)
    }
}

impl Default for LevelSelectGrid {
    fn default() -> Self {
        Self::standard()
    }
}

/// Describes the data required to present a scene to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Window size in pixels.
    pub window_size: Vec2,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, window_size: Vec2, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            window_size,
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tower Mini scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}
