#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tower Mini.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Window pixels and world units coincide, so the scene is drawn without any
//! camera transform. Sprites are optional; every drawable has a primitive
//! fallback.

mod sprites;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    time::Duration,
};
use tower_mini_rendering::{
    palette, Color, FrameInput, LevelSelectGrid, PlacementIndicator, Presentation,
    RenderingBackend, Scene, SceneEnemy, SceneTower, Screen,
};
use tracing::{info, warn};

use self::sprites::{SpriteAtlas, SpriteKey};

const FIELD_FONT_SIZE: u16 = 28;
const MENU_FONT_SIZE: u16 = 32;
const PATH_THICKNESS: f32 = 2.0;
const RANGE_DOT_RADIUS: f32 = 1.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits while a level is on screen.
    quit_requested: bool,
    /// `Backspace` leaves the level for the level-select screen.
    return_to_menu: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            return_to_menu: is_key_pressed(KeyCode::Backspace),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    load_sprites: bool,
    sprite_manifest: PathBuf,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            load_sprites: true,
            sprite_manifest: SpriteAtlas::default_manifest_path(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load sprite assets.
    #[must_use]
    pub fn with_sprite_loading(mut self, enabled: bool) -> Self {
        self.load_sprites = enabled;
        self
    }

    /// Overrides the location of the sprite manifest.
    #[must_use]
    pub fn with_sprite_manifest(mut self, path: impl AsRef<Path>) -> Self {
        self.sprite_manifest = path.as_ref().to_path_buf();
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            load_sprites,
            sprite_manifest,
        } = self;

        let Presentation {
            window_title,
            window_size,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.x.round() as i32,
            window_height: window_size.y.round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let sprite_atlas = if load_sprites {
                load_sprite_atlas(&sprite_manifest)
            } else {
                None
            };

            let grid = LevelSelectGrid::standard();
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested && scene.screen == Screen::Playing {
                    break;
                }

                let window = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = frame_input_from_observations(
                    Vec2::new(cursor_x, cursor_y),
                    is_mouse_button_pressed(MouseButton::Left),
                    keyboard.return_to_menu,
                    window,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                match scene.screen {
                    Screen::LevelSelect => draw_level_select(&grid, frame_input.cursor),
                    Screen::Playing => {
                        draw_field(&scene, clear_color, window, sprite_atlas.as_ref());
                    }
                }

                if let Some(FpsMetrics {
                    per_second,
                    trailing_ten_seconds,
                }) = fps_counter.record_frame(frame_dt)
                {
                    if show_fps {
                        info!(
                            fps = per_second,
                            trailing_ten_seconds, "frame rate"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn load_sprite_atlas(manifest: &Path) -> Option<SpriteAtlas> {
    match SpriteAtlas::from_manifest_path(manifest) {
        Ok(atlas) => {
            info!(
                sprites = atlas.len(),
                background = atlas.contains(SpriteKey::Background),
                "sprite atlas ready"
            );
            Some(atlas)
        }
        Err(error) => {
            warn!("drawing primitives only: {error:#}");
            None
        }
    }
}

fn frame_input_from_observations(
    cursor: Vec2,
    left_click: bool,
    return_to_menu: bool,
    window: Vec2,
) -> FrameInput {
    let inside = cursor.x >= 0.0 && cursor.y >= 0.0 && cursor.x < window.x && cursor.y < window.y;
    let cursor = inside.then_some(cursor);

    FrameInput {
        cursor,
        click: if left_click { cursor } else { None },
        return_to_menu,
    }
}

fn draw_level_select(grid: &LevelSelectGrid, cursor: Option<Vec2>) {
    macroquad::window::clear_background(to_macroquad_color(palette::MENU));
    draw_text_at(
        LevelSelectGrid::TITLE,
        LevelSelectGrid::TITLE_POSITION,
        MENU_FONT_SIZE,
        palette::MENU_TITLE,
    );

    for (level, rect) in grid.buttons() {
        let hovered = cursor.is_some_and(|cursor| rect.contains_inclusive(cursor));
        let fill = if hovered {
            palette::BUTTON_FILL.lighten(0.15)
        } else {
            palette::BUTTON_FILL
        };
        macroquad::shapes::draw_rectangle(
            rect.origin.x,
            rect.origin.y,
            rect.size.x,
            rect.size.y,
            to_macroquad_color(fill),
        );
        macroquad::shapes::draw_rectangle_lines(
            rect.origin.x,
            rect.origin.y,
            rect.size.x,
            rect.size.y,
            1.0,
            to_macroquad_color(palette::BUTTON_OUTLINE),
        );

        let label = level.to_string();
        let dimensions = macroquad::text::measure_text(&label, None, MENU_FONT_SIZE, 1.0);
        let center = rect.center();
        draw_text_at(
            &label,
            Vec2::new(
                center.x - dimensions.width * 0.5,
                center.y - dimensions.height * 0.5,
            ),
            MENU_FONT_SIZE,
            palette::BUTTON_LABEL,
        );
    }

    draw_text_at(
        LevelSelectGrid::TIP,
        LevelSelectGrid::TIP_POSITION,
        MENU_FONT_SIZE,
        palette::MENU_TIP,
    );
}

fn draw_field(scene: &Scene, clear_color: Color, window: Vec2, sprite_atlas: Option<&SpriteAtlas>) {
    macroquad::window::clear_background(to_macroquad_color(clear_color));
    if let Some(atlas) = sprite_atlas {
        let _ = atlas.draw_background(window);
    }

    draw_path(&scene.path);
    for tower in &scene.towers {
        draw_tower(tower, sprite_atlas);
    }
    for enemy in &scene.enemies {
        draw_enemy(enemy, sprite_atlas);
    }
    draw_bullets(&scene.bullets);
    if let Some(preview) = scene.placement_preview {
        draw_placement_preview(preview);
    }

    draw_text_centered(&scene.hud, Scene::HUD_Y, window.x, palette::HUD);
    if let Some(banner) = &scene.banner {
        draw_text_centered(banner, Scene::BANNER_Y, window.x, palette::BANNER);
    }
}

fn draw_path(path: &[Vec2]) {
    let color = to_macroquad_color(palette::PATH);
    for segment in path.windows(2) {
        macroquad::shapes::draw_line(
            segment[0].x,
            segment[0].y,
            segment[1].x,
            segment[1].y,
            PATH_THICKNESS,
            color,
        );
    }
}

fn draw_tower(tower: &SceneTower, sprite_atlas: Option<&SpriteAtlas>) {
    let ring = to_macroquad_color(palette::RANGE_RING);
    for dot in tower.range_ring() {
        macroquad::shapes::draw_circle(dot.x, dot.y, RANGE_DOT_RADIUS, ring);
    }

    let drawn = sprite_atlas.is_some_and(|atlas| {
        atlas.draw_centered(SpriteKey::Tower, tower.position, SceneTower::SPRITE_SIZE)
    });
    if !drawn {
        macroquad::shapes::draw_circle(
            tower.position.x,
            tower.position.y,
            SceneTower::FALLBACK_RADIUS,
            to_macroquad_color(palette::TOWER),
        );
    }
}

fn draw_enemy(enemy: &SceneEnemy, sprite_atlas: Option<&SpriteAtlas>) {
    let drawn = sprite_atlas.is_some_and(|atlas| {
        atlas.draw_centered(
            SpriteKey::for_enemy(enemy.kind),
            enemy.position,
            enemy.sprite_size(),
        )
    });
    if !drawn {
        macroquad::shapes::draw_circle(
            enemy.position.x,
            enemy.position.y,
            enemy.fallback_radius(),
            to_macroquad_color(enemy.fallback_color()),
        );
    }
}

fn draw_bullets(bullets: &[Vec2]) {
    let color = to_macroquad_color(palette::BULLET);
    for bullet in bullets {
        let origin = bullet_origin(*bullet);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            Scene::BULLET_SIZE,
            Scene::BULLET_SIZE,
            color,
        );
    }
}

fn bullet_origin(center: Vec2) -> Vec2 {
    center - Vec2::splat(Scene::BULLET_SIZE * 0.5)
}

fn draw_placement_preview(preview: PlacementIndicator) {
    let color = if preview.placeable {
        palette::PREVIEW_OK
    } else {
        palette::PREVIEW_BLOCKED
    };
    macroquad::shapes::draw_circle(
        preview.position.x,
        preview.position.y,
        SceneTower::FALLBACK_RADIUS,
        to_macroquad_color(color),
    );
}

/// Draws `text` with its top-left corner at `position`.
fn draw_text_at(text: &str, position: Vec2, font_size: u16, color: Color) {
    let dimensions = macroquad::text::measure_text(text, None, font_size, 1.0);
    let _ = macroquad::text::draw_text(
        text,
        position.x,
        position.y + dimensions.offset_y,
        f32::from(font_size),
        to_macroquad_color(color),
    );
}

fn draw_text_centered(text: &str, top: f32, window_width: f32, color: Color) {
    if text.is_empty() {
        return;
    }
    let dimensions = macroquad::text::measure_text(text, None, FIELD_FONT_SIZE, 1.0);
    draw_text_at(
        text,
        Vec2::new(centered_left(dimensions.width, window_width), top),
        FIELD_FONT_SIZE,
        color,
    );
}

fn centered_left(text_width: f32, window_width: f32) -> f32 {
    (window_width - text_width) * 0.5
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
