#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic waypoint paths derived from the level number.
//!
//! Six hand-drawn templates are cycled through as levels advance. Every six
//! levels the template set repeats with a small positional offset drawn from
//! a 3×3 grid, and even levels run the template mirrored so enemies enter
//! from the right-hand side. Templates deliberately begin and end outside the
//! normalized unit square so enemies walk in from off-screen.

use tower_mini_core::{PlayArea, Point};

/// Offset step between neighbouring variants in normalized units.
const VARIANT_STEP: f32 = 0.03;

/// Vertical bias shared by every variant in normalized units.
const VERTICAL_BIAS: f32 = 0.01;

const TEMPLATES: [&[(f32, f32)]; 6] = [
    &[
        (-0.03, 0.50),
        (0.12, 0.50),
        (0.32, 0.35),
        (0.55, 0.35),
        (0.72, 0.55),
        (1.05, 0.55),
    ],
    &[
        (-0.03, 0.45),
        (0.18, 0.45),
        (0.35, 0.32),
        (0.55, 0.32),
        (0.74, 0.45),
        (1.05, 0.45),
    ],
    &[
        (-0.03, 0.60),
        (0.18, 0.60),
        (0.32, 0.42),
        (0.50, 0.62),
        (0.70, 0.40),
        (1.05, 0.40),
    ],
    &[
        (-0.03, 0.30),
        (0.22, 0.55),
        (0.45, 0.55),
        (0.65, 0.35),
        (1.05, 0.35),
    ],
    &[
        (-0.03, 0.50),
        (0.40, 0.50),
        (0.55, 0.68),
        (0.78, 0.68),
        (1.05, 0.42),
    ],
    &[
        (-0.03, 0.62),
        (0.20, 0.42),
        (0.45, 0.42),
        (0.65, 0.58),
        (0.85, 0.58),
        (1.05, 0.58),
    ],
];

/// Number of distinct path templates.
pub const TEMPLATE_COUNT: usize = TEMPLATES.len();

/// Parameters selecting and transforming a template for one level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelLayout {
    /// Index of the template shape.
    pub template: usize,
    /// Variant counter; advances once every full template cycle.
    pub variant: u32,
    /// Whether x coordinates are mirrored before the offset is applied.
    pub mirrored: bool,
    /// Offset applied to every control point in normalized units.
    pub offset: Point,
}

impl LevelLayout {
    /// Maps the layout's control points into play-area coordinates.
    #[must_use]
    pub fn waypoints(&self, area: &PlayArea) -> Vec<Point> {
        template_points(self.template)
            .iter()
            .map(|&(x, y)| {
                let x = if self.mirrored { 1.0 - x } else { x };
                area.normalized_to_world(x + self.offset.x, y + self.offset.y)
            })
            .collect()
    }
}

/// Selects the template, variant and orientation of `level`.
///
/// Level numbers start at one; zero is treated as the first level.
#[must_use]
pub fn layout_for(level: u32) -> LevelLayout {
    let level = level.max(1);
    let index = level - 1;
    let variant = index / TEMPLATE_COUNT as u32;
    let column = (variant % 3) as f32;
    let row = ((variant / 3) % 3) as f32;

    LevelLayout {
        template: (index % TEMPLATE_COUNT as u32) as usize,
        variant,
        mirrored: level % 2 == 0,
        offset: Point::new(
            column * VARIANT_STEP - VARIANT_STEP,
            row * VARIANT_STEP - VERTICAL_BIAS,
        ),
    }
}

/// Normalized control points of the requested template.
#[must_use]
pub fn template_points(template: usize) -> &'static [(f32, f32)] {
    TEMPLATES[template % TEMPLATE_COUNT]
}

/// Builds the waypoint path enemies follow during `level`.
#[must_use]
pub fn build_path(level: u32, area: &PlayArea) -> Vec<Point> {
    layout_for(level).waypoints(area)
}

/// Positions of the free towers guarding a freshly generated path.
///
/// One tower sits halfway along the second segment and another near the end
/// of the route. Paths shorter than three waypoints get no towers.
#[must_use]
pub fn default_tower_sites(path: &[Point]) -> Vec<Point> {
    let len = path.len();
    if len < 3 {
        return Vec::new();
    }

    let tail = if len > 4 { len - 3 } else { len - 2 };
    vec![
        path[1].midpoint(path[2]),
        path[tail].midpoint(path[tail + 1]),
    ]
}
