//! Tunable rules governing economy, combat and wave composition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, Point};

/// Rectangular play area measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayArea {
    /// Width of the play area.
    pub width: f32,
    /// Height of the play area.
    pub height: f32,
    /// Inset applied when mapping normalized coordinates.
    pub margin: f32,
}

impl PlayArea {
    /// Creates a play area with the provided dimensions and inset.
    #[must_use]
    pub const fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    /// Maps a normalized coordinate onto the inset play area.
    ///
    /// `(0, 0)` lands on the top-left inset corner and `(1, 1)` on the
    /// bottom-right one. Values outside `[0, 1]` land outside the inset.
    #[must_use]
    pub fn normalized_to_world(&self, nx: f32, ny: f32) -> Point {
        Point::new(
            nx * (self.width - 2.0 * self.margin) + self.margin,
            ny * (self.height - 2.0 * self.margin) + self.margin,
        )
    }

    /// Reports whether `point` lies within the play area grown by `margin`.
    #[must_use]
    pub fn contains_with_margin(&self, point: Point, margin: f32) -> bool {
        point.x >= -margin
            && point.x <= self.width + margin
            && point.y >= -margin
            && point.y <= self.height + margin
    }
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 20.0)
    }
}

/// Speed and durability of an enemy archetype as a function of level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyScaling {
    /// Speed at level zero.
    pub base_speed: f32,
    /// Speed gained per level.
    pub speed_per_level: f32,
    /// Hit points at level zero.
    pub base_hit_points: f32,
    /// Hit points gained per level.
    pub hit_points_per_level: f32,
}

impl EnemyScaling {
    /// Creates a scaling profile from its components.
    #[must_use]
    pub const fn new(
        base_speed: f32,
        speed_per_level: f32,
        base_hit_points: f32,
        hit_points_per_level: f32,
    ) -> Self {
        Self {
            base_speed,
            speed_per_level,
            base_hit_points,
            hit_points_per_level,
        }
    }

    /// Travel speed in units per second at `level`.
    #[must_use]
    pub fn speed_at(&self, level: u32) -> f32 {
        self.base_speed + self.speed_per_level * level as f32
    }

    /// Starting hit points at `level`.
    #[must_use]
    pub fn hit_points_at(&self, level: u32) -> f32 {
        self.base_hit_points + self.hit_points_per_level * level as f32
    }
}

/// Composition and pacing of each level's wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveRules {
    /// Enemies spawned at level zero.
    pub base_size: u32,
    /// Additional enemies per level.
    pub growth_per_level: u32,
    /// Spawn interval at level zero in seconds.
    pub base_spawn_interval: f32,
    /// Interval reduction per level in seconds.
    pub spawn_interval_step: f32,
    /// Shortest permitted spawn interval in seconds.
    pub min_spawn_interval: f32,
    /// Every n-th spawn of a wave is a tank.
    pub tank_every: u32,
    /// Scaling applied to fast enemies.
    pub fast: EnemyScaling,
    /// Scaling applied to tank enemies.
    pub tank: EnemyScaling,
}

impl WaveRules {
    /// Number of enemies spawned during `level`.
    #[must_use]
    pub fn wave_size(&self, level: u32) -> u32 {
        self.base_size
            .saturating_add(self.growth_per_level.saturating_mul(level))
    }

    /// Seconds between consecutive spawns during `level`.
    #[must_use]
    pub fn spawn_interval(&self, level: u32) -> f32 {
        (self.base_spawn_interval - self.spawn_interval_step * level as f32)
            .max(self.min_spawn_interval)
    }

    /// Archetype of the spawn with the given zero-based ordinal.
    #[must_use]
    pub fn kind_for_ordinal(&self, ordinal: u32) -> EnemyKind {
        if self.tank_every > 0 && ordinal % self.tank_every == self.tank_every - 1 {
            EnemyKind::Tank
        } else {
            EnemyKind::Fast
        }
    }

    /// Scaling profile of the provided archetype.
    #[must_use]
    pub const fn scaling(&self, kind: EnemyKind) -> &EnemyScaling {
        match kind {
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
        }
    }
}

impl Default for WaveRules {
    fn default() -> Self {
        Self {
            base_size: 6,
            growth_per_level: 2,
            base_spawn_interval: 0.8,
            spawn_interval_step: 0.01,
            min_spawn_interval: 0.25,
            tank_every: 4,
            fast: EnemyScaling::new(120.0, 4.0, 30.0, 6.0),
            tank: EnemyScaling::new(70.0, 2.0, 80.0, 12.0),
        }
    }
}

/// Complete rule set consumed by the world and its systems.
///
/// Every field has a default, so a rules file only needs to name the values
/// it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Dimensions of the play area.
    pub play_area: PlayArea,
    /// Highest level of a run.
    pub max_level: u32,
    /// Gold available before the first level bonus.
    pub starting_gold: u32,
    /// Hit points of the base.
    pub base_hit_points: u32,
    /// Gold charged per player-placed tower.
    pub tower_cost: u32,
    /// Gold awarded per enemy killed by tower fire.
    pub kill_gold: u32,
    /// Gold awarded whenever a level begins.
    pub level_bonus: u32,
    /// Targeting radius of towers.
    pub tower_range: f32,
    /// Seconds between consecutive shots of a tower.
    pub fire_interval: f32,
    /// Minimum distance between two towers.
    pub placement_spacing: f32,
    /// Bullet travel speed in units per second.
    pub bullet_speed: f32,
    /// Damage dealt per bullet.
    pub bullet_damage: f32,
    /// Distance at which a bullet strikes an enemy.
    pub hit_radius: f32,
    /// Distance beyond the play area at which bullets expire.
    pub bullet_bounds_margin: f32,
    /// Distance at which an enemy counts as having reached a waypoint.
    pub arrival_radius: f32,
    /// Pause between a cleared wave and the next level in seconds.
    pub intermission_seconds: f32,
    /// Delay before the first spawn of a level in seconds.
    pub initial_spawn_delay: f32,
    /// Upper bound applied to frame deltas, if any.
    pub max_frame_dt: Option<f32>,
    /// Wave composition and pacing.
    pub waves: WaveRules,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            play_area: PlayArea::default(),
            max_level: 30,
            starting_gold: 100,
            base_hit_points: 10,
            tower_cost: 40,
            kill_gold: 5,
            level_bonus: 20,
            tower_range: 180.0,
            fire_interval: 0.6,
            placement_spacing: 40.0,
            bullet_speed: 320.0,
            bullet_damage: 18.0,
            hit_radius: 16.0,
            bullet_bounds_margin: 50.0,
            arrival_radius: 9.0,
            intermission_seconds: 3.0,
            initial_spawn_delay: 0.7,
            max_frame_dt: None,
            waves: WaveRules::default(),
        }
    }
}

impl Rules {
    /// Checks that the rules describe a playable game.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.max_level == 0 {
            return Err(RulesError::NoLevels);
        }
        if self.base_hit_points == 0 {
            return Err(RulesError::NoBaseHitPoints);
        }
        let area = &self.play_area;
        if !(area.width > 2.0 * area.margin && area.height > 2.0 * area.margin) {
            return Err(RulesError::DegeneratePlayArea {
                width: area.width,
                height: area.height,
                margin: area.margin,
            });
        }
        if self.waves.min_spawn_interval <= 0.0 {
            return Err(RulesError::NonPositive {
                field: "waves.min_spawn_interval",
            });
        }
        let positive = [
            ("tower_range", self.tower_range),
            ("fire_interval", self.fire_interval),
            ("bullet_speed", self.bullet_speed),
            ("bullet_damage", self.bullet_damage),
            ("hit_radius", self.hit_radius),
            ("arrival_radius", self.arrival_radius),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(RulesError::NonPositive { field });
        }
        if let Some(limit) = self.max_frame_dt {
            if !(limit > 0.0) {
                return Err(RulesError::NonPositive {
                    field: "max_frame_dt",
                });
            }
        }
        Ok(())
    }
}

/// Problems detected while validating [`Rules`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RulesError {
    /// A run needs at least one level.
    #[error("max_level must be at least 1")]
    NoLevels,
    /// The base must survive at least one breach.
    #[error("base_hit_points must be at least 1")]
    NoBaseHitPoints,
    /// The inset leaves no room for the path.
    #[error("play area {width}x{height} leaves no room inside a {margin} margin")]
    DegeneratePlayArea {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
        /// Configured inset.
        margin: f32,
    },
    /// A quantity that must be strictly positive is not.
    #[error("{field} must be strictly positive")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },
}
