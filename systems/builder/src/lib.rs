#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating player clicks into tower placement commands.
//!
//! The world stays the authority on whether a placement succeeds. The
//! builder only filters out clicks made while no level accepts towers and
//! offers a side-effect free preview adapters can use to draw a ghost tower
//! under the cursor.

use tower_mini_core::{Command, PlacementError, Point, RunPhase, TowerView};

/// Configuration parameters required to construct the builder system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    placement_spacing: f32,
    tower_cost: u32,
}

impl Config {
    /// Creates a configuration mirroring the world's placement rules.
    #[must_use]
    pub const fn new(placement_spacing: f32, tower_cost: u32) -> Self {
        Self {
            placement_spacing,
            tower_cost,
        }
    }
}

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Position the tower would occupy.
    pub position: Point,
    /// Reason the world would refuse the placement, if any.
    pub rejection: Option<PlacementError>,
}

impl PlacementPreview {
    /// Indicates whether the preview represents a valid placement location.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Play-area position of a primary click made on this frame.
    pub click: Option<Point>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(click: Option<Point>) -> Self {
        Self { click }
    }
}

/// System that turns clicks into placement commands while a run is underway.
#[derive(Debug, Clone)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits `Command::PlaceTower` for a click made during a level or an intermission.
    pub fn handle(&mut self, phase: RunPhase, input: BuilderInput, out: &mut Vec<Command>) {
        if !accepts_towers(phase) {
            return;
        }

        if let Some(position) = input.click {
            out.push(Command::PlaceTower { position });
        }
    }

    /// Predicts how the world would answer a placement at `position`.
    #[must_use]
    pub fn preview(
        &self,
        phase: RunPhase,
        position: Point,
        towers: &TowerView,
        gold: u32,
    ) -> PlacementPreview {
        let spacing_sq = self.config.placement_spacing * self.config.placement_spacing;
        let rejection = if !accepts_towers(phase) {
            Some(PlacementError::RunInactive)
        } else if towers
            .iter()
            .any(|tower| tower.position.distance_squared(position) < spacing_sq)
        {
            Some(PlacementError::TooClose)
        } else if gold < self.config.tower_cost {
            Some(PlacementError::InsufficientGold)
        } else {
            None
        };

        PlacementPreview {
            position,
            rejection,
        }
    }
}

fn accepts_towers(phase: RunPhase) -> bool {
    matches!(phase, RunPhase::WaveActive | RunPhase::Intermission)
}
