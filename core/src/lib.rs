#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Mini engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems read immutable views ([`EnemyView`], [`TowerView`],
//! [`BulletView`], [`WaveSnapshot`]) and respond exclusively with new command
//! batches, so every tick is a deterministic function of the previous state
//! and the frame delta.

mod rules;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use rules::{EnemyScaling, PlayArea, Rules, RulesError, WaveRules};

/// Seconds a level start or level clear banner remains visible.
pub const LEVEL_BANNER_SECONDS: f32 = 2.0;

/// Seconds a placement confirmation or rejection banner remains visible.
pub const PLACEMENT_BANNER_SECONDS: f32 = 1.2;

/// Two-dimensional point or displacement expressed in play-area units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate, growing to the right.
    pub x: f32,
    /// Vertical coordinate, growing downwards.
    pub y: f32,
}

impl Point {
    /// Origin of the play area.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance between two points.
    #[must_use]
    pub fn distance_squared(self, other: Point) -> f32 {
        distance_squared(self, other)
    }

    /// Euclidean length of the point interpreted as a displacement.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Displacement leading from `self` to `other`.
    #[must_use]
    pub fn to(self, other: Point) -> Self {
        Self::new(other.x - self.x, other.y - self.y)
    }

    /// Returns the point scaled component-wise by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Returns the point translated by `delta`.
    #[must_use]
    pub fn translated(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Unit-length displacement sharing the direction of `self`.
    ///
    /// A zero-length displacement has no direction and is returned unchanged.
    #[must_use]
    pub fn normalized_or_zero(self) -> Self {
        let length = self.length();
        if length > 0.0 {
            Self::new(self.x / length, self.y / length)
        } else {
            self
        }
    }
}

/// Squared Euclidean distance between two points.
#[must_use]
pub fn distance_squared(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Enemy archetypes that walk the waypoint path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Quick, fragile enemy making up most of every wave.
    Fast,
    /// Slow, durable enemy spawned periodically within a wave.
    Tank,
}

/// Lifecycle phase of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// No level has been started yet.
    Idle,
    /// The current level's wave is spawning or still has enemies alive.
    WaveActive,
    /// Timed pause between a cleared wave and the next level.
    Intermission,
    /// The base was destroyed. Terminal.
    GameOver,
    /// The final level was cleared. Terminal.
    GameWin,
}

impl RunPhase {
    /// Reports whether the run reached an outcome and no longer simulates.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::GameWin)
    }

    /// Reports whether the simulation advances on ticks in this phase.
    #[must_use]
    pub const fn advances(self) -> bool {
        matches!(self, Self::WaveActive | Self::Intermission)
    }
}

/// Result of advancing a bullet for a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOutcome {
    /// The bullet is still travelling.
    InFlight,
    /// The bullet left the play area.
    Expired,
    /// The bullet struck the identified enemy.
    Hit {
        /// Enemy receiving the bullet's damage.
        enemy: EnemyId,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the run outcome and begins play at the provided level.
    StartAtLevel {
        /// One-based level to begin with.
        level: u32,
    },
    /// Requests that the player's tower be built at the provided position.
    PlaceTower {
        /// Play-area position of the new tower.
        position: Point,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the path at its first waypoint.
    SpawnEnemy {
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Travel speed in units per second.
        speed: f32,
        /// Starting hit points.
        hit_points: f32,
    },
    /// Records an enemy's progress along the path.
    MoveEnemy {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Position reached during the tick.
        position: Point,
        /// Index of the last waypoint the enemy reached.
        waypoint: usize,
    },
    /// Reports that an enemy walked past the final waypoint into the base.
    BreachBase {
        /// Enemy that reached the base.
        enemy: EnemyId,
    },
    /// Requests that a tower launch a bullet toward its target.
    FireBullet {
        /// Tower firing the bullet.
        tower: TowerId,
        /// Enemy selected as the target.
        target: EnemyId,
        /// Velocity of the bullet in units per second.
        velocity: Point,
    },
    /// Records where a bullet travelled during the tick and what it struck.
    ResolveBullet {
        /// Bullet that advanced.
        bullet: BulletId,
        /// Position reached during the tick.
        position: Point,
        /// Whether the bullet keeps flying, expired or hit an enemy.
        outcome: BulletOutcome,
    },
    /// Compacts dead entities and evaluates whether the wave was cleared.
    ConcludeTick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level began with a fresh path and wave.
    LevelStarted {
        /// Level that began.
        level: u32,
        /// Number of enemies the wave will spawn.
        to_spawn: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy reached the base.
    BaseDamaged {
        /// Enemy that reached the base.
        enemy: EnemyId,
        /// Base hit points left after the breach.
        remaining: u32,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Position of the tower.
        position: Point,
        /// Gold paid for the tower. Default defenses are free.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Position provided in the placement request.
        position: Point,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower launched a bullet.
    BulletFired {
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the tower aimed at.
        target: EnemyId,
    },
    /// Reports that a bullet left the play area without hitting anything.
    BulletExpired {
        /// Bullet that expired.
        bullet: BulletId,
    },
    /// Reports that a bullet damaged an enemy.
    EnemyHit {
        /// Bullet that struck.
        bullet: BulletId,
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Hit points the enemy has left.
        remaining_hit_points: f32,
    },
    /// Reports that an enemy was destroyed by tower fire.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Gold awarded for the kill.
        reward: u32,
    },
    /// Announces that every enemy of the level's wave was dealt with.
    WaveCleared {
        /// Level whose wave was cleared.
        level: u32,
    },
    /// Announces that the base was destroyed.
    GameOver {
        /// Level during which the base fell.
        level: u32,
    },
    /// Announces that the final level was cleared.
    GameWon,
    /// Reports that a new banner replaced the previous one.
    BannerShown {
        /// Message carried by the banner.
        message: BannerMessage,
    },
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// Another tower stands within the minimum spacing.
    #[error("Too close to another tower")]
    TooClose,
    /// The gold balance does not cover the tower cost.
    #[error("Not enough gold")]
    InsufficientGold,
    /// No level is in progress or the run already ended.
    #[error("no run is accepting tower placements")]
    RunInactive,
}

/// Transient status messages surfaced to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BannerMessage {
    /// A level just began.
    LevelBegins {
        /// Level that began.
        level: u32,
    },
    /// A level's wave was cleared.
    LevelCleared {
        /// Level that was cleared.
        level: u32,
    },
    /// A tower was bought.
    TowerPlaced {
        /// Gold paid for the tower.
        cost: u32,
    },
    /// A tower purchase was refused.
    PlacementRejected {
        /// Reason the purchase was refused.
        reason: PlacementError,
    },
    /// The base fell.
    GameOver,
    /// Every level was cleared.
    Victory,
}

impl BannerMessage {
    /// Seconds the message stays visible, or `None` when it never expires.
    #[must_use]
    pub const fn display_seconds(self) -> Option<f32> {
        match self {
            Self::LevelBegins { .. } | Self::LevelCleared { .. } => Some(LEVEL_BANNER_SECONDS),
            Self::TowerPlaced { .. } | Self::PlacementRejected { .. } => {
                Some(PLACEMENT_BANNER_SECONDS)
            }
            Self::GameOver | Self::Victory => None,
        }
    }
}

impl fmt::Display for BannerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelBegins { level } => write!(f, "Level {level} begins!"),
            Self::LevelCleared { level } => write!(f, "Level {level} cleared!"),
            Self::TowerPlaced { cost } => write!(f, "Tower placed (-{cost})"),
            Self::PlacementRejected { reason } => write!(f, "{reason}"),
            Self::GameOver => write!(f, "Game Over"),
            Self::Victory => write!(f, "All levels cleared! You win!"),
        }
    }
}

/// Banner currently shown to the player together with its expiry timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Banner {
    message: BannerMessage,
    remaining: Option<f32>,
}

impl Banner {
    /// Creates a banner that expires after the message's display time.
    #[must_use]
    pub const fn new(message: BannerMessage) -> Self {
        Self {
            message,
            remaining: message.display_seconds(),
        }
    }

    /// Message carried by the banner.
    #[must_use]
    pub const fn message(&self) -> BannerMessage {
        self.message
    }

    /// Seconds left before the banner hides, or `None` for persistent banners.
    #[must_use]
    pub const fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Reports whether the banner should still be displayed.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.remaining.map_or(true, |remaining| remaining > 0.0)
    }

    /// Counts the expiry timer down by `seconds`.
    pub fn elapse(&mut self, seconds: f32) {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= seconds;
        }
    }
}

/// Immutable representation of a single live enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Current position in play-area units.
    pub position: Point,
    /// Index of the last waypoint the enemy reached.
    pub waypoint: usize,
    /// Travel speed in units per second.
    pub speed: f32,
    /// Hit points left.
    pub hit_points: f32,
}

/// Read-only snapshot describing all live enemies in spawn order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no live enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Position of the tower.
    pub position: Point,
    /// Targeting radius in play-area units.
    pub range: f32,
    /// Seconds left before the tower may fire. Ready once `<= 0`.
    pub cooldown: f32,
}

impl TowerSnapshot {
    /// Reports whether the tower may fire this tick.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Read-only snapshot describing all towers in placement order.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no towers were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single live bullet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier allocated to the bullet by the world.
    pub id: BulletId,
    /// Current position.
    pub position: Point,
    /// Velocity in units per second.
    pub velocity: Point,
    /// Damage dealt on impact.
    pub damage: f32,
}

/// Read-only snapshot describing all live bullets in firing order.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured bullet snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Number of bullets captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no bullets were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Enemy a tower locked onto for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Position of the tower.
    pub tower_position: Point,
    /// Position of the enemy when it was selected.
    pub enemy_position: Point,
}

/// Progress of the current level's wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSnapshot {
    /// Level the wave belongs to.
    pub level: u32,
    /// Enemies spawned so far.
    pub spawned: u32,
    /// Enemies the wave spawns in total.
    pub to_spawn: u32,
    /// Seconds until the next spawn. Due once `<= 0`.
    pub spawn_timer: f32,
}

impl WaveSnapshot {
    /// Reports whether the wave still has enemies left to spawn.
    #[must_use]
    pub const fn has_pending_spawns(&self) -> bool {
        self.spawned < self.to_spawn
    }
}
