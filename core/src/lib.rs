#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod geometry;

pub use geometry::{Facing, TILE_SIZE};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Dungeon Crawl.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with the provided definition.
    ConfigureLevel {
        /// Static level data to load into the world.
        level: LevelDefinition,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Requests that the player move by the provided pixel displacement.
    MovePlayer {
        /// Displacement to apply to the player's position this frame.
        displacement: Vec2,
        /// Cardinal facing derived from the movement input.
        facing: Facing,
    },
    /// Requests that an enemy commit a movement and steering update.
    MoveEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Proposed pixel-space position after the move.
        to: Vec2,
        /// Unit heading the enemy is steering along.
        direction: Vec2,
        /// Rotation in radians the enemy should present.
        rotation: f32,
        /// Behavior state the enemy transitions to alongside the move.
        state: AiState,
    },
    /// Updates an enemy's behavior state without moving it.
    SetEnemyState {
        /// Identifier of the enemy changing state.
        enemy: EnemyId,
        /// Behavior state the enemy transitions to.
        state: AiState,
        /// Last position the enemy observed the player at, if any.
        last_seen: Option<Vec2>,
    },
    /// Assigns a lazily generated patrol route to an enemy.
    AssignPatrolRoute {
        /// Identifier of the enemy receiving the route.
        enemy: EnemyId,
        /// Ordered pixel-space waypoints composing the route.
        waypoints: Vec<Vec2>,
    },
    /// Advances an enemy to the next waypoint of its patrol route.
    AdvancePatrol {
        /// Identifier of the patrolling enemy.
        enemy: EnemyId,
    },
    /// Requests that a spawner emit a new enemy into the dungeon.
    SpawnEnemy {
        /// Grid cell of the spawner responsible for the enemy.
        spawner: TileCoord,
        /// Kind of enemy the spawner produces.
        kind: EnemyKind,
    },
    /// Applies melee damage to the spawner occupying the provided cell.
    DamageSpawner {
        /// Grid cell hosting the spawner.
        cell: TileCoord,
        /// Health points to deplete.
        amount: u32,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Identifier of the enemy taking damage.
        enemy: EnemyId,
        /// Health points to deplete.
        amount: u32,
    },
    /// Removes an enemy without awarding score (kamikaze self-destruct).
    DespawnEnemy {
        /// Identifier of the enemy to remove.
        enemy: EnemyId,
    },
    /// Applies damage to the player.
    DamagePlayer {
        /// Health points to deplete.
        amount: u32,
        /// Enemy responsible for the damage, if any.
        source: Option<EnemyId>,
    },
    /// Consumes the pickup occupying the provided cell.
    CollectPickup {
        /// Grid cell hosting the pickup.
        cell: TileCoord,
    },
    /// Opens the door occupying the provided cell, consuming a held key.
    OpenDoor {
        /// Grid cell hosting the door.
        cell: TileCoord,
    },
    /// Unlocks the level exit once the kill quota has been met.
    UnlockExit,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces that a level finished loading.
    LevelConfigured {
        /// Identifier of the room described by the level.
        room: String,
        /// Number of tile columns in the loaded grid.
        columns: u32,
        /// Number of tile rows in the loaded grid.
        rows: u32,
        /// Enemy kills required to unlock the exit.
        kill_quota: u32,
    },
    /// Confirms that the player moved to a new position.
    PlayerMoved {
        /// Position the player occupied before the move.
        from: Vec2,
        /// Position the player occupies after the move.
        to: Vec2,
        /// Facing the player presents after the move.
        facing: Facing,
    },
    /// Reports that the player took damage.
    PlayerDamaged {
        /// Health points depleted by the hit.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
        /// Enemy responsible for the damage, if any.
        source: Option<EnemyId>,
    },
    /// Reports that the player's health was restored.
    PlayerHealed {
        /// Health points restored.
        amount: u32,
        /// Health total after healing.
        total: Health,
    },
    /// Announces that the player died. Emitted exactly once per life.
    PlayerDied,
    /// Reports that the player's score increased.
    ScoreAwarded {
        /// Points awarded by the triggering action.
        amount: u32,
        /// Score total after the award.
        total: u32,
    },
    /// Confirms that a spawner produced a new enemy.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// Pixel-space position the enemy was placed at.
        position: Vec2,
        /// Grid cell of the spawner that produced the enemy.
        spawner: TileCoord,
    },
    /// Confirms that an enemy committed a move.
    EnemyMoved {
        /// Identifier of the enemy that moved.
        enemy: EnemyId,
        /// Position the enemy occupied before the move.
        from: Vec2,
        /// Position the enemy occupies after the move.
        to: Vec2,
    },
    /// Announces that an enemy transitioned to a new behavior state.
    EnemyStateChanged {
        /// Identifier of the enemy that changed state.
        enemy: EnemyId,
        /// Behavior state the enemy is now in.
        state: AiState,
    },
    /// Reports that an enemy took damage and survived.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Announces that an enemy was removed after its health reached zero.
    EnemyDied {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
        /// Kind of the removed enemy.
        kind: EnemyKind,
        /// Position the enemy occupied when it died.
        position: Vec2,
    },
    /// Announces that an enemy was removed without dying (self-destruct).
    EnemyDespawned {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Reports that a spawner took damage and survived.
    SpawnerDamaged {
        /// Grid cell hosting the spawner.
        cell: TileCoord,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Announces that a spawner was destroyed and its cell rewritten.
    SpawnerDestroyed {
        /// Grid cell that hosted the spawner.
        cell: TileCoord,
    },
    /// Reports that a spawn request was rejected by the world.
    SpawnRejected {
        /// Grid cell of the spawner named in the request.
        cell: TileCoord,
        /// Kind of enemy requested.
        kind: EnemyKind,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a pickup was consumed by the player.
    PickupCollected {
        /// Grid cell that hosted the pickup.
        cell: TileCoord,
        /// Kind of pickup that was consumed.
        kind: PickupKind,
    },
    /// Confirms that a door was opened, consuming a key.
    DoorOpened {
        /// Grid cell that hosted the door.
        cell: TileCoord,
    },
    /// Reports that a door interaction was rejected.
    DoorRejected {
        /// Grid cell named in the request.
        cell: TileCoord,
        /// Specific reason the door stayed closed.
        reason: DoorError,
    },
    /// Announces that the level exit became passable.
    ExitUnlocked,
    /// Announces that the player stepped onto an unlocked exit tile.
    ExitReached,
    /// Fire-and-forget presentation request for downstream consumers.
    EffectRequested {
        /// Effect the rendering or audio layer should play.
        effect: Effect,
    },
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

/// Location of a single grid tile expressed as column and row indices.
///
/// Indices are signed so that out-of-range queries (including negative ones
/// produced by ray stepping) remain representable; the grid model treats any
/// out-of-range tile as blocking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Returns the tile offset by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column + columns,
            row: self.row + rows,
        }
    }
}

/// Health total carried by the player, enemies and spawners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health total.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the health total has been depleted.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Depletes the health total, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Restores health up to the provided maximum.
    #[must_use]
    pub fn saturating_add_clamped(self, amount: u32, max: Health) -> Self {
        Self(self.0.saturating_add(amount).min(max.0))
    }
}

/// Character codes describing a single grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCode {
    /// Solid wall that blocks movement and line of sight.
    Wall,
    /// Open floor.
    Floor,
    /// Closed door; becomes floor once opened with a key.
    Door,
    /// Level exit; passable only once the kill quota unlocks it.
    Exit,
    /// Spawner that periodically produces ghosts.
    GhostSpawner,
    /// Spawner that periodically produces grunts.
    GruntSpawner,
    /// Key pickup consumed by doors.
    Key,
    /// Food pickup that restores player health.
    Food,
    /// Chest pickup that awards score and a temporary attack buff.
    Chest,
    /// Reserved decorative code with no simulation behavior.
    Decor(char),
}

impl TileCode {
    /// Parses a tile code from its character representation.
    ///
    /// Unrecognised characters map to [`TileCode::Decor`]; the original level
    /// format reserves them for decoration.
    #[must_use]
    pub const fn from_char(code: char) -> Self {
        match code {
            '#' => Self::Wall,
            '.' | ' ' => Self::Floor,
            'D' => Self::Door,
            'E' => Self::Exit,
            'B' => Self::GhostSpawner,
            'G' => Self::GruntSpawner,
            'K' => Self::Key,
            'F' => Self::Food,
            'C' => Self::Chest,
            other => Self::Decor(other),
        }
    }

    /// Character representation of the tile code.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Floor => '.',
            Self::Door => 'D',
            Self::Exit => 'E',
            Self::GhostSpawner => 'B',
            Self::GruntSpawner => 'G',
            Self::Key => 'K',
            Self::Food => 'F',
            Self::Chest => 'C',
            Self::Decor(other) => other,
        }
    }

    /// Reports whether the tile hosts a spawner.
    #[must_use]
    pub const fn is_spawner(self) -> bool {
        matches!(self, Self::GhostSpawner | Self::GruntSpawner)
    }

    /// Kind of enemy produced by the tile, when it hosts a spawner.
    #[must_use]
    pub const fn spawned_kind(self) -> Option<EnemyKind> {
        match self {
            Self::GhostSpawner => Some(EnemyKind::Ghost),
            Self::GruntSpawner => Some(EnemyKind::Grunt),
            _ => None,
        }
    }

    /// Kind of pickup hosted by the tile, if any.
    #[must_use]
    pub const fn pickup_kind(self) -> Option<PickupKind> {
        match self {
            Self::Key => Some(PickupKind::Key),
            Self::Food => Some(PickupKind::Food),
            Self::Chest => Some(PickupKind::Chest),
            _ => None,
        }
    }
}

/// Kinds of pickups the player can consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Key consumed when opening a door.
    Key,
    /// Food that restores health.
    Food,
    /// Chest that awards score and a temporary attack buff.
    Chest,
}

/// Variant tag identifying an enemy's kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Phasing enemy that ignores walls for movement and line of sight.
    Ghost,
    /// Kamikaze enemy that self-destructs on contact with the player.
    Grunt,
    /// Common melee enemy.
    Goblin,
    /// Heavy melee enemy that guards its post.
    Orc,
    /// Patrolling enemy.
    Skeleton,
    /// Fast aggressive enemy.
    Shadow,
    /// Patrolling enemy with a short reach.
    Spider,
    /// Stat-driven enemy whose special casing is purely presentational.
    Mimic,
    /// Slow boss-grade enemy.
    BigMonster,
}

/// Base statistics shared by all enemies of a kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindStats {
    /// Health the enemy spawns with.
    pub max_health: Health,
    /// Movement speed measured in tiles per second.
    pub speed: f32,
    /// Damage dealt by a successful attack.
    pub damage: u32,
    /// Bounding-box edge length in pixels.
    pub size: f32,
    /// Distance in pixels at which the enemy notices the player.
    pub sight_range: f32,
    /// Distance in pixels at which the enemy can attack.
    pub attack_range: f32,
    /// Score awarded to the player for the kill.
    pub score: u32,
}

impl EnemyKind {
    /// Base statistics for the kind.
    #[must_use]
    pub const fn stats(self) -> KindStats {
        match self {
            Self::Ghost => KindStats {
                max_health: Health::new(2),
                speed: 2.0,
                damage: 1,
                size: 28.0,
                sight_range: 6.0 * TILE_SIZE,
                attack_range: 0.8 * TILE_SIZE,
                score: 10,
            },
            Self::Grunt => KindStats {
                max_health: Health::new(1),
                speed: 3.0,
                damage: 1,
                size: 24.0,
                sight_range: 8.0 * TILE_SIZE,
                attack_range: 0.6 * TILE_SIZE,
                score: 5,
            },
            Self::Goblin => KindStats {
                max_health: Health::new(3),
                speed: 2.5,
                damage: 1,
                size: 30.0,
                sight_range: 5.0 * TILE_SIZE,
                attack_range: 1.0 * TILE_SIZE,
                score: 15,
            },
            Self::Orc => KindStats {
                max_health: Health::new(5),
                speed: 1.8,
                damage: 2,
                size: 32.0,
                sight_range: 5.0 * TILE_SIZE,
                attack_range: 1.1 * TILE_SIZE,
                score: 25,
            },
            Self::Skeleton => KindStats {
                max_health: Health::new(3),
                speed: 2.2,
                damage: 1,
                size: 30.0,
                sight_range: 6.0 * TILE_SIZE,
                attack_range: 1.0 * TILE_SIZE,
                score: 20,
            },
            Self::Shadow => KindStats {
                max_health: Health::new(2),
                speed: 3.2,
                damage: 1,
                size: 28.0,
                sight_range: 7.0 * TILE_SIZE,
                attack_range: 0.9 * TILE_SIZE,
                score: 20,
            },
            Self::Spider => KindStats {
                max_health: Health::new(2),
                speed: 2.8,
                damage: 1,
                size: 26.0,
                sight_range: 5.0 * TILE_SIZE,
                attack_range: 0.8 * TILE_SIZE,
                score: 15,
            },
            Self::Mimic => KindStats {
                max_health: Health::new(4),
                speed: 2.0,
                damage: 2,
                size: 32.0,
                sight_range: 5.0 * TILE_SIZE,
                attack_range: 1.0 * TILE_SIZE,
                score: 30,
            },
            Self::BigMonster => KindStats {
                max_health: Health::new(10),
                speed: 1.2,
                damage: 3,
                size: 48.0,
                sight_range: 7.0 * TILE_SIZE,
                attack_range: 1.2 * TILE_SIZE,
                score: 100,
            },
        }
    }

    /// Reports whether the kind phases through walls for movement and sight.
    #[must_use]
    pub const fn is_phasing(self) -> bool {
        matches!(self, Self::Ghost)
    }

    /// Reports whether the kind self-destructs on contact with the player.
    #[must_use]
    pub const fn is_kamikaze(self) -> bool {
        matches!(self, Self::Grunt)
    }

    /// Behavior policy enemies of this kind spawn with.
    #[must_use]
    pub const fn default_ai(self) -> AiType {
        match self {
            Self::Ghost | Self::Grunt | Self::Goblin | Self::Shadow | Self::BigMonster => {
                AiType::Aggressive
            }
            Self::Skeleton | Self::Spider => AiType::Patrol,
            Self::Orc | Self::Mimic => AiType::Guard,
        }
    }

    /// Minimum interval between spawns for kinds produced by spawners.
    #[must_use]
    pub const fn spawn_interval(self) -> Option<Duration> {
        match self {
            Self::Ghost => Some(Duration::from_millis(2500)),
            Self::Grunt => Some(Duration::from_millis(4000)),
            _ => None,
        }
    }
}

/// Behavior policy selecting how an enemy reacts to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiType {
    /// Chases the player on sight and wanders otherwise.
    Aggressive,
    /// Cycles through patrol waypoints until the player is sighted.
    Patrol,
    /// Holds a post, creeping toward intruders within sight.
    Guard,
}

/// Current behavior state of an enemy's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// No target; wandering or holding position.
    Idle,
    /// Cycling patrol waypoints.
    Patrol,
    /// Actively pursuing the player or their last seen position.
    Chase,
    /// In range and attacking; no movement.
    Attack,
    /// Returning to the guarded post.
    Return,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// No spawner record exists at the named cell.
    MissingSpawner,
    /// The spawner was destroyed before the request was applied.
    InactiveSpawner,
    /// The grid cell no longer shows the expected spawner code.
    CellMismatch,
}

/// Reasons a door interaction may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DoorError {
    /// The named cell does not host a closed door.
    NotADoor,
    /// The player is not standing adjacent to the door.
    NotAdjacent,
    /// The player holds no key to consume.
    NoKey,
}

/// Fire-and-forget presentation requests emitted alongside world events.
///
/// The core never waits on these; rendering and audio layers consume them
/// downstream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Play the named sound cue.
    Sound(SoundCue),
    /// Spawn a transient visual at the provided pixel position.
    Visual {
        /// Visual to present.
        kind: VisualKind,
        /// Pixel-space position the visual anchors to.
        position: Vec2,
    },
}

/// Sound cues the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Player melee swing.
    AttackSwing,
    /// Enemy took damage.
    EnemyHit,
    /// Enemy died.
    EnemyDied,
    /// Spawner destroyed.
    SpawnerDestroyed,
    /// Player took damage.
    PlayerHurt,
    /// Pickup consumed.
    Pickup,
    /// Door opened.
    DoorOpen,
    /// Exit unlocked.
    ExitUnlocked,
}

/// Transient visuals the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// Melee slash arc.
    Slash,
    /// Puff left behind by a dying enemy.
    DeathPuff,
    /// Rubble burst from a destroyed spawner.
    Rubble,
    /// Sparkle over a collected pickup.
    Sparkle,
}

/// Static tile matrix plus metadata loaded once per room transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Identifier of the room described by the level.
    pub room: String,
    /// Enemy kills required to unlock the exit.
    pub kill_quota: u32,
    /// Tile rows encoded as strings of tile-code characters.
    ///
    /// Exactly one `P` marks the player start; the cell reads as floor.
    pub rows: Vec<String>,
}

/// Sampled player input consumed by the movement and combat systems.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// Move toward decreasing row indices.
    pub up: bool,
    /// Move toward increasing row indices.
    pub down: bool,
    /// Move toward decreasing column indices.
    pub left: bool,
    /// Move toward increasing column indices.
    pub right: bool,
    /// Melee attack trigger.
    pub attack: bool,
}

impl InputState {
    /// Unnormalized movement direction expressed by the pressed keys.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.up {
            direction.y -= 1.0;
        }
        if self.down {
            direction.y += 1.0;
        }
        if self.left {
            direction.x -= 1.0;
        }
        if self.right {
            direction.x += 1.0;
        }
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn manhattan_distance_handles_negative_coordinates() {
        let origin = TileCoord::new(-2, -1);
        let destination = TileCoord::new(1, 1);
        assert_eq!(origin.manhattan_distance(destination), 5);
    }

    #[test]
    fn tile_codes_round_trip_through_chars() {
        for code in ['#', '.', 'D', 'E', 'B', 'G', 'K', 'F', 'C', '~'] {
            let parsed = TileCode::from_char(code);
            assert_eq!(parsed.as_char(), code);
        }
    }

    #[test]
    fn spawner_codes_map_to_kinds() {
        assert_eq!(
            TileCode::GhostSpawner.spawned_kind(),
            Some(EnemyKind::Ghost)
        );
        assert_eq!(
            TileCode::GruntSpawner.spawned_kind(),
            Some(EnemyKind::Grunt)
        );
        assert_eq!(TileCode::Floor.spawned_kind(), None);
    }

    #[test]
    fn ghost_is_the_only_phasing_kind() {
        let kinds = [
            EnemyKind::Ghost,
            EnemyKind::Grunt,
            EnemyKind::Goblin,
            EnemyKind::Orc,
            EnemyKind::Skeleton,
            EnemyKind::Shadow,
            EnemyKind::Spider,
            EnemyKind::Mimic,
            EnemyKind::BigMonster,
        ];
        for kind in kinds {
            assert_eq!(kind.is_phasing(), kind == EnemyKind::Ghost);
        }
    }

    #[test]
    fn spawn_intervals_only_exist_for_spawner_kinds() {
        assert_eq!(
            EnemyKind::Ghost.spawn_interval(),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(
            EnemyKind::Grunt.spawn_interval(),
            Some(Duration::from_millis(4000))
        );
        assert_eq!(EnemyKind::Orc.spawn_interval(), None);
    }

    #[test]
    fn health_saturates_at_zero() {
        let health = Health::new(2);
        assert_eq!(health.saturating_sub(5), Health::new(0));
        assert!(health.saturating_sub(5).is_zero());
    }

    #[test]
    fn health_clamps_at_maximum_when_healing() {
        let health = Health::new(8);
        assert_eq!(
            health.saturating_add_clamped(5, Health::new(10)),
            Health::new(10)
        );
    }

    #[test]
    fn input_direction_combines_pressed_keys() {
        let input = InputState {
            up: true,
            right: true,
            ..InputState::default()
        };
        assert_eq!(input.direction(), Vec2::new(1.0, -1.0));
        assert_eq!(InputState::default().direction(), Vec2::ZERO);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(42));
    }

    #[test]
    fn tile_coord_round_trips_through_bincode() {
        assert_round_trip(&TileCoord::new(-3, 17));
    }

    #[test]
    fn enemy_kind_round_trips_through_bincode() {
        assert_round_trip(&EnemyKind::BigMonster);
    }

    #[test]
    fn level_definition_round_trips_through_bincode() {
        let level = LevelDefinition {
            room: "crypt".to_owned(),
            kill_quota: 5,
            rows: vec!["####".to_owned(), "#P.#".to_owned(), "####".to_owned()],
        };
        assert_round_trip(&level);
    }
}
