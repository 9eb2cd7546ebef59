//! Pixel-space geometry helpers shared by the world and the pure systems.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::TileCoord;

/// Side length of a single square tile measured in pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Euclidean distance between two pixel-space points.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Normalizes the provided vector, returning the zero vector instead of NaN
/// when the input has zero length.
#[must_use]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let length = v.length();
    if length <= f32::EPSILON {
        Vec2::ZERO
    } else {
        v / length
    }
}

/// Rotation in radians that points `from` toward `to`.
#[must_use]
pub fn rotation_towards(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Tile coordinate containing the provided pixel-space point.
#[must_use]
pub fn tile_containing(position: Vec2) -> TileCoord {
    TileCoord::new(
        (position.x / TILE_SIZE).floor() as i32,
        (position.y / TILE_SIZE).floor() as i32,
    )
}

/// Pixel-space center of the provided tile.
#[must_use]
pub fn tile_center(tile: TileCoord) -> Vec2 {
    Vec2::new(
        tile.column() as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        tile.row() as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Pixel-space position of the top-left corner of the provided tile.
#[must_use]
pub fn tile_origin(tile: TileCoord) -> Vec2 {
    Vec2::new(
        tile.column() as f32 * TILE_SIZE,
        tile.row() as f32 * TILE_SIZE,
    )
}

/// Cardinal facing directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Facing toward decreasing row indices.
    North,
    /// Facing toward increasing column indices.
    East,
    /// Facing toward increasing row indices.
    South,
    /// Facing toward decreasing column indices.
    West,
}

impl Facing {
    /// Unit vector pointing along the facing in pixel space.
    #[must_use]
    pub const fn unit(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, -1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, 1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Tile-space offset of the cell directly ahead of the facing.
    #[must_use]
    pub const fn tile_offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Derives the dominant cardinal facing from an arbitrary direction.
    ///
    /// A zero vector keeps callers honest by defaulting to south, the facing
    /// the player starts with.
    #[must_use]
    pub fn from_direction(direction: Vec2) -> Self {
        if direction.x.abs() >= direction.y.abs() {
            if direction.x >= 0.0 {
                Self::East
            } else {
                Self::West
            }
        } else if direction.y >= 0.0 {
            Self::South
        } else {
            Self::North
        }
    }
}
