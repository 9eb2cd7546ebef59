#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player movement system: turns sampled input into move commands.

use std::time::Duration;

use dungeon_crawl_core::{geometry, Command, Facing, InputState, TILE_SIZE};
use dungeon_crawl_world::query::PlayerSnapshot;

/// Tuning knobs for player movement.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Player movement speed in tiles per second.
    pub speed: f32,
}

impl Config {
    /// Baseline tuning matching the simulation's reference behavior.
    #[must_use]
    pub const fn new() -> Self {
        Self { speed: 4.5 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure system that proposes player displacement from sampled input.
///
/// The world validates the proposal against the grid; a rejected move still
/// commits the facing change, so the player turns toward walls they press
/// into.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates the system with explicit tuning.
    #[must_use]
    pub const fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Emits a move command for the frame's input, if any movement is held.
    pub fn handle(
        &self,
        input: &InputState,
        player: &PlayerSnapshot,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        if !player.alive {
            return;
        }

        let direction = geometry::normalize_or_zero(input.direction());
        if direction == dungeon_crawl_core::Vec2::ZERO {
            return;
        }

        let displacement = direction * self.config.speed * TILE_SIZE * dt.as_secs_f32();
        let facing = Facing::from_direction(direction);
        out.push(Command::MovePlayer {
            displacement,
            facing,
        });
    }
}
