//! Level parsing: turns a [`LevelDefinition`] into grid data and entity seeds.

use dungeon_crawl_core::{geometry, LevelDefinition, TileCode, TileCoord, Vec2, TILE_SIZE};
use thiserror::Error;

use crate::grid::TileGrid;
use crate::PLAYER_SIZE;

/// Character marking the player start inside level rows.
const PLAYER_START_CODE: char = 'P';

/// Errors raised while parsing a level definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelParseError {
    /// The definition contained no rows or empty rows.
    #[error("level `{room}` has no tiles")]
    EmptyGrid {
        /// Room identifier of the offending level.
        room: String,
    },
    /// A row's length differed from the first row's length.
    #[error("level row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// No `P` player start marker was present.
    #[error("level `{room}` is missing a player start marker")]
    MissingPlayerStart {
        /// Room identifier of the offending level.
        room: String,
    },
    /// More than one `P` player start marker was present.
    #[error("level `{room}` declares multiple player start markers")]
    MultiplePlayerStarts {
        /// Room identifier of the offending level.
        room: String,
    },
}

/// Grid data and entity seeds produced by parsing a level definition.
#[derive(Debug)]
pub(crate) struct ParsedLevel {
    pub(crate) grid: TileGrid,
    pub(crate) player_start: Vec2,
    pub(crate) spawners: Vec<TileCoord>,
}

/// Parses the provided level definition, validating its invariants.
pub(crate) fn parse(level: &LevelDefinition) -> Result<ParsedLevel, LevelParseError> {
    if level.rows.is_empty() || level.rows[0].is_empty() {
        return Err(LevelParseError::EmptyGrid {
            room: level.room.clone(),
        });
    }

    let columns = level.rows[0].chars().count();
    let rows = level.rows.len();
    let mut cells = Vec::with_capacity(columns * rows);
    let mut player_start = None;
    let mut spawners = Vec::new();

    for (row_index, row) in level.rows.iter().enumerate() {
        let found = row.chars().count();
        if found != columns {
            return Err(LevelParseError::RaggedRow {
                row: row_index,
                expected: columns,
                found,
            });
        }

        for (column_index, code) in row.chars().enumerate() {
            let tile = TileCoord::new(column_index as i32, row_index as i32);
            if code == PLAYER_START_CODE {
                if player_start.is_some() {
                    return Err(LevelParseError::MultiplePlayerStarts {
                        room: level.room.clone(),
                    });
                }
                player_start = Some(centered_in_tile(tile, PLAYER_SIZE));
                cells.push(TileCode::Floor);
                continue;
            }

            let parsed = TileCode::from_char(code);
            if parsed.is_spawner() {
                spawners.push(tile);
            }
            cells.push(parsed);
        }
    }

    let player_start = player_start.ok_or_else(|| LevelParseError::MissingPlayerStart {
        room: level.room.clone(),
    })?;

    Ok(ParsedLevel {
        grid: TileGrid::from_cells(cells, columns as u32, rows as u32),
        player_start,
        spawners,
    })
}

/// Top-left anchor that centers a box of the given size inside a tile.
pub(crate) fn centered_in_tile(tile: TileCoord, size: f32) -> Vec2 {
    geometry::tile_origin(tile) + Vec2::splat((TILE_SIZE - size) / 2.0)
}
