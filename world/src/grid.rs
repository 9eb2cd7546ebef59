//! Tile grid model: walkability, line of sight and cell mutation.

use dungeon_crawl_core::{geometry, TileCode, TileCoord, Vec2, TILE_SIZE};

/// Inset applied to bounding-box corners before sampling walkability, so an
/// entity flush against a wall does not read the wall's tile.
const CORNER_INSET: f32 = 2.0;

/// Sampling step used when walking a line-of-sight segment.
const LOS_STEP: f32 = TILE_SIZE / 2.0;

/// Dense rectangular grid of tile codes.
///
/// Mutations are immediately visible to every subsequent query; the grid
/// performs no caching. Out-of-range queries read as [`TileCode::Wall`] so
/// that callers fail toward "cannot move, cannot see".
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    cells: Vec<TileCode>,
    columns: u32,
    rows: u32,
}

impl TileGrid {
    /// Builds a grid from parsed tile rows. Rows must be rectangular.
    #[must_use]
    pub(crate) fn from_cells(cells: Vec<TileCode>, columns: u32, rows: u32) -> Self {
        debug_assert_eq!(cells.len(), (columns as usize) * (rows as usize));
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * TILE_SIZE
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * TILE_SIZE
    }

    /// Reports whether the tile lies inside the grid bounds.
    #[must_use]
    pub fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.column() >= 0
            && tile.row() >= 0
            && (tile.column() as u32) < self.columns
            && (tile.row() as u32) < self.rows
    }

    /// Linear cell index for an in-bounds tile; `None` when out of range.
    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.in_bounds(tile) {
            return None;
        }
        Some((tile.row() as usize) * (self.columns as usize) + tile.column() as usize)
    }

    /// Tile code at the provided coordinate; out-of-range reads as wall.
    #[must_use]
    pub fn tile_at(&self, tile: TileCoord) -> TileCode {
        let Some(index) = self.index(tile) else {
            return TileCode::Wall;
        };
        self.cells.get(index).copied().unwrap_or(TileCode::Wall)
    }

    /// Overwrites the tile at the provided coordinate.
    pub(crate) fn set_tile(&mut self, tile: TileCoord, code: TileCode) {
        if let Some(index) = self.index(tile) {
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = code;
            }
        }
    }

    /// Rewrites the tile to floor. Idempotent; out-of-range is a no-op.
    pub(crate) fn destroy_tile(&mut self, tile: TileCoord) {
        self.set_tile(tile, TileCode::Floor);
    }

    /// Reports whether a grounded entity's tile is blocked.
    ///
    /// Walls, live spawners and closed doors block; the exit blocks until the
    /// kill quota unlocks it. Phasing enemies never consult this check.
    #[must_use]
    pub fn blocks_walk(&self, tile: TileCoord, exit_unlocked: bool) -> bool {
        match self.tile_at(tile) {
            TileCode::Wall | TileCode::Door | TileCode::GhostSpawner | TileCode::GruntSpawner => {
                true
            }
            TileCode::Exit => !exit_unlocked,
            _ => false,
        }
    }

    /// Entity-size-aware walkability check for a grounded entity.
    ///
    /// Samples the four inset corners plus the center of the bounding box
    /// anchored at `position` (top-left) rather than just its center, so a
    /// box straddling a wall edge is rejected.
    #[must_use]
    pub fn is_walkable(&self, position: Vec2, size: f32, exit_unlocked: bool) -> bool {
        let inset = CORNER_INSET.min(size / 2.0);
        let samples = [
            Vec2::new(position.x + inset, position.y + inset),
            Vec2::new(position.x + size - inset, position.y + inset),
            Vec2::new(position.x + inset, position.y + size - inset),
            Vec2::new(position.x + size - inset, position.y + size - inset),
            Vec2::new(position.x + size / 2.0, position.y + size / 2.0),
        ];
        samples.into_iter().all(|sample| {
            let tile = geometry::tile_containing(sample);
            self.in_bounds(tile) && !self.blocks_walk(tile, exit_unlocked)
        })
    }

    /// Steps along the segment from `from` to `to` in half-tile increments.
    ///
    /// Returns `false` as soon as a wall tile is encountered (unless the
    /// mover phases through walls) or the segment leaves the grid bounds.
    #[must_use]
    pub fn line_of_sight(&self, from: Vec2, to: Vec2, phasing: bool) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length <= f32::EPSILON {
            return self.in_bounds(geometry::tile_containing(from));
        }

        let steps = (length / LOS_STEP).ceil() as u32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let sample = from + delta * t;
            let tile = geometry::tile_containing(sample);
            if !self.in_bounds(tile) {
                return false;
            }
            if !phasing && self.tile_at(tile) == TileCode::Wall {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::geometry::tile_center;

    fn grid_from_rows(rows: &[&str]) -> TileGrid {
        let columns = rows[0].len() as u32;
        let cells = rows
            .iter()
            .flat_map(|row| row.chars().map(TileCode::from_char))
            .collect();
        TileGrid::from_cells(cells, columns, rows.len() as u32)
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = grid_from_rows(&["##", "##"]);
        assert_eq!(grid.tile_at(TileCoord::new(-1, 0)), TileCode::Wall);
        assert_eq!(grid.tile_at(TileCoord::new(0, 5)), TileCode::Wall);
    }

    #[test]
    fn walkability_rejects_walls_and_bounds() {
        let grid = grid_from_rows(&["####", "#..#", "####"]);
        assert!(grid.is_walkable(tile_center(TileCoord::new(1, 1)) - Vec2::splat(14.0), 28.0, false));
        assert!(!grid.is_walkable(tile_center(TileCoord::new(0, 0)) - Vec2::splat(14.0), 28.0, false));
        assert!(!grid.is_walkable(Vec2::new(-40.0, -40.0), 28.0, false));
    }

    #[test]
    fn walkability_samples_corners_not_just_center() {
        let grid = grid_from_rows(&["####", "#..#", "####"]);
        // Box centered on the floor but wide enough to overlap the wall row.
        let centered = tile_center(TileCoord::new(1, 1)) - Vec2::splat(30.0);
        assert!(!grid.is_walkable(centered, 60.0, false));
    }

    #[test]
    fn destroy_tile_is_idempotent_and_visible() {
        let mut grid = grid_from_rows(&["#G#"]);
        let cell = TileCoord::new(1, 0);
        assert_eq!(grid.tile_at(cell), TileCode::GruntSpawner);
        grid.destroy_tile(cell);
        assert_eq!(grid.tile_at(cell), TileCode::Floor);
        grid.destroy_tile(cell);
        assert_eq!(grid.tile_at(cell), TileCode::Floor);
    }

    #[test]
    fn exit_blocks_until_unlocked() {
        let grid = grid_from_rows(&["E"]);
        let cell = TileCoord::new(0, 0);
        assert!(grid.blocks_walk(cell, false));
        assert!(!grid.blocks_walk(cell, true));
    }

    #[test]
    fn line_of_sight_blocked_by_walls_for_grounded_movers() {
        let grid = grid_from_rows(&["...", "###", "..."]);
        let from = tile_center(TileCoord::new(1, 0));
        let to = tile_center(TileCoord::new(1, 2));
        assert!(!grid.line_of_sight(from, to, false));
        assert!(grid.line_of_sight(from, to, true));
    }

    #[test]
    fn line_of_sight_fails_outside_bounds() {
        let grid = grid_from_rows(&["..."]);
        let from = tile_center(TileCoord::new(0, 0));
        assert!(!grid.line_of_sight(from, Vec2::new(200.0, 0.0), true));
    }
}
