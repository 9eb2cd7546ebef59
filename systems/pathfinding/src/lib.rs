#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded A* pathfinding over the tile grid.
//!
//! The planner is deliberately budgeted: it refuses to spend more than a
//! fixed number of node expansions per query and falls back to a direct
//! waypoint when the budget runs out, so a single enemy can never stall a
//! frame. Callers re-plan every frame, which keeps stale paths harmless.

use dungeon_crawl_core::{geometry, TileCoord, Vec2, TILE_SIZE};

/// Maximum node expansions per query before the planner gives up.
const EXPANSION_CAP: usize = 100;

/// Movement cost of one cardinal step.
const STEP_COST: u32 = 10;

/// Straight-line distance under which planning is skipped entirely.
const DIRECT_DISTANCE: f32 = 3.0 * TILE_SIZE;

/// Transient search node stored in the planner's arena.
#[derive(Clone, Copy, Debug)]
struct PathNode {
    tile: TileCoord,
    g: u32,
    h: u32,
    parent: Option<usize>,
    closed: bool,
}

impl PathNode {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

/// Reusable A* planner with scratch buffers that survive across queries.
#[derive(Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<PathNode>,
    open: Vec<usize>,
}

impl Pathfinder {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans a pixel-space waypoint list from `start` toward `goal`.
    ///
    /// Targets closer than three tiles are returned directly. Otherwise a
    /// 4-directional A* runs with `is_blocked` deciding which tiles reject
    /// expansion; phasing movers ignore blocking entirely. The returned list
    /// never includes the start tile and is never empty: exhausting the
    /// expansion budget or failing to reach the goal degrades to `[goal]`.
    pub fn find_path<F>(
        &mut self,
        start: Vec2,
        goal: Vec2,
        columns: u32,
        rows: u32,
        is_blocked: F,
        phasing: bool,
    ) -> Vec<Vec2>
    where
        F: Fn(TileCoord) -> bool,
    {
        if geometry::distance(start, goal) < DIRECT_DISTANCE {
            return vec![goal];
        }

        let start_tile = geometry::tile_containing(start);
        let goal_tile = geometry::tile_containing(goal);
        if start_tile == goal_tile {
            return vec![goal];
        }

        self.nodes.clear();
        self.open.clear();
        self.nodes.push(PathNode {
            tile: start_tile,
            g: 0,
            h: heuristic(start_tile, goal_tile),
            parent: None,
            closed: false,
        });
        self.open.push(0);

        let mut expansions = 0;
        while expansions < EXPANSION_CAP {
            let Some(open_slot) = self.lowest_f_slot() else {
                break;
            };
            let current = self.open.remove(open_slot);
            self.nodes[current].closed = true;
            expansions += 1;

            if self.nodes[current].tile == goal_tile {
                return self.reconstruct(current, goal);
            }

            let tile = self.nodes[current].tile;
            let g = self.nodes[current].g + STEP_COST;
            for neighbor in cardinal_neighbors(tile) {
                if !in_bounds(neighbor, columns, rows) {
                    continue;
                }
                if !phasing && is_blocked(neighbor) {
                    continue;
                }
                self.visit(neighbor, g, goal_tile, current);
            }
        }

        vec![goal]
    }

    /// Index into the open list of the first node with the lowest f score.
    fn lowest_f_slot(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for (slot, &node) in self.open.iter().enumerate() {
            let f = self.nodes[node].f();
            if best.map_or(true, |(_, best_f)| f < best_f) {
                best = Some((slot, f));
            }
        }
        best.map(|(slot, _)| slot)
    }

    fn visit(&mut self, tile: TileCoord, g: u32, goal: TileCoord, parent: usize) {
        if let Some(existing) = self.nodes.iter().position(|node| node.tile == tile) {
            if self.nodes[existing].closed || self.nodes[existing].g <= g {
                return;
            }
            self.nodes[existing].g = g;
            self.nodes[existing].parent = Some(parent);
            return;
        }

        self.nodes.push(PathNode {
            tile,
            g,
            h: heuristic(tile, goal),
            parent: Some(parent),
            closed: false,
        });
        self.open.push(self.nodes.len() - 1);
    }

    /// Walks parent pointers back to the start, dropping the start tile and
    /// pinning the final waypoint to the exact goal position.
    fn reconstruct(&self, mut current: usize, goal: Vec2) -> Vec<Vec2> {
        let mut tiles = Vec::new();
        loop {
            let node = self.nodes[current];
            match node.parent {
                Some(parent) => {
                    tiles.push(node.tile);
                    current = parent;
                }
                None => break,
            }
        }
        tiles.reverse();

        let mut waypoints: Vec<Vec2> = tiles.iter().map(|&tile| geometry::tile_center(tile)).collect();
        match waypoints.last_mut() {
            Some(last) => *last = goal,
            None => waypoints.push(goal),
        }
        waypoints
    }
}

const fn heuristic(tile: TileCoord, goal: TileCoord) -> u32 {
    tile.manhattan_distance(goal) * STEP_COST
}

fn cardinal_neighbors(tile: TileCoord) -> [TileCoord; 4] {
    [
        tile.offset(0, -1),
        tile.offset(-1, 0),
        tile.offset(1, 0),
        tile.offset(0, 1),
    ]
}

fn in_bounds(tile: TileCoord, columns: u32, rows: u32) -> bool {
    tile.column() >= 0
        && tile.row() >= 0
        && (tile.column() as u32) < columns
        && (tile.row() as u32) < rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::geometry::tile_center;

    struct Maze {
        rows: Vec<&'static str>,
    }

    impl Maze {
        fn columns(&self) -> u32 {
            self.rows[0].len() as u32
        }

        fn rows_count(&self) -> u32 {
            self.rows.len() as u32
        }

        fn blocked(&self, tile: TileCoord) -> bool {
            let Some(row) = usize::try_from(tile.row()).ok().and_then(|r| self.rows.get(r)) else {
                return true;
            };
            row.as_bytes()
                .get(tile.column() as usize)
                .map_or(true, |&code| code == b'#')
        }
    }

    #[test]
    fn short_range_targets_skip_planning() {
        let mut planner = Pathfinder::new();
        let start = tile_center(TileCoord::new(1, 1));
        let goal = tile_center(TileCoord::new(2, 1));
        let path = planner.find_path(start, goal, 10, 10, |_| false, false);
        assert_eq!(path, vec![goal]);
    }

    #[test]
    fn plans_around_a_wall() {
        let maze = Maze {
            rows: vec![
                "########", //
                "#......#", //
                "#.####.#", //
                "#......#", //
                "########",
            ],
        };
        let mut planner = Pathfinder::new();
        let start = tile_center(TileCoord::new(1, 2));
        let goal = tile_center(TileCoord::new(6, 2));
        let path = planner.find_path(
            start,
            goal,
            maze.columns(),
            maze.rows_count(),
            |tile| maze.blocked(tile),
            false,
        );

        assert!(path.len() > 1, "expected a multi-waypoint detour");
        assert_eq!(*path.last().expect("non-empty path"), goal);
        for waypoint in &path {
            let tile = dungeon_crawl_core::geometry::tile_containing(*waypoint);
            assert!(!maze.blocked(tile), "waypoint on blocked tile {tile:?}");
        }
    }

    #[test]
    fn phasing_movers_ignore_walls() {
        let maze = Maze {
            rows: vec![
                "#########", //
                "#...#...#", //
                "#...#...#", //
                "#...#...#", //
                "#########",
            ],
        };
        let mut planner = Pathfinder::new();
        let start = tile_center(TileCoord::new(1, 2));
        let goal = tile_center(TileCoord::new(7, 2));
        let path = planner.find_path(
            start,
            goal,
            maze.columns(),
            maze.rows_count(),
            |tile| maze.blocked(tile),
            true,
        );

        // Straight through the dividing wall: one tile per column crossed.
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn unreachable_goal_degrades_to_direct_waypoint() {
        let maze = Maze {
            rows: vec![
                "#########", //
                "#...#...#", //
                "#...#...#", //
                "#...#...#", //
                "#########",
            ],
        };
        let mut planner = Pathfinder::new();
        let start = tile_center(TileCoord::new(1, 2));
        let goal = tile_center(TileCoord::new(7, 2));
        let path = planner.find_path(
            start,
            goal,
            maze.columns(),
            maze.rows_count(),
            |tile| maze.blocked(tile),
            false,
        );
        assert_eq!(path, vec![goal]);
    }

    #[test]
    fn expansion_budget_caps_open_field_searches() {
        let mut planner = Pathfinder::new();
        let start = tile_center(TileCoord::new(0, 0));
        let goal = tile_center(TileCoord::new(199, 199));
        let path = planner.find_path(start, goal, 200, 200, |_| false, false);
        assert_eq!(path, vec![goal]);
    }
}
