#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Local steering for enemies: pairwise repulsion, wall avoidance, stuck
//! detection and collision-aware move resolution.
//!
//! The system never mutates the world. It blends a caller-provided desired
//! heading with repulsion forces, tracks per-enemy progress to detect stuck
//! entities, and offers deflection candidates when the straight step is
//! blocked. All randomness flows through a seeded generator so identical
//! seeds reproduce identical steering.

use std::collections::HashMap;
use std::time::Duration;

use dungeon_crawl_core::{geometry, EnemyId, Vec2, TILE_SIZE};
use dungeon_crawl_world::query::{EnemySnapshot, EnemyView, GridView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tuning knobs for steering, repulsion and stuck recovery.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Pairwise repulsion radius between enemy centers.
    pub separation_radius: f32,
    /// Radius inside which blocking neighbor tiles push enemies away.
    pub wall_radius: f32,
    /// Minimum center distance a resolved move must keep from peers.
    pub min_peer_separation: f32,
    /// Displacement under which an enemy counts as not progressing.
    pub stuck_displacement: f32,
    /// How long an enemy must fail to progress before an escape is issued.
    pub stuck_delay: Duration,
    /// How long an issued escape heading stays in force.
    pub escape_hold: Duration,
    /// Weight of the escape heading while an escape is active.
    pub escape_weight: f32,
    /// Weight of the desired heading while an escape is active.
    pub desired_weight: f32,
    /// Weight of combined repulsion while an escape is active.
    pub repulsion_weight: f32,
    /// Chance that a fresh escape heading receives positional jitter.
    pub jitter_chance: f64,
    /// Maximum jitter magnitude applied to a fresh escape heading.
    pub jitter_magnitude: f32,
}

impl Config {
    /// Baseline tuning matching the simulation's reference behavior.
    #[must_use]
    pub fn new() -> Self {
        Self {
            separation_radius: 1.5 * TILE_SIZE,
            wall_radius: 0.8 * TILE_SIZE,
            min_peer_separation: 0.7 * TILE_SIZE,
            stuck_displacement: 0.1 * TILE_SIZE,
            stuck_delay: Duration::from_secs(1),
            escape_hold: Duration::from_millis(1500),
            escape_weight: 2.5,
            desired_weight: 0.2,
            repulsion_weight: 0.5,
            jitter_chance: 0.3,
            jitter_magnitude: 0.4 * TILE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
struct Escape {
    heading: Vec2,
    until: Duration,
}

#[derive(Clone, Copy, Debug)]
struct StuckRecord {
    last_position: Vec2,
    last_progress: Duration,
    escape: Option<Escape>,
}

/// A resolved movement candidate produced by [`Flocking::resolve_move`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedMove {
    /// Position the mover may commit to.
    pub position: Vec2,
    /// Heading actually taken, after any deflection.
    pub heading: Vec2,
}

/// Steering system holding per-enemy stuck records and a seeded generator.
#[derive(Debug)]
pub struct Flocking {
    config: Config,
    records: HashMap<EnemyId, StuckRecord>,
    rng: ChaCha8Rng,
}

impl Flocking {
    /// Creates the system with baseline tuning and the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(Config::new(), seed)
    }

    /// Creates the system with explicit tuning.
    #[must_use]
    pub fn with_config(config: Config, seed: u64) -> Self {
        Self {
            config,
            records: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pairwise repulsion away from peers inside the separation radius.
    ///
    /// The force grows linearly from zero at the radius to its maximum at
    /// contact. Coincident peers yield a random nonzero push so stacked
    /// enemies always drift apart.
    pub fn separation(&mut self, enemy: &EnemySnapshot, peers: &EnemyView) -> Vec2 {
        let center = enemy.center();
        let mut total = Vec2::ZERO;
        for peer in peers.iter() {
            if peer.id == enemy.id {
                continue;
            }
            let away = center - peer.center();
            let distance = away.length();
            if distance >= self.config.separation_radius {
                continue;
            }
            if distance <= f32::EPSILON {
                total += self.random_unit();
                continue;
            }
            let weight = (self.config.separation_radius - distance) / self.config.separation_radius;
            total += (away / distance) * weight;
        }
        total
    }

    /// Repulsion away from blocking tiles among the 8 surrounding the mover.
    #[must_use]
    pub fn wall_repulsion(&self, center: Vec2, grid: &GridView<'_>) -> Vec2 {
        let tile = geometry::tile_containing(center);
        let mut total = Vec2::ZERO;
        for row in -1..=1 {
            for column in -1..=1 {
                if column == 0 && row == 0 {
                    continue;
                }
                let neighbor = tile.offset(column, row);
                if !grid.blocks_walk(neighbor) {
                    continue;
                }
                let away = center - geometry::tile_center(neighbor);
                let distance = away.length();
                if distance >= self.config.wall_radius || distance <= f32::EPSILON {
                    continue;
                }
                let weight = (self.config.wall_radius - distance) / self.config.wall_radius;
                total += (away / distance) * weight;
            }
        }
        total
    }

    /// Blends the desired heading with repulsion and any active escape.
    ///
    /// Also samples the enemy's progress: less than a tenth of a tile of
    /// displacement for over a second issues an escape heading that stays in
    /// force for a hold period. The result is a unit vector unless every
    /// contribution vanished.
    pub fn steer(
        &mut self,
        enemy: &EnemySnapshot,
        desired: Vec2,
        peers: &EnemyView,
        grid: &GridView<'_>,
        now: Duration,
    ) -> Vec2 {
        let desired_unit = geometry::normalize_or_zero(desired);
        self.sample_progress(enemy, desired_unit, now);

        let separation = self.separation(enemy, peers);
        let repulsion = separation + self.wall_repulsion(enemy.center(), grid);

        let escape = self
            .records
            .get(&enemy.id)
            .and_then(|record| record.escape)
            .map(|escape| escape.heading);

        let total = match escape {
            Some(heading) => {
                heading * self.config.escape_weight
                    + desired_unit * self.config.desired_weight
                    + repulsion * self.config.repulsion_weight
            }
            None => desired_unit + repulsion,
        };

        let length = total.length();
        if length > 1e-4 {
            total / length
        } else {
            desired_unit
        }
    }

    /// Attempts to commit a step, deflecting around blocked candidates.
    ///
    /// Tries the straight step first, then ±30° and ±45° deflections at 80%
    /// of the step length. A candidate is rejected when it lands on
    /// unwalkable ground or closes below the minimum peer separation.
    /// Returns `None` when every candidate fails; callers hold position but
    /// should still update facing and state.
    #[must_use]
    pub fn resolve_move(
        &self,
        enemy: &EnemySnapshot,
        heading: Vec2,
        step: f32,
        peers: &EnemyView,
        grid: &GridView<'_>,
    ) -> Option<ResolvedMove> {
        const DEFLECTIONS: [(f32, f32); 5] = [
            (0.0, 1.0),
            (30.0, 0.8),
            (-30.0, 0.8),
            (45.0, 0.8),
            (-45.0, 0.8),
        ];

        for (degrees, scale) in DEFLECTIONS {
            let direction = Vec2::from_angle(degrees.to_radians()).rotate(heading);
            let position = enemy.position + direction * step * scale;
            if !grid.is_walkable(position, enemy.size) {
                continue;
            }
            if self.crowds_a_peer(enemy, position, peers) {
                continue;
            }
            return Some(ResolvedMove {
                position,
                heading: direction,
            });
        }
        None
    }

    /// Drops the stuck record of a removed enemy.
    pub fn forget(&mut self, enemy: EnemyId) {
        let _ = self.records.remove(&enemy);
    }

    /// Reports whether a stuck record is still held for the enemy.
    #[must_use]
    pub fn remembers(&self, enemy: EnemyId) -> bool {
        self.records.contains_key(&enemy)
    }

    fn sample_progress(&mut self, enemy: &EnemySnapshot, desired_unit: Vec2, now: Duration) {
        let config = self.config;
        let needs_escape = {
            let record = self.records.entry(enemy.id).or_insert(StuckRecord {
                last_position: enemy.position,
                last_progress: now,
                escape: None,
            });

            if geometry::distance(enemy.position, record.last_position)
                >= config.stuck_displacement
            {
                record.last_position = enemy.position;
                record.last_progress = now;
            }
            if record
                .escape
                .is_some_and(|escape| escape.until <= now)
            {
                record.escape = None;
            }

            record.escape.is_none()
                && now.saturating_sub(record.last_progress) > config.stuck_delay
        };

        if needs_escape {
            let heading = self.escape_heading(desired_unit);
            if let Some(record) = self.records.get_mut(&enemy.id) {
                record.escape = Some(Escape {
                    heading,
                    until: now + config.escape_hold,
                });
                record.last_progress = now;
            }
        }
    }

    /// Perpendicular of the desired heading with a random sign, optionally
    /// jittered, so escapes break symmetric deadlocks.
    fn escape_heading(&mut self, desired_unit: Vec2) -> Vec2 {
        let base = if desired_unit == Vec2::ZERO {
            self.random_unit()
        } else {
            let sign = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
            Vec2::new(-desired_unit.y, desired_unit.x) * sign
        };

        if self.rng.gen_bool(self.config.jitter_chance) {
            let magnitude = self.config.jitter_magnitude;
            let jitter = Vec2::new(
                self.rng.gen_range(-magnitude..=magnitude),
                self.rng.gen_range(-magnitude..=magnitude),
            );
            geometry::normalize_or_zero(base * TILE_SIZE + jitter)
        } else {
            base
        }
    }

    fn crowds_a_peer(&self, enemy: &EnemySnapshot, position: Vec2, peers: &EnemyView) -> bool {
        let current_center = enemy.center();
        let candidate_center = position + Vec2::splat(enemy.size / 2.0);
        peers.iter().any(|peer| {
            if peer.id == enemy.id {
                return false;
            }
            let candidate_distance = geometry::distance(candidate_center, peer.center());
            // Moving apart is always allowed, even below the minimum.
            candidate_distance < self.config.min_peer_separation
                && candidate_distance < geometry::distance(current_center, peer.center())
        })
    }

    fn random_unit(&mut self) -> Vec2 {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        Vec2::from_angle(angle)
    }
}
