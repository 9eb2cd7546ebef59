#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behavior engine: per-policy state machines driving move commands.
//!
//! Every frame the engine evaluates one decision per enemy through the
//! policy table (aggressive, patrol, guard), blends the resulting desire
//! through the flocking system, and emits movement and state commands. It
//! owns the pathfinder and the stuck-recovery state, and cleans both up
//! when enemies leave the world.

use std::time::Duration;

use dungeon_crawl_core::{
    geometry, AiState, AiType, Command, EnemyId, Event, TileCoord, Vec2, TILE_SIZE,
};
use dungeon_crawl_system_flocking::Flocking;
use dungeon_crawl_system_pathfinding::Pathfinder;
use dungeon_crawl_world::query::{EnemySnapshot, EnemyView, GridView, PlayerSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

mod policies;

use policies::{Decision, LastSeen, PolicyContext, Toolkit};

/// Tuning knobs for the behavior policies.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Per-frame chance that a wandering enemy picks a fresh heading.
    pub wander_rehead_chance: f64,
    /// Per-frame chance that an idle guard turns to face a new direction.
    pub guard_reface_chance: f64,
    /// Speed multiplier while cycling patrol waypoints.
    pub patrol_speed_scale: f32,
    /// Speed multiplier while a guard creeps toward an intruder.
    pub guard_creep_scale: f32,
    /// Fraction of sight range inside which a guard starts creeping.
    pub guard_creep_sight_scale: f32,
    /// Maximum kamikaze speed bonus, reached at point-blank range.
    pub kamikaze_ramp_bonus: f32,
    /// Waypoints per generated patrol route, inclusive bounds.
    pub patrol_route_points: (usize, usize),
    /// Rejection-sampling attempts per patrol waypoint.
    pub patrol_sample_retries: usize,
}

impl Config {
    /// Baseline tuning matching the simulation's reference behavior.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wander_rehead_chance: 0.02,
            guard_reface_chance: 0.005,
            patrol_speed_scale: 0.7,
            guard_creep_scale: 0.3,
            guard_creep_sight_scale: 0.7,
            kamikaze_ramp_bonus: 0.5,
            patrol_route_points: (3, 5),
            patrol_sample_retries: 50,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior engine owning the planner, steering state and dice.
#[derive(Debug)]
pub struct EnemyAi {
    config: Config,
    pathfinder: Pathfinder,
    flocking: Flocking,
    rng: ChaCha8Rng,
}

impl EnemyAi {
    /// Creates the engine with baseline tuning and the provided seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(Config::new(), seed)
    }

    /// Creates the engine with explicit tuning.
    #[must_use]
    pub fn with_config(config: Config, seed: u64) -> Self {
        Self {
            config,
            pathfinder: Pathfinder::new(),
            flocking: Flocking::new(seed.wrapping_mul(0x9e37_79b9)),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and views to emit behavior commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        clock: Duration,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::EnemyDied { enemy, .. } | Event::EnemyDespawned { enemy } => {
                    self.flocking.forget(*enemy);
                }
                _ => {}
            }
        }

        for enemy in enemies.iter() {
            self.drive(enemy, player, enemies, grid, clock, dt, out);
        }
    }

    /// Reports whether steering history is still held for an enemy.
    #[must_use]
    pub fn tracks_steering(&self, enemy: EnemyId) -> bool {
        self.flocking.remembers(enemy)
    }

    fn drive(
        &mut self,
        enemy: &EnemySnapshot,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        clock: Duration,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        let decision = {
            let mut kit = Toolkit {
                rng: &mut self.rng,
                pathfinder: &mut self.pathfinder,
                config: &self.config,
            };
            let ctx = PolicyContext {
                enemy,
                player,
                grid,
            };
            match enemy.ai_type {
                AiType::Aggressive => policies::aggressive(&mut kit, &ctx),
                AiType::Patrol => policies::patrol(&mut kit, &ctx),
                AiType::Guard => policies::guard(&mut kit, &ctx),
            }
        };

        match decision.last_seen {
            LastSeen::Keep => {}
            LastSeen::Set(position) => out.push(Command::SetEnemyState {
                enemy: enemy.id,
                state: decision.state,
                last_seen: Some(position),
            }),
            LastSeen::Clear => out.push(Command::SetEnemyState {
                enemy: enemy.id,
                state: decision.state,
                last_seen: None,
            }),
        }

        if decision.assign_route {
            let waypoints = self.sample_patrol_route(grid);
            if !waypoints.is_empty() {
                out.push(Command::AssignPatrolRoute {
                    enemy: enemy.id,
                    waypoints,
                });
            }
        }
        if decision.advance_route {
            out.push(Command::AdvancePatrol { enemy: enemy.id });
        }

        match decision.desired {
            Some(desired) => {
                self.drive_movement(enemy, player, enemies, grid, clock, dt, &decision, desired, out);
            }
            None => self.drive_stationary(enemy, player, &decision, out),
        }
    }

    fn drive_movement(
        &mut self,
        enemy: &EnemySnapshot,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        clock: Duration,
        dt: Duration,
        decision: &Decision,
        desired: Vec2,
        out: &mut Vec<Command>,
    ) {
        let heading = self.flocking.steer(enemy, desired, enemies, grid, clock);
        let step = enemy.speed * decision.speed_scale * TILE_SIZE * dt.as_secs_f32();

        if enemy.kind.is_phasing() {
            let to = enemy.position + heading * step;
            out.push(Command::MoveEnemy {
                enemy: enemy.id,
                to,
                direction: heading,
                rotation: self.presented_rotation(enemy, player, decision, heading),
                state: decision.state,
            });
            return;
        }

        match self.flocking.resolve_move(enemy, heading, step, enemies, grid) {
            Some(resolved) => out.push(Command::MoveEnemy {
                enemy: enemy.id,
                to: resolved.position,
                direction: resolved.heading,
                rotation: self.presented_rotation(enemy, player, decision, resolved.heading),
                state: decision.state,
            }),
            None => {
                // Hold position; wandering enemies pick a new heading so
                // they peel off the wall next frame.
                let direction = if decision.state == AiState::Idle {
                    policies::random_heading(&mut self.rng)
                } else {
                    heading
                };
                out.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    to: enemy.position,
                    direction,
                    rotation: self.presented_rotation(enemy, player, decision, direction),
                    state: decision.state,
                });
            }
        }
    }

    fn drive_stationary(
        &mut self,
        enemy: &EnemySnapshot,
        player: &PlayerSnapshot,
        decision: &Decision,
        out: &mut Vec<Command>,
    ) {
        let rotation = if decision.face_player {
            Some(geometry::rotation_towards(enemy.center(), player.center()))
        } else {
            decision.reface
        };

        let state_changed = decision.state != enemy.state;
        let Some(rotation) = rotation else {
            if state_changed && decision.last_seen == LastSeen::Keep {
                out.push(Command::SetEnemyState {
                    enemy: enemy.id,
                    state: decision.state,
                    last_seen: enemy.last_seen,
                });
            }
            return;
        };

        out.push(Command::MoveEnemy {
            enemy: enemy.id,
            to: enemy.position,
            direction: Vec2::from_angle(rotation),
            rotation,
            state: decision.state,
        });
    }

    fn presented_rotation(
        &self,
        enemy: &EnemySnapshot,
        player: &PlayerSnapshot,
        decision: &Decision,
        heading: Vec2,
    ) -> f32 {
        if decision.face_player {
            geometry::rotation_towards(enemy.center(), player.center())
        } else if heading == Vec2::ZERO {
            enemy.rotation
        } else {
            heading.y.atan2(heading.x)
        }
    }

    /// Rejection-samples a handful of reachable waypoints for a patrol loop.
    fn sample_patrol_route(&mut self, grid: &GridView<'_>) -> Vec<Vec2> {
        let (min_points, max_points) = self.config.patrol_route_points;
        let count = self.rng.gen_range(min_points..=max_points);
        let mut waypoints = Vec::with_capacity(count);
        for _ in 0..count {
            for _ in 0..self.config.patrol_sample_retries {
                let column = self.rng.gen_range(0..grid.columns()) as i32;
                let row = self.rng.gen_range(0..grid.rows()) as i32;
                let tile = TileCoord::new(column, row);
                if !grid.blocks_walk(tile) {
                    waypoints.push(geometry::tile_center(tile));
                    break;
                }
            }
        }
        waypoints
    }
}

/// Attack predicate shared with the combat resolver: an enemy may strike
/// only while in the attack state and inside its attack range.
#[must_use]
pub fn can_attack(enemy: &EnemySnapshot, player: &PlayerSnapshot) -> bool {
    enemy.state == AiState::Attack
        && geometry::distance(enemy.center(), player.center()) <= enemy.attack_range
}
