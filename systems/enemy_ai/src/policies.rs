//! Behavior policies keyed by the enemy's policy tag.
//!
//! Each policy is a pure decision function: it inspects one enemy snapshot
//! plus the player and grid, and returns a [`Decision`] describing the
//! state transition and steering wish. The driver in the crate root turns
//! decisions into commands, so policies never touch the command stream.

use dungeon_crawl_core::{geometry, AiState, Vec2, TILE_SIZE};
use dungeon_crawl_world::query::{EnemySnapshot, GridView, PlayerSnapshot};
use dungeon_crawl_system_pathfinding::Pathfinder;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::Config;

/// How a decision updates the enemy's remembered player position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum LastSeen {
    /// Leave the remembered position untouched.
    Keep,
    /// Remember the provided position.
    Set(Vec2),
    /// Forget the remembered position.
    Clear,
}

/// Outcome of one policy evaluation for one enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Decision {
    pub(crate) state: AiState,
    pub(crate) desired: Option<Vec2>,
    pub(crate) speed_scale: f32,
    pub(crate) last_seen: LastSeen,
    pub(crate) face_player: bool,
    pub(crate) reface: Option<f32>,
    pub(crate) assign_route: bool,
    pub(crate) advance_route: bool,
}

impl Decision {
    fn hold(state: AiState) -> Self {
        Self {
            state,
            desired: None,
            speed_scale: 1.0,
            last_seen: LastSeen::Keep,
            face_player: false,
            reface: None,
            assign_route: false,
            advance_route: false,
        }
    }

    fn moving(state: AiState, desired: Vec2) -> Self {
        Self {
            desired: Some(desired),
            ..Self::hold(state)
        }
    }
}

/// Scratch tools shared by all policies: the planner and the dice.
pub(crate) struct Toolkit<'a> {
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) pathfinder: &'a mut Pathfinder,
    pub(crate) config: &'a Config,
}

pub(crate) struct PolicyContext<'a> {
    pub(crate) enemy: &'a EnemySnapshot,
    pub(crate) player: &'a PlayerSnapshot,
    pub(crate) grid: &'a GridView<'a>,
}

/// Chases on sight, pursues the last seen position, wanders otherwise.
///
/// Phasing and kamikaze kinds always know where the player is; the kamikaze
/// kind additionally ramps its speed linearly up to a bonus inside half its
/// sight range.
pub(crate) fn aggressive(kit: &mut Toolkit<'_>, ctx: &PolicyContext<'_>) -> Decision {
    let enemy = ctx.enemy;
    let player = ctx.player;
    let center = enemy.center();
    let target = player.center();
    let dist = geometry::distance(center, target);
    let phasing = enemy.kind.is_phasing();
    let always_aware = phasing || enemy.kind.is_kamikaze();
    let has_los = ctx.grid.line_of_sight(center, target, phasing);
    let sees = player.alive && (always_aware || (dist <= enemy.sight_range && has_los));

    if sees {
        // Kamikaze kinds never stop to attack; they charge into contact.
        if !enemy.kind.is_kamikaze() && dist <= enemy.attack_range {
            return Decision {
                face_player: true,
                last_seen: LastSeen::Set(target),
                ..Decision::hold(AiState::Attack)
            };
        }

        let mut scale = 1.0;
        if enemy.kind.is_kamikaze() {
            let ramp_range = enemy.sight_range * 0.5;
            if dist < ramp_range {
                scale += kit.config.kamikaze_ramp_bonus * (1.0 - dist / ramp_range);
            }
        }

        let desired = if phasing || has_los {
            geometry::normalize_or_zero(target - center)
        } else {
            toward_first_waypoint(kit, ctx, target, phasing)
        };
        return Decision {
            speed_scale: scale,
            last_seen: LastSeen::Set(target),
            ..Decision::moving(AiState::Chase, desired)
        };
    }

    if let Some(seen) = enemy.last_seen {
        if geometry::distance(center, seen) <= TILE_SIZE {
            return Decision {
                last_seen: LastSeen::Clear,
                ..Decision::hold(AiState::Idle)
            };
        }
        let desired = toward_first_waypoint(kit, ctx, seen, phasing);
        return Decision::moving(AiState::Chase, desired);
    }

    let heading = wander_heading(kit, enemy.direction);
    Decision::moving(AiState::Idle, heading)
}

/// Cycles lazily generated waypoints, breaking into a chase on sight.
pub(crate) fn patrol(kit: &mut Toolkit<'_>, ctx: &PolicyContext<'_>) -> Decision {
    let enemy = ctx.enemy;
    let player = ctx.player;
    let center = enemy.center();
    let dist = geometry::distance(center, player.center());
    let sees = player.alive
        && dist <= enemy.sight_range
        && ctx.grid.line_of_sight(center, player.center(), false);

    if sees || enemy.last_seen.is_some() {
        return aggressive(kit, ctx);
    }

    if !enemy.has_patrol_route {
        return Decision {
            assign_route: true,
            ..Decision::hold(AiState::Patrol)
        };
    }

    let Some(target) = enemy.patrol_target else {
        return Decision {
            assign_route: true,
            ..Decision::hold(AiState::Patrol)
        };
    };

    if geometry::distance(center, target) <= TILE_SIZE {
        return Decision {
            advance_route: true,
            ..Decision::hold(AiState::Patrol)
        };
    }

    let desired = geometry::normalize_or_zero(target - center);
    Decision {
        speed_scale: kit.config.patrol_speed_scale,
        ..Decision::moving(AiState::Patrol, desired)
    }
}

/// Holds a post, creeping toward visible intruders and drifting back home.
pub(crate) fn guard(kit: &mut Toolkit<'_>, ctx: &PolicyContext<'_>) -> Decision {
    let enemy = ctx.enemy;
    let player = ctx.player;
    let center = enemy.center();
    let target = player.center();
    let dist = geometry::distance(center, target);
    let sees = player.alive
        && dist <= enemy.sight_range
        && ctx.grid.line_of_sight(center, target, false);

    if sees {
        if dist <= enemy.attack_range {
            return Decision {
                face_player: true,
                last_seen: LastSeen::Set(target),
                ..Decision::hold(AiState::Attack)
            };
        }
        if dist <= enemy.sight_range * kit.config.guard_creep_sight_scale {
            let desired = geometry::normalize_or_zero(target - center);
            return Decision {
                speed_scale: kit.config.guard_creep_scale,
                last_seen: LastSeen::Set(target),
                ..Decision::moving(AiState::Chase, desired)
            };
        }
        // Squares up the moment the intruder is visible; range still gates
        // the actual strike.
        return Decision {
            face_player: true,
            ..Decision::hold(AiState::Attack)
        };
    }

    if geometry::distance(enemy.position, enemy.home) > TILE_SIZE / 2.0 {
        let desired = geometry::normalize_or_zero(enemy.home - enemy.position);
        return Decision {
            last_seen: LastSeen::Clear,
            ..Decision::moving(AiState::Return, desired)
        };
    }

    let reface = if kit.rng.gen_bool(kit.config.guard_reface_chance) {
        Some(kit.rng.gen_range(0.0..std::f32::consts::TAU))
    } else {
        None
    };
    Decision {
        reface,
        ..Decision::hold(AiState::Idle)
    }
}

/// Direction toward the first waypoint the planner produces.
fn toward_first_waypoint(
    kit: &mut Toolkit<'_>,
    ctx: &PolicyContext<'_>,
    goal: Vec2,
    phasing: bool,
) -> Vec2 {
    let grid = ctx.grid;
    let waypoints = kit.pathfinder.find_path(
        ctx.enemy.center(),
        goal,
        grid.columns(),
        grid.rows(),
        |tile| grid.is_wall(tile),
        phasing,
    );
    let next = waypoints.first().copied().unwrap_or(goal);
    geometry::normalize_or_zero(next - ctx.enemy.center())
}

/// Keeps the current wander heading, reheading occasionally or when unset.
fn wander_heading(kit: &mut Toolkit<'_>, current: Vec2) -> Vec2 {
    if current == Vec2::ZERO || kit.rng.gen_bool(kit.config.wander_rehead_chance) {
        let angle = kit.rng.gen_range(0.0..std::f32::consts::TAU);
        Vec2::from_angle(angle)
    } else {
        current
    }
}

/// Random heading used when a wander step is rejected by the grid.
pub(crate) fn random_heading(rng: &mut ChaCha8Rng) -> Vec2 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}
