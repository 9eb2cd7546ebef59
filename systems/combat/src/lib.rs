#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat and interaction resolver.
//!
//! Translates the player's attack input into spawner, door and enemy damage
//! requests, resolves enemy attacks against the player (contact detonation,
//! cooldown-gated melee, an occasional ranged strike), and collects pickups
//! the player walks over. All damage is requested through commands; the
//! world remains the only authority on health and removal.

use std::collections::HashMap;
use std::time::Duration;

use dungeon_crawl_core::{geometry, Command, EnemyId, Event, InputState, TileCode, TILE_SIZE};
use dungeon_crawl_system_enemy_ai::can_attack;
use dungeon_crawl_world::query::{EnemyView, GridView, PlayerSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tuning knobs for melee, ranged attacks and interaction radii.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Damage one player swing deals to an enemy.
    pub melee_enemy_damage: u32,
    /// Damage one player swing deals to a spawner.
    pub melee_spawner_damage: u32,
    /// Damage multiplier while the chest attack buff is active.
    pub buff_multiplier: u32,
    /// Radius of the player's melee sweep around their center.
    pub melee_radius: f32,
    /// Minimum delay between melee strikes of a single enemy.
    pub enemy_cooldown: Duration,
    /// Maximum range of the occasional enemy ranged strike.
    pub ranged_range: f32,
    /// Per-frame chance of a ranged strike from an enemy in range.
    pub ranged_chance: f64,
    /// Damage dealt by a ranged strike.
    pub ranged_damage: u32,
    /// Distance within which the player scoops up a pickup.
    pub pickup_radius: f32,
}

impl Config {
    /// Baseline tuning matching the simulation's reference behavior.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            melee_enemy_damage: 2,
            melee_spawner_damage: 10,
            buff_multiplier: 2,
            melee_radius: 1.2 * TILE_SIZE,
            enemy_cooldown: Duration::from_millis(1100),
            ranged_range: 4.0 * TILE_SIZE,
            ranged_chance: 0.004,
            ranged_damage: 1,
            pickup_radius: 0.75 * TILE_SIZE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Combat system holding per-enemy strike cooldowns and the ranged dice.
#[derive(Debug)]
pub struct Combat {
    config: Config,
    last_strike: HashMap<EnemyId, Duration>,
    attack_held: bool,
    rng: ChaCha8Rng,
}

impl Combat {
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
            last_strike: HashMap::new(),
            attack_held: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes input, events and views to emit damage and pickup commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: &InputState,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        clock: Duration,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelConfigured { .. } => {
                    self.last_strike.clear();
                    self.attack_held = false;
                }
                Event::EnemyDied { enemy, .. } | Event::EnemyDespawned { enemy } => {
                    let _ = self.last_strike.remove(enemy);
                }
                _ => {}
            }
        }

        if !player.alive {
            self.attack_held = input.attack;
            return;
        }

        self.resolve_player_attack(input, player, enemies, grid, out);
        self.resolve_enemy_attacks(player, enemies, grid, clock, out);
        collect_nearby_pickups(&self.config, player, grid, out);
    }

    /// Attack triggers on the press edge, not while held.
    fn resolve_player_attack(
        &mut self,
        input: &InputState,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let pressed = input.attack && !self.attack_held;
        self.attack_held = input.attack;
        if !pressed {
            return;
        }

        let multiplier = if player.attack_buffed {
            self.config.buff_multiplier
        } else {
            1
        };

        let center = player.center();
        let (columns, rows) = player.facing.tile_offset();
        let facing_tile = geometry::tile_containing(center).offset(columns, rows);
        match grid.tile_at(facing_tile) {
            code if code.is_spawner() => out.push(Command::DamageSpawner {
                cell: facing_tile,
                amount: self.config.melee_spawner_damage * multiplier,
            }),
            TileCode::Door => out.push(Command::OpenDoor { cell: facing_tile }),
            _ => {}
        }

        for enemy in enemies.iter() {
            let target = enemy.center();
            if geometry::distance(center, target) > self.config.melee_radius {
                continue;
            }
            if !grid.line_of_sight(center, target, false) {
                continue;
            }
            out.push(Command::DamageEnemy {
                enemy: enemy.id,
                amount: self.config.melee_enemy_damage * multiplier,
            });
        }
    }

    fn resolve_enemy_attacks(
        &mut self,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        grid: &GridView<'_>,
        clock: Duration,
        out: &mut Vec<Command>,
    ) {
        let target = player.center();
        for enemy in enemies.iter() {
            let center = enemy.center();
            let dist = geometry::distance(center, target);
            let phasing = enemy.kind.is_phasing();

            if enemy.kind.is_kamikaze() {
                if dist <= enemy.attack_range {
                    out.push(Command::DamagePlayer {
                        amount: enemy.damage,
                        source: Some(enemy.id),
                    });
                    out.push(Command::DespawnEnemy { enemy: enemy.id });
                }
                continue;
            }

            if can_attack(enemy, player) && grid.line_of_sight(center, target, phasing) {
                let ready = self
                    .last_strike
                    .get(&enemy.id)
                    .map_or(true, |&last| clock.saturating_sub(last) >= self.config.enemy_cooldown);
                if ready {
                    let _ = self.last_strike.insert(enemy.id, clock);
                    out.push(Command::DamagePlayer {
                        amount: enemy.damage,
                        source: Some(enemy.id),
                    });
                }
                continue;
            }

            if dist > enemy.attack_range
                && dist <= self.config.ranged_range
                && grid.line_of_sight(center, target, phasing)
                && self.rng.gen_bool(self.config.ranged_chance)
            {
                out.push(Command::DamagePlayer {
                    amount: self.config.ranged_damage,
                    source: Some(enemy.id),
                });
            }
        }
    }
}

/// Scans the tiles around the player for pickups within scooping range.
fn collect_nearby_pickups(
    config: &Config,
    player: &PlayerSnapshot,
    grid: &GridView<'_>,
    out: &mut Vec<Command>,
) {
    let center = player.center();
    let player_tile = geometry::tile_containing(center);
    for row in -1..=1 {
        for column in -1..=1 {
            let tile = player_tile.offset(column, row);
            if grid.tile_at(tile).pickup_kind().is_none() {
                continue;
            }
            if geometry::distance(center, geometry::tile_center(tile)) <= config.pickup_radius {
                out.push(Command::CollectPickup { cell: tile });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::{AiState, AiType, EnemyKind, Facing, LevelDefinition, Vec2};
    use dungeon_crawl_world::query::EnemySnapshot;
    use dungeon_crawl_world::{apply, query, World};

    const FRAME: Duration = Duration::from_millis(50);

    fn world_with(rows: &[&str]) -> World {
        let mut world = World::with_seed(21);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureLevel {
                level: LevelDefinition {
                    room: "test".to_owned(),
                    kill_quota: 0,
                    rows: rows.iter().map(|row| (*row).to_owned()).collect(),
                },
            },
            &mut events,
        );
        world
    }

    fn attack_input() -> InputState {
        InputState {
            attack: true,
            ..InputState::default()
        }
    }

    fn enemy_at(id: u32, kind: EnemyKind, state: AiState, position: Vec2) -> EnemySnapshot {
        let stats = kind.stats();
        EnemySnapshot {
            id: EnemyId::new(id),
            kind,
            ai_type: AiType::Aggressive,
            state,
            position,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            damage: stats.damage,
            size: stats.size,
            rotation: 0.0,
            direction: Vec2::ZERO,
            sight_range: stats.sight_range,
            attack_range: stats.attack_range,
            last_seen: None,
            patrol_target: None,
            has_patrol_route: false,
            hit_flash: None,
            home: position,
        }
    }

    #[test]
    fn attack_fires_on_the_press_edge_only() {
        let world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let mut combat = Combat::new(7);
        let grid = query::grid_view(&world);
        let mut player = query::player_snapshot(&world);
        player.facing = Facing::North;
        let enemies = EnemyView::from_snapshots(Vec::new());
        let mut out = Vec::new();

        combat.handle(&[], &attack_input(), &player, &enemies, &grid, Duration::ZERO, &mut out);
        let strikes = out
            .iter()
            .filter(|command| matches!(command, Command::DamageSpawner { .. }))
            .count();
        assert_eq!(strikes, 1);

        // Holding the button across frames must not re-trigger.
        out.clear();
        combat.handle(&[], &attack_input(), &player, &enemies, &grid, FRAME, &mut out);
        assert!(out.is_empty());

        out.clear();
        combat.handle(&[], &InputState::default(), &player, &enemies, &grid, FRAME, &mut out);
        combat.handle(&[], &attack_input(), &player, &enemies, &grid, FRAME * 2, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn buffed_swings_hit_spawners_harder() {
        let world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let mut combat = Combat::new(7);
        let grid = query::grid_view(&world);
        let mut player = query::player_snapshot(&world);
        player.facing = Facing::North;
        player.attack_buffed = true;
        let enemies = EnemyView::from_snapshots(Vec::new());
        let mut out = Vec::new();

        combat.handle(&[], &attack_input(), &player, &enemies, &grid, Duration::ZERO, &mut out);
        assert!(out.contains(&Command::DamageSpawner {
            cell: dungeon_crawl_core::TileCoord::new(2, 1),
            amount: 20,
        }));
    }

    #[test]
    fn kamikaze_contact_detonates_and_despawns() {
        let world = world_with(&["#####", "#...#", "#.P.#", "#####"]);
        let mut combat = Combat::new(7);
        let grid = query::grid_view(&world);
        let player = query::player_snapshot(&world);
        let grunt = enemy_at(1, EnemyKind::Grunt, AiState::Chase, player.position);
        let enemies = EnemyView::from_snapshots(vec![grunt]);
        let mut out = Vec::new();

        combat.handle(&[], &InputState::default(), &player, &enemies, &grid, Duration::ZERO, &mut out);
        assert!(out.contains(&Command::DamagePlayer {
            amount: 1,
            source: Some(EnemyId::new(1)),
        }));
        assert!(out.contains(&Command::DespawnEnemy {
            enemy: EnemyId::new(1),
        }));
    }

    #[test]
    fn melee_respects_the_per_enemy_cooldown() {
        let world = world_with(&["#####", "#...#", "#.P.#", "#####"]);
        let mut combat = Combat::new(7);
        let grid = query::grid_view(&world);
        let player = query::player_snapshot(&world);
        let goblin = enemy_at(
            1,
            EnemyKind::Goblin,
            AiState::Attack,
            player.position + Vec2::new(20.0, 0.0),
        );
        let enemies = EnemyView::from_snapshots(vec![goblin]);
        let mut out = Vec::new();

        combat.handle(&[], &InputState::default(), &player, &enemies, &grid, Duration::ZERO, &mut out);
        assert_eq!(out.len(), 1);

        // Within the cooldown window nothing lands.
        out.clear();
        combat.handle(
            &[],
            &InputState::default(),
            &player,
            &enemies,
            &grid,
            Duration::from_millis(600),
            &mut out,
        );
        assert!(out.is_empty());

        combat.handle(
            &[],
            &InputState::default(),
            &player,
            &enemies,
            &grid,
            Duration::from_millis(1200),
            &mut out,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn pickups_collect_only_within_range() {
        let world = world_with(&["#####", "#PK.#", "#####"]);
        let mut combat = Combat::new(7);
        let grid = query::grid_view(&world);
        let mut player = query::player_snapshot(&world);
        let enemies = EnemyView::from_snapshots(Vec::new());
        let mut out = Vec::new();

        // A full tile away is out of scooping range.
        combat.handle(&[], &InputState::default(), &player, &enemies, &grid, Duration::ZERO, &mut out);
        assert!(out.is_empty());

        // Half a tile of overlap brings the key inside the radius.
        player.position += Vec2::new(16.0, 0.0);
        combat.handle(&[], &InputState::default(), &player, &enemies, &grid, FRAME, &mut out);
        assert!(out.contains(&Command::CollectPickup {
            cell: dungeon_crawl_core::TileCoord::new(2, 1),
        }));
    }
}
