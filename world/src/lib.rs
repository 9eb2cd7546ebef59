#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Dungeon Crawl.
//!
//! The world owns the two pieces of shared mutable state — the tile grid and
//! the enemy collection — plus the player, the spawner records and the timed
//! task queue. All mutation flows through [`apply`]; systems observe the
//! world exclusively through the read-only [`query`] views.

use std::time::Duration;

use dungeon_crawl_core::{
    geometry, AiState, AiType, Command, DoorError, Effect, EnemyId, EnemyKind, Event, Facing,
    Health, LevelDefinition, PickupKind, SoundCue, SpawnError, TileCode, TileCoord, Vec2,
    VisualKind, WELCOME_BANNER,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod grid;
mod levels;
mod tasks;

pub use grid::TileGrid;
pub use levels::LevelParseError;

use tasks::{TaskKind, TaskQueue};

/// Bounding-box edge length of the player in pixels.
pub const PLAYER_SIZE: f32 = 28.0;

/// Health the player starts a fresh life with.
pub const PLAYER_MAX_HEALTH: Health = Health::new(20);

/// Health every spawner starts with when a level loads.
pub const SPAWNER_HEALTH: Health = Health::new(50);

/// Cadence of the unconditional survival-pressure health drain.
const DRAIN_PERIOD: Duration = Duration::from_secs(1);
const DRAIN_AMOUNT: u32 = 1;

/// How long the player's hurt animation state lasts before auto-reverting.
const HURT_DURATION: Duration = Duration::from_millis(400);

/// How long hit flashes linger before the world clears them.
const FLASH_DURATION: Duration = Duration::from_millis(150);

/// Health restored by a food pickup.
const FOOD_HEAL: u32 = 3;

/// Score awarded by opening a chest.
const CHEST_SCORE: u32 = 50;

/// Duration of the chest attack buff.
const ATTACK_BUFF_DURATION: Duration = Duration::from_secs(10);

/// Seed used by [`World::new`]; tests construct worlds with explicit seeds.
const WORLD_RNG_SEED: u64 = 0x5eed_d00d_cafe_f00d;

/// Enemy owned by the world's enemy collection.
#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    ai_type: AiType,
    state: AiState,
    position: Vec2,
    health: Health,
    max_health: Health,
    speed: f32,
    damage: u32,
    size: f32,
    rotation: f32,
    direction: Vec2,
    sight_range: f32,
    attack_range: f32,
    last_seen: Option<Vec2>,
    patrol_points: Vec<Vec2>,
    patrol_index: usize,
    hit_flash: Option<Duration>,
    home: Vec2,
}

impl Enemy {
    fn from_kind(id: EnemyId, kind: EnemyKind, position: Vec2) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            ai_type: kind.default_ai(),
            state: AiState::Idle,
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
            patrol_points: Vec::new(),
            patrol_index: 0,
            hit_flash: None,
            home: position,
        }
    }
}

/// The player singleton.
#[derive(Clone, Debug)]
struct Player {
    position: Vec2,
    health: Health,
    max_health: Health,
    facing: Facing,
    score: u32,
    keys: u32,
    alive: bool,
    hurt_until: Option<Duration>,
    hit_flash: Option<Duration>,
    attack_buff_until: Option<Duration>,
}

impl Player {
    fn fresh(position: Vec2) -> Self {
        Self {
            position,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            facing: Facing::South,
            score: 0,
            keys: 0,
            alive: true,
            hurt_until: None,
            hit_flash: None,
            attack_buff_until: None,
        }
    }
}

/// Spawner record keyed by its grid cell.
///
/// Identity is the cell itself: at most one spawner occupies a cell, so no
/// separate identifier is needed.
#[derive(Clone, Debug)]
struct Spawner {
    cell: TileCoord,
    kind: EnemyKind,
    active: bool,
    health: Health,
    last_spawn: Option<Duration>,
}

/// Represents the authoritative Dungeon Crawl world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: TileGrid,
    room: String,
    kill_quota: u32,
    exit_unlocked: bool,
    exit_announced: bool,
    player: Player,
    enemies: Vec<Enemy>,
    spawners: Vec<Spawner>,
    next_enemy_id: u32,
    clock: Duration,
    drain_accumulator: Duration,
    tasks: TaskQueue,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world hosting the built-in starter room.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(WORLD_RNG_SEED)
    }

    /// Creates a new world with an explicit placement RNG seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            grid: TileGrid::from_cells(vec![TileCode::Wall], 1, 1),
            room: String::new(),
            kill_quota: 0,
            exit_unlocked: false,
            exit_announced: false,
            player: Player::fresh(Vec2::ZERO),
            enemies: Vec::new(),
            spawners: Vec::new(),
            next_enemy_id: 0,
            clock: Duration::ZERO,
            drain_accumulator: Duration::ZERO,
            tasks: TaskQueue::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        let mut events = Vec::new();
        world.configure_level(&default_level(), &mut events);
        world
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn spawner_index(&self, cell: TileCoord) -> Option<usize> {
        self.spawners.iter().position(|candidate| candidate.cell == cell)
    }

    fn configure_level(&mut self, level: &LevelDefinition, out_events: &mut Vec<Event>) {
        let parsed = match levels::parse(level) {
            Ok(parsed) => parsed,
            Err(error) => {
                log::error!("rejected level `{}`: {error}", level.room);
                return;
            }
        };

        self.grid = parsed.grid;
        self.room = level.room.clone();
        self.kill_quota = level.kill_quota;
        self.exit_unlocked = false;
        self.exit_announced = false;
        self.enemies.clear();
        self.spawners = parsed
            .spawners
            .iter()
            .filter_map(|&cell| {
                let kind = self.grid.tile_at(cell).spawned_kind()?;
                Some(Spawner {
                    cell,
                    kind,
                    active: true,
                    health: SPAWNER_HEALTH,
                    last_spawn: None,
                })
            })
            .collect();
        self.tasks.clear();
        self.drain_accumulator = Duration::ZERO;

        if self.player.health.is_zero() {
            self.player = Player::fresh(parsed.player_start);
        } else {
            self.player.position = parsed.player_start;
            self.player.facing = Facing::South;
            self.player.hurt_until = None;
            self.player.hit_flash = None;
        }

        out_events.push(Event::LevelConfigured {
            room: self.room.clone(),
            columns: self.grid.columns(),
            rows: self.grid.rows(),
            kill_quota: self.kill_quota,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        // Survival pressure: unconditional drain while the player lives.
        if self.player.alive {
            self.drain_accumulator = self.drain_accumulator.saturating_add(dt);
            while self.drain_accumulator >= DRAIN_PERIOD && self.player.alive {
                self.drain_accumulator -= DRAIN_PERIOD;
                self.damage_player(DRAIN_AMOUNT, None, false, out_events);
            }
        }

        for kind in self.tasks.drain_due(self.clock) {
            self.run_task(kind);
        }
    }

    fn run_task(&mut self, kind: TaskKind) {
        match kind {
            TaskKind::ClearPlayerHurt => {
                if self.player.hurt_until.is_some_and(|until| until <= self.clock) {
                    self.player.hurt_until = None;
                }
            }
            TaskKind::ClearPlayerFlash => {
                if self
                    .player
                    .hit_flash
                    .is_some_and(|since| since + FLASH_DURATION <= self.clock)
                {
                    self.player.hit_flash = None;
                }
            }
            TaskKind::ClearAttackBuff => {
                if self
                    .player
                    .attack_buff_until
                    .is_some_and(|until| until <= self.clock)
                {
                    self.player.attack_buff_until = None;
                }
            }
            TaskKind::ClearEnemyFlash(enemy) => {
                // The enemy may have died while the task was pending.
                let clock = self.clock;
                if let Some(index) = self.enemy_index(enemy) {
                    let enemy = &mut self.enemies[index];
                    if enemy
                        .hit_flash
                        .is_some_and(|since| since + FLASH_DURATION <= clock)
                    {
                        enemy.hit_flash = None;
                    }
                }
            }
        }
    }

    fn move_player(&mut self, displacement: Vec2, facing: Facing, out_events: &mut Vec<Event>) {
        if !self.player.alive {
            return;
        }

        self.player.facing = facing;
        let from = self.player.position;
        let proposed = from + displacement;
        if !self.grid.is_walkable(proposed, PLAYER_SIZE, self.exit_unlocked) {
            // Invalid moves are silently rejected; facing already updated.
            return;
        }

        self.player.position = proposed;
        out_events.push(Event::PlayerMoved {
            from,
            to: proposed,
            facing,
        });

        if self.exit_unlocked && !self.exit_announced {
            let center = proposed + Vec2::splat(PLAYER_SIZE / 2.0);
            if self.grid.tile_at(geometry::tile_containing(center)) == TileCode::Exit {
                self.exit_announced = true;
                out_events.push(Event::ExitReached);
            }
        }
    }

    fn move_enemy(
        &mut self,
        enemy: EnemyId,
        to: Vec2,
        direction: Vec2,
        rotation: f32,
        state: AiState,
        out_events: &mut Vec<Event>,
    ) {
        let exit_unlocked = self.exit_unlocked;
        let (grid_width, grid_height) = (self.grid.width(), self.grid.height());
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };

        let allowed = {
            let record = &self.enemies[index];
            record.kind.is_phasing()
                || to == record.position
                || self.grid.is_walkable(to, record.size, exit_unlocked)
        };

        let record = &mut self.enemies[index];
        record.direction = direction;
        record.rotation = rotation;
        if record.state != state {
            record.state = state;
            out_events.push(Event::EnemyStateChanged { enemy, state });
        }

        if !allowed {
            // Rejected moves hold position but keep the steering update.
            return;
        }

        let from = record.position;
        let mut committed = to;
        if record.kind.is_phasing() {
            // Ghosts skip walkability but stay inside the grid rectangle.
            committed.x = committed.x.clamp(0.0, (grid_width - record.size).max(0.0));
            committed.y = committed.y.clamp(0.0, (grid_height - record.size).max(0.0));
        }
        if committed != from {
            record.position = committed;
            out_events.push(Event::EnemyMoved {
                enemy,
                from,
                to: committed,
            });
        }
    }

    fn set_enemy_state(
        &mut self,
        enemy: EnemyId,
        state: AiState,
        last_seen: Option<Vec2>,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(index) = self.enemy_index(enemy) {
            let record = &mut self.enemies[index];
            record.last_seen = last_seen;
            if record.state != state {
                record.state = state;
                out_events.push(Event::EnemyStateChanged { enemy, state });
            }
        }
    }

    fn spawn_enemy(&mut self, spawner: TileCoord, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let Some(index) = self.spawner_index(spawner) else {
            out_events.push(Event::SpawnRejected {
                cell: spawner,
                kind,
                reason: SpawnError::MissingSpawner,
            });
            return;
        };

        if !self.spawners[index].active {
            out_events.push(Event::SpawnRejected {
                cell: spawner,
                kind,
                reason: SpawnError::InactiveSpawner,
            });
            return;
        }

        // The cell may have been rewritten between the request being queued
        // and applied; re-check before producing an enemy.
        if self.grid.tile_at(spawner).spawned_kind() != Some(kind) {
            out_events.push(Event::SpawnRejected {
                cell: spawner,
                kind,
                reason: SpawnError::CellMismatch,
            });
            return;
        }

        let position = self.place_spawn(spawner, kind);
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::from_kind(id, kind, position));
        self.spawners[index].last_spawn = Some(self.clock);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
            spawner,
        });
    }

    /// Searches a shuffled ring of candidate cells around the spawner,
    /// widening once before falling back to the spawner's own cell.
    fn place_spawn(&mut self, cell: TileCoord, kind: EnemyKind) -> Vec2 {
        let size = kind.stats().size;
        for radius in 1..=2 {
            let mut ring = ring_offsets(radius);
            ring.shuffle(&mut self.rng);
            for (columns, rows) in ring {
                let candidate = cell.offset(columns, rows);
                let anchor = levels::centered_in_tile(candidate, size);
                let accepted = if kind.is_phasing() {
                    // Ghosts accept any in-bounds non-wall tile.
                    self.grid.in_bounds(candidate)
                        && self.grid.tile_at(candidate) != TileCode::Wall
                } else {
                    self.grid.is_walkable(anchor, size, self.exit_unlocked)
                };
                if accepted {
                    return anchor;
                }
            }
        }

        log::warn!(
            "no free tile around spawner at ({}, {}); placing on the spawner cell",
            cell.column(),
            cell.row()
        );
        levels::centered_in_tile(cell, size)
    }

    fn damage_spawner(&mut self, cell: TileCoord, amount: u32, out_events: &mut Vec<Event>) {
        let Some(index) = self.spawner_index(cell) else {
            return;
        };

        // Destruction is one-way: re-damaging a dead spawner is a no-op.
        if !self.spawners[index].active {
            return;
        }

        let remaining = self.spawners[index].health.saturating_sub(amount);
        self.spawners[index].health = remaining;
        if remaining.is_zero() {
            self.spawners[index].active = false;
            self.grid.destroy_tile(cell);
            out_events.push(Event::SpawnerDestroyed { cell });
            out_events.push(Event::EffectRequested {
                effect: Effect::Sound(SoundCue::SpawnerDestroyed),
            });
            out_events.push(Event::EffectRequested {
                effect: Effect::Visual {
                    kind: VisualKind::Rubble,
                    position: geometry::tile_center(cell),
                },
            });
        } else {
            out_events.push(Event::SpawnerDamaged { cell, remaining });
        }
    }

    fn damage_enemy(&mut self, enemy: EnemyId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(index) = self.enemy_index(enemy) else {
            return;
        };

        let remaining = self.enemies[index].health.saturating_sub(amount);
        self.enemies[index].health = remaining;
        if remaining.is_zero() {
            let record = self.enemies.remove(index);
            let reward = record.kind.stats().score;
            self.player.score += reward;
            out_events.push(Event::EnemyDied {
                enemy,
                kind: record.kind,
                position: record.position,
            });
            out_events.push(Event::ScoreAwarded {
                amount: reward,
                total: self.player.score,
            });
            out_events.push(Event::EffectRequested {
                effect: Effect::Sound(SoundCue::EnemyDied),
            });
            out_events.push(Event::EffectRequested {
                effect: Effect::Visual {
                    kind: VisualKind::DeathPuff,
                    position: record.position,
                },
            });
        } else {
            self.enemies[index].hit_flash = Some(self.clock);
            self.tasks
                .schedule(self.clock + FLASH_DURATION, TaskKind::ClearEnemyFlash(enemy));
            out_events.push(Event::EnemyDamaged { enemy, remaining });
            out_events.push(Event::EffectRequested {
                effect: Effect::Sound(SoundCue::EnemyHit),
            });
        }
    }

    fn despawn_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if let Some(index) = self.enemy_index(enemy) {
            let _ = self.enemies.remove(index);
            out_events.push(Event::EnemyDespawned { enemy });
        }
    }

    fn damage_player(
        &mut self,
        amount: u32,
        source: Option<EnemyId>,
        flash: bool,
        out_events: &mut Vec<Event>,
    ) {
        if !self.player.alive {
            return;
        }

        let remaining = self.player.health.saturating_sub(amount);
        self.player.health = remaining;
        if flash {
            self.player.hit_flash = Some(self.clock);
            self.player.hurt_until = Some(self.clock + HURT_DURATION);
            self.tasks
                .schedule(self.clock + FLASH_DURATION, TaskKind::ClearPlayerFlash);
            self.tasks
                .schedule(self.clock + HURT_DURATION, TaskKind::ClearPlayerHurt);
            out_events.push(Event::EffectRequested {
                effect: Effect::Sound(SoundCue::PlayerHurt),
            });
        }
        out_events.push(Event::PlayerDamaged {
            amount,
            remaining,
            source,
        });

        if remaining.is_zero() {
            // The alive flag guards the death transition so it fires once.
            self.player.alive = false;
            out_events.push(Event::PlayerDied);
        }
    }

    fn collect_pickup(&mut self, cell: TileCoord, out_events: &mut Vec<Event>) {
        let Some(kind) = self.grid.tile_at(cell).pickup_kind() else {
            return;
        };

        match kind {
            PickupKind::Key => {
                self.player.keys += 1;
            }
            PickupKind::Food => {
                let healed = self
                    .player
                    .health
                    .saturating_add_clamped(FOOD_HEAL, self.player.max_health);
                self.player.health = healed;
                out_events.push(Event::PlayerHealed {
                    amount: FOOD_HEAL,
                    total: healed,
                });
            }
            PickupKind::Chest => {
                self.player.score += CHEST_SCORE;
                self.player.attack_buff_until = Some(self.clock + ATTACK_BUFF_DURATION);
                self.tasks
                    .schedule(self.clock + ATTACK_BUFF_DURATION, TaskKind::ClearAttackBuff);
                out_events.push(Event::ScoreAwarded {
                    amount: CHEST_SCORE,
                    total: self.player.score,
                });
            }
        }

        self.grid.destroy_tile(cell);
        out_events.push(Event::PickupCollected { cell, kind });
        out_events.push(Event::EffectRequested {
            effect: Effect::Sound(SoundCue::Pickup),
        });
        out_events.push(Event::EffectRequested {
            effect: Effect::Visual {
                kind: VisualKind::Sparkle,
                position: geometry::tile_center(cell),
            },
        });
    }

    fn open_door(&mut self, cell: TileCoord, out_events: &mut Vec<Event>) {
        if self.grid.tile_at(cell) != TileCode::Door {
            out_events.push(Event::DoorRejected {
                cell,
                reason: DoorError::NotADoor,
            });
            return;
        }

        let player_tile =
            geometry::tile_containing(self.player.position + Vec2::splat(PLAYER_SIZE / 2.0));
        if player_tile.manhattan_distance(cell) > 1 {
            out_events.push(Event::DoorRejected {
                cell,
                reason: DoorError::NotAdjacent,
            });
            return;
        }

        if self.player.keys == 0 {
            out_events.push(Event::DoorRejected {
                cell,
                reason: DoorError::NoKey,
            });
            return;
        }

        self.player.keys -= 1;
        self.grid.destroy_tile(cell);
        out_events.push(Event::DoorOpened { cell });
        out_events.push(Event::EffectRequested {
            effect: Effect::Sound(SoundCue::DoorOpen),
        });
    }

    fn unlock_exit(&mut self, out_events: &mut Vec<Event>) {
        if self.exit_unlocked {
            return;
        }
        self.exit_unlocked = true;
        out_events.push(Event::ExitUnlocked);
        out_events.push(Event::EffectRequested {
            effect: Effect::Sound(SoundCue::ExitUnlocked),
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel { level } => world.configure_level(&level, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer {
            displacement,
            facing,
        } => world.move_player(displacement, facing, out_events),
        Command::MoveEnemy {
            enemy,
            to,
            direction,
            rotation,
            state,
        } => world.move_enemy(enemy, to, direction, rotation, state, out_events),
        Command::SetEnemyState {
            enemy,
            state,
            last_seen,
        } => world.set_enemy_state(enemy, state, last_seen, out_events),
        Command::AssignPatrolRoute { enemy, waypoints } => {
            if let Some(index) = world.enemy_index(enemy) {
                let record = &mut world.enemies[index];
                record.patrol_points = waypoints;
                record.patrol_index = 0;
            }
        }
        Command::AdvancePatrol { enemy } => {
            if let Some(index) = world.enemy_index(enemy) {
                let record = &mut world.enemies[index];
                if !record.patrol_points.is_empty() {
                    record.patrol_index = (record.patrol_index + 1) % record.patrol_points.len();
                }
            }
        }
        Command::SpawnEnemy { spawner, kind } => world.spawn_enemy(spawner, kind, out_events),
        Command::DamageSpawner { cell, amount } => world.damage_spawner(cell, amount, out_events),
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::DespawnEnemy { enemy } => world.despawn_enemy(enemy, out_events),
        Command::DamagePlayer { amount, source } => {
            world.damage_player(amount, source, true, out_events);
        }
        Command::CollectPickup { cell } => world.collect_pickup(cell, out_events),
        Command::OpenDoor { cell } => world.open_door(cell, out_events),
        Command::UnlockExit => world.unlock_exit(out_events),
    }
}

/// All offsets whose Chebyshev distance from the origin equals `radius`.
fn ring_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for row in -radius..=radius {
        for column in -radius..=radius {
            if column.abs().max(row.abs()) == radius {
                offsets.push((column, row));
            }
        }
    }
    offsets
}

/// Built-in starter room used by [`World::new`].
fn default_level() -> LevelDefinition {
    LevelDefinition {
        room: "starter-crypt".to_owned(),
        kill_quota: 5,
        rows: vec![
            "############".to_owned(),
            "#..........#".to_owned(),
            "#.B......G.#".to_owned(),
            "#..........#".to_owned(),
            "#....P.....#".to_owned(),
            "#..........#".to_owned(),
            "#.K......F.#".to_owned(),
            "##D........#".to_owned(),
            "##########E#".to_owned(),
        ],
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use dungeon_crawl_core::{
        AiState, AiType, EnemyId, EnemyKind, Facing, Health, TileCode, TileCoord, Vec2,
    };

    use super::{TileGrid, World, PLAYER_SIZE};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Identifier of the currently loaded room.
    #[must_use]
    pub fn room(world: &World) -> &str {
        &world.room
    }

    /// Enemy kills required to unlock the exit of the current room.
    #[must_use]
    pub fn kill_quota(world: &World) -> u32 {
        world.kill_quota
    }

    /// Current simulation clock.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Reports whether the level exit has been unlocked.
    #[must_use]
    pub fn exit_unlocked(world: &World) -> bool {
        world.exit_unlocked
    }

    /// Captures a read-only snapshot of the player.
    #[must_use]
    pub fn player_snapshot(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            position: player.position,
            health: player.health,
            max_health: player.max_health,
            facing: player.facing,
            score: player.score,
            keys: player.keys,
            alive: player.alive,
            hurt: player.hurt_until.is_some(),
            hit_flash: player.hit_flash,
            attack_buffed: player.attack_buff_until.is_some(),
        }
    }

    /// Captures a read-only view of the enemies inhabiting the dungeon.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                kind: enemy.kind,
                ai_type: enemy.ai_type,
                state: enemy.state,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                speed: enemy.speed,
                damage: enemy.damage,
                size: enemy.size,
                rotation: enemy.rotation,
                direction: enemy.direction,
                sight_range: enemy.sight_range,
                attack_range: enemy.attack_range,
                last_seen: enemy.last_seen,
                patrol_target: enemy.patrol_points.get(enemy.patrol_index).copied(),
                has_patrol_route: !enemy.patrol_points.is_empty(),
                hit_flash: enemy.hit_flash,
                home: enemy.home,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Captures a read-only view of the spawner records.
    #[must_use]
    pub fn spawner_view(world: &World) -> SpawnerView {
        let mut snapshots: Vec<SpawnerSnapshot> = world
            .spawners
            .iter()
            .map(|spawner| SpawnerSnapshot {
                cell: spawner.cell,
                kind: spawner.kind,
                active: spawner.active,
                health: spawner.health,
                last_spawn: spawner.last_spawn,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        SpawnerView { snapshots }
    }

    /// Exposes a read-only view of the tile grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView {
            grid: &world.grid,
            exit_unlocked: world.exit_unlocked,
        }
    }

    /// Immutable representation of the player used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Top-left anchored pixel-space position.
        pub position: Vec2,
        /// Current health.
        pub health: Health,
        /// Maximum health.
        pub max_health: Health,
        /// Cardinal facing.
        pub facing: Facing,
        /// Accumulated score.
        pub score: u32,
        /// Keys held.
        pub keys: u32,
        /// Whether the player is alive.
        pub alive: bool,
        /// Whether the transient hurt animation state is active.
        pub hurt: bool,
        /// Timestamp of the last hit flash, if still visible.
        pub hit_flash: Option<Duration>,
        /// Whether the chest attack buff is active.
        pub attack_buffed: bool,
    }

    impl PlayerSnapshot {
        /// Pixel-space center of the player's bounding box.
        #[must_use]
        pub fn center(&self) -> Vec2 {
            self.position + Vec2::splat(PLAYER_SIZE / 2.0)
        }
    }

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Unique identifier assigned to the enemy.
        pub id: EnemyId,
        /// Kind of the enemy.
        pub kind: EnemyKind,
        /// Behavior policy driving the enemy.
        pub ai_type: AiType,
        /// Current behavior state.
        pub state: AiState,
        /// Top-left anchored pixel-space position.
        pub position: Vec2,
        /// Current health.
        pub health: Health,
        /// Maximum health.
        pub max_health: Health,
        /// Movement speed in tiles per second.
        pub speed: f32,
        /// Damage dealt by a successful attack.
        pub damage: u32,
        /// Bounding-box edge length in pixels.
        pub size: f32,
        /// Presented rotation in radians.
        pub rotation: f32,
        /// Current unit heading.
        pub direction: Vec2,
        /// Sight range in pixels.
        pub sight_range: f32,
        /// Attack range in pixels.
        pub attack_range: f32,
        /// Last position the player was seen at while chasing.
        pub last_seen: Option<Vec2>,
        /// Current patrol waypoint, if a route is assigned.
        pub patrol_target: Option<Vec2>,
        /// Whether a patrol route has been assigned.
        pub has_patrol_route: bool,
        /// Timestamp of the last hit flash, if still visible.
        pub hit_flash: Option<Duration>,
        /// Position the enemy spawned at; guards return to it.
        pub home: Vec2,
    }

    impl EnemySnapshot {
        /// Pixel-space center of the enemy's bounding box.
        #[must_use]
        pub fn center(&self) -> Vec2 {
            self.position + Vec2::splat(self.size / 2.0)
        }
    }

    /// Read-only snapshot describing all enemies, in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Builds a view directly from snapshots. System tests use this to
        /// exercise steering without driving a full world.
        #[must_use]
        pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
            snapshots.sort_by_key(|snapshot| snapshot.id);
            Self { snapshots }
        }

        /// Iterator over the captured enemy snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured snapshots.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether the view captured no enemies.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Snapshot of the enemy with the provided id, if present.
        #[must_use]
        pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }
    }

    /// Immutable representation of a spawner record used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct SpawnerSnapshot {
        /// Grid cell hosting the spawner.
        pub cell: TileCoord,
        /// Kind of enemy the spawner produces.
        pub kind: EnemyKind,
        /// Whether the spawner is still standing.
        pub active: bool,
        /// Remaining health.
        pub health: Health,
        /// Simulation-clock time of the last successful spawn.
        pub last_spawn: Option<Duration>,
    }

    /// Read-only snapshot describing all spawners, in deterministic order.
    #[derive(Clone, Debug, Default)]
    pub struct SpawnerView {
        snapshots: Vec<SpawnerSnapshot>,
    }

    impl SpawnerView {
        /// Builds a view directly from snapshots. System tests use this to
        /// exercise cadence without driving a full world.
        #[must_use]
        pub fn from_snapshots(mut snapshots: Vec<SpawnerSnapshot>) -> Self {
            snapshots.sort_by_key(|snapshot| snapshot.cell);
            Self { snapshots }
        }

        /// Iterator over the captured spawner snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &SpawnerSnapshot> {
            self.snapshots.iter()
        }

        /// Snapshot of the spawner at the provided cell, if present.
        #[must_use]
        pub fn get(&self, cell: TileCoord) -> Option<&SpawnerSnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
        }
    }

    /// Read-only view into the tile grid used by the pure systems.
    #[derive(Clone, Copy, Debug)]
    pub struct GridView<'a> {
        grid: &'a TileGrid,
        exit_unlocked: bool,
    }

    impl GridView<'_> {
        /// Number of tile columns in the grid.
        #[must_use]
        pub fn columns(&self) -> u32 {
            self.grid.columns()
        }

        /// Number of tile rows in the grid.
        #[must_use]
        pub fn rows(&self) -> u32 {
            self.grid.rows()
        }

        /// Total width of the grid in pixels.
        #[must_use]
        pub fn width(&self) -> f32 {
            self.grid.width()
        }

        /// Total height of the grid in pixels.
        #[must_use]
        pub fn height(&self) -> f32 {
            self.grid.height()
        }

        /// Tile code at the provided coordinate; out-of-range reads as wall.
        #[must_use]
        pub fn tile_at(&self, tile: TileCoord) -> TileCode {
            self.grid.tile_at(tile)
        }

        /// Reports whether a wall occupies the tile. This is the only code
        /// that blocks pathfinding expansion and line of sight.
        #[must_use]
        pub fn is_wall(&self, tile: TileCoord) -> bool {
            self.grid.tile_at(tile) == TileCode::Wall
        }

        /// Reports whether a grounded entity's tile is blocked.
        #[must_use]
        pub fn blocks_walk(&self, tile: TileCoord) -> bool {
            self.grid.blocks_walk(tile, self.exit_unlocked)
        }

        /// Entity-size-aware walkability check for a grounded entity.
        #[must_use]
        pub fn is_walkable(&self, position: Vec2, size: f32) -> bool {
            self.grid.is_walkable(position, size, self.exit_unlocked)
        }

        /// Line-of-sight check between two pixel-space points.
        #[must_use]
        pub fn line_of_sight(&self, from: Vec2, to: Vec2, phasing: bool) -> bool {
            self.grid.line_of_sight(from, to, phasing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::geometry::tile_center;

    fn level(rows: &[&str]) -> LevelDefinition {
        LevelDefinition {
            room: "test".to_owned(),
            kill_quota: 1,
            rows: rows.iter().map(|row| (*row).to_owned()).collect(),
        }
    }

    fn world_with(rows: &[&str]) -> World {
        let mut world = World::with_seed(7);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureLevel { level: level(rows) },
            &mut events,
        );
        world
    }

    fn spawn_one(world: &mut World, cell: TileCoord, kind: EnemyKind) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                spawner: cell,
                kind,
            },
            &mut events,
        );
        events
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("expected a spawned enemy")
    }

    #[test]
    fn destroying_a_spawner_rewrites_the_cell_and_blocks_respawns() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let cell = TileCoord::new(2, 1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageSpawner {
                cell,
                amount: SPAWNER_HEALTH.get(),
            },
            &mut events,
        );
        assert!(events.contains(&Event::SpawnerDestroyed { cell }));
        assert_eq!(world.grid.tile_at(cell), TileCode::Floor);

        // Re-destroying is a no-op.
        events.clear();
        apply(
            &mut world,
            Command::DamageSpawner { cell, amount: 10 },
            &mut events,
        );
        assert!(events.is_empty());

        // A queued spawn racing the destruction is rejected.
        events.clear();
        apply(
            &mut world,
            Command::SpawnEnemy {
                spawner: cell,
                kind: EnemyKind::Grunt,
            },
            &mut events,
        );
        assert!(events.iter().any(|event| matches!(
            event,
            Event::SpawnRejected {
                reason: SpawnError::InactiveSpawner,
                ..
            }
        )));
    }

    #[test]
    fn spawner_health_is_monotone_and_clamps_at_zero() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let cell = TileCoord::new(2, 1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageSpawner { cell, amount: 20 },
            &mut events,
        );
        let remaining = query::spawner_view(&world)
            .get(cell)
            .expect("spawner record")
            .health;
        assert_eq!(remaining, SPAWNER_HEALTH.saturating_sub(20));

        apply(
            &mut world,
            Command::DamageSpawner { cell, amount: 1000 },
            &mut events,
        );
        let snapshot = *query::spawner_view(&world).get(cell).expect("spawner record");
        assert!(snapshot.health.is_zero());
        assert!(!snapshot.active);
    }

    #[test]
    fn enemy_removal_awards_score_exactly_once() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let enemy = spawn_one(&mut world, TileCoord::new(2, 1), EnemyKind::Grunt);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageEnemy { enemy, amount: 99 },
            &mut events,
        );
        let died = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDied { .. }))
            .count();
        assert_eq!(died, 1);
        assert_eq!(
            query::player_snapshot(&world).score,
            EnemyKind::Grunt.stats().score
        );

        // Damaging the removed enemy is a no-op.
        events.clear();
        apply(
            &mut world,
            Command::DamageEnemy { enemy, amount: 1 },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn passive_drain_kills_the_player_exactly_once() {
        let mut world = world_with(&["####", "#P.#", "####"]);
        world.player.health = Health::new(1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::PlayerDied))
            .count();
        assert_eq!(deaths, 1);

        // Further ticks drain nothing and never re-announce the death.
        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        assert!(!events.iter().any(|event| matches!(event, Event::PlayerDied)));
    }

    #[test]
    fn ghost_moves_skip_walkability_but_stay_in_bounds() {
        let mut world = world_with(&["#####", "#.B.#", "#.P.#", "#####"]);
        let enemy = spawn_one(&mut world, TileCoord::new(2, 1), EnemyKind::Ghost);
        let wall = tile_center(TileCoord::new(0, 0)) - Vec2::splat(14.0);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEnemy {
                enemy,
                to: wall,
                direction: Vec2::new(-1.0, 0.0),
                rotation: 0.0,
                state: AiState::Chase,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyMoved { .. })));
    }

    #[test]
    fn grounded_moves_into_walls_hold_position_but_keep_steering() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let enemy = spawn_one(&mut world, TileCoord::new(2, 1), EnemyKind::Grunt);
        let before = query::enemy_view(&world)
            .get(enemy)
            .expect("snapshot")
            .position;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEnemy {
                enemy,
                to: Vec2::new(-100.0, -100.0),
                direction: Vec2::new(-1.0, 0.0),
                rotation: 1.0,
                state: AiState::Chase,
            },
            &mut events,
        );
        let view = query::enemy_view(&world);
        let after = view.get(enemy).expect("snapshot");
        assert_eq!(after.position, before);
        assert_eq!(after.direction, Vec2::new(-1.0, 0.0));
        assert_eq!(after.state, AiState::Chase);
    }

    #[test]
    fn door_opens_only_when_adjacent_with_a_key() {
        let mut world = world_with(&["#####", "#PDK#", "#####"]);
        let door = TileCoord::new(2, 1);
        let mut events = Vec::new();

        apply(&mut world, Command::OpenDoor { cell: door }, &mut events);
        assert!(events.contains(&Event::DoorRejected {
            cell: door,
            reason: DoorError::NoKey,
        }));

        world.player.keys = 1;
        events.clear();
        apply(&mut world, Command::OpenDoor { cell: door }, &mut events);
        assert!(events.contains(&Event::DoorOpened { cell: door }));
        assert_eq!(world.grid.tile_at(door), TileCode::Floor);
        assert_eq!(query::player_snapshot(&world).keys, 0);
    }

    #[test]
    fn pickups_mutate_player_state_and_consume_the_tile() {
        let mut world = world_with(&["#####", "#PKF#", "#####"]);
        world.player.health = Health::new(5);
        let key = TileCoord::new(2, 1);
        let food = TileCoord::new(3, 1);
        let mut events = Vec::new();

        apply(&mut world, Command::CollectPickup { cell: key }, &mut events);
        apply(&mut world, Command::CollectPickup { cell: food }, &mut events);

        let player = query::player_snapshot(&world);
        assert_eq!(player.keys, 1);
        assert_eq!(player.health, Health::new(5 + FOOD_HEAL));
        assert_eq!(world.grid.tile_at(key), TileCode::Floor);
        assert_eq!(world.grid.tile_at(food), TileCode::Floor);
    }

    #[test]
    fn hit_flash_clears_after_the_scheduled_task_fires() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let enemy = spawn_one(&mut world, TileCoord::new(2, 1), EnemyKind::Grunt);
        world.enemies[0].health = Health::new(5);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageEnemy { enemy, amount: 1 },
            &mut events,
        );
        assert!(query::enemy_view(&world)
            .get(enemy)
            .expect("snapshot")
            .hit_flash
            .is_some());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(200),
            },
            &mut events,
        );
        assert!(query::enemy_view(&world)
            .get(enemy)
            .expect("snapshot")
            .hit_flash
            .is_none());
    }

    #[test]
    fn unlock_exit_is_idempotent() {
        let mut world = world_with(&["####", "#P.#", "####"]);
        let mut events = Vec::new();
        apply(&mut world, Command::UnlockExit, &mut events);
        apply(&mut world, Command::UnlockExit, &mut events);
        let unlocked = events
            .iter()
            .filter(|event| matches!(event, Event::ExitUnlocked))
            .count();
        assert_eq!(unlocked, 1);
    }

    #[test]
    fn spawn_rejected_when_cell_was_rewritten() {
        let mut world = world_with(&["#####", "#.G.#", "#.P.#", "#####"]);
        let cell = TileCoord::new(2, 1);
        world.grid.destroy_tile(cell);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                spawner: cell,
                kind: EnemyKind::Grunt,
            },
            &mut events,
        );
        assert!(events.contains(&Event::SpawnRejected {
            cell,
            kind: EnemyKind::Grunt,
            reason: SpawnError::CellMismatch,
        }));
    }
}
