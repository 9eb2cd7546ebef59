#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless session driver and shareable level codes.
//!
//! [`Session`] hosts the per-frame orchestration: input flows through the
//! movement system, then enemy behavior, combat, spawning and progress, with
//! the world applying each stage's command batch before the next stage runs.
//! Later stages therefore observe the current frame's movement results.

use std::time::Duration;

use dungeon_crawl_core::{Command, Event, InputState, LevelDefinition};
use dungeon_crawl_system_combat::Combat;
use dungeon_crawl_system_enemy_ai::EnemyAi;
use dungeon_crawl_system_movement::Movement;
use dungeon_crawl_system_progress::Progress;
use dungeon_crawl_system_spawning::Spawning;
use dungeon_crawl_world::{apply, query, World};

pub mod level_transfer;

/// A running simulation: the world plus one instance of every system.
#[derive(Debug)]
pub struct Session {
    world: World,
    movement: Movement,
    enemy_ai: EnemyAi,
    combat: Combat,
    spawning: Spawning,
    progress: Progress,
    pending_events: Vec<Event>,
}

impl Session {
    /// Boots a session on the built-in starter room.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::build(seed, None)
    }

    /// Boots a session on the provided level.
    #[must_use]
    pub fn with_level(seed: u64, level: LevelDefinition) -> Self {
        Self::build(seed, Some(level))
    }

    fn build(seed: u64, level: Option<LevelDefinition>) -> Self {
        let mut world = World::with_seed(seed);
        let mut pending_events = Vec::new();
        match level {
            Some(level) => {
                apply(&mut world, Command::ConfigureLevel { level }, &mut pending_events);
            }
            None => {
                // The systems still need to observe the initial level load.
                pending_events.push(Event::LevelConfigured {
                    room: query::room(&world).to_owned(),
                    columns: query::grid_view(&world).columns(),
                    rows: query::grid_view(&world).rows(),
                    kill_quota: query::kill_quota(&world),
                });
            }
        }
        Self {
            world,
            movement: Movement::default(),
            enemy_ai: EnemyAi::new(seed.wrapping_add(1)),
            combat: Combat::new(seed.wrapping_add(2)),
            spawning: Spawning::new(),
            progress: Progress::new(),
            pending_events,
        }
    }

    /// Read-only access to the hosted world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances the simulation one frame and returns its event batch.
    pub fn advance_frame(&mut self, input: &InputState, dt: Duration) -> Vec<Event> {
        let mut events = std::mem::take(&mut self.pending_events);
        apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();

        {
            let player = query::player_snapshot(&self.world);
            self.movement.handle(input, &player, dt, &mut commands);
        }
        self.flush(&mut commands, &mut events);

        {
            let player = query::player_snapshot(&self.world);
            let enemies = query::enemy_view(&self.world);
            let grid = query::grid_view(&self.world);
            self.enemy_ai.handle(
                &events,
                &player,
                &enemies,
                &grid,
                query::clock(&self.world),
                dt,
                &mut commands,
            );
        }
        self.flush(&mut commands, &mut events);

        {
            let player = query::player_snapshot(&self.world);
            let enemies = query::enemy_view(&self.world);
            let grid = query::grid_view(&self.world);
            self.combat.handle(
                &events,
                input,
                &player,
                &enemies,
                &grid,
                query::clock(&self.world),
                &mut commands,
            );
        }
        self.flush(&mut commands, &mut events);

        {
            let spawners = query::spawner_view(&self.world);
            self.spawning
                .handle(&events, &spawners, query::clock(&self.world), &mut commands);
        }
        self.flush(&mut commands, &mut events);

        self.progress.handle(&events, &mut commands);
        self.flush(&mut commands, &mut events);

        events
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            apply(&mut self.world, command, events);
        }
    }
}
