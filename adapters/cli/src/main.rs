#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the dungeon simulation headlessly.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dungeon_crawl_cli::{level_transfer, Session};
use dungeon_crawl_core::{Event, InputState, LevelDefinition, WELCOME_BANNER};
use dungeon_crawl_world::query;

#[derive(Debug, Parser)]
#[command(name = "dungeon-crawl", about = "Headless dungeon crawl simulation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Simulates a number of frames with scripted input and prints a summary.
    Run {
        /// Number of frames to simulate.
        #[arg(long, default_value_t = 300)]
        frames: u32,
        /// Frames per second of simulated time.
        #[arg(long, default_value_t = 20)]
        fps: u32,
        /// Seed for the deterministic random streams.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Path to a level definition in JSON form.
        #[arg(long, conflicts_with = "code")]
        level: Option<PathBuf>,
        /// Shareable level code produced by the encode subcommand.
        #[arg(long)]
        code: Option<String>,
    },
    /// Encodes a JSON level definition into a shareable level code.
    Encode {
        /// Path to a level definition in JSON form.
        path: PathBuf,
    },
    /// Decodes a shareable level code back into its JSON definition.
    Decode {
        /// The level code to decode.
        code: String,
    },
}

/// Entry point for the dungeon crawl command-line interface.
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        None => {
            println!("{WELCOME_BANNER}");
            Ok(())
        }
        Some(Mode::Run {
            frames,
            fps,
            seed,
            level,
            code,
        }) => run(frames, fps, seed, level, code),
        Some(Mode::Encode { path }) => {
            let level = load_level(&path)?;
            println!("{}", level_transfer::encode(&level));
            Ok(())
        }
        Some(Mode::Decode { code }) => {
            let level = level_transfer::decode(&code).context("level code rejected")?;
            let json =
                serde_json::to_string_pretty(&level).context("level serialization failed")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn run(
    frames: u32,
    fps: u32,
    seed: u64,
    level: Option<PathBuf>,
    code: Option<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(fps > 0, "fps must be positive");
    let dt = Duration::from_secs_f64(1.0 / f64::from(fps));

    let mut session = match (level, code) {
        (Some(path), _) => Session::with_level(seed, load_level(&path)?),
        (None, Some(code)) => {
            let level = level_transfer::decode(&code).context("level code rejected")?;
            Session::with_level(seed, level)
        }
        (None, None) => Session::new(seed),
    };
    log::info!("simulating {frames} frames at {fps} fps with seed {seed}");

    println!("{}", query::welcome_banner(session.world()));
    let mut tally = EventTally::default();
    for frame in 0..frames {
        let input = scripted_input(frame, fps);
        let events = session.advance_frame(&input, dt);
        tally.absorb(&events);
    }

    let player = query::player_snapshot(session.world());
    if !player.alive {
        log::warn!("the player fell before the scripted run finished");
    }
    println!("room: {}", query::room(session.world()));
    println!(
        "simulated {frames} frames ({:.1} s)",
        dt.as_secs_f64() * f64::from(frames)
    );
    println!(
        "player: health {}/{} score {} keys {} alive {}",
        player.health.get(),
        player.max_health.get(),
        player.score,
        player.keys,
        player.alive
    );
    println!(
        "enemies: {} spawned, {} slain, {} on the field",
        tally.spawned,
        tally.slain,
        query::enemy_view(session.world()).len()
    );
    println!(
        "spawners destroyed: {}, pickups collected: {}, doors opened: {}",
        tally.spawners_destroyed, tally.pickups, tally.doors
    );
    if tally.exit_unlocked {
        println!("exit unlocked");
    }
    if tally.exit_reached {
        println!("exit reached");
    }
    Ok(())
}

/// Deterministic input script: walk a different direction each second and
/// swing on every fourth frame.
fn scripted_input(frame: u32, fps: u32) -> InputState {
    let second = frame / fps.max(1);
    let mut input = InputState {
        attack: frame % 4 == 0,
        ..InputState::default()
    };
    match second % 4 {
        0 => input.right = true,
        1 => input.down = true,
        2 => input.left = true,
        _ => input.up = true,
    }
    input
}

fn load_level(path: &PathBuf) -> anyhow::Result<LevelDefinition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read level file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("could not parse level file {}", path.display()))
}

#[derive(Debug, Default)]
struct EventTally {
    spawned: u32,
    slain: u32,
    spawners_destroyed: u32,
    pickups: u32,
    doors: u32,
    exit_unlocked: bool,
    exit_reached: bool,
}

impl EventTally {
    fn absorb(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyDied { .. } => self.slain += 1,
                Event::SpawnerDestroyed { .. } => self.spawners_destroyed += 1,
                Event::PickupCollected { .. } => self.pickups += 1,
                Event::DoorOpened { .. } => self.doors += 1,
                Event::ExitUnlocked => self.exit_unlocked = true,
                Event::ExitReached => self.exit_reached = true,
                _ => {}
            }
        }
    }
}
