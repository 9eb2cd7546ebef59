#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawner cadence: emits spawn requests when per-spawner intervals elapse.
//!
//! Cadence lives here as explicit due-times on the simulation clock; the
//! world re-validates each request at apply time, so a spawner destroyed
//! while a request was queued rejects cleanly instead of producing an
//! orphaned enemy.

use std::time::Duration;

use dungeon_crawl_core::{Command, EnemyKind, Event, TileCoord};
use dungeon_crawl_world::query::SpawnerView;

#[derive(Clone, Copy, Debug)]
struct Cadence {
    cell: TileCoord,
    kind: EnemyKind,
    next_due: Duration,
}

/// Pure system tracking one due-time per live spawner.
#[derive(Debug, Default)]
pub struct Spawning {
    records: Vec<Cadence>,
}

impl Spawning {
    /// Creates the system with no tracked spawners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the spawner view to emit due spawn requests.
    ///
    /// A fresh spawner waits one full interval before its first spawn. The
    /// next due-time is pushed forward at emission, not at confirmation, so
    /// a rejected request simply skips that interval.
    pub fn handle(
        &mut self,
        events: &[Event],
        spawners: &SpawnerView,
        clock: Duration,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelConfigured { .. } => self.records.clear(),
                Event::SpawnerDestroyed { cell } => {
                    self.records.retain(|record| record.cell != *cell);
                }
                _ => {}
            }
        }

        // Track spawners that appeared since the last frame.
        for spawner in spawners.iter() {
            if !spawner.active {
                continue;
            }
            let Some(interval) = spawner.kind.spawn_interval() else {
                continue;
            };
            if self.records.iter().any(|record| record.cell == spawner.cell) {
                continue;
            }
            self.records.push(Cadence {
                cell: spawner.cell,
                kind: spawner.kind,
                next_due: clock + interval,
            });
        }

        for record in &mut self.records {
            if clock < record.next_due {
                continue;
            }
            let Some(interval) = record.kind.spawn_interval() else {
                continue;
            };
            record.next_due = clock + interval;
            out.push(Command::SpawnEnemy {
                spawner: record.cell,
                kind: record.kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::EnemyKind;
    use dungeon_crawl_world::query::SpawnerSnapshot;

    fn view(snapshots: Vec<SpawnerSnapshot>) -> SpawnerView {
        SpawnerView::from_snapshots(snapshots)
    }

    fn spawner(cell: TileCoord, kind: EnemyKind, active: bool) -> SpawnerSnapshot {
        SpawnerSnapshot {
            cell,
            kind,
            active,
            health: dungeon_crawl_core::Health::new(50),
            last_spawn: None,
        }
    }

    #[test]
    fn first_spawn_waits_one_full_interval() {
        let mut spawning = Spawning::new();
        let cell = TileCoord::new(2, 1);
        let spawners = view(vec![spawner(cell, EnemyKind::Grunt, true)]);
        let mut out = Vec::new();

        spawning.handle(&[], &spawners, Duration::ZERO, &mut out);
        assert!(out.is_empty());

        spawning.handle(&[], &spawners, Duration::from_millis(3999), &mut out);
        assert!(out.is_empty());

        spawning.handle(&[], &spawners, Duration::from_millis(4000), &mut out);
        assert_eq!(
            out,
            vec![Command::SpawnEnemy {
                spawner: cell,
                kind: EnemyKind::Grunt,
            }]
        );
    }

    #[test]
    fn interval_restarts_from_emission() {
        let mut spawning = Spawning::new();
        let cell = TileCoord::new(1, 1);
        let spawners = view(vec![spawner(cell, EnemyKind::Ghost, true)]);
        let mut out = Vec::new();

        spawning.handle(&[], &spawners, Duration::ZERO, &mut out);
        spawning.handle(&[], &spawners, Duration::from_millis(2500), &mut out);
        assert_eq!(out.len(), 1);

        // A frame shortly after the emission must stay quiet.
        out.clear();
        spawning.handle(&[], &spawners, Duration::from_millis(2600), &mut out);
        assert!(out.is_empty());

        out.clear();
        spawning.handle(&[], &spawners, Duration::from_millis(5000), &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn destroyed_spawners_stop_spawning() {
        let mut spawning = Spawning::new();
        let cell = TileCoord::new(1, 1);
        let live = view(vec![spawner(cell, EnemyKind::Ghost, true)]);
        let dead = view(vec![spawner(cell, EnemyKind::Ghost, false)]);
        let mut out = Vec::new();

        spawning.handle(&[], &live, Duration::ZERO, &mut out);
        spawning.handle(
            &[Event::SpawnerDestroyed { cell }],
            &dead,
            Duration::from_millis(1000),
            &mut out,
        );
        spawning.handle(&[], &dead, Duration::from_secs(30), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn level_reconfiguration_resets_cadence() {
        let mut spawning = Spawning::new();
        let cell = TileCoord::new(1, 1);
        let spawners = view(vec![spawner(cell, EnemyKind::Ghost, true)]);
        let mut out = Vec::new();

        spawning.handle(&[], &spawners, Duration::from_secs(100), &mut out);
        let reconfigure = Event::LevelConfigured {
            room: "next".to_owned(),
            columns: 4,
            rows: 4,
            kill_quota: 1,
        };
        // The old due-time is discarded; the spawner re-registers fresh.
        spawning.handle(&[reconfigure], &spawners, Duration::from_secs(101), &mut out);
        assert!(out.is_empty());

        spawning.handle(&[], &spawners, Duration::from_millis(103_500), &mut out);
        assert_eq!(out.len(), 1);
    }
}
