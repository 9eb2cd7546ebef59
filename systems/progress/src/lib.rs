#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progress: counts kills against the quota and unlocks the exit.

use dungeon_crawl_core::{Command, Event};

/// Pure system that observes kill events and requests the exit unlock.
#[derive(Debug, Default)]
pub struct Progress {
    kills: u32,
    quota: u32,
    unlocked: bool,
}

impl Progress {
    /// Creates the system with no level loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills counted toward the current level's quota.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Consumes world events, emitting `UnlockExit` once the quota is met.
    ///
    /// Self-destructing enemies despawn without dying and never count.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelConfigured { kill_quota, .. } => {
                    self.kills = 0;
                    self.quota = *kill_quota;
                    self.unlocked = false;
                }
                Event::EnemyDied { .. } => {
                    self.kills = self.kills.saturating_add(1);
                }
                _ => {}
            }
        }

        if !self.unlocked && self.quota > 0 && self.kills >= self.quota {
            self.unlocked = true;
            out.push(Command::UnlockExit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_crawl_core::{EnemyId, EnemyKind, Vec2};

    fn configured(quota: u32) -> Event {
        Event::LevelConfigured {
            room: "crypt".to_owned(),
            columns: 8,
            rows: 8,
            kill_quota: quota,
        }
    }

    fn died(id: u32) -> Event {
        Event::EnemyDied {
            enemy: EnemyId::new(id),
            kind: EnemyKind::Grunt,
            position: Vec2::ZERO,
        }
    }

    #[test]
    fn unlocks_exactly_once_when_quota_met() {
        let mut progress = Progress::new();
        let mut out = Vec::new();

        progress.handle(&[configured(2)], &mut out);
        progress.handle(&[died(1)], &mut out);
        assert!(out.is_empty());

        progress.handle(&[died(2)], &mut out);
        assert_eq!(out, vec![Command::UnlockExit]);

        out.clear();
        progress.handle(&[died(3)], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn despawns_do_not_count() {
        let mut progress = Progress::new();
        let mut out = Vec::new();
        progress.handle(&[configured(1)], &mut out);
        progress.handle(
            &[Event::EnemyDespawned {
                enemy: EnemyId::new(1),
            }],
            &mut out,
        );
        assert!(out.is_empty());
        assert_eq!(progress.kills(), 0);
    }

    #[test]
    fn reconfiguration_resets_the_count() {
        let mut progress = Progress::new();
        let mut out = Vec::new();
        progress.handle(&[configured(1), died(1)], &mut out);
        assert_eq!(out, vec![Command::UnlockExit]);

        out.clear();
        progress.handle(&[configured(1)], &mut out);
        assert!(out.is_empty());
        assert_eq!(progress.kills(), 0);

        progress.handle(&[died(2)], &mut out);
        assert_eq!(out, vec![Command::UnlockExit]);
    }

    #[test]
    fn zero_quota_levels_never_unlock_through_progress() {
        let mut progress = Progress::new();
        let mut out = Vec::new();
        progress.handle(&[configured(0), died(1)], &mut out);
        assert!(out.is_empty());
    }
}
