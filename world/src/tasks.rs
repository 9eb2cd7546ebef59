//! Scheduled-task queue drained once per frame.
//!
//! Replaces the original's fire-and-forget wall-clock timers with explicit
//! due-times on the simulation clock. Each drained task is re-checked against
//! current world state before acting, so a task whose target disappeared
//! while pending is a safe no-op.

use std::time::Duration;

use dungeon_crawl_core::EnemyId;

/// Timed follow-up actions the world schedules against its own clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TaskKind {
    /// Revert the player's transient hurt animation state.
    ClearPlayerHurt,
    /// Clear the player's hit flash.
    ClearPlayerFlash,
    /// Expire the player's chest attack buff.
    ClearAttackBuff,
    /// Clear an enemy's hit flash; no-op if the enemy is gone.
    ClearEnemyFlash(EnemyId),
}

#[derive(Clone, Copy, Debug)]
struct Task {
    due: Duration,
    kind: TaskKind,
}

/// Queue of pending timed tasks ordered by due time at drain.
#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    /// Schedules a task to fire once the clock reaches `due`.
    pub(crate) fn schedule(&mut self, due: Duration, kind: TaskKind) {
        self.tasks.push(Task { due, kind });
    }

    /// Removes and returns every task due at or before `now`, oldest first.
    pub(crate) fn drain_due(&mut self, now: Duration) -> Vec<TaskKind> {
        let mut due: Vec<Task> = Vec::new();
        self.tasks.retain(|task| {
            if task.due <= now {
                due.push(*task);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|task| task.due);
        due.into_iter().map(|task| task.kind).collect()
    }

    /// Discards every pending task. Used when a level is reconfigured.
    pub(crate) fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_tasks_in_order() {
        let mut queue = TaskQueue::default();
        queue.schedule(Duration::from_millis(300), TaskKind::ClearPlayerHurt);
        queue.schedule(Duration::from_millis(100), TaskKind::ClearPlayerFlash);
        queue.schedule(Duration::from_millis(900), TaskKind::ClearAttackBuff);

        let drained = queue.drain_due(Duration::from_millis(500));
        assert_eq!(
            drained,
            vec![TaskKind::ClearPlayerFlash, TaskKind::ClearPlayerHurt]
        );

        let drained = queue.drain_due(Duration::from_millis(1000));
        assert_eq!(drained, vec![TaskKind::ClearAttackBuff]);
        assert!(queue.drain_due(Duration::from_secs(10)).is_empty());
    }
}
