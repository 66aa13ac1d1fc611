//! Level, wave and life bookkeeping plus the generation-keyed scheduler.

use std::time::Duration;

use alley_tanks_core::{
    Arena, Checkpoint, EnemyId, GameMode, GameOverStats, Generation, SessionSnapshot,
};

/// Progress of the running session.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) active: bool,
    pub(crate) mode: GameMode,
    pub(crate) level: u32,
    pub(crate) wave: u32,
    pub(crate) difficulty: f32,
    pub(crate) lives: u32,
    pub(crate) score: u32,
    pub(crate) has_key: bool,
    pub(crate) total_enemies: u32,
    pub(crate) remaining_enemies: u32,
    pub(crate) wave_in_progress: bool,
    pub(crate) checkpoints: Vec<Checkpoint>,
    pub(crate) game_over: bool,
    pub(crate) generation: Generation,
    pub(crate) level_started_at: Duration,
    pub(crate) started_at: Duration,
    pub(crate) enemies_defeated: u32,
}

impl Session {
    /// Idle session used before the first `StartSession`.
    pub(crate) fn idle() -> Self {
        Self {
            active: false,
            mode: GameMode::Normal,
            level: 1,
            wave: 0,
            difficulty: 1.0,
            lives: 0,
            score: 0,
            has_key: false,
            total_enemies: 0,
            remaining_enemies: 0,
            wave_in_progress: false,
            checkpoints: Vec::new(),
            game_over: false,
            generation: Generation::default(),
            level_started_at: Duration::ZERO,
            started_at: Duration::ZERO,
            enemies_defeated: 0,
        }
    }

    /// Resets every counter for a fresh session. The generation keeps counting
    /// so that work scheduled by the previous session stays stale.
    pub(crate) fn begin(&mut self, mode: GameMode, difficulty: f32, lives: u32, now: Duration) {
        let generation = self.generation.next();
        *self = Self {
            active: true,
            mode,
            difficulty,
            lives,
            generation,
            level_started_at: now,
            started_at: now,
            wave: if mode == GameMode::Survival { 1 } else { 0 },
            wave_in_progress: mode == GameMode::Survival,
            ..Self::idle()
        };
    }

    /// Whether gameplay commands are currently accepted.
    pub(crate) fn accepts_gameplay(&self) -> bool {
        self.active && !self.game_over
    }

    /// Clears per-level state when a level or attempt begins.
    pub(crate) fn reset_level(&mut self, arena: &Arena, now: Duration) {
        self.has_key = false;
        self.total_enemies = 0;
        self.remaining_enemies = 0;
        self.level_started_at = now;
        self.checkpoints = if self.mode == GameMode::TimeTrial {
            arena
                .checkpoint_positions()
                .into_iter()
                .map(|position| Checkpoint {
                    position,
                    collected: false,
                })
                .collect()
        } else {
            Vec::new()
        };
    }

    pub(crate) fn game_over_stats(&self, now: Duration) -> GameOverStats {
        GameOverStats {
            score: self.score,
            level: self.level,
            wave: self.wave,
            enemies_defeated: self.enemies_defeated,
            time_played: now.saturating_sub(self.started_at),
        }
    }

    pub(crate) fn snapshot(&self, now: Duration) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            level: self.level,
            wave: self.wave,
            difficulty: self.difficulty,
            lives: self.lives,
            score: self.score,
            has_key: self.has_key,
            total_enemies: self.total_enemies,
            remaining_enemies: self.remaining_enemies,
            wave_in_progress: self.wave_in_progress,
            checkpoints: self.checkpoints.clone(),
            game_over: self.game_over,
            generation: self.generation,
            now,
        }
    }
}

/// Deferred world action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ScheduledAction {
    StartWave { wave: u32 },
    EndTeleportEffect { enemy: EnemyId },
}

#[derive(Clone, Copy, Debug)]
struct ScheduledEntry {
    due: Duration,
    generation: Generation,
    action: ScheduledAction,
}

/// Timer queue driven by the simulation clock.
///
/// Every entry remembers the generation it was scheduled in; entries from an
/// older generation are discarded instead of executed.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    entries: Vec<ScheduledEntry>,
}

impl Scheduler {
    pub(crate) fn schedule(
        &mut self,
        due: Duration,
        generation: Generation,
        action: ScheduledAction,
    ) {
        self.entries.push(ScheduledEntry {
            due,
            generation,
            action,
        });
    }

    /// Removes every entry due at `now`, returning the actions still valid
    /// for `generation` in due order.
    pub(crate) fn drain_due(
        &mut self,
        now: Duration,
        generation: Generation,
    ) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        self.entries.retain(|entry| {
            if entry.due > now {
                return true;
            }
            if entry.generation == generation {
                due.push(*entry);
            } else {
                tracing::debug!(
                    action = ?entry.action,
                    scheduled_for = entry.generation.get(),
                    current = generation.get(),
                    "dropping stale scheduled action"
                );
            }
            false
        });
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.action).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_entries_are_dropped() {
        let mut scheduler = Scheduler::default();
        let old = Generation::new(1);
        let current = old.next();
        scheduler.schedule(Duration::from_secs(1), old, ScheduledAction::StartWave { wave: 2 });
        scheduler.schedule(
            Duration::from_secs(1),
            current,
            ScheduledAction::StartWave { wave: 3 },
        );

        let due = scheduler.drain_due(Duration::from_secs(2), current);
        assert_eq!(due, vec![ScheduledAction::StartWave { wave: 3 }]);
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn future_entries_stay_queued() {
        let mut scheduler = Scheduler::default();
        let generation = Generation::new(4);
        scheduler.schedule(
            Duration::from_secs(3),
            generation,
            ScheduledAction::EndTeleportEffect {
                enemy: EnemyId::new(7),
            },
        );
        assert!(scheduler.drain_due(Duration::from_secs(2), generation).is_empty());
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.drain_due(Duration::from_secs(3), generation).len(), 1);
    }

    #[test]
    fn begin_bumps_generation_and_prepares_survival() {
        let mut session = Session::idle();
        let before = session.generation;
        session.begin(GameMode::Survival, 1.0, 3, Duration::ZERO);
        assert!(session.generation > before);
        assert_eq!(session.wave, 1);
        assert!(session.wave_in_progress);
        assert!(session.accepts_gameplay());
    }
}
