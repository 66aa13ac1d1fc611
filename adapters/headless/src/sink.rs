//! Notification sink that logs HUD events.

use alley_tanks_core::{presentation::EventSink, GameOverStats, MessageKind};

/// Event sink that reports notifications through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink {
    messages: usize,
}

impl TracingSink {
    /// Creates a sink that has logged nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of player-facing messages logged so far.
    #[must_use]
    pub fn messages(&self) -> usize {
        self.messages
    }
}

impl EventSink for TracingSink {
    fn on_score(&mut self, points: u32) {
        tracing::debug!(points, "score");
    }

    fn on_enemy_defeated(&mut self, is_boss: bool) {
        tracing::debug!(is_boss, "enemy defeated");
    }

    fn on_message(&mut self, text: &str, kind: MessageKind) {
        self.messages += 1;
        match kind {
            MessageKind::Warning | MessageKind::Danger => tracing::warn!(?kind, "{text}"),
            MessageKind::Info | MessageKind::Success => tracing::info!(?kind, "{text}"),
        }
    }

    fn on_level_advance(&mut self, level: u32) {
        tracing::info!(level, "level advanced");
    }

    fn on_game_over(&mut self, stats: &GameOverStats) {
        tracing::info!(
            score = stats.score,
            level = stats.level,
            wave = stats.wave,
            enemies_defeated = stats.enemies_defeated,
            time_played_ms = stats.time_played.as_millis() as u64,
            "game over"
        );
    }
}
