#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progression system that drives the per-mode session state machine.
//!
//! The controller never mutates the session itself. It inspects the latest
//! snapshot after every event batch and requests the transitions the rules
//! allow: unlocking the gate, collecting checkpoints, passing or bouncing off
//! the gate, closing survival waves and consuming lives. The world guards
//! every transition, so repeated requests from consecutive ticks are no-ops.

use alley_tanks_core::{
    geometry::planar_distance, Arena, Command, Event, GameMode, PlayerSnapshot, SessionSnapshot,
    CHECKPOINT_RADIUS, GATE_TRIGGER_DISTANCE,
};

/// Progression controller shared by every game mode.
#[derive(Debug, Default)]
pub struct Progression;

impl Progression {
    /// Creates a new progression controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits the session transitions implied by `events` and the current state.
    pub fn handle(
        &mut self,
        events: &[Event],
        session: &SessionSnapshot,
        player: &PlayerSnapshot,
        arena: &Arena,
        out: &mut Vec<Command>,
    ) {
        if events.is_empty() || session.game_over {
            return;
        }

        for event in events {
            if let Event::PlayerDestroyed { generation } = *event {
                out.push(Command::LoseLife { generation });
            }
        }

        if !player.alive {
            return;
        }

        if session.mode == GameMode::TimeTrial {
            collect_checkpoints(session, player, out);
        }

        if !session.has_key && session.unlock_condition_met() {
            tracing::debug!(mode = session.mode.label(), "unlock condition met");
            out.push(Command::GrantKey);
        }

        match session.mode {
            GameMode::Normal | GameMode::TimeTrial => gate(session, player, arena, out),
            GameMode::Survival => {
                if session.wave_in_progress
                    && session.total_enemies > 0
                    && session.remaining_enemies == 0
                {
                    out.push(Command::CompleteWave { wave: session.wave });
                }
            }
        }
    }
}

fn collect_checkpoints(session: &SessionSnapshot, player: &PlayerSnapshot, out: &mut Vec<Command>) {
    for (index, checkpoint) in session.checkpoints.iter().enumerate() {
        if !checkpoint.collected
            && planar_distance(checkpoint.position, player.position) <= CHECKPOINT_RADIUS
        {
            out.push(Command::CollectCheckpoint { index });
        }
    }
}

fn gate(session: &SessionSnapshot, player: &PlayerSnapshot, arena: &Arena, out: &mut Vec<Command>) {
    if planar_distance(player.position, arena.gate_position()) > GATE_TRIGGER_DISTANCE {
        return;
    }

    // The key may be granted by a command earlier in this batch; the advance
    // then goes through on the next pump once the snapshot shows it.
    if session.has_key {
        out.push(Command::AdvanceLevel {
            from_level: session.level,
        });
    } else if !session.unlock_condition_met() {
        out.push(Command::BlockAtGate);
    }
}
