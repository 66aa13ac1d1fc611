//! Scripted stand-in for a human player.
//!
//! Drives toward the objective of the current mode and fires at the nearest
//! enemy in range. It only ever produces the input commands a keyboard
//! handler would, so the rest of the pipeline cannot tell it from a player.

use std::time::Duration;

use alley_tanks_core::{
    frames,
    geometry::{heading_of, planar_direction, planar_distance},
    Arena, Command, EnemySnapshot, EnemyView, GameMode, PlayerSnapshot, SessionSnapshot,
};
use glam::Vec3;

use crate::config::ScriptedPickup;

const CRUISE_SPEED: f32 = 0.5;
const ENGAGE_RANGE: f32 = 45.0;
const STANDOFF: f32 = 25.0;
const RELOAD: Duration = Duration::from_millis(250);
const MUZZLE_OFFSET: f32 = 2.5;

/// Deterministic player input generator.
#[derive(Debug)]
pub struct Autopilot {
    last_shot_at: Option<Duration>,
    pickups: Vec<ScriptedPickup>,
}

impl Autopilot {
    /// Creates an autopilot that collects `pickups` at their scheduled times.
    #[must_use]
    pub fn new(mut pickups: Vec<ScriptedPickup>) -> Self {
        pickups.sort_by_key(|pickup| std::cmp::Reverse(pickup.at_ms));
        Self {
            last_shot_at: None,
            pickups,
        }
    }

    /// Pushes the input commands for the step that ends at `now + dt`.
    #[allow(clippy::too_many_arguments)]
    pub fn drive(
        &mut self,
        now: Duration,
        dt: Duration,
        player: &PlayerSnapshot,
        enemies: &EnemyView,
        session: &SessionSnapshot,
        arena: &Arena,
        out: &mut Vec<Command>,
    ) {
        if session.game_over || !player.alive {
            return;
        }

        while let Some(pickup) = self.pickups.last().copied() {
            if Duration::from_millis(pickup.at_ms) > now {
                break;
            }
            let _ = self.pickups.pop();
            out.push(Command::CollectPowerUp { kind: pickup.kind });
        }

        let target = nearest(enemies, player.position);
        let destination = destination(session, arena, player.position, target);
        let step = CRUISE_SPEED * player.speed_multiplier * frames(dt);
        let offset = destination - player.position;
        let (position, heading) = if planar_distance(destination, player.position) > step {
            let direction = planar_direction(offset);
            (arena.clamp(player.position + direction * step), heading_of(direction))
        } else {
            (arena.clamp(destination), player.heading)
        };
        out.push(Command::SyncPlayer { position, heading });

        let Some(target) = target else {
            return;
        };
        if planar_distance(position, target.position) > ENGAGE_RANGE {
            return;
        }
        let ready = self
            .last_shot_at
            .map_or(true, |last| now.saturating_sub(last) >= RELOAD);
        if !ready {
            return;
        }

        let direction = planar_direction(target.position - position);
        if direction == Vec3::ZERO {
            return;
        }
        self.last_shot_at = Some(now);
        out.push(Command::FirePlayerProjectile {
            origin: position + direction * MUZZLE_OFFSET,
            direction,
        });
    }
}

fn nearest(enemies: &EnemyView, position: Vec3) -> Option<&EnemySnapshot> {
    enemies.iter().min_by(|a, b| {
        planar_distance(a.position, position).total_cmp(&planar_distance(b.position, position))
    })
}

fn destination(
    session: &SessionSnapshot,
    arena: &Arena,
    position: Vec3,
    target: Option<&EnemySnapshot>,
) -> Vec3 {
    match session.mode {
        GameMode::Survival => position,
        GameMode::TimeTrial => session
            .checkpoints
            .iter()
            .find(|checkpoint| !checkpoint.collected)
            .map_or_else(|| arena.gate_position(), |checkpoint| checkpoint.position),
        GameMode::Normal => match target {
            _ if session.has_key => arena.gate_position(),
            Some(enemy) => {
                let standoff = enemy.position + Vec3::new(0.0, 0.0, STANDOFF);
                if standoff.z < position.z {
                    Vec3::new(enemy.position.x, 0.0, standoff.z)
                } else {
                    position
                }
            }
            None => arena.gate_position(),
        },
    }
}
