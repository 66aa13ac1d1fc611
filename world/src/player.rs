//! Mirror of the externally driven player tank.

use std::time::Duration;

use alley_tanks_core::{Aabb, PlayerCollider, PlayerSnapshot, PowerUpKind, PLAYER_MAX_HEALTH};
use glam::Vec3;

const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(1.5, 1.0, 2.0);
const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
const ATTACK_BOOST_MULTIPLIER: f32 = 2.0;
const REPAIR_AMOUNT: u32 = 30;

#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub(crate) position: Vec3,
    pub(crate) heading: f32,
    pub(crate) health: u32,
    pub(crate) alive: bool,
    speed_boost_until: Option<Duration>,
    attack_boost_until: Option<Duration>,
    shield_until: Option<Duration>,
}

/// Outcome of applying damage to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DamageOutcome {
    pub(crate) applied: u32,
    pub(crate) destroyed: bool,
}

impl PlayerState {
    pub(crate) fn new(start: Vec3) -> Self {
        Self {
            position: start,
            heading: std::f32::consts::PI,
            health: PLAYER_MAX_HEALTH,
            alive: true,
            speed_boost_until: None,
            attack_boost_until: None,
            shield_until: None,
        }
    }

    /// Restores the tank for a fresh attempt.
    pub(crate) fn respawn(&mut self, start: Vec3) {
        *self = Self::new(start);
    }

    pub(crate) fn activate(&mut self, kind: PowerUpKind, now: Duration) {
        let until = kind.duration().map(|duration| now.saturating_add(duration));
        match kind {
            PowerUpKind::SpeedBoost => self.speed_boost_until = until,
            PowerUpKind::AttackBoost => self.attack_boost_until = until,
            PowerUpKind::Shield => self.shield_until = until,
            PowerUpKind::Repair => {
                self.health = self.health.saturating_add(REPAIR_AMOUNT).min(PLAYER_MAX_HEALTH);
            }
        }
    }

    /// Drops power-ups whose duration elapsed and reports them.
    pub(crate) fn expire(&mut self, now: Duration) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for (slot, kind) in [
            (&mut self.speed_boost_until, PowerUpKind::SpeedBoost),
            (&mut self.attack_boost_until, PowerUpKind::AttackBoost),
            (&mut self.shield_until, PowerUpKind::Shield),
        ] {
            if slot.is_some_and(|until| now >= until) {
                *slot = None;
                expired.push(kind);
            }
        }
        expired
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        if self.speed_boost_until.is_some() {
            SPEED_BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    pub(crate) fn attack_multiplier(&self) -> f32 {
        if self.attack_boost_until.is_some() {
            ATTACK_BOOST_MULTIPLIER
        } else {
            1.0
        }
    }

    pub(crate) fn shielded(&self) -> bool {
        self.shield_until.is_some()
    }

    /// Applies damage, honouring the shield. Dead tanks take no damage.
    pub(crate) fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome {
                applied: 0,
                destroyed: false,
            };
        }

        let applied = if self.shielded() { 0 } else { amount.min(self.health) };
        self.health -= applied;
        let destroyed = self.health == 0;
        if destroyed {
            self.alive = false;
        }
        DamageOutcome { applied, destroyed }
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, PLAYER_HALF_EXTENTS)
    }

    pub(crate) fn collider(&self) -> PlayerCollider {
        PlayerCollider {
            bounds: self.bounds(),
            alive: self.alive,
        }
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            heading: self.heading,
            health: self.health,
            alive: self.alive,
            speed_multiplier: self.speed_multiplier(),
            attack_multiplier: self.attack_multiplier(),
            shielded: self.shielded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shield_blocks_damage_until_it_expires() {
        let mut player = PlayerState::new(Vec3::ZERO);
        player.activate(PowerUpKind::Shield, Duration::ZERO);
        assert_eq!(player.apply_damage(40).applied, 0);
        assert_eq!(player.health, PLAYER_MAX_HEALTH);

        assert_eq!(player.expire(Duration::from_secs(5)), vec![PowerUpKind::Shield]);
        assert_eq!(player.apply_damage(40).applied, 40);
        assert_eq!(player.health, 60);
    }

    #[test]
    fn lethal_damage_reports_destruction_once() {
        let mut player = PlayerState::new(Vec3::ZERO);
        let outcome = player.apply_damage(250);
        assert_eq!(
            outcome,
            DamageOutcome {
                applied: PLAYER_MAX_HEALTH,
                destroyed: true,
            }
        );
        assert!(!player.alive);
        assert!(!player.apply_damage(10).destroyed);
    }

    #[test]
    fn repair_is_capped_at_max_health() {
        let mut player = PlayerState::new(Vec3::ZERO);
        let _ = player.apply_damage(10);
        player.activate(PowerUpKind::Repair, Duration::ZERO);
        assert_eq!(player.health, PLAYER_MAX_HEALTH);
    }

    #[test]
    fn boosts_raise_multipliers() {
        let mut player = PlayerState::new(Vec3::ZERO);
        player.activate(PowerUpKind::AttackBoost, Duration::ZERO);
        player.activate(PowerUpKind::SpeedBoost, Duration::ZERO);
        assert!((player.attack_multiplier() - 2.0).abs() < f32::EPSILON);
        assert!((player.speed_multiplier() - 1.5).abs() < f32::EPSILON);
    }
}
