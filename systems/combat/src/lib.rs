#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves projectile collisions into damage commands.

use alley_tanks_core::{Command, CollisionView, EnemyId, Event, Owner, ProjectileSnapshot};

/// Combat resolver that matches projectiles against bounding volumes.
///
/// Each projectile resolves at most one hit per tick. Player bolts only hit
/// enemies and enemy bolts only hit the player.
#[derive(Debug, Default)]
pub struct CombatResolver {
    health: Vec<(EnemyId, u32)>,
}

impl CombatResolver {
    /// Creates a new resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits damage commands for every projectile overlapping a valid target.
    ///
    /// Collisions are only resolved for batches that advanced time.
    pub fn handle(&mut self, events: &[Event], view: &CollisionView, out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.health.clear();
        self.health.extend(
            view.enemies()
                .iter()
                .filter(|enemy| enemy.bounds.is_finite())
                .map(|enemy| (enemy.id, enemy.health)),
        );

        for projectile in view.projectiles() {
            if !projectile.position.is_finite() || !projectile.bounds.is_finite() {
                tracing::warn!(
                    projectile = projectile.id.get(),
                    "discarding projectile with invalid transform"
                );
                out.push(Command::DiscardProjectile {
                    projectile: projectile.id,
                });
                continue;
            }

            match projectile.owner {
                Owner::Player => self.resolve_player_bolt(projectile, view, out),
                Owner::Enemy(_) => {
                    let player = view.player();
                    if player.alive
                        && player.bounds.is_finite()
                        && projectile.bounds.intersects(&player.bounds)
                    {
                        out.push(Command::DamagePlayer {
                            projectile: projectile.id,
                        });
                    }
                }
            }
        }
    }

    fn resolve_player_bolt(
        &mut self,
        projectile: &ProjectileSnapshot,
        view: &CollisionView,
        out: &mut Vec<Command>,
    ) {
        for enemy in view.enemies() {
            if !projectile.bounds.intersects(&enemy.bounds) {
                continue;
            }
            let Some(health) = self.remaining_health(enemy.id) else {
                continue;
            };
            if *health == 0 {
                continue;
            }

            *health = health.saturating_sub(projectile.damage);
            out.push(Command::DamageEnemy {
                enemy: enemy.id,
                projectile: projectile.id,
            });
            break;
        }
    }

    fn remaining_health(&mut self, enemy: EnemyId) -> Option<&mut u32> {
        self.health
            .binary_search_by_key(&enemy, |(id, _)| *id)
            .ok()
            .map(|index| &mut self.health[index].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use alley_tanks_core::{
        Aabb, EnemyCollider, EnemyTier, PlayerCollider, ProjectileId,
    };
    use glam::Vec3;

    fn tick() -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16),
            now: Duration::from_millis(16),
        }]
    }

    fn bolt(id: u32, owner: Owner, position: Vec3, damage: u32) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(id),
            owner,
            position,
            direction: Vec3::Z,
            damage,
            age: Duration::ZERO,
            bounds: Aabb::from_center(position, Vec3::splat(0.25)),
        }
    }

    fn tank(id: u32, position: Vec3, health: u32) -> EnemyCollider {
        EnemyCollider {
            id: EnemyId::new(id),
            tier: EnemyTier::Normal,
            health,
            bounds: Aabb::from_center(position, EnemyTier::Normal.half_extents()),
        }
    }

    fn player_at(position: Vec3) -> PlayerCollider {
        PlayerCollider {
            bounds: Aabb::from_center(position, Vec3::new(1.5, 1.0, 2.0)),
            alive: true,
        }
    }

    #[test]
    fn projectile_hits_at_most_one_overlapping_enemy() {
        let view = CollisionView::new(
            vec![bolt(0, Owner::Player, Vec3::new(0.0, 0.0, -10.0), 15)],
            vec![
                tank(2, Vec3::new(0.5, 0.0, -10.0), 100),
                tank(1, Vec3::new(-0.5, 0.0, -10.0), 100),
            ],
            player_at(Vec3::ZERO),
        );
        let mut out = Vec::new();
        CombatResolver::new().handle(&tick(), &view, &mut out);
        assert_eq!(
            out,
            vec![Command::DamageEnemy {
                enemy: EnemyId::new(1),
                projectile: ProjectileId::new(0),
            }]
        );
    }

    #[test]
    fn bolts_skip_enemies_already_finished_this_tick() {
        let view = CollisionView::new(
            vec![
                bolt(0, Owner::Player, Vec3::new(0.0, 0.0, -10.0), 15),
                bolt(1, Owner::Player, Vec3::new(0.2, 0.0, -10.0), 15),
            ],
            vec![
                tank(1, Vec3::new(0.0, 0.0, -10.0), 10),
                tank(2, Vec3::new(1.0, 0.0, -10.0), 100),
            ],
            player_at(Vec3::ZERO),
        );
        let mut out = Vec::new();
        CombatResolver::new().handle(&tick(), &view, &mut out);
        assert_eq!(
            out,
            vec![
                Command::DamageEnemy {
                    enemy: EnemyId::new(1),
                    projectile: ProjectileId::new(0),
                },
                Command::DamageEnemy {
                    enemy: EnemyId::new(2),
                    projectile: ProjectileId::new(1),
                },
            ]
        );
    }

    #[test]
    fn no_friendly_fire() {
        let view = CollisionView::new(
            vec![
                bolt(0, Owner::Enemy(EnemyId::new(1)), Vec3::new(0.0, 0.0, -10.0), 10),
                bolt(1, Owner::Player, Vec3::ZERO, 15),
            ],
            vec![tank(1, Vec3::new(0.0, 0.0, -10.0), 100)],
            player_at(Vec3::ZERO),
        );
        let mut out = Vec::new();
        CombatResolver::new().handle(&tick(), &view, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn enemy_bolt_hits_living_player_only() {
        let hit = bolt(4, Owner::Enemy(EnemyId::new(1)), Vec3::new(0.0, 0.0, 1.0), 10);
        let mut out = Vec::new();
        CombatResolver::new().handle(
            &tick(),
            &CollisionView::new(vec![hit], Vec::new(), player_at(Vec3::ZERO)),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DamagePlayer {
                projectile: ProjectileId::new(4)
            }]
        );

        let mut dead = player_at(Vec3::ZERO);
        dead.alive = false;
        out.clear();
        CombatResolver::new().handle(
            &tick(),
            &CollisionView::new(vec![hit], Vec::new(), dead),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_projectiles_are_discarded() {
        let mut broken = bolt(9, Owner::Player, Vec3::ZERO, 15);
        broken.position = Vec3::new(f32::NAN, 0.0, 0.0);
        broken.bounds = Aabb::from_center(broken.position, Vec3::splat(0.25));
        let mut out = Vec::new();
        CombatResolver::new().handle(
            &tick(),
            &CollisionView::new(vec![broken], Vec::new(), player_at(Vec3::ZERO)),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DiscardProjectile {
                projectile: ProjectileId::new(9)
            }]
        );
    }

    #[test]
    fn idle_batches_resolve_nothing() {
        let view = CollisionView::new(
            vec![bolt(0, Owner::Player, Vec3::new(0.0, 0.0, -10.0), 15)],
            vec![tank(1, Vec3::new(0.0, 0.0, -10.0), 100)],
            player_at(Vec3::ZERO),
        );
        let mut out = Vec::new();
        CombatResolver::new().handle(&[], &view, &mut out);
        assert!(out.is_empty());
    }
}
