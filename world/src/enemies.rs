//! Authoritative enemy state management utilities.

use std::{collections::BTreeMap, time::Duration};

use alley_tanks_core::{
    Aabb, Behavior, EnemyCollider, EnemyId, EnemySnapshot, EnemySpawn, EnemyStats, EnemyTier,
    SpecialAbility,
};
use glam::Vec3;

/// Enemy tank stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) tier: EnemyTier,
    pub(crate) position: Vec3,
    pub(crate) heading: f32,
    pub(crate) health: u32,
    pub(crate) stats: EnemyStats,
    pub(crate) behavior: Behavior,
    pub(crate) behavior_change_at: Duration,
    pub(crate) last_shot_at: Option<Duration>,
    pub(crate) special: Option<SpecialAbility>,
    pub(crate) level: u32,
    pub(crate) difficulty: f32,
}

impl Enemy {
    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.tier.half_extents())
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            tier: self.tier,
            position: self.position,
            heading: self.heading,
            health: self.health,
            stats: self.stats,
            behavior: self.behavior,
            behavior_change_at: self.behavior_change_at,
            last_shot_at: self.last_shot_at,
            special: self.special,
            level: self.level,
            difficulty: self.difficulty,
        }
    }

    pub(crate) fn collider(&self) -> EnemyCollider {
        EnemyCollider {
            id: self.id,
            tier: self.tier,
            health: self.health,
            bounds: self.bounds(),
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    /// Registers a spawned enemy and returns its identifier.
    pub(crate) fn insert(&mut self, spawn: EnemySpawn) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        let enemy = Enemy {
            id,
            tier: spawn.tier,
            position: spawn.position,
            heading: spawn.heading,
            health: spawn.stats.health.max(1),
            stats: spawn.stats,
            behavior: spawn.behavior,
            behavior_change_at: spawn.behavior_change_at,
            last_shot_at: None,
            special: spawn.special,
            level: spawn.level,
            difficulty: spawn.difficulty,
        };
        let _ = self.entries.insert(id, enemy);
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    /// Disposes of every enemy. Safe to call on an empty registry.
    pub(crate) fn clear(&mut self) -> Vec<EnemyId> {
        let ids = self.entries.keys().copied().collect();
        self.entries.clear();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }
}
