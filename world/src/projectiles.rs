//! Projectile simulator: a flat list of bolts advanced every tick.

use std::time::Duration;

use alley_tanks_core::{
    frames, Aabb, Owner, ProjectileId, ProjectileSnapshot, PROJECTILE_LIFETIME,
};
use glam::Vec3;

const PROJECTILE_HALF_EXTENT: f32 = 0.25;

/// Bolt in flight.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) owner: Owner,
    pub(crate) position: Vec3,
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
    pub(crate) age: Duration,
}

impl Projectile {
    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, Vec3::splat(PROJECTILE_HALF_EXTENT))
    }

    fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            owner: self.owner,
            position: self.position,
            direction: self.direction,
            damage: self.damage,
            age: self.age,
            bounds: self.bounds(),
        }
    }
}

/// Owns every projectile and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct ProjectileSimulator {
    entries: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSimulator {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Creates a projectile. `direction` must already be a unit vector.
    pub(crate) fn fire(
        &mut self,
        owner: Owner,
        origin: Vec3,
        direction: Vec3,
        damage: u32,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Projectile {
            id,
            owner,
            position: origin,
            direction,
            speed: owner.projectile_speed(),
            damage,
            age: Duration::ZERO,
        });
        id
    }

    /// Ages and moves every projectile, returning those that expired.
    ///
    /// A projectile is removed on the first tick its age exceeds the lifetime.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<ProjectileId> {
        let step = frames(dt);
        let mut expired = Vec::new();
        self.entries.retain_mut(|projectile| {
            projectile.age = projectile.age.saturating_add(dt);
            if projectile.age > PROJECTILE_LIFETIME {
                expired.push(projectile.id);
                return false;
            }
            projectile.position += projectile.direction * projectile.speed * step;
            true
        });
        expired
    }

    pub(crate) fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.entries.iter().find(|projectile| projectile.id == id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        let index = self.entries.iter().position(|projectile| projectile.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Removes every projectile. Safe to call on an empty simulator.
    pub(crate) fn clear(&mut self) -> Vec<ProjectileId> {
        self.entries.drain(..).map(|projectile| projectile.id).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.entries.iter().map(Projectile::snapshot).collect()
    }
}
