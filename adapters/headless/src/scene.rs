//! In-memory scene and the presenter that mirrors the world into any scene.

use std::collections::{BTreeMap, HashMap};

use alley_tanks_core::{
    geometry::heading_of,
    presentation::{enemy_visual_scale, Scene, VisualHandle},
    Aabb, EnemyId, EnemyTier, EnemyView, Event, ProjectileId, ProjectileSnapshot,
};
use glam::Vec3;

const HULL_HALF_EXTENTS: Vec3 = Vec3::new(1.5, 1.0, 1.5);
const BOLT_HALF_EXTENTS: Vec3 = Vec3::new(0.25, 0.25, 0.25);

/// Mesh tracked by the [`HeadlessScene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    /// Current position.
    pub position: Vec3,
    /// Current heading.
    pub heading: f32,
    /// Half extents of the mesh bounds.
    pub half_extents: Vec3,
    /// Whether the mesh is an enemy bolt.
    pub hostile: bool,
}

/// Scene without a renderer, used by tests and the command-line runner.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    visuals: BTreeMap<VisualHandle, Visual>,
    next_handle: u64,
}

impl HeadlessScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    /// Reports whether the scene holds no meshes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// Looks up a mesh.
    #[must_use]
    pub fn visual(&self, handle: VisualHandle) -> Option<&Visual> {
        self.visuals.get(&handle)
    }

    fn insert(&mut self, visual: Visual) -> VisualHandle {
        let handle = VisualHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let _ = self.visuals.insert(handle, visual);
        handle
    }
}

impl Scene for HeadlessScene {
    fn spawn_enemy_visual(&mut self, tier: EnemyTier, position: Vec3) -> VisualHandle {
        self.insert(Visual {
            position,
            heading: 0.0,
            half_extents: HULL_HALF_EXTENTS * enemy_visual_scale(tier),
            hostile: false,
        })
    }

    fn spawn_projectile_visual(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        is_enemy: bool,
    ) -> VisualHandle {
        self.insert(Visual {
            position: origin,
            heading: heading_of(direction),
            half_extents: BOLT_HALF_EXTENTS,
            hostile: is_enemy,
        })
    }

    fn move_visual(&mut self, handle: VisualHandle, position: Vec3, heading: f32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.position = position;
            visual.heading = heading;
        }
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        let _ = self.visuals.remove(&handle);
    }

    fn bounding_box(&self, handle: VisualHandle) -> Option<Aabb> {
        self.visuals
            .get(&handle)
            .map(|visual| Aabb::from_center(visual.position, visual.half_extents))
    }
}

/// Keeps scene meshes in step with simulation entities.
#[derive(Debug, Default)]
pub struct Presenter {
    enemies: HashMap<EnemyId, VisualHandle>,
    projectiles: HashMap<ProjectileId, VisualHandle>,
}

impl Presenter {
    /// Creates a presenter that tracks no meshes yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and disposes meshes for the entity lifecycle events in `events`.
    pub fn apply_events(&mut self, scene: &mut dyn Scene, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned {
                    enemy,
                    tier,
                    position,
                } => {
                    let handle = scene.spawn_enemy_visual(*tier, *position);
                    if let Some(stale) = self.enemies.insert(*enemy, handle) {
                        scene.remove_visual(stale);
                    }
                }
                Event::ProjectileFired {
                    projectile,
                    owner,
                    origin,
                    direction,
                } => {
                    let handle =
                        scene.spawn_projectile_visual(*origin, *direction, owner.is_enemy());
                    if let Some(stale) = self.projectiles.insert(*projectile, handle) {
                        scene.remove_visual(stale);
                    }
                }
                Event::EnemyDefeated { enemy, .. } | Event::EnemyDespawned { enemy } => {
                    self.drop_enemy(scene, *enemy);
                }
                Event::EnemyHit { projectile, .. }
                | Event::PlayerHit { projectile, .. }
                | Event::ProjectileExpired { projectile }
                | Event::ProjectileDiscarded { projectile } => {
                    self.drop_projectile(scene, *projectile);
                }
                Event::ArenaCleared {
                    enemies,
                    projectiles,
                } => {
                    for enemy in enemies {
                        self.drop_enemy(scene, *enemy);
                    }
                    for projectile in projectiles {
                        self.drop_projectile(scene, *projectile);
                    }
                }
                _ => {}
            }
        }
    }

    /// Moves every tracked mesh to the transform reported by the world.
    pub fn sync_transforms(
        &self,
        scene: &mut dyn Scene,
        enemies: &EnemyView,
        projectiles: &[ProjectileSnapshot],
    ) {
        for enemy in enemies.iter() {
            if let Some(handle) = self.enemies.get(&enemy.id) {
                scene.move_visual(*handle, enemy.position, enemy.heading);
            }
        }
        for projectile in projectiles {
            if let Some(handle) = self.projectiles.get(&projectile.id) {
                let heading = heading_of(projectile.direction);
                scene.move_visual(*handle, projectile.position, heading);
            }
        }
    }

    /// Number of meshes the presenter currently tracks.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.enemies.len() + self.projectiles.len()
    }

    fn drop_enemy(&mut self, scene: &mut dyn Scene, enemy: EnemyId) {
        if let Some(handle) = self.enemies.remove(&enemy) {
            scene.remove_visual(handle);
        }
    }

    fn drop_projectile(&mut self, scene: &mut dyn Scene, projectile: ProjectileId) {
        if let Some(handle) = self.projectiles.remove(&projectile) {
            scene.remove_visual(handle);
        }
    }
}
