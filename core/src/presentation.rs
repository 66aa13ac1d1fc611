//! Ports implemented by presentation adapters.
//!
//! The simulation owns all gameplay state. Adapters own the visual
//! representation of enemies and projectiles, keyed by [`VisualHandle`], and
//! receive fire-and-forget notifications through [`EventSink`].

use glam::Vec3;

use crate::{Aabb, EnemyTier, Event, GameOverStats, MessageKind};

/// Opaque handle to a visual owned by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(u64);

impl VisualHandle {
    /// Creates a handle from its numeric representation.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Scene graph that mirrors simulation entities as meshes.
pub trait Scene {
    /// Creates the mesh for a freshly spawned enemy.
    fn spawn_enemy_visual(&mut self, tier: EnemyTier, position: Vec3) -> VisualHandle;

    /// Creates the mesh for a freshly fired projectile.
    fn spawn_projectile_visual(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        is_enemy: bool,
    ) -> VisualHandle;

    /// Moves an existing mesh.
    fn move_visual(&mut self, handle: VisualHandle, position: Vec3, heading: f32);

    /// Disposes of a mesh. Unknown handles are ignored.
    fn remove_visual(&mut self, handle: VisualHandle);

    /// Bounding box recomputed from the mesh's current transform.
    ///
    /// Serves hosts that need mesh bounds, such as picking or debug overlays.
    /// Hit resolution reads the world's colliders instead and never calls it.
    fn bounding_box(&self, handle: VisualHandle) -> Option<Aabb>;
}

/// Receiver of user-facing notifications such as HUD updates.
pub trait EventSink {
    /// Points were awarded.
    fn on_score(&mut self, points: u32);

    /// An enemy was destroyed.
    fn on_enemy_defeated(&mut self, is_boss: bool);

    /// A message should be shown to the player.
    fn on_message(&mut self, text: &str, kind: MessageKind);

    /// The player reached a new level.
    fn on_level_advance(&mut self, level: u32);

    /// The session ended permanently.
    fn on_game_over(&mut self, stats: &GameOverStats);
}

/// Forwards the notification-worthy subset of `event` to `sink`.
pub fn notify(sink: &mut dyn EventSink, event: &Event) {
    match event {
        Event::ScoreChanged { points, .. } => sink.on_score(*points),
        Event::EnemyDefeated { tier, .. } => sink.on_enemy_defeated(tier.is_boss_tier()),
        Event::Message { text, kind } => sink.on_message(text, *kind),
        Event::LevelAdvanced { level, .. } => sink.on_level_advance(*level),
        Event::GameOver { stats } => sink.on_game_over(stats),
        _ => {}
    }
}

/// Scale applied to the mesh of an enemy tier.
#[must_use]
pub fn enemy_visual_scale(tier: EnemyTier) -> f32 {
    tier.scale()
}
