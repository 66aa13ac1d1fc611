#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Alley Tanks engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

pub mod geometry;
pub mod presentation;

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use geometry::Aabb;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Alley Tanks.";

/// Frame rate that per-frame speeds are expressed against.
pub const REFERENCE_FRAME_RATE: f32 = 60.0;

/// Health restored to the player at the start of every level attempt.
pub const PLAYER_MAX_HEALTH: u32 = 100;

/// Number of extra lives granted when a session starts.
pub const DEFAULT_LIVES: u32 = 3;

/// Age after which a projectile is discarded.
pub const PROJECTILE_LIFETIME: Duration = Duration::from_secs(2);

/// Distance covered by a player projectile per reference frame.
pub const PLAYER_PROJECTILE_SPEED: f32 = 1.5;

/// Distance covered by an enemy projectile per reference frame.
pub const ENEMY_PROJECTILE_SPEED: f32 = 0.75;

/// Damage dealt by a player projectile without boosts.
pub const PLAYER_PROJECTILE_DAMAGE: u32 = 15;

/// Damage dealt by an enemy projectile before the tier multiplier.
pub const ENEMY_PROJECTILE_DAMAGE: u32 = 10;

/// Planar distance from the gate at which the player triggers it.
pub const GATE_TRIGGER_DISTANCE: f32 = 10.0;

/// Distance a player without the key is pushed back from the gate.
pub const GATE_BOUNCE_DISTANCE: f32 = 15.0;

/// Planar distance within which a checkpoint is collected.
pub const CHECKPOINT_RADIUS: f32 = 6.0;

/// Pause between a cleared survival wave and the next one.
pub const WAVE_PAUSE: Duration = Duration::from_secs(3);

/// Duration of the teleport visual effect.
pub const TELEPORT_EFFECT_DURATION: Duration = Duration::from_millis(500);

/// Converts a simulated time step into reference frames.
#[must_use]
pub fn frames(dt: Duration) -> f32 {
    dt.as_secs_f32() * REFERENCE_FRAME_RATE
}

/// Rule set governing a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Clear the alley of enemies, take the key and pass the gate.
    Normal,
    /// Collect every checkpoint and reach the gate as quickly as possible.
    TimeTrial,
    /// Endless waves spawned around the player.
    Survival,
}

impl GameMode {
    /// Stable label used in logs and seed derivation.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::TimeTrial => "time_trial",
            Self::Survival => "survival",
        }
    }

    /// Reports whether the mode ends each level at the gate.
    #[must_use]
    pub const fn uses_gate(self) -> bool {
        matches!(self, Self::Normal | Self::TimeTrial)
    }
}

/// Strength class of an enemy tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTier {
    /// Regular alley tank.
    Normal,
    /// Heavier tank with boosted stats.
    Boss,
    /// Stationary turret guarding the gate.
    MegaBoss,
}

impl EnemyTier {
    /// Visual and collision scale applied to the tier.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Boss => 1.5,
            Self::MegaBoss => 3.0,
        }
    }

    /// Half extents of the tier's collision box.
    #[must_use]
    pub fn half_extents(self) -> Vec3 {
        Vec3::new(1.5, 1.0, 1.5) * self.scale()
    }

    /// Points awarded when an enemy of this tier is destroyed.
    #[must_use]
    pub const fn score_value(self) -> u32 {
        match self {
            Self::Normal => 5,
            Self::Boss | Self::MegaBoss => 25,
        }
    }

    /// Reports whether the tier counts as a boss for scoring and notifications.
    #[must_use]
    pub const fn is_boss_tier(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Numeric stats rolled for an enemy at creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: u32,
    /// Movement speed per reference frame.
    pub speed: f32,
    /// Minimum time between regular shots.
    pub shoot_interval: Duration,
    /// Distance within which the enemy opens fire.
    pub chase_range: f32,
    /// Multiplier applied to the base enemy projectile damage.
    pub projectile_damage_multiplier: f32,
}

impl EnemyStats {
    /// Damage carried by projectiles fired with these stats.
    #[must_use]
    pub fn projectile_damage(&self) -> u32 {
        let scaled = ENEMY_PROJECTILE_DAMAGE as f32 * self.projectile_damage_multiplier;
        scaled.round().max(0.0) as u32
    }
}

/// Discriminant of a [`Behavior`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Drive straight at the player.
    Approach,
    /// Orbit the player.
    Circle,
    /// Slide sideways while closing in.
    Strafe,
    /// Rush the player at increased speed.
    Charge,
    /// Back away while keeping the player in sight.
    Retreat,
    /// Turret mode pinned at the gate.
    Fixed,
}

/// Side an enemy strafes toward relative to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrafeDirection {
    /// Counter-clockwise around the player.
    Left,
    /// Clockwise around the player.
    Right,
}

impl StrafeDirection {
    /// Sign applied to the perpendicular component of strafing motion.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Fan layout fired by a mega-boss in turret mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FanPattern {
    /// Five bolts at -30°, -15°, 0°, 15° and 30°.
    Center,
    /// Three bolts at -30°, 0° and 30°.
    Flank,
}

impl FanPattern {
    /// Angular offsets of the fan measured in degrees from the aim direction.
    #[must_use]
    pub const fn offsets_degrees(self) -> &'static [f32] {
        match self {
            Self::Center => &[-30.0, -15.0, 0.0, 15.0, 30.0],
            Self::Flank => &[-30.0, 0.0, 30.0],
        }
    }
}

/// Active behavior of an enemy together with its state-specific parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    /// Move straight toward the player.
    Approach,
    /// Orbit the player along a circle.
    Circle {
        /// Orbit radius measured from the player.
        radius: f32,
        /// Current orbit phase in radians.
        phase: f32,
        /// Phase advance per reference frame.
        angular_speed: f32,
    },
    /// Blend approach with sideways motion.
    Strafe {
        /// Side of the perpendicular component.
        direction: StrafeDirection,
        /// Simulation time at which the strafe ends.
        ends_at: Duration,
    },
    /// Rush the player.
    Charge {
        /// Multiplier applied to the base speed while charging.
        speed_multiplier: f32,
        /// Simulation time at which the charge ends.
        ends_at: Duration,
    },
    /// Back away from the player.
    Retreat {
        /// Simulation time at which the retreat ends.
        ends_at: Duration,
    },
    /// Turret mode used by mega-bosses.
    Fixed {
        /// Position the enemy is pinned to.
        anchor: Vec3,
        /// Fan fired on every shot.
        pattern: FanPattern,
    },
}

impl Behavior {
    /// Discriminant of the behavior.
    #[must_use]
    pub const fn kind(&self) -> BehaviorKind {
        match self {
            Self::Approach => BehaviorKind::Approach,
            Self::Circle { .. } => BehaviorKind::Circle,
            Self::Strafe { .. } => BehaviorKind::Strafe,
            Self::Charge { .. } => BehaviorKind::Charge,
            Self::Retreat { .. } => BehaviorKind::Retreat,
            Self::Fixed { .. } => BehaviorKind::Fixed,
        }
    }

    /// End time of time-bounded behaviors.
    #[must_use]
    pub const fn ends_at(&self) -> Option<Duration> {
        match self {
            Self::Strafe { ends_at, .. }
            | Self::Charge { ends_at, .. }
            | Self::Retreat { ends_at } => Some(*ends_at),
            Self::Approach | Self::Circle { .. } | Self::Fixed { .. } => None,
        }
    }
}

/// Boss-only ability kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Relocate behind or beside the player.
    Teleport,
    /// Fire a full circle of projectiles.
    Multishot,
}

/// Special ability descriptor carried by some bosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialAbility {
    /// Ability kind.
    pub kind: SpecialKind,
    /// Minimum time between uses.
    pub cooldown: Duration,
    /// Simulation time of the last use; `None` when the ability is primed.
    pub last_used_at: Option<Duration>,
}

impl SpecialAbility {
    /// Reports whether the cooldown elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_used_at {
            Some(last_used_at) => now.saturating_sub(last_used_at) > self.cooldown,
            None => true,
        }
    }
}

/// Unique identifier assigned to an enemy by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Counter bumped whenever a level, wave or session is torn down.
///
/// Deferred work stamped with an older generation is inert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u32);

impl Generation {
    /// Creates a generation with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value of the generation.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Side that fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Fired by the player tank.
    Player,
    /// Fired by the identified enemy.
    Enemy(EnemyId),
}

impl Owner {
    /// Reports whether the projectile belongs to an enemy.
    #[must_use]
    pub const fn is_enemy(self) -> bool {
        matches!(self, Self::Enemy(_))
    }

    /// Distance covered per reference frame by projectiles of this owner.
    #[must_use]
    pub const fn projectile_speed(self) -> f32 {
        match self {
            Self::Player => PLAYER_PROJECTILE_SPEED,
            Self::Enemy(_) => ENEMY_PROJECTILE_SPEED,
        }
    }
}

/// Shape of an enemy volley, which decides the cooldown it consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VolleyKind {
    /// Regular shot, optionally with extra spread bolts.
    Aimed,
    /// Mega-boss turret fan.
    Fan,
    /// Boss multishot ability.
    Multishot,
}

/// Power-ups the player can pick up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Faster movement for a limited time.
    SpeedBoost,
    /// Doubled projectile damage for a limited time.
    AttackBoost,
    /// Immunity to damage for a limited time.
    Shield,
    /// Immediate health restoration.
    Repair,
}

impl PowerUpKind {
    /// Time the power-up stays active, or `None` for instant effects.
    #[must_use]
    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::SpeedBoost | Self::AttackBoost => Some(Duration::from_secs(10)),
            Self::Shield => Some(Duration::from_secs(5)),
            Self::Repair => None,
        }
    }
}

/// Severity of a user-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Neutral information.
    Info,
    /// Something the player should react to.
    Warning,
    /// Positive outcome.
    Success,
    /// Life lost or session over.
    Danger,
}

/// Summary reported when a session ends permanently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverStats {
    /// Final score.
    pub score: u32,
    /// Level reached.
    pub level: u32,
    /// Wave reached in survival mode.
    pub wave: u32,
    /// Enemies destroyed over the whole session.
    pub enemies_defeated: u32,
    /// Simulated time played.
    pub time_played: Duration,
}

/// Geometry of the alley shared by every system.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Distance from the centre line to either wall.
    pub half_width: f32,
    /// Distance from the player start to the gate.
    pub length: f32,
    /// Clearance kept between tanks and the walls.
    pub wall_margin: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            half_width: 20.0,
            length: 1_000.0,
            wall_margin: 1.0,
        }
    }
}

impl Arena {
    /// Largest absolute x coordinate a tank may occupy.
    #[must_use]
    pub fn lateral_limit(&self) -> f32 {
        (self.half_width - self.wall_margin).max(0.0)
    }

    /// Clamps a position so that it stays between the walls.
    #[must_use]
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        let limit = self.lateral_limit();
        Vec3::new(position.x.clamp(-limit, limit), position.y, position.z)
    }

    /// Where the player tank starts each level.
    #[must_use]
    pub fn player_start(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// Centre of the gate at the end of the alley.
    #[must_use]
    pub fn gate_position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.length)
    }

    /// Z coordinate mega-bosses are pinned to, just in front of the gate.
    #[must_use]
    pub fn mega_boss_z(&self) -> f32 {
        -self.length + 1.0
    }

    /// Checkpoints laid out along the racing line for time-trial levels.
    #[must_use]
    pub fn checkpoint_positions(&self) -> Vec<Vec3> {
        let lateral = (self.half_width * 0.4).min(self.lateral_limit());
        (1..=4)
            .map(|index| {
                let side = if index % 2 == 0 { 1.0 } else { -1.0 };
                let z = -self.length * index as f32 / 5.0;
                Vec3::new(side * lateral, 0.0, z)
            })
            .collect()
    }
}

/// Request to register a new enemy in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Strength class.
    pub tier: EnemyTier,
    /// Starting position.
    pub position: Vec3,
    /// Starting heading.
    pub heading: f32,
    /// Rolled stats.
    pub stats: EnemyStats,
    /// Initial behavior.
    pub behavior: Behavior,
    /// Time at which the initial behavior is re-rolled.
    pub behavior_change_at: Duration,
    /// Optional boss ability.
    pub special: Option<SpecialAbility>,
    /// Level or wave the enemy was rolled for.
    pub level: u32,
    /// Difficulty multiplier the enemy was rolled with.
    pub difficulty: f32,
}

/// Per-tick behavior output for a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyUpdate {
    /// Enemy being updated.
    pub enemy: EnemyId,
    /// New position.
    pub position: Vec3,
    /// New heading.
    pub heading: f32,
    /// Behavior active after the update.
    pub behavior: Behavior,
    /// Time at which the behavior is re-rolled next.
    pub behavior_change_at: Duration,
    /// Makes the special ability immediately available again.
    pub reset_special_cooldown: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Tears down any running session and starts a fresh one.
    StartSession {
        /// Rule set of the session.
        mode: GameMode,
        /// Difficulty multiplier applied on top of level scaling.
        difficulty: f32,
        /// Extra lives available before the session ends.
        lives: u32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports the player's transform as driven by the host's input handling.
    SyncPlayer {
        /// Current player position.
        position: Vec3,
        /// Current player heading.
        heading: f32,
    },
    /// Fires a player projectile.
    FirePlayerProjectile {
        /// Muzzle position.
        origin: Vec3,
        /// Direction of travel.
        direction: Vec3,
    },
    /// Applies external damage such as obstacle collisions to the player.
    HurtPlayer {
        /// Health removed from the player.
        amount: u32,
    },
    /// Activates a power-up picked up by the player.
    CollectPowerUp {
        /// Kind of power-up collected.
        kind: PowerUpKind,
    },
    /// Registers a new enemy.
    SpawnEnemy {
        /// Enemy description.
        spawn: EnemySpawn,
    },
    /// Applies the behavior state machine's output to an enemy.
    UpdateEnemy {
        /// Update payload.
        update: EnemyUpdate,
    },
    /// Fires a volley of enemy projectiles.
    EnemyFire {
        /// Enemy firing the volley.
        enemy: EnemyId,
        /// Direction of each projectile.
        directions: Vec<Vec3>,
        /// Volley classification.
        kind: VolleyKind,
    },
    /// Relocates a boss using its teleport ability.
    TeleportEnemy {
        /// Enemy teleporting.
        enemy: EnemyId,
        /// Destination.
        to: Vec3,
    },
    /// Drops an enemy whose state is no longer valid.
    DespawnEnemy {
        /// Enemy to drop.
        enemy: EnemyId,
    },
    /// Resolves a player projectile hitting an enemy.
    DamageEnemy {
        /// Enemy hit.
        enemy: EnemyId,
        /// Projectile that hit.
        projectile: ProjectileId,
    },
    /// Resolves an enemy projectile hitting the player.
    DamagePlayer {
        /// Projectile that hit.
        projectile: ProjectileId,
    },
    /// Drops a projectile whose state is no longer valid.
    DiscardProjectile {
        /// Projectile to drop.
        projectile: ProjectileId,
    },
    /// Unlocks the gate once the mode's unlock condition holds.
    GrantKey,
    /// Marks a time-trial checkpoint as collected.
    CollectCheckpoint {
        /// Index of the checkpoint within the level.
        index: usize,
    },
    /// Pushes a player without the key back from the gate.
    BlockAtGate,
    /// Moves on to the next level after passing the gate.
    AdvanceLevel {
        /// Level the request was issued for; stale requests are ignored.
        from_level: u32,
    },
    /// Closes a cleared survival wave and schedules the next one.
    CompleteWave {
        /// Wave the request was issued for; stale requests are ignored.
        wave: u32,
    },
    /// Consumes a life after the player was destroyed.
    LoseLife {
        /// Generation in which the player was destroyed.
        generation: Generation,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces a fresh session.
    SessionStarted {
        /// Rule set of the session.
        mode: GameMode,
        /// Difficulty multiplier.
        difficulty: f32,
        /// Extra lives available.
        lives: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Simulation time after the tick.
        now: Duration,
    },
    /// A normal or time-trial level attempt began and needs a roster.
    LevelStarted {
        /// Rule set of the session.
        mode: GameMode,
        /// Level number, starting at one.
        level: u32,
        /// Difficulty multiplier.
        difficulty: f32,
        /// Generation of the attempt.
        generation: Generation,
        /// Simulation time at which the attempt began.
        at: Duration,
        /// Whether this is a retry after losing a life.
        restart: bool,
    },
    /// A survival wave began and needs a roster.
    WaveStarted {
        /// Wave number, starting at one.
        wave: u32,
        /// Difficulty multiplier.
        difficulty: f32,
        /// Generation of the wave.
        generation: Generation,
        /// Simulation time at which the wave began.
        at: Duration,
        /// Player position the wave is arranged around.
        player_position: Vec3,
    },
    /// Every enemy and projectile was removed.
    ArenaCleared {
        /// Enemies removed.
        enemies: Vec<EnemyId>,
        /// Projectiles removed.
        projectiles: Vec<ProjectileId>,
    },
    /// Confirms that an enemy was registered.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Strength class.
        tier: EnemyTier,
        /// Spawn position.
        position: Vec3,
    },
    /// An enemy switched behavior.
    BehaviorChanged {
        /// Enemy that switched.
        enemy: EnemyId,
        /// Previous behavior.
        from: BehaviorKind,
        /// New behavior.
        to: BehaviorKind,
    },
    /// A boss teleported.
    EnemyTeleported {
        /// Enemy that teleported.
        enemy: EnemyId,
        /// Position before the jump.
        from: Vec3,
        /// Position after the jump.
        to: Vec3,
    },
    /// The teleport visual effect of an enemy finished.
    TeleportEffectEnded {
        /// Enemy whose effect ended.
        enemy: EnemyId,
    },
    /// An enemy was dropped without being defeated.
    EnemyDespawned {
        /// Enemy dropped.
        enemy: EnemyId,
    },
    /// A projectile was created.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side that fired it.
        owner: Owner,
        /// Muzzle position.
        origin: Vec3,
        /// Unit direction of travel.
        direction: Vec3,
    },
    /// A projectile exceeded its lifetime.
    ProjectileExpired {
        /// Projectile removed.
        projectile: ProjectileId,
    },
    /// A projectile was dropped because its state was invalid.
    ProjectileDiscarded {
        /// Projectile removed.
        projectile: ProjectileId,
    },
    /// A player projectile struck an enemy and was consumed.
    EnemyHit {
        /// Enemy struck.
        enemy: EnemyId,
        /// Projectile consumed.
        projectile: ProjectileId,
        /// Damage applied.
        damage: u32,
        /// Health left after the hit.
        remaining_health: u32,
    },
    /// An enemy's health reached zero.
    EnemyDefeated {
        /// Enemy destroyed.
        enemy: EnemyId,
        /// Strength class of the destroyed enemy.
        tier: EnemyTier,
        /// Points awarded.
        points: u32,
    },
    /// The score changed.
    ScoreChanged {
        /// Points just awarded.
        points: u32,
        /// Score after the award.
        total: u32,
    },
    /// An enemy projectile struck the player and was consumed.
    PlayerHit {
        /// Projectile consumed.
        projectile: ProjectileId,
        /// Damage applied; zero while shielded.
        damage: u32,
        /// Player health after the hit.
        health: u32,
    },
    /// External damage such as an obstacle collision was applied.
    PlayerHurt {
        /// Damage applied; zero while shielded.
        damage: u32,
        /// Player health after the damage.
        health: u32,
    },
    /// The player's health reached zero.
    PlayerDestroyed {
        /// Generation of the attempt that was lost.
        generation: Generation,
    },
    /// A power-up became active.
    PowerUpActivated {
        /// Kind activated.
        kind: PowerUpKind,
    },
    /// A timed power-up ran out.
    PowerUpExpired {
        /// Kind that expired.
        kind: PowerUpKind,
    },
    /// The gate unlocked.
    KeyAcquired,
    /// A time-trial checkpoint was collected.
    CheckpointCollected {
        /// Checkpoint index.
        index: usize,
        /// Checkpoints left this level.
        remaining: usize,
    },
    /// The world moved the player, either back from a locked gate or to the
    /// start of a fresh attempt.
    PlayerRelocated {
        /// Position the player was moved to.
        position: Vec3,
    },
    /// User-facing informational message.
    Message {
        /// Message text.
        text: String,
        /// Severity.
        kind: MessageKind,
    },
    /// The player passed the gate.
    LevelAdvanced {
        /// Level that just began.
        level: u32,
        /// Time taken to complete the previous level.
        elapsed: Duration,
    },
    /// Every enemy of a survival wave was destroyed.
    WaveCleared {
        /// Wave cleared.
        wave: u32,
    },
    /// A life was consumed and the attempt restarts.
    LifeLost {
        /// Lives left after the loss.
        lives_remaining: u32,
    },
    /// The session ended permanently.
    GameOver {
        /// Final statistics.
        stats: GameOverStats,
    },
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Strength class.
    pub tier: EnemyTier,
    /// Current position.
    pub position: Vec3,
    /// Current heading.
    pub heading: f32,
    /// Current health.
    pub health: u32,
    /// Stats rolled at creation.
    pub stats: EnemyStats,
    /// Active behavior.
    pub behavior: Behavior,
    /// Time at which the behavior is re-rolled.
    pub behavior_change_at: Duration,
    /// Time of the last regular or fan shot.
    pub last_shot_at: Option<Duration>,
    /// Optional boss ability.
    pub special: Option<SpecialAbility>,
    /// Level or wave the enemy was rolled for.
    pub level: u32,
    /// Difficulty multiplier the enemy was rolled with.
    pub difficulty: f32,
}

/// Read-only snapshot describing all enemies in the alley.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile used for collision queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Side that fired it.
    pub owner: Owner,
    /// Current position.
    pub position: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    /// Damage applied on hit.
    pub damage: u32,
    /// Time since the projectile was fired.
    pub age: Duration,
    /// Current bounding volume.
    pub bounds: Aabb,
}

/// Collision state of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyCollider {
    /// Enemy identifier.
    pub id: EnemyId,
    /// Strength class.
    pub tier: EnemyTier,
    /// Current health.
    pub health: u32,
    /// Current bounding volume.
    pub bounds: Aabb,
}

/// Collision state of the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerCollider {
    /// Current bounding volume.
    pub bounds: Aabb,
    /// Whether the player can currently be hit.
    pub alive: bool,
}

/// Everything the combat resolver needs for one tick.
#[derive(Clone, Debug)]
pub struct CollisionView {
    projectiles: Vec<ProjectileSnapshot>,
    enemies: Vec<EnemyCollider>,
    player: PlayerCollider,
}

impl CollisionView {
    /// Captures a collision view, ordering entities by identifier.
    #[must_use]
    pub fn new(
        mut projectiles: Vec<ProjectileSnapshot>,
        mut enemies: Vec<EnemyCollider>,
        player: PlayerCollider,
    ) -> Self {
        projectiles.sort_by_key(|projectile| projectile.id);
        enemies.sort_by_key(|enemy| enemy.id);
        Self {
            projectiles,
            enemies,
            player,
        }
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[ProjectileSnapshot] {
        &self.projectiles
    }

    /// Living enemies.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyCollider] {
        &self.enemies
    }

    /// The player tank.
    #[must_use]
    pub const fn player(&self) -> PlayerCollider {
        self.player
    }
}

/// Player telemetry mirrored into the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current position.
    pub position: Vec3,
    /// Current heading.
    pub heading: f32,
    /// Current health.
    pub health: u32,
    /// Whether the player tank is alive.
    pub alive: bool,
    /// Active movement multiplier.
    pub speed_multiplier: f32,
    /// Active damage multiplier.
    pub attack_multiplier: f32,
    /// Whether incoming damage is ignored.
    pub shielded: bool,
}

/// Checkpoint laid out along a time-trial level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    /// Position of the checkpoint.
    pub position: Vec3,
    /// Whether the player already passed it.
    pub collected: bool,
}

/// Read-only snapshot of the level or wave session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Rule set.
    pub mode: GameMode,
    /// Current level.
    pub level: u32,
    /// Current survival wave.
    pub wave: u32,
    /// Difficulty multiplier.
    pub difficulty: f32,
    /// Extra lives left.
    pub lives: u32,
    /// Current score.
    pub score: u32,
    /// Whether the gate is unlocked.
    pub has_key: bool,
    /// Enemies registered for the current level or wave.
    pub total_enemies: u32,
    /// Enemies still alive in the current level or wave.
    pub remaining_enemies: u32,
    /// Whether a survival wave is being fought.
    pub wave_in_progress: bool,
    /// Checkpoints of the current time-trial level.
    pub checkpoints: Vec<Checkpoint>,
    /// Whether the session ended permanently.
    pub game_over: bool,
    /// Current generation.
    pub generation: Generation,
    /// Simulation time.
    pub now: Duration,
}

impl SessionSnapshot {
    /// Checkpoints that have not been collected yet.
    #[must_use]
    pub fn checkpoints_remaining(&self) -> usize {
        self.checkpoints
            .iter()
            .filter(|checkpoint| !checkpoint.collected)
            .count()
    }

    /// Reports whether the mode's gate unlock condition currently holds.
    #[must_use]
    pub fn unlock_condition_met(&self) -> bool {
        match self.mode {
            GameMode::Normal | GameMode::Survival => {
                self.total_enemies > 0 && self.remaining_enemies == 0
            }
            GameMode::TimeTrial => {
                !self.checkpoints.is_empty() && self.checkpoints_remaining() == 0
            }
        }
    }
}
