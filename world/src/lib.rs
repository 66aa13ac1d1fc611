#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Alley Tanks.
//!
//! The world is the single owner of every enemy, projectile and session
//! counter. Systems observe it through [`query`] and mutate it exclusively by
//! submitting [`Command`] values to [`apply`].

mod enemies;
mod player;
mod projectiles;
mod session;

use std::time::Duration;

use alley_tanks_core::{
    geometry::planar_distance, Arena, Command, EnemyId, EnemySpawn, EnemyUpdate, Event,
    GameMode, Generation, MessageKind, Owner, PowerUpKind, ProjectileId, SpecialKind, VolleyKind,
    GATE_BOUNCE_DISTANCE, GATE_TRIGGER_DISTANCE, PLAYER_PROJECTILE_DAMAGE,
    TELEPORT_EFFECT_DURATION, WAVE_PAUSE, WELCOME_BANNER,
};
use alley_tanks_system_stats::normalize_difficulty;
use glam::Vec3;

use enemies::EnemyRegistry;
use player::PlayerState;
use projectiles::ProjectileSimulator;
use session::{ScheduledAction, Scheduler, Session};

/// Distance between an enemy hull and the muzzle of the bolts it fires.
const MUZZLE_CLEARANCE: f32 = 0.5;

/// Represents the authoritative Alley Tanks world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    arena: Arena,
    session: Session,
    enemies: EnemyRegistry,
    projectiles: ProjectileSimulator,
    player: PlayerState,
    scheduler: Scheduler,
    now: Duration,
}

impl World {
    /// Creates a new world laid out on the default alley.
    #[must_use]
    pub fn new() -> Self {
        Self::with_arena(Arena::default())
    }

    /// Creates a new world laid out on the provided alley.
    #[must_use]
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            banner: WELCOME_BANNER,
            player: PlayerState::new(arena.player_start()),
            arena,
            session: Session::idle(),
            enemies: EnemyRegistry::new(),
            projectiles: ProjectileSimulator::new(),
            scheduler: Scheduler::default(),
            now: Duration::ZERO,
        }
    }

    fn clear_arena(&mut self, out_events: &mut Vec<Event>) {
        let enemies = self.enemies.clear();
        let projectiles = self.projectiles.clear();
        out_events.push(Event::ArenaCleared {
            enemies,
            projectiles,
        });
    }

    fn relocate_player(&mut self, position: Vec3, out_events: &mut Vec<Event>) {
        self.player.position = position;
        out_events.push(Event::PlayerRelocated { position });
    }

    fn announce(&self, text: impl Into<String>, kind: MessageKind, out_events: &mut Vec<Event>) {
        out_events.push(Event::Message {
            text: text.into(),
            kind,
        });
    }

    /// Emits the roster request for the current level or wave.
    fn announce_attempt(&self, restart: bool, out_events: &mut Vec<Event>) {
        let session = &self.session;
        if session.mode == GameMode::Survival {
            out_events.push(Event::WaveStarted {
                wave: session.wave,
                difficulty: session.difficulty,
                generation: session.generation,
                at: self.now,
                player_position: self.player.position,
            });
        } else {
            out_events.push(Event::LevelStarted {
                mode: session.mode,
                level: session.level,
                difficulty: session.difficulty,
                generation: session.generation,
                at: self.now,
                restart,
            });
        }
    }

    fn start_session(
        &mut self,
        mode: GameMode,
        difficulty: f32,
        lives: u32,
        out_events: &mut Vec<Event>,
    ) {
        let difficulty = normalize_difficulty(difficulty);
        self.clear_arena(out_events);
        self.session.begin(mode, difficulty, lives, self.now);
        self.session.reset_level(&self.arena, self.now);
        self.player.respawn(self.arena.player_start());

        tracing::info!(mode = mode.label(), difficulty, lives, "session started");
        out_events.push(Event::SessionStarted {
            mode,
            difficulty,
            lives,
        });
        self.relocate_player(self.arena.player_start(), out_events);
        self.announce_attempt(false, out_events);
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.now = self.now.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt, now: self.now });

        if !self.session.accepts_gameplay() {
            return;
        }

        for projectile in self.projectiles.advance(dt) {
            out_events.push(Event::ProjectileExpired { projectile });
        }

        for kind in self.player.expire(self.now) {
            out_events.push(Event::PowerUpExpired { kind });
        }

        for action in self.scheduler.drain_due(self.now, self.session.generation) {
            self.run_scheduled(action, out_events);
        }
    }

    fn run_scheduled(&mut self, action: ScheduledAction, out_events: &mut Vec<Event>) {
        match action {
            ScheduledAction::StartWave { wave } => {
                let session = &self.session;
                if session.mode != GameMode::Survival
                    || session.wave_in_progress
                    || wave != session.wave.saturating_add(1)
                {
                    tracing::debug!(wave, "ignoring out of order wave start");
                    return;
                }

                self.clear_arena(out_events);
                self.session.generation = self.session.generation.next();
                self.session.wave = wave;
                self.session.wave_in_progress = true;
                self.session.reset_level(&self.arena, self.now);
                tracing::info!(wave, "survival wave started");
                self.announce(format!("Wave {wave}"), MessageKind::Info, out_events);
                self.announce_attempt(false, out_events);
            }
            ScheduledAction::EndTeleportEffect { enemy } => {
                if self.enemies.get(enemy).is_some() {
                    out_events.push(Event::TeleportEffectEnded { enemy });
                }
            }
        }
    }

    fn spawn_enemy(&mut self, mut spawn: EnemySpawn, out_events: &mut Vec<Event>) {
        if !spawn.position.is_finite() || !spawn.heading.is_finite() {
            tracing::warn!(tier = ?spawn.tier, "rejecting enemy spawn with invalid transform");
            return;
        }

        spawn.position = self.arena.clamp(spawn.position);
        let enemy = self.enemies.insert(spawn);
        self.session.total_enemies = self.session.total_enemies.saturating_add(1);
        self.session.remaining_enemies = self.session.remaining_enemies.saturating_add(1);
        out_events.push(Event::EnemySpawned {
            enemy,
            tier: spawn.tier,
            position: spawn.position,
        });
    }

    fn update_enemy(&mut self, update: EnemyUpdate, out_events: &mut Vec<Event>) {
        if !update.position.is_finite() || !update.heading.is_finite() {
            tracing::warn!(enemy = update.enemy.get(), "skipping enemy update with invalid transform");
            return;
        }

        let position = self.arena.clamp(update.position);
        let Some(enemy) = self.enemies.get_mut(update.enemy) else {
            tracing::warn!(enemy = update.enemy.get(), "update for unknown enemy");
            return;
        };

        let from = enemy.behavior.kind();
        let to = update.behavior.kind();
        enemy.position = position;
        enemy.heading = update.heading;
        enemy.behavior = update.behavior;
        enemy.behavior_change_at = update.behavior_change_at;
        if update.reset_special_cooldown {
            if let Some(special) = enemy.special.as_mut() {
                special.last_used_at = None;
            }
        }

        if from != to {
            tracing::debug!(enemy = update.enemy.get(), ?from, ?to, "behavior changed");
            out_events.push(Event::BehaviorChanged {
                enemy: update.enemy,
                from,
                to,
            });
        }
    }

    fn enemy_fire(
        &mut self,
        enemy_id: EnemyId,
        directions: Vec<Vec3>,
        kind: VolleyKind,
        out_events: &mut Vec<Event>,
    ) {
        let now = self.now;
        let Some(enemy) = self.enemies.get_mut(enemy_id) else {
            tracing::warn!(enemy = enemy_id.get(), "volley from unknown enemy");
            return;
        };

        match kind {
            VolleyKind::Multishot => match enemy.special.as_mut() {
                Some(special) if special.kind == SpecialKind::Multishot => {
                    special.last_used_at = Some(now);
                }
                _ => {
                    tracing::warn!(enemy = enemy_id.get(), "multishot without the ability");
                    return;
                }
            },
            VolleyKind::Aimed | VolleyKind::Fan => enemy.last_shot_at = Some(now),
        }

        let clearance = enemy.tier.half_extents().x + MUZZLE_CLEARANCE;
        let centre = enemy.position;
        let damage = enemy.stats.projectile_damage();
        let owner = Owner::Enemy(enemy_id);

        for direction in directions {
            let direction = direction.normalize_or_zero();
            if direction == Vec3::ZERO || !direction.is_finite() {
                continue;
            }
            let origin = centre + direction * clearance;
            let projectile = self.projectiles.fire(owner, origin, direction, damage);
            out_events.push(Event::ProjectileFired {
                projectile,
                owner,
                origin,
                direction,
            });
        }
    }

    fn teleport_enemy(&mut self, enemy_id: EnemyId, to: Vec3, out_events: &mut Vec<Event>) {
        if !to.is_finite() {
            tracing::warn!(enemy = enemy_id.get(), "teleport to invalid position");
            return;
        }

        let now = self.now;
        let destination = self.arena.clamp(to);
        let Some(enemy) = self.enemies.get_mut(enemy_id) else {
            tracing::warn!(enemy = enemy_id.get(), "teleport for unknown enemy");
            return;
        };
        let Some(special) = enemy
            .special
            .as_mut()
            .filter(|special| special.kind == SpecialKind::Teleport)
        else {
            tracing::warn!(enemy = enemy_id.get(), "teleport without the ability");
            return;
        };

        special.last_used_at = Some(now);
        let from = enemy.position;
        enemy.position = destination;
        self.scheduler.schedule(
            now.saturating_add(TELEPORT_EFFECT_DURATION),
            self.session.generation,
            ScheduledAction::EndTeleportEffect { enemy: enemy_id },
        );
        out_events.push(Event::EnemyTeleported {
            enemy: enemy_id,
            from,
            to: destination,
        });
    }

    fn despawn_enemy(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.remove(enemy).is_none() {
            return;
        }
        self.session.remaining_enemies = self.session.remaining_enemies.saturating_sub(1);
        tracing::warn!(enemy = enemy.get(), "enemy dropped from the alley");
        out_events.push(Event::EnemyDespawned { enemy });
    }

    fn fire_player_projectile(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        out_events: &mut Vec<Event>,
    ) {
        if !self.player.alive {
            return;
        }
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || !direction.is_finite() || !origin.is_finite() {
            tracing::warn!("ignoring player shot with invalid transform");
            return;
        }

        let damage = (PLAYER_PROJECTILE_DAMAGE as f32 * self.player.attack_multiplier()).round();
        let damage = damage.max(0.0) as u32;
        let projectile = self
            .projectiles
            .fire(Owner::Player, origin, direction, damage);
        out_events.push(Event::ProjectileFired {
            projectile,
            owner: Owner::Player,
            origin,
            direction,
        });
    }

    fn damage_enemy(
        &mut self,
        enemy_id: EnemyId,
        projectile_id: ProjectileId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(projectile) = self.projectiles.get(projectile_id) else {
            tracing::warn!(projectile = projectile_id.get(), "hit by unknown projectile");
            return;
        };
        if projectile.owner != Owner::Player {
            tracing::warn!(projectile = projectile_id.get(), "enemy bolt cannot hit enemies");
            return;
        }
        let damage = projectile.damage;
        let Some(enemy) = self.enemies.get_mut(enemy_id) else {
            tracing::warn!(enemy = enemy_id.get(), "hit on unknown enemy");
            return;
        };

        enemy.health = enemy.health.saturating_sub(damage);
        let remaining_health = enemy.health;
        let tier = enemy.tier;
        let _ = self.projectiles.remove(projectile_id);
        out_events.push(Event::EnemyHit {
            enemy: enemy_id,
            projectile: projectile_id,
            damage,
            remaining_health,
        });

        if remaining_health > 0 {
            return;
        }

        let _ = self.enemies.remove(enemy_id);
        let points = tier.score_value();
        let session = &mut self.session;
        session.remaining_enemies = session.remaining_enemies.saturating_sub(1);
        session.enemies_defeated = session.enemies_defeated.saturating_add(1);
        session.score = session.score.saturating_add(points);
        tracing::debug!(
            enemy = enemy_id.get(),
            ?tier,
            remaining = session.remaining_enemies,
            "enemy defeated"
        );
        out_events.push(Event::EnemyDefeated {
            enemy: enemy_id,
            tier,
            points,
        });
        out_events.push(Event::ScoreChanged {
            points,
            total: session.score,
        });
    }

    fn damage_player(&mut self, projectile_id: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(projectile) = self.projectiles.get(projectile_id) else {
            tracing::warn!(projectile = projectile_id.get(), "hit by unknown projectile");
            return;
        };
        if !projectile.owner.is_enemy() {
            tracing::warn!(projectile = projectile_id.get(), "player bolt cannot hit the player");
            return;
        }
        if !self.player.alive {
            return;
        }

        let damage = projectile.damage;
        let _ = self.projectiles.remove(projectile_id);
        let outcome = self.player.apply_damage(damage);
        out_events.push(Event::PlayerHit {
            projectile: projectile_id,
            damage: outcome.applied,
            health: self.player.health,
        });
        if outcome.destroyed {
            self.player_destroyed(out_events);
        }
    }

    fn hurt_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if !self.player.alive {
            return;
        }
        let outcome = self.player.apply_damage(amount);
        out_events.push(Event::PlayerHurt {
            damage: outcome.applied,
            health: self.player.health,
        });
        if outcome.destroyed {
            self.player_destroyed(out_events);
        }
    }

    fn player_destroyed(&self, out_events: &mut Vec<Event>) {
        tracing::info!(lives = self.session.lives, "player destroyed");
        out_events.push(Event::PlayerDestroyed {
            generation: self.session.generation,
        });
    }

    fn grant_key(&mut self, out_events: &mut Vec<Event>) {
        if self.session.has_key {
            return;
        }
        if !self.session.snapshot(self.now).unlock_condition_met() {
            tracing::debug!("key requested before the unlock condition holds");
            return;
        }

        self.session.has_key = true;
        out_events.push(Event::KeyAcquired);
        let text = match self.session.mode {
            GameMode::Survival => "Wave cleared!",
            GameMode::Normal | GameMode::TimeTrial => "The gate is unlocked. Head for the exit!",
        };
        self.announce(text, MessageKind::Success, out_events);
    }

    fn collect_checkpoint(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let Some(checkpoint) = self.session.checkpoints.get_mut(index) else {
            tracing::warn!(index, "unknown checkpoint");
            return;
        };
        if checkpoint.collected {
            return;
        }

        checkpoint.collected = true;
        let remaining = self
            .session
            .checkpoints
            .iter()
            .filter(|checkpoint| !checkpoint.collected)
            .count();
        out_events.push(Event::CheckpointCollected { index, remaining });
        self.announce(
            format!("Checkpoint reached! {remaining} to go."),
            MessageKind::Info,
            out_events,
        );
    }

    fn block_at_gate(&mut self, out_events: &mut Vec<Event>) {
        if !self.session.mode.uses_gate() || self.session.has_key {
            return;
        }
        let gate = self.arena.gate_position();
        if planar_distance(self.player.position, gate) > GATE_TRIGGER_DISTANCE {
            return;
        }

        let bounced = Vec3::new(
            self.player.position.x,
            self.player.position.y,
            gate.z + GATE_BOUNCE_DISTANCE,
        );
        self.relocate_player(bounced, out_events);
        self.announce(
            "You need the key to pass the gate!",
            MessageKind::Warning,
            out_events,
        );
    }

    fn advance_level(&mut self, from_level: u32, out_events: &mut Vec<Event>) {
        let session = &self.session;
        if !session.mode.uses_gate() || !session.has_key || session.level != from_level {
            tracing::debug!(from_level, "ignoring duplicate level advance");
            return;
        }

        let elapsed = self.now.saturating_sub(session.level_started_at);
        let level = from_level.saturating_add(1);
        self.clear_arena(out_events);
        self.session.generation = self.session.generation.next();
        self.session.level = level;
        self.session.reset_level(&self.arena, self.now);

        tracing::info!(level, elapsed_ms = elapsed.as_millis() as u64, "level advanced");
        out_events.push(Event::LevelAdvanced { level, elapsed });
        self.announce(format!("Level {level}!"), MessageKind::Success, out_events);
        self.relocate_player(self.arena.player_start(), out_events);
        self.announce_attempt(false, out_events);
    }

    fn complete_wave(&mut self, wave: u32, out_events: &mut Vec<Event>) {
        let session = &self.session;
        if session.mode != GameMode::Survival
            || !session.wave_in_progress
            || session.wave != wave
            || session.total_enemies == 0
            || session.remaining_enemies > 0
        {
            tracing::debug!(wave, "ignoring premature wave completion");
            return;
        }

        self.session.wave_in_progress = false;
        self.scheduler.schedule(
            self.now.saturating_add(WAVE_PAUSE),
            self.session.generation,
            ScheduledAction::StartWave {
                wave: wave.saturating_add(1),
            },
        );
        tracing::info!(wave, "survival wave cleared");
        out_events.push(Event::WaveCleared { wave });
        self.announce(
            format!("Wave {wave} cleared! Next wave incoming."),
            MessageKind::Success,
            out_events,
        );
    }

    fn lose_life(&mut self, generation: Generation, out_events: &mut Vec<Event>) {
        if generation != self.session.generation || self.player.alive {
            tracing::debug!(generation = generation.get(), "ignoring stale life loss");
            return;
        }

        if self.session.lives == 0 {
            self.session.game_over = true;
            let stats = self.session.game_over_stats(self.now);
            tracing::info!(score = stats.score, level = stats.level, "game over");
            self.announce("Game over!", MessageKind::Danger, out_events);
            out_events.push(Event::GameOver { stats });
            return;
        }

        self.session.lives -= 1;
        let lives_remaining = self.session.lives;
        self.clear_arena(out_events);
        self.session.generation = self.session.generation.next();
        self.session.reset_level(&self.arena, self.now);
        if self.session.mode == GameMode::Survival {
            self.session.wave_in_progress = true;
        }
        self.player.respawn(self.arena.player_start());

        tracing::info!(lives_remaining, "life lost, restarting");
        out_events.push(Event::LifeLost { lives_remaining });
        self.announce(
            format!("Tank destroyed! {lives_remaining} lives left."),
            MessageKind::Danger,
            out_events,
        );
        self.relocate_player(self.arena.player_start(), out_events);
        self.announce_attempt(true, out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession {
            mode,
            difficulty,
            lives,
        } => world.start_session(mode, difficulty, lives, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SyncPlayer { position, heading } => {
            if position.is_finite() && heading.is_finite() {
                world.player.position = position;
                world.player.heading = heading;
            } else {
                tracing::warn!("ignoring player sync with invalid transform");
            }
        }
        command if !world.session.accepts_gameplay() => {
            tracing::debug!(?command, "session inactive, command ignored");
        }
        Command::FirePlayerProjectile { origin, direction } => {
            world.fire_player_projectile(origin, direction, out_events);
        }
        Command::HurtPlayer { amount } => world.hurt_player(amount, out_events),
        Command::CollectPowerUp { kind } => {
            world.player.activate(kind, world.now);
            if kind == PowerUpKind::Repair {
                tracing::debug!(health = world.player.health, "player repaired");
            }
            out_events.push(Event::PowerUpActivated { kind });
        }
        Command::SpawnEnemy { spawn } => world.spawn_enemy(spawn, out_events),
        Command::UpdateEnemy { update } => world.update_enemy(update, out_events),
        Command::EnemyFire {
            enemy,
            directions,
            kind,
        } => world.enemy_fire(enemy, directions, kind, out_events),
        Command::TeleportEnemy { enemy, to } => world.teleport_enemy(enemy, to, out_events),
        Command::DespawnEnemy { enemy } => world.despawn_enemy(enemy, out_events),
        Command::DamageEnemy { enemy, projectile } => {
            world.damage_enemy(enemy, projectile, out_events);
        }
        Command::DamagePlayer { projectile } => world.damage_player(projectile, out_events),
        Command::DiscardProjectile { projectile } => {
            if world.projectiles.remove(projectile).is_some() {
                tracing::warn!(projectile = projectile.get(), "projectile discarded");
                out_events.push(Event::ProjectileDiscarded { projectile });
            }
        }
        Command::GrantKey => world.grant_key(out_events),
        Command::CollectCheckpoint { index } => world.collect_checkpoint(index, out_events),
        Command::BlockAtGate => world.block_at_gate(out_events),
        Command::AdvanceLevel { from_level } => world.advance_level(from_level, out_events),
        Command::CompleteWave { wave } => world.complete_wave(wave, out_events),
        Command::LoseLife { generation } => world.lose_life(generation, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use alley_tanks_core::{
        Arena, CollisionView, EnemyView, PlayerSnapshot, ProjectileSnapshot, SessionSnapshot,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the alley geometry.
    #[must_use]
    pub fn arena(world: &World) -> &Arena {
        &world.arena
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Captures a read-only view of the enemies inhabiting the alley.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures everything the combat resolver needs for the current tick.
    #[must_use]
    pub fn collision_view(world: &World) -> CollisionView {
        CollisionView::new(
            world.projectiles.snapshots(),
            world.enemies.iter().map(|enemy| enemy.collider()).collect(),
            world.player.collider(),
        )
    }

    /// Mirror of the player tank.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Snapshot of the level or wave session.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        world.session.snapshot(world.now)
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectile_snapshots(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.snapshots()
    }

    /// Number of living enemies.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn projectile_count(world: &World) -> usize {
        world.projectiles.len()
    }

    /// Number of deferred actions waiting in the scheduler, stale ones included.
    #[must_use]
    pub fn pending_scheduled(world: &World) -> usize {
        world.scheduler.len()
    }
}
