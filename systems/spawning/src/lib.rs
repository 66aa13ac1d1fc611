#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.
//!
//! Each level or wave draws its roster from a dedicated random stream seeded
//! by hashing the session seed together with the mode and level, so a replay
//! with the same seed rebuilds identical rosters.

use std::{f32::consts::TAU, time::Duration};

use alley_tanks_core::{
    geometry::{forward, heading_towards},
    Arena, Behavior, Command, EnemySpawn, EnemyTier, Event, FanPattern, GameMode,
    SpecialAbility, SpecialKind,
};
use alley_tanks_system_behavior::{roll_behavior, roll_behavior_change_at};
use alley_tanks_system_stats::{compute_enemy_stats, normalize_difficulty, normalize_level};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

const NORMAL_REGULARS: usize = 20;
const NORMAL_BOSSES: usize = 3;
const MEGA_BOSS_SPACING: f32 = 10.0;

const REGULAR_DEPTH: (f32, f32) = (0.05, 0.9);
const BOSS_DEPTH: (f32, f32) = (0.3, 0.85);

const CHECKPOINT_SPREAD: (f32, f32) = (6.0, 15.0);

const SURVIVAL_WAVE_SIZE: usize = 20;
const SURVIVAL_BOSS_EVERY: u32 = 3;
const SURVIVAL_ZONES: [(f32, f32); 3] = [(15.0, 35.0), (35.0, 60.0), (60.0, 90.0)];

const SPECIAL_MIN_LEVEL: u32 = 2;
const TELEPORT_COOLDOWN: Duration = Duration::from_secs(8);
const MULTISHOT_COOLDOWN: Duration = Duration::from_secs(6);

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided session seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Describes the level or wave a roster is built for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RosterRequest {
    /// Rule set deciding the roster composition.
    pub mode: GameMode,
    /// Level number, or wave number in survival.
    pub number: u32,
    /// Difficulty multiplier applied to every stat roll.
    pub difficulty: f32,
    /// Simulation time the level or wave begins at.
    pub at: Duration,
    /// Point enemies face on spawn; survival zones are centred on it.
    pub focus: Vec3,
}

/// Pure system that emits a fresh roster whenever a level or wave begins.
#[derive(Debug)]
pub struct Spawning {
    rng_seed: u64,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng_seed: config.rng_seed,
        }
    }

    /// Consumes events to emit spawn commands for started levels and waves.
    pub fn handle(&mut self, events: &[Event], arena: &Arena, out: &mut Vec<Command>) {
        for event in events {
            let request = match *event {
                Event::LevelStarted {
                    mode,
                    level,
                    difficulty,
                    at,
                    ..
                } => RosterRequest {
                    mode,
                    number: level,
                    difficulty,
                    at,
                    focus: arena.player_start(),
                },
                Event::WaveStarted {
                    wave,
                    difficulty,
                    at,
                    player_position,
                    ..
                } => RosterRequest {
                    mode: GameMode::Survival,
                    number: wave,
                    difficulty,
                    at,
                    focus: player_position,
                },
                _ => continue,
            };

            let spawns = roster(self.rng_seed, arena, &request);
            tracing::info!(
                mode = request.mode.label(),
                number = request.number,
                enemies = spawns.len(),
                "spawning roster"
            );
            out.extend(spawns.into_iter().map(|spawn| Command::SpawnEnemy { spawn }));
        }
    }
}

/// Builds the roster for `request`. Identical inputs yield identical rosters.
#[must_use]
pub fn roster(seed: u64, arena: &Arena, request: &RosterRequest) -> Vec<EnemySpawn> {
    let request = RosterRequest {
        number: normalize_level(request.number),
        difficulty: normalize_difficulty(request.difficulty),
        ..*request
    };
    let mut builder = RosterBuilder {
        rng: ChaCha8Rng::seed_from_u64(derive_roster_seed(seed, request.mode, request.number)),
        arena,
        request,
        spawns: Vec::new(),
    };

    match request.mode {
        GameMode::Normal => builder.normal(),
        GameMode::TimeTrial => builder.time_trial(),
        GameMode::Survival => builder.survival(),
    }

    builder.spawns
}

struct RosterBuilder<'a> {
    rng: ChaCha8Rng,
    arena: &'a Arena,
    request: RosterRequest,
    spawns: Vec<EnemySpawn>,
}

impl RosterBuilder<'_> {
    fn normal(&mut self) {
        for _ in 0..NORMAL_REGULARS {
            let position = self.alley_position(REGULAR_DEPTH);
            self.push(EnemyTier::Normal, position);
        }
        for _ in 0..NORMAL_BOSSES {
            let position = self.alley_position(BOSS_DEPTH);
            self.push(EnemyTier::Boss, position);
        }
        self.mega_bosses();
    }

    fn time_trial(&mut self) {
        let checkpoints = self.arena.checkpoint_positions();
        if checkpoints.is_empty() {
            return;
        }

        let regulars = NORMAL_REGULARS * 4 / 5;
        let bosses = NORMAL_BOSSES * 4 / 5;
        for index in 0..regulars + bosses {
            let tier = if index < regulars {
                EnemyTier::Normal
            } else {
                EnemyTier::Boss
            };
            let anchor = checkpoints[index % checkpoints.len()];
            let position = self.around(anchor, CHECKPOINT_SPREAD);
            self.push(tier, position);
        }
    }

    fn survival(&mut self) {
        let boss_wave = self.request.number % SURVIVAL_BOSS_EVERY == 0;
        for index in 0..SURVIVAL_WAVE_SIZE {
            let tier = if boss_wave && index == 0 {
                EnemyTier::Boss
            } else {
                EnemyTier::Normal
            };
            let zone = SURVIVAL_ZONES[index % SURVIVAL_ZONES.len()];
            let position = self.around(self.request.focus, zone);
            self.push(tier, position);
        }
    }

    fn mega_bosses(&mut self) {
        let spacing = MEGA_BOSS_SPACING.min(self.arena.lateral_limit());
        let z = self.arena.mega_boss_z();
        for (x, pattern) in [
            (-spacing, FanPattern::Flank),
            (0.0, FanPattern::Center),
            (spacing, FanPattern::Flank),
        ] {
            let anchor = Vec3::new(x, 0.0, z);
            let request = self.request;
            self.spawns.push(EnemySpawn {
                tier: EnemyTier::MegaBoss,
                position: anchor,
                heading: heading_towards(anchor, request.focus),
                stats: compute_enemy_stats(EnemyTier::MegaBoss, request.number, request.difficulty),
                behavior: Behavior::Fixed { anchor, pattern },
                behavior_change_at: request.at,
                special: None,
                level: request.number,
                difficulty: request.difficulty,
            });
        }
    }

    fn push(&mut self, tier: EnemyTier, position: Vec3) {
        let RosterRequest {
            number,
            difficulty,
            at,
            focus,
            ..
        } = self.request;
        let behavior = roll_behavior(&mut self.rng, tier, number, difficulty, at);
        let behavior_change_at = roll_behavior_change_at(&mut self.rng, number, difficulty, at);
        let special = self.roll_special(tier);
        self.spawns.push(EnemySpawn {
            tier,
            position,
            heading: heading_towards(position, focus),
            stats: compute_enemy_stats(tier, number, difficulty),
            behavior,
            behavior_change_at,
            special,
            level: number,
            difficulty,
        });
    }

    /// Bosses past the first level carry one ability, cooling down from spawn.
    fn roll_special(&mut self, tier: EnemyTier) -> Option<SpecialAbility> {
        if tier != EnemyTier::Boss || self.request.number < SPECIAL_MIN_LEVEL {
            return None;
        }
        let (kind, cooldown) = if self.rng.gen_bool(0.5) {
            (SpecialKind::Teleport, TELEPORT_COOLDOWN)
        } else {
            (SpecialKind::Multishot, MULTISHOT_COOLDOWN)
        };
        Some(SpecialAbility {
            kind,
            cooldown,
            last_used_at: Some(self.request.at),
        })
    }

    fn alley_position(&mut self, depth: (f32, f32)) -> Vec3 {
        let limit = self.arena.lateral_limit();
        let length = self.arena.length;
        let x = self.rng.gen_range(-limit..=limit);
        let z = -self.rng.gen_range(length * depth.0..=length * depth.1);
        Vec3::new(x, 0.0, z)
    }

    fn around(&mut self, centre: Vec3, band: (f32, f32)) -> Vec3 {
        let angle = self.rng.gen_range(0.0..TAU);
        let distance = self.rng.gen_range(band.0..=band.1);
        self.arena.clamp(centre + forward(angle) * distance)
    }
}

fn derive_roster_seed(seed: u64, mode: GameMode, number: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(mode.label().as_bytes());
    hasher.update(number.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
