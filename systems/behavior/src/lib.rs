#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behavior state machine.
//!
//! Every tick the system re-rolls expired behaviors, steers each enemy
//! according to its active behavior, and decides whether it fires or uses
//! its special ability. The world applies the resulting commands in order,
//! so an enemy always fires from the position it was just moved to.

use std::{
    f32::consts::{FRAC_PI_2, TAU},
    time::Duration,
};

use alley_tanks_core::{
    frames,
    geometry::{
        forward, heading_of, heading_towards, planar_direction, planar_distance, rotate_y,
        within_forward_arc,
    },
    Arena, Behavior, BehaviorKind, Command, EnemySnapshot, EnemyTier, EnemyUpdate, EnemyView,
    Event, FanPattern, PlayerSnapshot, SpecialAbility, SpecialKind, StrafeDirection, VolleyKind,
};
use alley_tanks_system_stats::{behavior_pacing, forced_charge_chance};
use glam::Vec3;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

const GLOBAL_CHANGE_SECS: (f32, f32) = (1.0, 3.0);
const TIMED_STATE_SECS: (f32, f32) = (1.0, 2.5);

const REGULAR_BEHAVIORS: [BehaviorKind; 4] = [
    BehaviorKind::Approach,
    BehaviorKind::Circle,
    BehaviorKind::Strafe,
    BehaviorKind::Retreat,
];
const BOSS_BEHAVIOR_WEIGHTS: [(BehaviorKind, u32); 5] = [
    (BehaviorKind::Approach, 15),
    (BehaviorKind::Circle, 15),
    (BehaviorKind::Strafe, 15),
    (BehaviorKind::Charge, 40),
    (BehaviorKind::Retreat, 15),
];

const CIRCLE_RADIUS: (f32, f32) = (8.0, 15.0);
const CIRCLE_ANGULAR_SPEED: f32 = 0.02;
const CHARGE_SPEED_MULTIPLIER: (f32, f32) = (1.3, 1.5);
const RETREAT_SPEED_FACTOR: f32 = 0.7;
const STRAFE_APPROACH_WEIGHT: f32 = 0.3;
const STRAFE_SIDE_WEIGHT: f32 = 0.7;

const AIM_SPREAD_SIGMA: f32 = 0.03;
const BONUS_VOLLEY_MIN_LEVEL: u32 = 3;
const BONUS_VOLLEY_CHANCE: f64 = 0.3;
const BONUS_VOLLEY_BOLTS: (usize, usize) = (2, 4);
const BONUS_VOLLEY_SPREAD: f32 = 0.25;

const SPECIAL_RESET_CHANCE: f64 = 0.3;
const TELEPORT_BEHIND_CHANCE: f64 = 0.6;
const TELEPORT_DISTANCE: (f32, f32) = (8.0, 12.0);

/// Configuration parameters required to construct the behavior system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration drawing randomness from `rng_seed`.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that steers enemies and decides when they fire.
#[derive(Debug)]
pub struct EnemyBehavior {
    rng: ChaCha8Rng,
}

impl EnemyBehavior {
    /// Creates a new behavior system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes world events and immutable views to emit enemy commands.
    ///
    /// Nothing is emitted unless the batch contains a `TimeAdvanced` event.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: &PlayerSnapshot,
        arena: &Arena,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        let mut now = None;
        for event in events {
            if let Event::TimeAdvanced { dt, now: at } = event {
                elapsed = elapsed.saturating_add(*dt);
                now = Some(*at);
            }
        }
        let Some(now) = now else {
            return;
        };

        let step = frames(elapsed);
        for enemy in enemies.iter() {
            self.drive(enemy, now, step, player, arena, out);
        }
    }

    fn drive(
        &mut self,
        enemy: &EnemySnapshot,
        now: Duration,
        step: f32,
        player: &PlayerSnapshot,
        arena: &Arena,
        out: &mut Vec<Command>,
    ) {
        if !enemy.position.is_finite() || !enemy.heading.is_finite() {
            tracing::warn!(enemy = enemy.id.get(), "dropping enemy with invalid transform");
            out.push(Command::DespawnEnemy { enemy: enemy.id });
            return;
        }

        let (behavior, behavior_change_at, rerolled) = self.next_behavior(enemy, now);
        let reset_special_cooldown =
            rerolled && enemy.special.is_some() && self.rng.gen_bool(SPECIAL_RESET_CHANCE);
        let (position, heading, behavior) = steer(enemy, behavior, player.position, step, arena);

        out.push(Command::UpdateEnemy {
            update: EnemyUpdate {
                enemy: enemy.id,
                position,
                heading,
                behavior,
                behavior_change_at,
                reset_special_cooldown,
            },
        });

        if !player.alive {
            return;
        }

        self.fire(enemy, behavior, position, heading, now, player, out);

        let special = enemy.special.map(|special| SpecialAbility {
            last_used_at: if reset_special_cooldown {
                None
            } else {
                special.last_used_at
            },
            ..special
        });
        if let Some(special) = special.filter(|special| special.is_ready(now)) {
            self.use_special(enemy, special.kind, now, player, arena, out);
        }
    }

    /// Returns the behavior active after this tick and whether it was re-rolled.
    ///
    /// Time-bounded states are checked before the global change timer.
    fn next_behavior(&mut self, enemy: &EnemySnapshot, now: Duration) -> (Behavior, Duration, bool) {
        if matches!(enemy.behavior, Behavior::Fixed { .. }) {
            return (enemy.behavior, enemy.behavior_change_at, false);
        }

        let state_ended = enemy.behavior.ends_at().is_some_and(|ends_at| now > ends_at);
        if !state_ended && now <= enemy.behavior_change_at {
            return (enemy.behavior, enemy.behavior_change_at, false);
        }

        let behavior = roll_behavior(&mut self.rng, enemy.tier, enemy.level, enemy.difficulty, now);
        let change_at = roll_behavior_change_at(&mut self.rng, enemy.level, enemy.difficulty, now);
        tracing::trace!(
            enemy = enemy.id.get(),
            from = ?enemy.behavior.kind(),
            to = ?behavior.kind(),
            state_ended,
            "behavior re-rolled"
        );
        (behavior, change_at, true)
    }

    #[allow(clippy::too_many_arguments)]
    fn fire(
        &mut self,
        enemy: &EnemySnapshot,
        behavior: Behavior,
        position: Vec3,
        heading: f32,
        now: Duration,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) {
        let reloaded = enemy
            .last_shot_at
            .map_or(true, |last| now.saturating_sub(last) > enemy.stats.shoot_interval);
        if !reloaded {
            return;
        }

        let mut toward = planar_direction(player.position - position);
        if toward == Vec3::ZERO {
            toward = forward(heading);
        }

        if let Behavior::Fixed { pattern, .. } = behavior {
            out.push(Command::EnemyFire {
                enemy: enemy.id,
                directions: fan_directions(toward, pattern),
                kind: VolleyKind::Fan,
            });
            return;
        }

        if planar_distance(position, player.position) >= enemy.stats.chase_range
            || !within_forward_arc(position, heading, player.position)
        {
            return;
        }

        let mut directions = vec![rotate_y(toward, self.aim_spread())];
        if enemy.tier == EnemyTier::Boss
            && enemy.level >= BONUS_VOLLEY_MIN_LEVEL
            && self.rng.gen_bool(BONUS_VOLLEY_CHANCE)
        {
            let extra = self
                .rng
                .gen_range(BONUS_VOLLEY_BOLTS.0..=BONUS_VOLLEY_BOLTS.1);
            for _ in 0..extra {
                let angle = self
                    .rng
                    .gen_range(-BONUS_VOLLEY_SPREAD..=BONUS_VOLLEY_SPREAD);
                directions.push(rotate_y(toward, angle));
            }
        }

        out.push(Command::EnemyFire {
            enemy: enemy.id,
            directions,
            kind: VolleyKind::Aimed,
        });
    }

    fn use_special(
        &mut self,
        enemy: &EnemySnapshot,
        kind: SpecialKind,
        now: Duration,
        player: &PlayerSnapshot,
        arena: &Arena,
        out: &mut Vec<Command>,
    ) {
        match kind {
            SpecialKind::Teleport => {
                let to = self.teleport_destination(player, arena);
                tracing::debug!(enemy = enemy.id.get(), now_ms = now.as_millis() as u64, "teleport");
                out.push(Command::TeleportEnemy { enemy: enemy.id, to });
            }
            SpecialKind::Multishot => out.push(Command::EnemyFire {
                enemy: enemy.id,
                directions: multishot_directions(multishot_count(enemy.level)),
                kind: VolleyKind::Multishot,
            }),
        }
    }

    /// Picks a spot behind the player, or beside it less often.
    fn teleport_destination(&mut self, player: &PlayerSnapshot, arena: &Arena) -> Vec3 {
        let facing = forward(player.heading);
        let distance = self.rng.gen_range(TELEPORT_DISTANCE.0..=TELEPORT_DISTANCE.1);
        let offset = if self.rng.gen_bool(TELEPORT_BEHIND_CHANCE) {
            -facing * distance
        } else {
            let side = if self.rng.gen_bool(0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
            rotate_y(facing, side) * distance
        };
        arena.clamp(player.position + offset)
    }

    fn aim_spread(&mut self) -> f32 {
        Normal::new(0.0, AIM_SPREAD_SIGMA)
            .map(|normal| normal.sample(&mut self.rng))
            .unwrap_or(0.0)
    }
}

/// Moves an enemy one step under `behavior`, returning its new transform and
/// the behavior with any per-tick parameters advanced.
fn steer(
    enemy: &EnemySnapshot,
    behavior: Behavior,
    target: Vec3,
    step: f32,
    arena: &Arena,
) -> (Vec3, f32, Behavior) {
    let position = enemy.position;
    let speed = enemy.stats.speed * step;
    let toward = planar_direction(target - position);
    let facing_player = if toward == Vec3::ZERO {
        enemy.heading
    } else {
        heading_of(toward)
    };

    let (moved, heading, behavior) = match behavior {
        Behavior::Approach => (position + toward * speed, facing_player, behavior),
        Behavior::Circle {
            radius,
            phase,
            angular_speed,
        } => {
            let phase = (phase + angular_speed * step).rem_euclid(TAU);
            let orbit = target + Vec3::new(phase.cos(), 0.0, phase.sin()) * radius;
            let offset = Vec3::new(orbit.x - position.x, 0.0, orbit.z - position.z);
            let travel = offset.length().min(speed);
            let moved = position + offset.normalize_or_zero() * travel;
            let heading = if planar_direction(target - moved) == Vec3::ZERO {
                enemy.heading
            } else {
                heading_towards(moved, target)
            };
            (
                moved,
                heading,
                Behavior::Circle {
                    radius,
                    phase,
                    angular_speed,
                },
            )
        }
        Behavior::Strafe { direction, .. } => {
            let side = Vec3::new(-toward.z, 0.0, toward.x) * direction.sign();
            let blend = (toward * STRAFE_APPROACH_WEIGHT + side * STRAFE_SIDE_WEIGHT)
                .normalize_or_zero();
            (position + blend * speed, facing_player, behavior)
        }
        Behavior::Charge {
            speed_multiplier, ..
        } => (
            position + toward * speed * speed_multiplier,
            facing_player,
            behavior,
        ),
        Behavior::Retreat { .. } => (
            position - toward * speed * RETREAT_SPEED_FACTOR,
            facing_player,
            behavior,
        ),
        Behavior::Fixed { anchor, .. } => (anchor, facing_player, behavior),
    };

    (arena.clamp(moved), heading, behavior)
}

/// Draws a fresh behavior for an enemy of `tier`.
///
/// Bosses are weighted toward charging; regular tanks pick uniformly among
/// the non-charge behaviors unless the level-scaled forced charge fires.
/// Mega-bosses are turrets and never re-roll, so they are treated like bosses
/// here.
pub fn roll_behavior<R: Rng + ?Sized>(
    rng: &mut R,
    tier: EnemyTier,
    level: u32,
    difficulty: f32,
    now: Duration,
) -> Behavior {
    let kind = if tier.is_boss_tier() {
        WeightedIndex::new(BOSS_BEHAVIOR_WEIGHTS.iter().map(|(_, weight)| *weight))
            .map(|weights| BOSS_BEHAVIOR_WEIGHTS[weights.sample(rng)].0)
            .unwrap_or(BehaviorKind::Charge)
    } else if rng.gen_bool(f64::from(forced_charge_chance(level, difficulty))) {
        BehaviorKind::Charge
    } else {
        REGULAR_BEHAVIORS[rng.gen_range(0..REGULAR_BEHAVIORS.len())]
    };

    instantiate(rng, kind, level, difficulty, now)
}

/// Draws the time at which the next global behavior change happens.
pub fn roll_behavior_change_at<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    difficulty: f32,
    now: Duration,
) -> Duration {
    now.saturating_add(paced_duration(rng, GLOBAL_CHANGE_SECS, level, difficulty))
}

fn instantiate<R: Rng + ?Sized>(
    rng: &mut R,
    kind: BehaviorKind,
    level: u32,
    difficulty: f32,
    now: Duration,
) -> Behavior {
    match kind {
        BehaviorKind::Approach | BehaviorKind::Fixed => Behavior::Approach,
        BehaviorKind::Circle => Behavior::Circle {
            radius: rng.gen_range(CIRCLE_RADIUS.0..=CIRCLE_RADIUS.1),
            phase: rng.gen_range(0.0..TAU),
            angular_speed: CIRCLE_ANGULAR_SPEED,
        },
        BehaviorKind::Strafe => Behavior::Strafe {
            direction: if rng.gen_bool(0.5) {
                StrafeDirection::Left
            } else {
                StrafeDirection::Right
            },
            ends_at: now.saturating_add(paced_duration(rng, TIMED_STATE_SECS, level, difficulty)),
        },
        BehaviorKind::Charge => Behavior::Charge {
            speed_multiplier: rng.gen_range(CHARGE_SPEED_MULTIPLIER.0..=CHARGE_SPEED_MULTIPLIER.1),
            ends_at: now.saturating_add(paced_duration(rng, TIMED_STATE_SECS, level, difficulty)),
        },
        BehaviorKind::Retreat => Behavior::Retreat {
            ends_at: now.saturating_add(paced_duration(rng, TIMED_STATE_SECS, level, difficulty)),
        },
    }
}

/// Uniform draw from `window` seconds, compressed by the level pacing factor.
fn paced_duration<R: Rng + ?Sized>(
    rng: &mut R,
    window: (f32, f32),
    level: u32,
    difficulty: f32,
) -> Duration {
    let seconds = rng.gen_range(window.0..=window.1) / behavior_pacing(level, difficulty);
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f32(seconds)
    } else {
        Duration::from_secs_f32(window.0)
    }
}

/// Number of bolts in a multishot burst for enemies rolled at `level`.
#[must_use]
pub fn multishot_count(level: u32) -> usize {
    if level < 5 {
        8
    } else if level < 10 {
        12
    } else {
        16
    }
}

/// Evenly spaced directions covering the full circle.
#[must_use]
pub fn multishot_directions(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|index| forward(TAU * index as f32 / count as f32))
        .collect()
}

/// Directions of a mega-boss fan centred on `toward`.
#[must_use]
pub fn fan_directions(toward: Vec3, pattern: FanPattern) -> Vec<Vec3> {
    pattern
        .offsets_degrees()
        .iter()
        .map(|degrees| rotate_y(toward, degrees.to_radians()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alley_tanks_core::{EnemyId, EnemyStats};

    fn enemy(tier: EnemyTier, behavior: Behavior) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(1),
            tier,
            position: Vec3::new(0.0, 0.0, -30.0),
            heading: 0.0,
            health: 200,
            stats: EnemyStats {
                health: 200,
                speed: 0.3,
                shoot_interval: Duration::from_millis(1_500),
                chase_range: 50.0,
                projectile_damage_multiplier: 1.0,
            },
            behavior,
            behavior_change_at: Duration::from_secs(10),
            last_shot_at: None,
            special: None,
            level: 1,
            difficulty: 1.0,
        }
    }

    fn player_at(position: Vec3) -> PlayerSnapshot {
        PlayerSnapshot {
            position,
            heading: std::f32::consts::PI,
            health: 100,
            alive: true,
            speed_multiplier: 1.0,
            attack_multiplier: 1.0,
            shielded: false,
        }
    }

    fn tick(now: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(100),
            now,
        }]
    }

    fn run(snapshot: EnemySnapshot, player: PlayerSnapshot, now: Duration) -> Vec<Command> {
        let mut system = EnemyBehavior::new(Config::new(7));
        let mut out = Vec::new();
        system.handle(
            &tick(now),
            &EnemyView::from_snapshots(vec![snapshot]),
            &player,
            &Arena::default(),
            &mut out,
        );
        out
    }

    fn update_of(commands: &[Command]) -> EnemyUpdate {
        commands
            .iter()
            .find_map(|command| match command {
                Command::UpdateEnemy { update } => Some(*update),
                _ => None,
            })
            .expect("update emitted")
    }

    #[test]
    fn nothing_happens_without_time_advancing() {
        let mut system = EnemyBehavior::new(Config::new(1));
        let mut out = Vec::new();
        system.handle(
            &[],
            &EnemyView::from_snapshots(vec![enemy(EnemyTier::Normal, Behavior::Approach)]),
            &player_at(Vec3::ZERO),
            &Arena::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn bosses_favour_charging() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut charges = 0;
        let mut approaches = 0;
        for _ in 0..2_000 {
            match roll_behavior(&mut rng, EnemyTier::Boss, 1, 1.0, Duration::ZERO).kind() {
                BehaviorKind::Charge => charges += 1,
                BehaviorKind::Approach => approaches += 1,
                BehaviorKind::Fixed => panic!("re-roll produced a turret"),
                _ => {}
            }
        }
        assert!(charges > approaches * 2, "{charges} charges vs {approaches}");
    }

    #[test]
    fn rolled_durations_stay_within_paced_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let now = Duration::from_secs(4);
        for _ in 0..500 {
            let change_at = roll_behavior_change_at(&mut rng, 1, 1.0, now);
            assert!(change_at >= now + Duration::from_secs(1));
            assert!(change_at <= now + Duration::from_secs(3));

            if let Some(ends_at) = roll_behavior(&mut rng, EnemyTier::Normal, 1, 1.0, now).ends_at()
            {
                assert!(ends_at >= now + Duration::from_secs(1));
                assert!(ends_at <= now + Duration::from_millis(2_500));
            }
        }
    }

    #[test]
    fn expired_timed_state_rerolls_before_global_timer() {
        let strafe = Behavior::Strafe {
            direction: StrafeDirection::Left,
            ends_at: Duration::from_secs(1),
        };
        let now = Duration::from_millis(1_100);
        let update = update_of(&run(
            enemy(EnemyTier::Normal, strafe),
            player_at(Vec3::ZERO),
            now,
        ));
        assert_ne!(update.behavior, strafe);
        assert!(update.behavior.ends_at().map_or(true, |ends_at| ends_at > now));
        assert!(update.behavior_change_at > now);
    }

    #[test]
    fn approach_moves_toward_player() {
        let update = update_of(&run(
            enemy(EnemyTier::Normal, Behavior::Approach),
            player_at(Vec3::ZERO),
            Duration::from_millis(100),
        ));
        // 0.3 units per frame over six frames.
        assert!((update.position.z - (-28.2)).abs() < 1e-3);
    }

    #[test]
    fn fixed_turret_stays_on_its_anchor_and_fires_fans() {
        let anchor = Vec3::new(0.0, 0.0, -999.0);
        let mut turret = enemy(
            EnemyTier::MegaBoss,
            Behavior::Fixed {
                anchor,
                pattern: FanPattern::Center,
            },
        );
        turret.position = anchor;
        turret.behavior_change_at = Duration::ZERO;

        let commands = run(turret, player_at(Vec3::new(5.0, 0.0, -10.0)), Duration::from_secs(30));
        let update = update_of(&commands);
        assert_eq!(update.position, anchor);
        assert!(commands.iter().any(|command| matches!(
            command,
            Command::EnemyFire { directions, kind: VolleyKind::Fan, .. } if directions.len() == 5
        )));
    }

    #[test]
    fn aimed_fire_respects_chase_range() {
        let mut far = enemy(EnemyTier::Normal, Behavior::Approach);
        far.position = Vec3::new(0.0, 0.0, -200.0);
        let commands = run(far, player_at(Vec3::ZERO), Duration::from_millis(100));
        assert!(!commands
            .iter()
            .any(|command| matches!(command, Command::EnemyFire { .. })));

        let near = enemy(EnemyTier::Normal, Behavior::Approach);
        let commands = run(near, player_at(Vec3::ZERO), Duration::from_millis(100));
        assert!(commands.iter().any(|command| matches!(
            command,
            Command::EnemyFire {
                kind: VolleyKind::Aimed,
                ..
            }
        )));
    }

    #[test]
    fn invalid_transform_is_dropped() {
        let mut broken = enemy(EnemyTier::Normal, Behavior::Approach);
        broken.position = Vec3::new(f32::NAN, 0.0, 0.0);
        let commands = run(broken, player_at(Vec3::ZERO), Duration::from_millis(100));
        assert_eq!(
            commands,
            vec![Command::DespawnEnemy {
                enemy: EnemyId::new(1)
            }]
        );
    }

    #[test]
    fn ready_multishot_fires_a_full_circle() {
        let mut boss = enemy(EnemyTier::Boss, Behavior::Approach);
        boss.level = 6;
        boss.position = Vec3::new(0.0, 0.0, -300.0);
        boss.special = Some(SpecialAbility {
            kind: SpecialKind::Multishot,
            cooldown: Duration::from_secs(6),
            last_used_at: Some(Duration::ZERO),
        });
        let commands = run(boss, player_at(Vec3::ZERO), Duration::from_secs(7));
        assert!(commands.iter().any(|command| matches!(
            command,
            Command::EnemyFire { directions, kind: VolleyKind::Multishot, .. } if directions.len() == 12
        )));
    }

    #[test]
    fn multishot_counts_scale_with_level() {
        assert_eq!(multishot_count(1), 8);
        assert_eq!(multishot_count(5), 12);
        assert_eq!(multishot_count(10), 16);
        assert_eq!(multishot_directions(8).len(), 8);
    }

    #[test]
    fn flank_fan_has_three_bolts_around_aim() {
        let directions = fan_directions(Vec3::Z, FanPattern::Flank);
        assert_eq!(directions.len(), 3);
        assert!(directions
            .iter()
            .any(|direction| (direction.z - 1.0).abs() < 1e-5));
    }

    fn steer_one_frame(behavior: Behavior) -> (Vec3, f32, Behavior) {
        let snapshot = enemy(EnemyTier::Normal, behavior);
        steer(&snapshot, behavior, Vec3::ZERO, 1.0, &Arena::default())
    }

    fn assert_faces(heading: f32, from: Vec3, target: Vec3) {
        let expected = planar_direction(target - from);
        assert!(
            forward(heading).distance(expected) < 1e-4,
            "heading {heading} does not face {expected}"
        );
    }

    #[test]
    fn circle_advances_phase_and_keeps_facing_the_player() {
        let circle = Behavior::Circle {
            radius: 10.0,
            phase: 0.0,
            angular_speed: CIRCLE_ANGULAR_SPEED,
        };
        let (moved, heading, behavior) = steer_one_frame(circle);

        let Behavior::Circle { phase, radius, .. } = behavior else {
            panic!("circle changed into {behavior:?}");
        };
        assert!((phase - CIRCLE_ANGULAR_SPEED).abs() < 1e-6);
        assert_eq!(radius, 10.0);

        let start = Vec3::new(0.0, 0.0, -30.0);
        assert!(moved.distance(start) <= 0.3 + 1e-4);
        assert!(moved.x > 0.0 && moved.z > start.z);
        assert_faces(heading, moved, Vec3::ZERO);
    }

    #[test]
    fn strafe_blends_sideways_and_forward_motion() {
        for direction in [StrafeDirection::Left, StrafeDirection::Right] {
            let strafe = Behavior::Strafe {
                direction,
                ends_at: Duration::from_secs(5),
            };
            let (moved, heading, _) = steer_one_frame(strafe);
            let start = Vec3::new(0.0, 0.0, -30.0);
            let expected = (Vec3::Z * STRAFE_APPROACH_WEIGHT
                + Vec3::new(-1.0, 0.0, 0.0) * direction.sign() * STRAFE_SIDE_WEIGHT)
                .normalize()
                * 0.3;
            assert!((moved - start).distance(expected) < 1e-4);
            assert_faces(heading, start, Vec3::ZERO);
        }
    }

    #[test]
    fn charge_closes_in_at_its_multiplier() {
        let charge = Behavior::Charge {
            speed_multiplier: 1.4,
            ends_at: Duration::from_secs(5),
        };
        let (moved, heading, _) = steer_one_frame(charge);
        assert!((moved.z - (-29.58)).abs() < 1e-4);
        assert!(moved.x.abs() < 1e-6);
        assert_faces(heading, moved, Vec3::ZERO);
    }

    #[test]
    fn retreat_backs_away_while_facing_the_player() {
        let retreat = Behavior::Retreat {
            ends_at: Duration::from_secs(5),
        };
        let (moved, heading, _) = steer_one_frame(retreat);
        assert!((moved.z - (-30.21)).abs() < 1e-4);
        assert_faces(heading, moved, Vec3::ZERO);
    }

    #[test]
    fn teleports_land_mostly_behind_the_player() {
        let mut system = EnemyBehavior::new(Config::new(11));
        let player = player_at(Vec3::new(0.0, 0.0, -500.0));
        let behind = -forward(player.heading);

        let mut behind_count = 0;
        for _ in 0..1_000 {
            let offset = system.teleport_destination(&player, &Arena::default()) - player.position;
            let distance = offset.length();
            assert!((TELEPORT_DISTANCE.0 - 1e-3..=TELEPORT_DISTANCE.1 + 1e-3).contains(&distance));
            let alignment = offset.normalize().dot(behind);
            if alignment > 0.99 {
                behind_count += 1;
            } else {
                assert!(alignment.abs() < 1e-3, "teleport neither behind nor beside");
            }
        }
        assert!((520..=680).contains(&behind_count), "{behind_count} behind");
    }

    fn volley_sizes(tier: EnemyTier, level: u32) -> Vec<usize> {
        let mut system = EnemyBehavior::new(Config::new(23));
        let mut shooter = enemy(tier, Behavior::Approach);
        shooter.level = level;
        let player = player_at(Vec3::ZERO);
        let mut sizes = Vec::new();
        for _ in 0..1_000 {
            let mut out = Vec::new();
            system.fire(
                &shooter,
                Behavior::Approach,
                shooter.position,
                shooter.heading,
                Duration::from_secs(1),
                &player,
                &mut out,
            );
            for command in out {
                if let Command::EnemyFire { directions, .. } = command {
                    sizes.push(directions.len());
                }
            }
        }
        sizes
    }

    #[test]
    fn veteran_bosses_add_bonus_volleys() {
        let sizes = volley_sizes(EnemyTier::Boss, 3);
        assert_eq!(sizes.len(), 1_000);
        assert!(sizes
            .iter()
            .all(|size| *size == 1 || (3..=5).contains(size)));
        let bonus = sizes.iter().filter(|size| **size > 1).count();
        assert!((220..=380).contains(&bonus), "{bonus} bonus volleys");

        assert!(volley_sizes(EnemyTier::Boss, 2).iter().all(|size| *size == 1));
        assert!(volley_sizes(EnemyTier::Normal, 8).iter().all(|size| *size == 1));
    }

    #[test]
    fn rerolls_sometimes_reset_the_special_cooldown() {
        let special = SpecialAbility {
            kind: SpecialKind::Teleport,
            cooldown: Duration::from_secs(8),
            last_used_at: Some(Duration::from_millis(900)),
        };
        let mut resets = 0;
        for seed in 0..400 {
            let mut boss = enemy(EnemyTier::Boss, Behavior::Approach);
            boss.special = Some(special);
            boss.behavior_change_at = Duration::ZERO;

            let mut system = EnemyBehavior::new(Config::new(seed));
            let mut out = Vec::new();
            system.handle(
                &tick(Duration::from_secs(1)),
                &EnemyView::from_snapshots(vec![boss]),
                &player_at(Vec3::ZERO),
                &Arena::default(),
                &mut out,
            );
            if update_of(&out).reset_special_cooldown {
                resets += 1;
            }
        }
        assert!((80..=160).contains(&resets), "{resets} resets");

        let mut steady = enemy(EnemyTier::Boss, Behavior::Approach);
        steady.special = Some(special);
        let update = update_of(&run(steady, player_at(Vec3::ZERO), Duration::from_secs(1)));
        assert!(!update.reset_special_cooldown);
    }
}
