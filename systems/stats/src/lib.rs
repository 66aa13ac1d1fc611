#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure enemy stat scaling.
//!
//! Every function here is deterministic: identical inputs always yield
//! identical stats. Randomness stays with the callers.

use std::time::Duration;

use alley_tanks_core::{EnemyStats, EnemyTier};

/// Hard floor applied to rolled shoot intervals.
pub const MIN_SHOOT_INTERVAL_MS: u64 = 300;

/// Hard cap applied to rolled chase ranges.
pub const MAX_CHASE_RANGE: f32 = 100.0;

const BASE_CHASE_RANGE: f32 = 50.0;
const MEGA_BOSS_HEALTH_FACTOR: f64 = 4.0;
const MEGA_BOSS_DAMAGE_MULTIPLIER: f32 = 4.0;

#[derive(Clone, Copy, Debug)]
struct TierBase {
    health: f32,
    speed: f32,
    max_speed: f32,
    shoot_interval_ms: f32,
    damage_multiplier: f32,
}

const NORMAL_BASE: TierBase = TierBase {
    health: 100.0,
    speed: 0.3,
    max_speed: 0.6,
    shoot_interval_ms: 1_500.0,
    damage_multiplier: 1.0,
};

const BOSS_BASE: TierBase = TierBase {
    health: 400.0,
    speed: 0.2,
    max_speed: 0.5,
    shoot_interval_ms: 1_000.0,
    damage_multiplier: 2.0,
};

/// Level used when the caller passes an out-of-range level.
pub const FALLBACK_LEVEL: u32 = 1;

/// Difficulty used when the caller passes a non-positive or non-finite value.
pub const FALLBACK_DIFFICULTY: f32 = 1.0;

/// Clamps a level into the supported range, treating zero as level one.
#[must_use]
pub fn normalize_level(level: u32) -> u32 {
    level.max(FALLBACK_LEVEL)
}

/// Replaces invalid difficulty multipliers with the neutral default.
#[must_use]
pub fn normalize_difficulty(difficulty: f32) -> f32 {
    if difficulty.is_finite() && difficulty > 0.0 {
        difficulty
    } else {
        FALLBACK_DIFFICULTY
    }
}

/// Computes the stats of an enemy of `tier` rolled for `level` and `difficulty`.
///
/// Mega-boss stats derive from the boss stats: health is multiplied by four on
/// top of the boss scaling and projectile damage uses a fixed multiplier.
#[must_use]
pub fn compute_enemy_stats(tier: EnemyTier, level: u32, difficulty: f32) -> EnemyStats {
    let level = normalize_level(level);
    let difficulty = normalize_difficulty(difficulty);
    let steps = f64::from(level - 1);
    let difficulty = f64::from(difficulty);
    let difficulty_root = difficulty.sqrt();

    let base = match tier {
        EnemyTier::Normal => NORMAL_BASE,
        EnemyTier::Boss | EnemyTier::MegaBoss => BOSS_BASE,
    };

    // (1 + steps * 0.5) * 2 == 2 + steps, kept in integer-friendly form so
    // floors land on whole values.
    let mut health = (f64::from(base.health) * (2.0 + steps) * difficulty).floor();
    let speed = ((f64::from(base.speed) * (1.0 + steps * 0.2) * difficulty_root) as f32)
        .min(base.max_speed);
    let interval = (f64::from(base.shoot_interval_ms) * (100.0 - steps * 15.0)
        / (100.0 * difficulty_root))
        .floor();
    let shoot_interval_ms = if interval.is_finite() {
        (interval.max(0.0) as u64).max(MIN_SHOOT_INTERVAL_MS)
    } else {
        MIN_SHOOT_INTERVAL_MS
    };
    let chase_range = ((f64::from(BASE_CHASE_RANGE) * (10.0 + steps * 3.0) / 10.0
        * difficulty_root)
        .floor() as f32)
        .min(MAX_CHASE_RANGE);
    let mut projectile_damage_multiplier = base.damage_multiplier;

    if tier == EnemyTier::MegaBoss {
        health = (health * MEGA_BOSS_HEALTH_FACTOR).floor();
        projectile_damage_multiplier = MEGA_BOSS_DAMAGE_MULTIPLIER;
    }

    EnemyStats {
        health: saturating_health(health),
        speed,
        shoot_interval: Duration::from_millis(shoot_interval_ms),
        chase_range,
        projectile_damage_multiplier,
    }
}

/// Factor that compresses behavior durations as levels and difficulty rise.
#[must_use]
pub fn behavior_pacing(level: u32, difficulty: f32) -> f32 {
    let level = normalize_level(level);
    let difficulty = normalize_difficulty(difficulty);
    (1.0 + (level - 1) as f32 * 0.1) * difficulty.sqrt()
}

/// Probability that a regular enemy re-rolls straight into a charge.
#[must_use]
pub fn forced_charge_chance(level: u32, difficulty: f32) -> f32 {
    let level = normalize_level(level);
    let difficulty = normalize_difficulty(difficulty);
    ((0.1 + (level - 1) as f32 * 0.05) * difficulty).min(0.4)
}

fn saturating_health(value: f64) -> u32 {
    if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (value.max(1.0)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIERS: [EnemyTier; 3] = [EnemyTier::Normal, EnemyTier::Boss, EnemyTier::MegaBoss];

    #[test]
    fn level_one_baselines_match_table() {
        let normal = compute_enemy_stats(EnemyTier::Normal, 1, 1.0);
        assert_eq!(normal.health, 200);
        assert!((normal.speed - 0.3).abs() < 1e-6);
        assert_eq!(normal.shoot_interval, Duration::from_millis(1_500));
        assert!((normal.chase_range - 50.0).abs() < f32::EPSILON);
        assert!((normal.projectile_damage_multiplier - 1.0).abs() < f32::EPSILON);

        let boss = compute_enemy_stats(EnemyTier::Boss, 1, 1.0);
        assert_eq!(boss.health, 800);
        assert_eq!(boss.shoot_interval, Duration::from_millis(1_000));
        assert!((boss.projectile_damage_multiplier - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mega_boss_derives_from_boss_stats() {
        let boss = compute_enemy_stats(EnemyTier::Boss, 3, 1.5);
        let mega = compute_enemy_stats(EnemyTier::MegaBoss, 3, 1.5);
        assert_eq!(mega.health, boss.health * 4);
        assert_eq!(mega.shoot_interval, boss.shoot_interval);
        assert!((mega.speed - boss.speed).abs() < f32::EPSILON);
        assert!((mega.projectile_damage_multiplier - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn level_scaling_follows_formulas() {
        let stats = compute_enemy_stats(EnemyTier::Normal, 3, 1.0);
        assert_eq!(stats.health, 400);
        assert!((stats.speed - 0.42).abs() < 1e-5);
        assert_eq!(stats.shoot_interval, Duration::from_millis(1_050));
        assert!((stats.chase_range - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn health_is_monotonic_in_level_and_difficulty() {
        for tier in TIERS {
            let mut previous = 0;
            for level in 1..=30 {
                let health = compute_enemy_stats(tier, level, 1.0).health;
                assert!(health >= previous, "{tier:?} level {level} regressed");
                previous = health;
            }

            let mut previous = 0;
            for step in 1..=40 {
                let difficulty = step as f32 * 0.25;
                let health = compute_enemy_stats(tier, 4, difficulty).health;
                assert!(health >= previous, "{tier:?} difficulty {difficulty} regressed");
                previous = health;
            }
        }
    }

    #[test]
    fn speed_and_chase_range_respect_caps() {
        for tier in TIERS {
            for level in [1, 2, 5, 10, 50, 500] {
                for difficulty in [0.5, 1.0, 2.0, 9.0, 100.0] {
                    let stats = compute_enemy_stats(tier, level, difficulty);
                    let cap = if tier == EnemyTier::Normal { 0.6 } else { 0.5 };
                    assert!(stats.speed <= cap + f32::EPSILON);
                    assert!(stats.chase_range <= MAX_CHASE_RANGE);
                    assert!(stats.shoot_interval >= Duration::from_millis(MIN_SHOOT_INTERVAL_MS));
                }
            }
        }
    }

    #[test]
    fn out_of_range_inputs_fall_back_to_level_one_defaults() {
        let baseline = compute_enemy_stats(EnemyTier::Boss, 1, 1.0);
        assert_eq!(compute_enemy_stats(EnemyTier::Boss, 0, 1.0), baseline);
        assert_eq!(compute_enemy_stats(EnemyTier::Boss, 1, f32::NAN), baseline);
        assert_eq!(compute_enemy_stats(EnemyTier::Boss, 1, -3.0), baseline);
    }

    #[test]
    fn stats_are_deterministic() {
        assert_eq!(
            compute_enemy_stats(EnemyTier::Normal, 7, 1.3),
            compute_enemy_stats(EnemyTier::Normal, 7, 1.3)
        );
    }

    #[test]
    fn pacing_and_charge_chance_scale_with_level() {
        assert!((behavior_pacing(1, 1.0) - 1.0).abs() < f32::EPSILON);
        assert!(behavior_pacing(5, 1.0) > behavior_pacing(2, 1.0));
        assert!((forced_charge_chance(1, 1.0) - 0.1).abs() < 1e-6);
        assert!((forced_charge_chance(40, 3.0) - 0.4).abs() < f32::EPSILON);
    }
}
