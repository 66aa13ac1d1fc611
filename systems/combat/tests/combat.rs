use std::time::Duration;

use alley_tanks_core::{
    Behavior, Command, EnemySpawn, EnemyStats, EnemyTier, Event, GameMode,
};
use alley_tanks_system_combat::CombatResolver;
use alley_tanks_world::{self as world, query, World};
use glam::Vec3;

fn start() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartSession {
            mode: GameMode::Normal,
            difficulty: 1.0,
            lives: 3,
        },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, tier: EnemyTier, position: Vec3, health: u32) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            spawn: EnemySpawn {
                tier,
                position,
                heading: 0.0,
                stats: EnemyStats {
                    health,
                    speed: 0.0,
                    shoot_interval: Duration::from_secs(60),
                    chase_range: 0.0,
                    projectile_damage_multiplier: 1.0,
                },
                behavior: Behavior::Approach,
                behavior_change_at: Duration::from_secs(60),
                special: None,
                level: 1,
                difficulty: 1.0,
            },
        },
        &mut events,
    );
}

fn fire_at(world: &mut World, target: Vec3) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::FirePlayerProjectile {
            origin: target,
            direction: Vec3::new(0.0, 0.0, -1.0),
        },
        &mut events,
    );
}

fn resolve_tick(world: &mut World, resolver: &mut CombatResolver) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    resolver.handle(&events, &query::collision_view(world), &mut commands);

    let mut resolved = Vec::new();
    for command in commands {
        world::apply(world, command, &mut resolved);
    }
    resolved
}

fn score_deltas(events: &[Event]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ScoreChanged { points, .. } => Some(*points),
            _ => None,
        })
        .collect()
}

#[test]
fn normal_kill_scores_five_and_boss_kill_scores_twenty_five() {
    let mut world = start();
    let mut resolver = CombatResolver::new();

    let normal_at = Vec3::new(-8.0, 0.0, -40.0);
    let boss_at = Vec3::new(8.0, 0.0, -40.0);
    spawn(&mut world, EnemyTier::Normal, normal_at, 15);
    spawn(&mut world, EnemyTier::Boss, boss_at, 15);

    fire_at(&mut world, normal_at);
    let events = resolve_tick(&mut world, &mut resolver);
    assert_eq!(score_deltas(&events), vec![5]);

    fire_at(&mut world, boss_at);
    let events = resolve_tick(&mut world, &mut resolver);
    assert_eq!(score_deltas(&events), vec![25]);

    assert_eq!(query::session(&world).score, 30);
    assert_eq!(query::enemy_count(&world), 0);
}

#[test]
fn stacked_enemies_take_one_hit_per_projectile() {
    let mut world = start();
    let mut resolver = CombatResolver::new();
    let position = Vec3::new(0.0, 0.0, -25.0);
    spawn(&mut world, EnemyTier::Normal, position, 100);
    spawn(&mut world, EnemyTier::Normal, position, 100);

    fire_at(&mut world, position);
    let events = resolve_tick(&mut world, &mut resolver);

    let hits: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyHit { .. }))
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(query::projectile_count(&world), 0);

    let total_health: u32 = query::enemy_view(&world)
        .iter()
        .map(|enemy| enemy.health)
        .sum();
    assert_eq!(total_health, 185);
}

#[test]
fn enemy_bolts_damage_the_player() {
    let mut world = start();
    let mut resolver = CombatResolver::new();
    spawn(&mut world, EnemyTier::Boss, Vec3::new(0.0, 0.0, -4.0), 400);
    let enemy = query::enemy_view(&world)
        .iter()
        .next()
        .map(|enemy| enemy.id)
        .expect("boss spawned");

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::EnemyFire {
            enemy,
            directions: vec![Vec3::Z],
            kind: alley_tanks_core::VolleyKind::Aimed,
        },
        &mut events,
    );
    let mut health = query::player(&world).health;
    for _ in 0..10 {
        let events = resolve_tick(&mut world, &mut resolver);
        if let Some(after) = events.iter().find_map(|event| match event {
            Event::PlayerHit { health, .. } => Some(*health),
            _ => None,
        }) {
            health = after;
            break;
        }
    }

    assert_eq!(health, 90);
}
