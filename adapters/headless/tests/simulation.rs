use alley_tanks_core::{
    presentation::VisualHandle, Command, Event, GameMode, PowerUpKind, GATE_BOUNCE_DISTANCE,
    PLAYER_MAX_HEALTH,
};
use glam::Vec3;
use alley_tanks_headless::{ScriptedPickup, Simulation, SimulationConfig};
use alley_tanks_world::query;

fn config(mode: GameMode) -> SimulationConfig {
    SimulationConfig {
        mode,
        seed: 1234,
        ..SimulationConfig::default()
    }
}

fn positions(simulation: &Simulation) -> Vec<[f32; 3]> {
    query::enemy_view(simulation.world())
        .iter()
        .map(|enemy| enemy.position.to_array())
        .collect()
}

#[test]
fn session_starts_with_a_mirrored_roster() {
    let simulation = Simulation::new(&config(GameMode::Normal));
    assert_eq!(query::enemy_count(simulation.world()), 26);
    assert_eq!(simulation.scene().len(), 26);

    let first = simulation
        .scene()
        .visual(VisualHandle::new(0))
        .expect("first enemy mesh");
    assert_eq!(first.half_extents, Vec3::new(1.5, 1.0, 1.5));
    assert!(!first.hostile);
    assert_eq!(
        first.position,
        query::enemy_view(simulation.world())
            .iter()
            .next()
            .expect("first enemy")
            .position
    );

    let survival = Simulation::new(&config(GameMode::Survival));
    assert_eq!(query::enemy_count(survival.world()), 20);
}

#[test]
fn scene_tracks_every_live_entity() {
    let mut simulation = Simulation::new(&config(GameMode::Normal));
    for _ in 0..240 {
        let _ = simulation.step();
        let world = simulation.world();
        assert_eq!(
            simulation.scene().len(),
            query::enemy_count(world) + query::projectile_count(world)
        );
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let mut first = Simulation::new(&config(GameMode::Normal));
    let mut second = Simulation::new(&config(GameMode::Normal));
    let first_summary = first.run(600);
    let second_summary = second.run(600);

    assert_eq!(first_summary, second_summary);
    assert_eq!(positions(&first), positions(&second));
    assert_eq!(
        query::projectile_snapshots(first.world()),
        query::projectile_snapshots(second.world())
    );
}

#[test]
fn game_over_freezes_the_alley() {
    let mut simulation = Simulation::new(&SimulationConfig {
        lives: 0,
        ..config(GameMode::Normal)
    });
    let events = simulation.submit(Command::HurtPlayer {
        amount: PLAYER_MAX_HEALTH,
    });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::GameOver { .. })));

    let frozen = positions(&simulation);
    for _ in 0..30 {
        let _ = simulation.step();
    }
    assert_eq!(positions(&simulation), frozen);

    let summary = simulation.run(100);
    assert!(summary.game_over);
    assert_eq!(summary.ticks, 30);
    assert_eq!(summary.lives, 0);
}

#[test]
fn scripted_pickups_are_collected_on_time() {
    let mut simulation = Simulation::new(&SimulationConfig {
        pickups: vec![
            ScriptedPickup {
                at_ms: 100,
                kind: PowerUpKind::SpeedBoost,
            },
            ScriptedPickup {
                at_ms: 0,
                kind: PowerUpKind::Shield,
            },
        ],
        ..config(GameMode::TimeTrial)
    });

    let first = simulation.step();
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::PowerUpActivated { kind: PowerUpKind::Shield })));
    assert!(query::player(simulation.world()).shielded);

    let mut boosted = false;
    for _ in 0..10 {
        boosted |= simulation.step().iter().any(|event| {
            matches!(
                event,
                Event::PowerUpActivated {
                    kind: PowerUpKind::SpeedBoost
                }
            )
        });
    }
    assert!(boosted);
    assert_eq!(query::player(simulation.world()).speed_multiplier, 1.5);
}

#[test]
fn gate_bounce_is_reported_to_the_player() {
    let mut simulation = Simulation::new(&config(GameMode::Normal));
    let before = simulation.sink().messages();
    let gate = query::arena(simulation.world()).gate_position();

    let events = simulation.submit(Command::SyncPlayer {
        position: gate,
        heading: std::f32::consts::PI,
    });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerRelocated { .. })));
    assert_eq!(simulation.sink().messages(), before + 1);
    assert_eq!(
        query::player(simulation.world()).position.z,
        gate.z + GATE_BOUNCE_DISTANCE
    );
}
