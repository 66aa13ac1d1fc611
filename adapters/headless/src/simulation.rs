//! Fixed-order tick driver wiring the world to every system.

use std::time::Duration;

use alley_tanks_core::{
    presentation::{notify, EventSink, Scene},
    Command, Event, GameMode,
};
use alley_tanks_system_behavior::{Config as BehaviorConfig, EnemyBehavior};
use alley_tanks_system_combat::CombatResolver;
use alley_tanks_system_progression::Progression;
use alley_tanks_system_spawning::{Config as SpawningConfig, Spawning};
use alley_tanks_world::{self as world, query, World};

use crate::{
    autopilot::Autopilot,
    config::SimulationConfig,
    scene::{HeadlessScene, Presenter},
    sink::TracingSink,
};

/// Upper bound on spawner and progression rounds within one step.
const MAX_SETTLE_ROUNDS: usize = 16;

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationSummary {
    /// Rule set that was played.
    pub mode: GameMode,
    /// Steps simulated.
    pub ticks: u32,
    /// Simulated time.
    pub elapsed: Duration,
    /// Final score.
    pub score: u32,
    /// Level reached.
    pub level: u32,
    /// Survival wave reached.
    pub wave: u32,
    /// Extra lives left.
    pub lives: u32,
    /// Enemies destroyed by the player.
    pub enemies_defeated: u32,
    /// Enemies still alive.
    pub enemies_alive: usize,
    /// Whether the session ended permanently.
    pub game_over: bool,
}

/// Owns the world and runs the systems in a fixed order every step:
/// player input, clock, spawner, behavior, combat, then progression, which is
/// pumped together with the spawner until neither has anything left to say.
#[derive(Debug)]
pub struct Simulation<S = HeadlessScene, K = TracingSink> {
    world: World,
    spawning: Spawning,
    behavior: EnemyBehavior,
    combat: CombatResolver,
    progression: Progression,
    autopilot: Autopilot,
    presenter: Presenter,
    scene: S,
    sink: K,
    timestep: Duration,
    ticks: u32,
    enemies_defeated: u32,
}

impl Simulation {
    /// Starts a session presented through the headless scene and tracing sink.
    #[must_use]
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_ports(config, HeadlessScene::new(), TracingSink::new())
    }
}

impl<S: Scene, K: EventSink> Simulation<S, K> {
    /// Starts a session presented through the provided ports.
    pub fn with_ports(config: &SimulationConfig, scene: S, sink: K) -> Self {
        let mut simulation = Self {
            world: World::with_arena(config.arena),
            spawning: Spawning::new(SpawningConfig::new(config.seed)),
            behavior: EnemyBehavior::new(BehaviorConfig::new(config.seed)),
            combat: CombatResolver::new(),
            progression: Progression::new(),
            autopilot: Autopilot::new(config.pickups.clone()),
            presenter: Presenter::new(),
            scene,
            sink,
            timestep: config.timestep(),
            ticks: 0,
            enemies_defeated: 0,
        };
        let _ = simulation.submit(Command::StartSession {
            mode: config.mode,
            difficulty: config.difficulty,
            lives: config.lives,
        });
        simulation
    }

    /// Applies a host command outside the regular step, such as a restart or
    /// scripted damage, and lets the spawner and progression react to it.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.settle(&mut events, true);
        self.present(&events);
        events
    }

    /// Advances the simulation by one fixed step and returns its events.
    pub fn step(&mut self) -> Vec<Event> {
        let dt = self.timestep;
        let mut events = Vec::new();

        let mut inputs = Vec::new();
        self.autopilot.drive(
            query::now(&self.world).saturating_add(dt),
            dt,
            &query::player(&self.world),
            &query::enemy_view(&self.world),
            &query::session(&self.world),
            query::arena(&self.world),
            &mut inputs,
        );
        self.apply_all(inputs, &mut events);

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.ticks = self.ticks.saturating_add(1);

        if !query::session(&self.world).game_over {
            self.run_systems(&mut events);
        }

        self.present(&events);
        events
    }

    /// Steps until `ticks` steps ran or the session ended.
    pub fn run(&mut self, ticks: u32) -> SimulationSummary {
        for _ in 0..ticks {
            if query::session(&self.world).game_over {
                break;
            }
            let _ = self.step();
        }
        self.summary()
    }

    /// Summarises the session so far.
    #[must_use]
    pub fn summary(&self) -> SimulationSummary {
        let session = query::session(&self.world);
        SimulationSummary {
            mode: session.mode,
            ticks: self.ticks,
            elapsed: query::now(&self.world),
            score: session.score,
            level: session.level,
            wave: session.wave,
            lives: session.lives,
            enemies_defeated: self.enemies_defeated,
            enemies_alive: query::enemy_count(&self.world),
            game_over: session.game_over,
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Scene the world is mirrored into.
    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Sink receiving player-facing notifications.
    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    fn run_systems(&mut self, events: &mut Vec<Event>) {
        let arena = *query::arena(&self.world);

        let mut commands = Vec::new();
        self.spawning.handle(events, &arena, &mut commands);
        self.apply_all(commands, events);

        let mut commands = Vec::new();
        self.behavior.handle(
            events,
            &query::enemy_view(&self.world),
            &query::player(&self.world),
            &arena,
            &mut commands,
        );
        self.apply_all(commands, events);

        let mut commands = Vec::new();
        self.combat
            .handle(events, &query::collision_view(&self.world), &mut commands);
        self.apply_all(commands, events);

        self.settle(events, false);
    }

    /// Pumps progression, and the spawner for anything progression started,
    /// until no further commands are produced.
    fn settle(&mut self, events: &mut Vec<Event>, spawn_first_batch: bool) {
        let arena = *query::arena(&self.world);
        let mut start = 0;
        for round in 0..MAX_SETTLE_ROUNDS {
            let mut commands = Vec::new();
            let batch = &events[start..];
            if round > 0 || spawn_first_batch {
                self.spawning.handle(batch, &arena, &mut commands);
            }
            self.progression.handle(
                batch,
                &query::session(&self.world),
                &query::player(&self.world),
                &arena,
                &mut commands,
            );
            if commands.is_empty() {
                return;
            }
            start = events.len();
            self.apply_all(commands, events);
        }
        tracing::warn!(rounds = MAX_SETTLE_ROUNDS, "progression did not settle");
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }

    fn present(&mut self, events: &[Event]) {
        self.presenter.apply_events(&mut self.scene, events);
        self.presenter.sync_transforms(
            &mut self.scene,
            &query::enemy_view(&self.world),
            &query::projectile_snapshots(&self.world),
        );
        for event in events {
            if matches!(event, Event::EnemyDefeated { .. }) {
                self.enemies_defeated = self.enemies_defeated.saturating_add(1);
            }
            notify(&mut self.sink, event);
        }
    }
}
