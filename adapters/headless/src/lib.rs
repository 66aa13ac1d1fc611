#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless adapter that runs Alley Tanks sessions without a renderer.
//!
//! The [`Simulation`] driver owns the world and the systems and calls them in
//! a fixed order every step. Presentation goes through the core ports: a
//! [`HeadlessScene`] mirrors entity meshes in memory and a [`TracingSink`]
//! logs player-facing notifications.

mod autopilot;
mod config;
mod scene;
mod simulation;
mod sink;

pub use autopilot::Autopilot;
pub use config::{ConfigError, ScriptedPickup, SimulationConfig};
pub use scene::{HeadlessScene, Presenter, Visual};
pub use simulation::{Simulation, SimulationSummary};
pub use sink::TracingSink;
