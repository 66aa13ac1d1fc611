//! Simulation settings loaded from TOML.

use std::{fs, path::Path, time::Duration};

use alley_tanks_core::{Arena, GameMode, PowerUpKind, DEFAULT_LIVES};
use serde::{Deserialize, Serialize};

/// Largest accepted difficulty multiplier.
const MAX_DIFFICULTY: f32 = 10.0;

/// Errors raised while loading or validating a [`SimulationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The configuration text is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The alley geometry leaves no room to drive.
    #[error("invalid alley: half_width {half_width}, length {length}, wall_margin {wall_margin}")]
    InvalidAlley {
        /// Configured half width.
        half_width: f32,
        /// Configured length.
        length: f32,
        /// Configured wall margin.
        wall_margin: f32,
    },
    /// The difficulty multiplier is not a positive finite number in range.
    #[error("difficulty must be within (0, 10], got {0}")]
    InvalidDifficulty(f32),
    /// The fixed time step is zero.
    #[error("timestep_ms must be positive")]
    InvalidTimestep,
}

/// A power-up the scripted player picks up at a fixed time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptedPickup {
    /// Simulation time of the pickup in milliseconds.
    pub at_ms: u64,
    /// Power-up collected.
    pub kind: PowerUpKind,
}

/// Parameters of a headless session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Seed shared by every random stream of the session.
    pub seed: u64,
    /// Rule set.
    pub mode: GameMode,
    /// Difficulty multiplier applied on top of level scaling.
    pub difficulty: f32,
    /// Extra lives before the session ends.
    pub lives: u32,
    /// Number of fixed steps to simulate.
    pub ticks: u32,
    /// Length of each step in milliseconds.
    pub timestep_ms: u64,
    /// Alley geometry.
    pub arena: Arena,
    /// Power-ups collected by the scripted player.
    pub pickups: Vec<ScriptedPickup>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0x0a11_e7a2,
            mode: GameMode::Normal,
            difficulty: 1.0,
            lives: DEFAULT_LIVES,
            ticks: 3_600,
            timestep_ms: 16,
            arena: Arena::default(),
            pickups: Vec::new(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the values serde cannot constrain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Arena {
            half_width,
            length,
            wall_margin,
        } = self.arena;
        let alley_ok = half_width.is_finite()
            && length.is_finite()
            && wall_margin.is_finite()
            && wall_margin >= 0.0
            && half_width > wall_margin
            && length > 0.0;
        if !alley_ok {
            return Err(ConfigError::InvalidAlley {
                half_width,
                length,
                wall_margin,
            });
        }

        if !(self.difficulty.is_finite()
            && self.difficulty > 0.0
            && self.difficulty <= MAX_DIFFICULTY)
        {
            return Err(ConfigError::InvalidDifficulty(self.difficulty));
        }

        if self.timestep_ms == 0 {
            return Err(ConfigError::InvalidTimestep);
        }

        Ok(())
    }

    /// Fixed step as a duration.
    #[must_use]
    pub fn timestep(&self) -> Duration {
        Duration::from_millis(self.timestep_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SimulationConfig::from_toml_str("").expect("defaults are valid");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.timestep(), Duration::from_millis(16));
    }

    #[test]
    fn nested_tables_override_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            seed = 7
            mode = "time_trial"
            difficulty = 1.5
            ticks = 120

            [arena]
            half_width = 15.0
            length = 600.0
            wall_margin = 1.0

            [[pickups]]
            at_ms = 2000
            kind = "shield"
            "#,
        )
        .expect("valid configuration");

        assert_eq!(config.seed, 7);
        assert_eq!(config.mode, GameMode::TimeTrial);
        assert_eq!(config.arena.length, 600.0);
        assert_eq!(config.lives, DEFAULT_LIVES);
        assert_eq!(
            config.pickups,
            vec![ScriptedPickup {
                at_ms: 2_000,
                kind: PowerUpKind::Shield
            }]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("difficulty = 0.0"),
            Err(ConfigError::InvalidDifficulty(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("timestep_ms = 0"),
            Err(ConfigError::InvalidTimestep)
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str(
                "[arena]\nhalf_width = 1.0\nlength = 100.0\nwall_margin = 1.0"
            ),
            Err(ConfigError::InvalidAlley { .. })
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("mode = \"arcade\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("speed = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
