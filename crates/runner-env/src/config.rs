//! Environment configuration

use runner_rl_core::{Result, RunnerError};
use runner_sim::RunnerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Procedural world tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Obstacle-free distance at the start of a run (default: 15.0)
    pub safe_start: f32,
    /// Distance between generated rows (default: 8.0)
    pub row_spacing: f32,
    /// How far ahead of the character rows exist (default: 45.0)
    pub spawn_ahead: f32,
    /// How far behind the character entities are kept (default: 5.0)
    pub cull_behind: f32,
    /// Obstacle width across the track (default: 1.2)
    pub obstacle_width: f32,
    /// Obstacle depth along the track (default: 1.0)
    pub obstacle_depth: f32,
    /// Side length of pickup boxes (default: 0.5)
    pub pickup_size: f32,
    /// Chance a free lane in a row carries a pickup (default: 0.4)
    pub pickup_probability: f64,
    /// Chance a free lane carries a power-up instead (default: 0.03)
    pub powerup_probability: f64,
    /// Character collider half width (default: 0.3)
    pub character_half_width: f32,
    /// Character collider height (default: 1.8)
    pub character_height: f32,
    /// Character collider height while sliding (default: 0.8)
    pub slide_height: f32,
    /// Reach of the coin magnet (default: 3.0)
    pub magnet_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            safe_start: 15.0,
            row_spacing: 8.0,
            spawn_ahead: 45.0,
            cull_behind: 5.0,
            obstacle_width: 1.2,
            obstacle_depth: 1.0,
            pickup_size: 0.5,
            pickup_probability: 0.4,
            powerup_probability: 0.03,
            character_half_width: 0.3,
            character_height: 1.8,
            slide_height: 0.8,
            magnet_radius: 3.0,
        }
    }
}

/// Full environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Simulation tuning
    pub runner: RunnerConfig,
    /// World generation
    pub world: WorldConfig,
    /// Simulation ticks per second (default: 60)
    pub tick_rate: u32,
    /// Truncate episodes after this many ticks (default: 18000)
    pub max_episode_ticks: Option<u64>,
    /// Seed used when reset is called without one (default: 0)
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            world: WorldConfig::default(),
            tick_rate: 60,
            max_episode_ticks: Some(18_000),
            seed: 0,
        }
    }
}

impl EnvConfig {
    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.runner.validate()?;
        if self.tick_rate == 0 {
            return Err(RunnerError::Config("tick_rate must be at least 1".into()));
        }
        if self.world.row_spacing <= 0.0 {
            return Err(RunnerError::Config("row_spacing must be positive".into()));
        }
        for p in [self.world.pickup_probability, self.world.powerup_probability] {
            if !(0.0..=1.0).contains(&p) {
                return Err(RunnerError::Config(
                    "probabilities must lie in [0, 1]".into(),
                ));
            }
        }
        Ok(())
    }

    /// Seconds per simulation tick
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document() {
        let config = EnvConfig::from_json(
            r#"{"seed": 42, "world": {"row_spacing": 12.0}, "runner": {"track": {"countdown": 0.0}}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.world.row_spacing, 12.0);
        assert_eq!(config.world.pickup_size, 0.5);
        assert_eq!(config.runner.track.countdown, 0.0);
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = EnvConfig::from_json(r#"{"world": {"pickup_probability": 1.5}}"#);
        assert!(matches!(err, Err(RunnerError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EnvConfig::from_file("/nonexistent/runner.json"),
            Err(RunnerError::Config(_))
        ));
    }
}
