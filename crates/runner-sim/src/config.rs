//! Tuning configuration for the runner simulation
//!
//! Every section has a `Default` matching the shipped game tuning, and every
//! field is optional when loading from JSON.

use runner_rl_core::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lane and vertical motion tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Number of lanes (default: 3)
    pub lane_count: usize,
    /// Lateral distance between lane centers (default: 1.0)
    pub lane_spacing: f32,
    /// Maximum body speed toward the target position, units/s (default: 1.0)
    pub lane_change_speed: f32,
    /// Distance covered by a jump at minimum speed (default: 2.0)
    pub jump_length: f32,
    /// Peak height of the jump arc (default: 1.2)
    pub jump_height: f32,
    /// Distance covered by a slide at minimum speed (default: 2.0)
    pub slide_length: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            lane_count: 3,
            lane_spacing: 1.0,
            lane_change_speed: 1.0,
            jump_length: 2.0,
            jump_height: 1.2,
            slide_length: 2.0,
        }
    }
}

impl LocomotionConfig {
    /// Index of the middle lane, also the starting lane
    pub fn center_lane(&self) -> usize {
        self.lane_count.saturating_sub(1) / 2
    }
}

/// Character bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Lives at the start of a fresh run (default: 3)
    pub max_life: i32,
    /// Whether manual jump/slide input is honored (default: false)
    pub vertical_movement_enabled: bool,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            max_life: 3,
            vertical_movement_enabled: false,
        }
    }
}

/// Which probe battery feeds the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationMode {
    /// Fan of angled rays at two heights
    #[default]
    Angled,
    /// Parallel rays straight ahead from fixed lateral positions
    Lanes,
}

impl ObservationMode {
    /// Parse an agent observation profile name
    pub fn from_profile(profile: &str) -> Option<Self> {
        match profile {
            "angled" | "default" => Some(ObservationMode::Angled),
            "lanes" => Some(ObservationMode::Lanes),
            _ => None,
        }
    }
}

/// Probe layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Active probe battery (default: angled)
    pub mode: ObservationMode,
    /// Probe range (default: 30.0)
    pub range: f32,
    /// Ray angles in degrees, 90 is straight ahead
    pub angles: Vec<f32>,
    /// Low angled probe start height (default: 0.1)
    pub low_height: f32,
    /// High angled probe start height (default: 1.2)
    pub high_height: f32,
    /// Height of the angled ray end point relative to the character (default: 0.0)
    pub end_height: f32,
    /// Lateral positions of the parallel lane probes
    pub lane_offsets: Vec<f32>,
    /// Low lane probe height (default: 0.3)
    pub lane_low_height: f32,
    /// High lane probe height (default: 1.2)
    pub lane_high_height: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            mode: ObservationMode::Angled,
            range: 30.0,
            angles: vec![30.0, 60.0, 75.0, 90.0, 105.0, 120.0, 150.0],
            low_height: 0.1,
            high_height: 1.2,
            end_height: 0.0,
            lane_offsets: vec![-1.5, 0.0, 1.5],
            lane_low_height: 0.3,
            lane_high_height: 1.2,
        }
    }
}

impl PerceptionConfig {
    /// Length of the observation vector in the active mode
    pub fn observation_len(&self) -> usize {
        match self.mode {
            ObservationMode::Angled => self.angles.len() * 2,
            ObservationMode::Lanes => self.lane_offsets.len() * 2,
        }
    }
}

/// Reward shaping increments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Added every decision step (default: 0.1)
    pub survival: f64,
    /// Added per pickup collected (default: 0.1)
    pub pickup: f64,
    /// Added per obstacle collision (default: -1.0)
    pub collision: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival: 0.1,
            pickup: 0.1,
            collision: -1.0,
        }
    }
}

/// Track advancement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Starting speed, units/s (default: 5.0)
    pub min_speed: f32,
    /// Top speed, units/s (default: 10.0)
    pub max_speed: f32,
    /// Speed gained per second (default: 0.2)
    pub acceleration: f32,
    /// Multiplier steps between min and max speed (default: 4)
    pub speed_step: u32,
    /// Countdown before the track starts moving, seconds (default: 3.0)
    pub countdown: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            min_speed: 5.0,
            max_speed: 10.0,
            acceleration: 0.2,
            speed_step: 4,
            countdown: 3.0,
        }
    }
}

/// All simulation tuning in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub locomotion: LocomotionConfig,
    pub character: CharacterConfig,
    pub perception: PerceptionConfig,
    pub reward: RewardConfig,
    pub track: TrackConfig,
}

impl RunnerConfig {
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

    /// Reject tunings the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.locomotion.lane_count == 0 {
            return Err(RunnerError::Config("lane_count must be at least 1".into()));
        }
        if self.locomotion.jump_length <= 0.0 || self.locomotion.slide_length <= 0.0 {
            return Err(RunnerError::Config(
                "jump_length and slide_length must be positive".into(),
            ));
        }
        if self.perception.range <= 0.0 {
            return Err(RunnerError::Config("perception range must be positive".into()));
        }
        if self.track.max_speed <= self.track.min_speed {
            return Err(RunnerError::Config(
                "max_speed must be greater than min_speed".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"locomotion": {"lane_count": 5}, "reward": {"collision": -2.0}}"#;
        let config = RunnerConfig::from_json(json).unwrap();

        assert_eq!(config.locomotion.lane_count, 5);
        assert_eq!(config.locomotion.center_lane(), 2);
        assert_eq!(config.locomotion.jump_length, 2.0);
        assert_eq!(config.reward.collision, -2.0);
        assert_eq!(config.reward.survival, 0.1);
        assert_eq!(config.perception.observation_len(), 14);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = RunnerConfig::from_json(r#"{"locomotion": {"lane_count": 0}}"#).unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));

        let err = RunnerConfig::from_json(r#"{"track": {"min_speed": 10.0, "max_speed": 10.0}}"#)
            .unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
    }

    #[test]
    fn test_observation_profiles() {
        assert_eq!(
            ObservationMode::from_profile("default"),
            Some(ObservationMode::Angled)
        );
        assert_eq!(
            ObservationMode::from_profile("lanes"),
            Some(ObservationMode::Lanes)
        );
        assert_eq!(ObservationMode::from_profile("pixels"), None);
    }
}
