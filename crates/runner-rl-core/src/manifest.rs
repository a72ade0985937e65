//! Environment manifest types

use serde::{Deserialize, Serialize};

use crate::action::ActionSpace;
use crate::reward::RewardComponentDef;

/// Manifest describing the environment and its capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameManifest {
    /// Game name
    pub name: String,
    /// Game version
    pub version: String,
    /// Protocol version
    pub protocol_version: String,
    /// Environment capabilities
    pub capabilities: Capabilities,
    /// Default observation space
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_observation_space: Option<serde_json::Value>,
    /// Default action space
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action_space: Option<ActionSpace>,
    /// Available reward components
    #[serde(default)]
    pub reward_components: Vec<RewardComponentDef>,
    /// Simulation tick rate
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Maximum episode length in ticks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_episode_ticks: Option<u64>,
}

fn default_tick_rate() -> u32 {
    60
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            multi_agent: false,
            max_agents: 1,
            agent_types: vec![],
            deterministic: false,
            save_replay: false,
            headless: false,
        }
    }
}

impl Default for GameManifest {
    fn default() -> Self {
        Self {
            name: "Unknown".into(),
            version: "0.0.0".into(),
            protocol_version: env!("CARGO_PKG_VERSION").into(),
            capabilities: Default::default(),
            default_observation_space: None,
            default_action_space: None,
            reward_components: vec![],
            tick_rate: 60,
            max_episode_ticks: None,
        }
    }
}

/// Environment capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Supports multiple agents
    #[serde(default)]
    pub multi_agent: bool,
    /// Maximum number of agents
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
    /// Supported agent types
    #[serde(default)]
    pub agent_types: Vec<String>,
    /// Deterministic simulation
    #[serde(default)]
    pub deterministic: bool,
    /// Supports trajectory save/replay
    #[serde(default)]
    pub save_replay: bool,
    /// Supports headless operation
    #[serde(default)]
    pub headless: bool,
}

fn default_max_agents() -> usize {
    1
}
