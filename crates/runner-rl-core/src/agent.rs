//! Agent types and registration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for an agent
pub type AgentId = String;

/// Agent archetypes supported by the runner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum AgentType {
    /// Passive observer - receives observations but takes no actions
    Observer,
    /// Controls the runner character
    Player,
}

/// Configuration for agent registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentConfig {
    /// Observation layout: "angled" (default) or "lanes"
    #[serde(default = "default_observation_profile")]
    pub observation_profile: String,

    /// Additional configuration
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_observation_profile() -> String {
    "angled".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            observation_profile: default_observation_profile(),
            extra: HashMap::new(),
        }
    }
}

/// Agent manifest returned after registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentManifest {
    pub agent_id: AgentId,
    pub agent_type: AgentType,
    pub observation_space: serde_json::Value,
    pub action_space: serde_json::Value,
    pub reward_components: Vec<String>,
}

/// Agent status in the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum AgentStatus {
    Registered,
    Active,
    Terminal,
}

/// Agent registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentEntry {
    pub agent_id: AgentId,
    pub agent_type: AgentType,
    pub status: AgentStatus,
    /// Seconds since the Unix epoch
    pub registered_at: u64,
    pub last_step: u64,
    pub total_reward: f64,
}
