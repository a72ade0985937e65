//! Observation types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::agent::AgentId;
use crate::reward::RewardComponents;

/// Result of a decision step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Agent that took the action
    pub agent_id: AgentId,

    /// Decision steps taken this episode
    pub step_id: u64,

    /// Current simulation tick
    pub tick: u64,

    /// Agent-specific observation
    pub observation: Observation,

    /// Scalar reward signal
    pub reward: f64,

    /// Decomposed reward for analysis
    #[serde(default)]
    pub reward_components: RewardComponents,

    /// Episode terminated (out of lives)
    pub done: bool,

    /// Episode truncated (tick limit)
    pub truncated: bool,

    /// Why episode ended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,

    /// Notable events this step
    #[serde(default)]
    pub events: Vec<GameEvent>,

    /// Determinism verification hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_hash: Option<String>,
}

/// Agent observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observation {
    /// Flat probe feature vector
    Vector(Vec<f64>),
    /// Structured observation
    Structured(HashMap<String, serde_json::Value>),
}

impl Observation {
    /// Build a vector observation from single-precision features
    pub fn from_features(features: &[f32]) -> Self {
        Observation::Vector(features.iter().map(|&v| f64::from(v)).collect())
    }
}

/// Why an episode ended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Character ran out of lives
    Failure,
    /// Tick limit reached
    Timeout,
    /// Reset requested by the controller
    External,
}

/// Game event that occurred during a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Event type identifier
    #[serde(rename = "type")]
    pub event_type: String,

    /// Tick when event occurred
    pub tick: u64,

    /// Severity level (0-3)
    #[serde(default)]
    pub severity: u8,

    /// Event-specific details
    #[serde(default)]
    pub details: serde_json::Value,
}

impl GameEvent {
    /// Event without details
    pub fn new(event_type: impl Into<String>, tick: u64) -> Self {
        Self {
            event_type: event_type.into(),
            tick,
            severity: 0,
            details: serde_json::Value::Null,
        }
    }
}
