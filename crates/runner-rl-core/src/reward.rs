//! Reward types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar reward with optional decomposition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    /// Total scalar reward
    pub value: f64,
    /// Decomposed components for analysis
    #[serde(default)]
    pub components: RewardComponents,
}

/// Decomposed reward components
pub type RewardComponents = HashMap<String, f64>;

/// Definition of a reward component, advertised in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardComponentDef {
    /// Component name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value added each time the component fires
    pub increment: f64,
}
