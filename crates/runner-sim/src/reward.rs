//! Event-driven reward accumulation

use runner_rl_core::{Reward, RewardComponentDef, RewardComponents};
use serde::{Deserialize, Serialize};

use crate::config::RewardConfig;

/// Discrete game events that move the reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEvent {
    /// One decision step survived
    Survival,
    /// Pickup collected
    Pickup,
    /// Obstacle hit
    Collision,
}

impl RewardEvent {
    pub const ALL: [RewardEvent; 3] = [
        RewardEvent::Survival,
        RewardEvent::Pickup,
        RewardEvent::Collision,
    ];

    /// Component name in reward decompositions
    pub fn component(self) -> &'static str {
        match self {
            RewardEvent::Survival => "survival",
            RewardEvent::Pickup => "pickup",
            RewardEvent::Collision => "collision",
        }
    }
}

/// Running reward total for the current decision step
#[derive(Debug, Clone)]
pub struct RewardAccumulator {
    config: RewardConfig,
    total: f64,
    components: RewardComponents,
}

impl RewardAccumulator {
    pub fn new(config: RewardConfig) -> Self {
        Self {
            config,
            total: 0.0,
            components: RewardComponents::new(),
        }
    }

    fn increment(&self, event: RewardEvent) -> f64 {
        match event {
            RewardEvent::Survival => self.config.survival,
            RewardEvent::Pickup => self.config.pickup,
            RewardEvent::Collision => self.config.collision,
        }
    }

    /// Apply the increment for `event`
    pub fn add(&mut self, event: RewardEvent) {
        let delta = self.increment(event);
        self.total += delta;
        *self
            .components
            .entry(event.component().to_string())
            .or_insert(0.0) += delta;
    }

    /// Total since the last drain
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Read and reset
    pub fn take(&mut self) -> Reward {
        let reward = Reward {
            value: self.total,
            components: std::mem::take(&mut self.components),
        };
        self.total = 0.0;
        reward
    }

    pub fn reset(&mut self) {
        self.total = 0.0;
        self.components.clear();
    }

    /// Manifest description of each component
    pub fn component_defs(&self) -> Vec<RewardComponentDef> {
        RewardEvent::ALL
            .iter()
            .map(|&event| RewardComponentDef {
                name: event.component().to_string(),
                description: Some(
                    match event {
                        RewardEvent::Survival => "Every decision step survived",
                        RewardEvent::Pickup => "Pickup collected",
                        RewardEvent::Collision => "Obstacle collision",
                    }
                    .to_string(),
                ),
                increment: self.increment(event),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increments() {
        let mut acc = RewardAccumulator::new(RewardConfig::default());
        acc.add(RewardEvent::Survival);
        assert!((acc.total() - 0.1).abs() < 1e-9);
        acc.add(RewardEvent::Pickup);
        assert!((acc.total() - 0.2).abs() < 1e-9);
        acc.add(RewardEvent::Collision);
        assert!((acc.total() + 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_take_drains_with_components() {
        let mut acc = RewardAccumulator::new(RewardConfig::default());
        acc.add(RewardEvent::Survival);
        acc.add(RewardEvent::Survival);
        acc.add(RewardEvent::Collision);

        let reward = acc.take();
        assert!((reward.value + 0.8).abs() < 1e-9);
        assert!((reward.components["survival"] - 0.2).abs() < 1e-9);
        assert_eq!(reward.components["collision"], -1.0);
        assert!(!reward.components.contains_key("pickup"));

        assert_eq!(acc.total(), 0.0);
        assert_eq!(acc.take(), Reward::default());
    }
}
