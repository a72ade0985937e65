//! Agent registry and lifecycle management

use runner_rl_core::{AgentEntry, AgentId, AgentStatus, AgentType};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Registry of active agents
pub struct AgentRegistry {
    agents: HashMap<AgentId, AgentEntry>,
    max_agents: usize,
}

impl AgentRegistry {
    /// Create a new registry with the given capacity
    pub fn new(max_agents: usize) -> Self {
        Self {
            agents: HashMap::new(),
            max_agents,
        }
    }

    /// Register an agent, returning `true` if the id was not already known
    pub fn register(
        &mut self,
        agent_id: AgentId,
        agent_type: AgentType,
    ) -> Result<bool, RegistryError> {
        // Idempotent: if already registered, just return success
        if self.agents.contains_key(&agent_id) {
            return Ok(false);
        }
        if self.agents.len() >= self.max_agents {
            return Err(RegistryError::CapacityExceeded);
        }

        let entry = AgentEntry {
            agent_id: agent_id.clone(),
            agent_type,
            status: AgentStatus::Registered,
            registered_at: unix_now(),
            last_step: 0,
            total_reward: 0.0,
        };

        self.agents.insert(agent_id, entry);
        Ok(true)
    }

    /// Deregister an agent
    pub fn deregister(&mut self, agent_id: &AgentId) -> Result<(), RegistryError> {
        self.agents
            .remove(agent_id)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(agent_id.clone()))
    }

    /// Get an agent entry
    pub fn get(&self, agent_id: &AgentId) -> Option<&AgentEntry> {
        self.agents.get(agent_id)
    }

    /// Update agent status
    pub fn set_status(&mut self, agent_id: &AgentId, status: AgentStatus) {
        if let Some(entry) = self.agents.get_mut(agent_id) {
            entry.status = status;
        }
    }

    /// Record a step for an agent
    pub fn record_step(&mut self, agent_id: &AgentId, reward: f64, done: bool) {
        if let Some(entry) = self.agents.get_mut(agent_id) {
            entry.last_step += 1;
            entry.total_reward += reward;
            entry.status = if done {
                AgentStatus::Terminal
            } else {
                AgentStatus::Active
            };
        }
    }

    /// Clear per-episode counters after a reset
    pub fn reset_episode(&mut self) {
        for entry in self.agents.values_mut() {
            entry.last_step = 0;
            entry.total_reward = 0.0;
            entry.status = AgentStatus::Registered;
        }
    }

    /// List all agents
    pub fn list(&self) -> Vec<&AgentEntry> {
        self.agents.values().collect()
    }

    /// Number of registered agents
    pub fn count(&self) -> usize {
        self.agents.len()
    }

    /// Available slots
    pub fn available_slots(&self) -> usize {
        self.max_agents.saturating_sub(self.agents.len())
    }
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Agent not found: {0}")]
    NotFound(AgentId),
    #[error("Maximum agent capacity exceeded")]
    CapacityExceeded,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_idempotence() {
        let mut registry = AgentRegistry::new(1);
        assert!(registry.register("runner".into(), AgentType::Player).unwrap());
        assert!(!registry.register("runner".into(), AgentType::Player).unwrap());
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.available_slots(), 0);

        assert!(matches!(
            registry.register("other".into(), AgentType::Observer),
            Err(RegistryError::CapacityExceeded)
        ));
    }

    #[test]
    fn test_step_bookkeeping() {
        let mut registry = AgentRegistry::new(1);
        let id: AgentId = "runner".into();
        registry.register(id.clone(), AgentType::Player).unwrap();

        registry.record_step(&id, 0.1, false);
        registry.record_step(&id, -0.9, true);
        let entry = registry.get(&id).unwrap();
        assert_eq!(entry.last_step, 2);
        assert!((entry.total_reward + 0.8).abs() < 1e-9);
        assert_eq!(entry.status, AgentStatus::Terminal);

        registry.reset_episode();
        let entry = registry.get(&id).unwrap();
        assert_eq!(entry.last_step, 0);
        assert_eq!(entry.status, AgentStatus::Registered);

        registry.deregister(&id).unwrap();
        assert!(matches!(
            registry.deregister(&id),
            Err(RegistryError::NotFound(_))
        ));
    }
}
