//! Environment trait

use async_trait::async_trait;
use runner_rl_core::{
    Action, AgentConfig, AgentId, AgentManifest, AgentType, GameManifest, Observation, Result,
    StepResult,
};

/// Trait for implementing runner environments
///
/// Implement this trait to expose a simulation through the MCP server.
#[async_trait]
pub trait GameEnvironment: Send + Sync + 'static {
    /// Register an agent with the environment
    async fn register_agent(
        &mut self,
        agent_id: AgentId,
        agent_type: AgentType,
        config: AgentConfig,
    ) -> Result<AgentManifest>;

    /// Deregister an agent
    async fn deregister_agent(&mut self, agent_id: &AgentId) -> Result<()>;

    /// Execute an action and advance simulation
    async fn step(&mut self, agent_id: &AgentId, action: Action, ticks: u32) -> Result<StepResult>;

    /// Reset the environment
    async fn reset(&mut self, seed: Option<u64>) -> Result<Observation>;

    /// Get current state hash for determinism verification
    async fn state_hash(&mut self) -> Result<String>;

    /// Save trajectory to file
    async fn save_trajectory(&self, path: &str) -> Result<()>;

    /// Load and replay trajectory
    async fn load_trajectory(&mut self, path: &str) -> Result<()>;

    /// Called when environment should shut down
    async fn shutdown(&mut self) -> Result<()>;

    /// Get the manifest describing capabilities
    fn manifest(&self) -> GameManifest;
}
