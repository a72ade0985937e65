//! MCP tool handlers for the runner environment

use runner_rl_core::{Action, AgentConfig, AgentId, AgentType, Result, RunnerError, error_codes};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::environment::GameEnvironment;
use crate::mcp::{RequestId, Response, rpc_codes};
use crate::registry::AgentRegistry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tool definition for MCP tools/list
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Get list of available tools
pub fn list_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "register_agent".into(),
            description: "Register an agent to drive the runner. MUST be called before sim_step. Example: {\"AgentId\": \"runner\", \"AgentType\": \"Player\", \"Config\": {\"ObservationProfile\": \"angled\"}}".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "AgentId": {
                        "type": "string",
                        "description": "Your agent's unique ID. Example: \"runner\""
                    },
                    "AgentType": {
                        "type": "string",
                        "description": "Agent role: Observer (observations only) or Player (controls lanes)",
                        "enum": ["Observer", "Player"],
                        "default": "Player"
                    },
                    "Config": {
                        "type": "object",
                        "description": "Optional configuration. ObservationProfile selects \"angled\" (14 fan probes) or \"lanes\" (6 forward probes)"
                    }
                },
                "required": ["AgentId", "AgentType"]
            }),
        },
        ToolDef {
            name: "deregister_agent".into(),
            description: "Remove an agent. Example: {\"AgentId\": \"runner\"}".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "AgentId": {
                        "type": "string",
                        "description": "The AgentId you registered with"
                    }
                },
                "required": ["AgentId"]
            }),
        },
        ToolDef {
            name: "sim_step".into(),
            description: "Apply one lane action and advance the run. Action 0 moves left, 1 moves right, anything else keeps the lane. Returns probe observation, reward and done flag.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "AgentId": {
                        "type": "string",
                        "description": "Your registered AgentId"
                    },
                    "Action": {
                        "description": "Discrete action code (0 = left, 1 = right, other = stay), or {\"Type\": \"Left\"}"
                    },
                    "Ticks": {
                        "type": "integer",
                        "description": "Simulation ticks to run after the action (60 ticks = 1 second)",
                        "default": 1
                    }
                },
                "required": ["AgentId", "Action"]
            }),
        },
        ToolDef {
            name: "reset".into(),
            description: "Start a new episode. Returns the initial observation.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "Seed": {
                        "type": "integer",
                        "description": "Random seed for world generation"
                    }
                }
            }),
        },
        ToolDef {
            name: "get_state_hash".into(),
            description: "Get a hash of the current simulation state for determinism checks".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDef {
            name: "save_trajectory".into(),
            description: "Write the current episode's seed and action log to a JSON file".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "Path": {
                        "type": "string",
                        "description": "Destination file path"
                    }
                },
                "required": ["Path"]
            }),
        },
        ToolDef {
            name: "load_trajectory".into(),
            description: "Reset with a saved seed and replay its action log".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "Path": {
                        "type": "string",
                        "description": "Trajectory file written by save_trajectory"
                    }
                },
                "required": ["Path"]
            }),
        },
    ]
}

/// Parameters for register_agent
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterAgentParams {
    pub agent_id: AgentId,
    pub agent_type: AgentType,
    #[serde(default)]
    pub config: AgentConfig,
}

/// Parameters for sim_step
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimStepParams {
    pub agent_id: AgentId,
    pub action: Action,
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

fn default_ticks() -> u32 {
    1
}

/// Parameters for reset
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResetParams {
    pub seed: Option<u64>,
}

/// Parameters for save_trajectory and load_trajectory
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrajectoryParams {
    pub path: String,
}

/// JSON-RPC error code for an environment error
pub fn error_code(error: &RunnerError) -> i32 {
    match error {
        RunnerError::AgentNotRegistered(_) => error_codes::AGENT_NOT_REGISTERED,
        RunnerError::InvalidAction(_) => error_codes::INVALID_ACTION,
        RunnerError::EpisodeTerminated => error_codes::EPISODE_TERMINATED,
        RunnerError::ResourceExhausted(_) => error_codes::RESOURCE_EXHAUSTED,
        RunnerError::Config(_) => rpc_codes::INVALID_PARAMS,
        _ => error_codes::INTERNAL_ERROR,
    }
}

/// Handle a tools/call request
pub async fn handle_tool_call<E: GameEnvironment>(
    name: &str,
    params: serde_json::Value,
    id: RequestId,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Response {
    debug!(tool = name, "Tool call");
    let result = match name {
        "register_agent" => handle_register_agent(params, environment, registry).await,
        "deregister_agent" => handle_deregister_agent(params, environment, registry).await,
        "sim_step" => handle_sim_step(params, environment, registry).await,
        "reset" => handle_reset(params, environment, registry).await,
        "get_state_hash" => handle_state_hash(environment).await,
        "save_trajectory" => handle_save_trajectory(params, environment).await,
        "load_trajectory" => handle_load_trajectory(params, environment, registry).await,
        _ => Err(RunnerError::ProtocolError(format!("Unknown tool: {}", name))),
    };

    match result {
        Ok(value) => Response::success(
            id,
            serde_json::json!({ "content": [{ "type": "text", "text": value.to_string() }] }),
        ),
        Err(e) => Response::error(id, error_code(&e), e.to_string()),
    }
}

async fn handle_register_agent<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Result<serde_json::Value> {
    let p: RegisterAgentParams = serde_json::from_value(params)?;

    let created = {
        let mut reg = registry.write().await;
        reg.register(p.agent_id.clone(), p.agent_type.clone())
            .map_err(|e| RunnerError::ResourceExhausted(e.to_string()))?
    };

    let manifest = {
        let mut env = environment.write().await;
        env.register_agent(p.agent_id.clone(), p.agent_type, p.config)
            .await
    };

    match manifest {
        Ok(manifest) => Ok(serde_json::to_value(manifest)?),
        Err(e) => {
            // Only roll back an entry this call inserted
            if created {
                let _ = registry.write().await.deregister(&p.agent_id);
            }
            Err(e)
        }
    }
}

async fn handle_deregister_agent<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Result<serde_json::Value> {
    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Params {
        agent_id: AgentId,
    }
    let p: Params = serde_json::from_value(params)?;

    {
        let mut env = environment.write().await;
        env.deregister_agent(&p.agent_id).await?;
    }

    {
        let mut reg = registry.write().await;
        let _ = reg.deregister(&p.agent_id);
    }

    Ok(serde_json::json!({ "deregistered": true }))
}

async fn handle_sim_step<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Result<serde_json::Value> {
    let p: SimStepParams = serde_json::from_value(params)?;

    let result = {
        let mut env = environment.write().await;
        env.step(&p.agent_id, p.action, p.ticks).await?
    };

    {
        let mut reg = registry.write().await;
        reg.record_step(&p.agent_id, result.reward, result.done || result.truncated);
    }

    Ok(serde_json::to_value(result)?)
}

async fn handle_reset<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Result<serde_json::Value> {
    let p: ResetParams = if params.is_null() {
        ResetParams::default()
    } else {
        serde_json::from_value(params)?
    };

    let obs = {
        let mut env = environment.write().await;
        env.reset(p.seed).await?
    };
    registry.write().await.reset_episode();

    Ok(serde_json::to_value(obs)?)
}

async fn handle_state_hash<E: GameEnvironment>(
    environment: &Arc<RwLock<E>>,
) -> Result<serde_json::Value> {
    let mut env = environment.write().await;
    let hash = env.state_hash().await?;

    Ok(serde_json::json!({ "hash": hash }))
}

async fn handle_save_trajectory<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
) -> Result<serde_json::Value> {
    let p: TrajectoryParams = serde_json::from_value(params)?;

    let env = environment.read().await;
    env.save_trajectory(&p.path).await?;

    Ok(serde_json::json!({ "saved": p.path }))
}

async fn handle_load_trajectory<E: GameEnvironment>(
    params: serde_json::Value,
    environment: &Arc<RwLock<E>>,
    registry: &Arc<RwLock<AgentRegistry>>,
) -> Result<serde_json::Value> {
    let p: TrajectoryParams = serde_json::from_value(params)?;

    let hash = {
        let mut env = environment.write().await;
        env.load_trajectory(&p.path).await?;
        env.state_hash().await?
    };
    registry.write().await.reset_episode();

    Ok(serde_json::json!({ "loaded": p.path, "hash": hash }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        let names: Vec<_> = list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "register_agent",
                "deregister_agent",
                "sim_step",
                "reset",
                "get_state_hash",
                "save_trajectory",
                "load_trajectory",
            ]
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&RunnerError::AgentNotRegistered("x".into())),
            error_codes::AGENT_NOT_REGISTERED
        );
        assert_eq!(
            error_code(&RunnerError::EpisodeTerminated),
            error_codes::EPISODE_TERMINATED
        );
        assert_eq!(
            error_code(&RunnerError::Config("Unknown observation profile: pixels".into())),
            rpc_codes::INVALID_PARAMS
        );
        assert_eq!(
            error_code(&RunnerError::Io("disk".into())),
            error_codes::INTERNAL_ERROR
        );
    }

    #[test]
    fn test_sim_step_params() {
        let p: SimStepParams = serde_json::from_value(serde_json::json!({
            "AgentId": "runner",
            "Action": 1
        }))
        .unwrap();
        assert_eq!(p.ticks, 1);
        assert_eq!(p.action, Action::Discrete(1));
    }
}
