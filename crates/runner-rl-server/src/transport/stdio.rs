//! stdio transport for MCP JSON-RPC

use crate::RunnerServer;
use crate::environment::GameEnvironment;
use crate::mcp::{
    InitializeParams, InitializeResult, Request, ResourcesCapability, Response,
    ServerCapabilities, ServerInfo, ToolsCapability, rpc_codes,
};
use crate::tools::{handle_tool_call, list_tools};
use runner_rl_core::{Result, RunnerError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

/// MCP protocol revision announced on initialize
pub const MCP_PROTOCOL_VERSION: &str = "2025-11-25";

/// Run the MCP server on stdio
pub async fn run<E: GameEnvironment>(server: RunnerServer<E>) -> Result<()> {
    info!("Runner MCP server starting on stdio");
    let reader = BufReader::new(tokio::io::stdin());
    serve(&server, reader, tokio::io::stdout()).await?;

    let mut env = server.environment.write().await;
    let _ = env.shutdown().await;
    Ok(())
}

/// Serve newline-delimited JSON-RPC until the reader hits EOF
pub async fn serve<E, R, W>(server: &RunnerServer<E>, mut reader: R, mut writer: W) -> Result<()>
where
    E: GameEnvironment,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| RunnerError::Io(format!("Failed to read request: {}", e)))?;

        if bytes_read == 0 {
            info!("Client disconnected (EOF)");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let request: Request = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                continue;
            }
        };

        let response = handle_request(&request, server).await;
        let response_json = serde_json::to_string(&response)?;

        debug!("Sending: {}", response_json);

        writer
            .write_all(response_json.as_bytes())
            .await
            .map_err(|e| RunnerError::Io(format!("Failed to write response: {}", e)))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| RunnerError::Io(format!("Failed to write newline: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| RunnerError::Io(format!("Failed to flush: {}", e)))?;
    }

    Ok(())
}

async fn handle_request<E: GameEnvironment>(
    request: &Request,
    server: &RunnerServer<E>,
) -> Response {
    match request.method.as_str() {
        "initialize" => handle_initialize(request, server),
        "initialized" | "notifications/initialized" => {
            Response::success(request.id.clone(), serde_json::json!({}))
        }
        "tools/list" => handle_tools_list(request),
        "tools/call" => handle_tools_call(request, server).await,
        "resources/list" => handle_resources_list(request),
        "resources/read" => handle_resources_read(request, server).await,
        _ => Response::error(
            request.id.clone(),
            rpc_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    }
}

fn handle_initialize<E: GameEnvironment>(request: &Request, server: &RunnerServer<E>) -> Response {
    let params = if request.params.is_null() {
        Ok(InitializeParams::default())
    } else {
        serde_json::from_value::<InitializeParams>(request.params.clone())
    };
    let params = match params {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                rpc_codes::INVALID_PARAMS,
                format!("Invalid initialize params: {}", e),
            );
        }
    };
    if let Some(client) = &params.client_info {
        info!(client = %client.name, version = %client.version, "Client connected");
    }

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: ToolsCapability {
                list_changed: false,
            },
            resources: ResourcesCapability {
                subscribe: false,
                list_changed: false,
            },
            logging: serde_json::json!({}),
        },
        server_info: ServerInfo {
            name: server.manifest.name.clone(),
            version: server.manifest.version.clone(),
            protocol_version: server.manifest.protocol_version.clone(),
        },
    };

    to_response(request, &result)
}

fn handle_tools_list(request: &Request) -> Response {
    let tools = list_tools();
    Response::success(request.id.clone(), serde_json::json!({ "tools": tools }))
}

async fn handle_tools_call<E: GameEnvironment>(
    request: &Request,
    server: &RunnerServer<E>,
) -> Response {
    #[derive(serde::Deserialize)]
    struct ToolCallParams {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    }

    let params: ToolCallParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                rpc_codes::INVALID_PARAMS,
                format!("Invalid tool call params: {}", e),
            );
        }
    };

    handle_tool_call(
        &params.name,
        params.arguments,
        request.id.clone(),
        &server.environment,
        &server.registry,
    )
    .await
}

fn handle_resources_list(request: &Request) -> Response {
    let resources = vec![
        serde_json::json!({
            "uri": "runner://manifest",
            "name": "Environment Manifest",
            "description": "Environment capabilities, action space and reward components",
            "mimeType": "application/json"
        }),
        serde_json::json!({
            "uri": "runner://agents",
            "name": "Agent Registry",
            "description": "Currently registered agents",
            "mimeType": "application/json"
        }),
    ];

    Response::success(
        request.id.clone(),
        serde_json::json!({ "resources": resources }),
    )
}

async fn handle_resources_read<E: GameEnvironment>(
    request: &Request,
    server: &RunnerServer<E>,
) -> Response {
    #[derive(serde::Deserialize)]
    struct ReadParams {
        uri: String,
    }

    let params: ReadParams = match serde_json::from_value(request.params.clone()) {
        Ok(p) => p,
        Err(e) => {
            return Response::error(
                request.id.clone(),
                rpc_codes::INVALID_PARAMS,
                format!("Invalid read params: {}", e),
            );
        }
    };

    let content = match params.uri.as_str() {
        "runner://manifest" => serde_json::to_value(&server.manifest),
        "runner://agents" => {
            let registry = server.registry.read().await;
            Ok(serde_json::json!({
                "agents": registry.list(),
                "limits": {
                    "max_agents": server.manifest.capabilities.max_agents,
                    "available_slots": registry.available_slots()
                }
            }))
        }
        _ => {
            return Response::error(
                request.id.clone(),
                rpc_codes::INVALID_PARAMS,
                format!("Unknown resource: {}", params.uri),
            );
        }
    };

    match content {
        Ok(content) => Response::success(
            request.id.clone(),
            serde_json::json!({
                "contents": [{
                    "uri": params.uri,
                    "mimeType": "application/json",
                    "text": content.to_string()
                }]
            }),
        ),
        Err(e) => Response::error(
            request.id.clone(),
            runner_rl_core::error_codes::INTERNAL_ERROR,
            e.to_string(),
        ),
    }
}

fn to_response<T: serde::Serialize>(request: &Request, value: &T) -> Response {
    match serde_json::to_value(value) {
        Ok(v) => Response::success(request.id.clone(), v),
        Err(e) => Response::error(
            request.id.clone(),
            runner_rl_core::error_codes::INTERNAL_ERROR,
            e.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use runner_rl_core::{
        Action, AgentConfig, AgentId, AgentManifest, AgentType, Capabilities, GameManifest,
        Observation, StepResult,
    };

    /// Counts steps; terminates after three
    #[derive(Default)]
    struct CountingEnv {
        agent: Option<AgentId>,
        steps: u64,
    }

    #[async_trait]
    impl GameEnvironment for CountingEnv {
        async fn register_agent(
            &mut self,
            agent_id: AgentId,
            agent_type: AgentType,
            config: AgentConfig,
        ) -> Result<AgentManifest> {
            if config.observation_profile == "pixels" {
                return Err(RunnerError::Config(
                    "Unknown observation profile: pixels".into(),
                ));
            }
            self.agent = Some(agent_id.clone());
            Ok(AgentManifest {
                agent_id,
                agent_type,
                observation_space: serde_json::json!({}),
                action_space: serde_json::json!({}),
                reward_components: vec![],
            })
        }

        async fn deregister_agent(&mut self, _agent_id: &AgentId) -> Result<()> {
            self.agent = None;
            Ok(())
        }

        async fn step(
            &mut self,
            agent_id: &AgentId,
            _action: Action,
            ticks: u32,
        ) -> Result<StepResult> {
            if self.agent.as_ref() != Some(agent_id) {
                return Err(RunnerError::AgentNotRegistered(agent_id.clone()));
            }
            self.steps += 1;
            Ok(StepResult {
                agent_id: agent_id.clone(),
                step_id: self.steps,
                tick: self.steps * u64::from(ticks),
                observation: Observation::Vector(vec![1.0]),
                reward: 0.1,
                reward_components: Default::default(),
                done: self.steps >= 3,
                truncated: false,
                termination_reason: None,
                events: vec![],
                state_hash: None,
            })
        }

        async fn reset(&mut self, _seed: Option<u64>) -> Result<Observation> {
            self.steps = 0;
            Ok(Observation::Vector(vec![1.0]))
        }

        async fn state_hash(&mut self) -> Result<String> {
            Ok(format!("steps-{}", self.steps))
        }

        async fn save_trajectory(&self, _path: &str) -> Result<()> {
            Ok(())
        }

        async fn load_trajectory(&mut self, _path: &str) -> Result<()> {
            Ok(())
        }

        async fn shutdown(&mut self) -> Result<()> {
            Ok(())
        }

        fn manifest(&self) -> GameManifest {
            GameManifest {
                name: "counting".into(),
                capabilities: Capabilities {
                    max_agents: 1,
                    ..Default::default()
                },
                ..Default::default()
            }
        }
    }

    async fn exchange(lines: &[serde_json::Value]) -> Vec<serde_json::Value> {
        let env = CountingEnv::default();
        let manifest = env.manifest();
        let server = RunnerServer::new(env, manifest);

        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let mut output = Vec::new();
        serve(&server, input.as_bytes(), &mut output).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn call(id: i64, name: &str, arguments: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }

    fn tool_payload(response: &serde_json::Value) -> serde_json::Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let responses = exchange(&[
            serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            serde_json::json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            serde_json::json!({"jsonrpc": "2.0", "id": 3, "method": "bogus"}),
        ])
        .await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "counting");
        assert_eq!(responses[0]["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 7);
        assert_eq!(responses[2]["error"]["code"], rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_step_requires_registration() {
        let responses = exchange(&[
            call(1, "sim_step", serde_json::json!({"AgentId": "runner", "Action": 0})),
            call(
                2,
                "register_agent",
                serde_json::json!({"AgentId": "runner", "AgentType": "Player"}),
            ),
            call(3, "sim_step", serde_json::json!({"AgentId": "runner", "Action": 0})),
        ])
        .await;

        assert_eq!(
            responses[0]["error"]["code"],
            runner_rl_core::error_codes::AGENT_NOT_REGISTERED
        );
        assert_eq!(tool_payload(&responses[1])["AgentId"], "runner");
        assert_eq!(tool_payload(&responses[2])["step_id"], 1);
    }

    #[tokio::test]
    async fn test_agents_resource_reflects_registry() {
        let responses = exchange(&[
            call(
                1,
                "register_agent",
                serde_json::json!({"AgentId": "runner", "AgentType": "Player"}),
            ),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "resources/read",
                "params": {"uri": "runner://agents"}
            }),
        ])
        .await;

        let text = responses[1]["result"]["contents"][0]["text"].as_str().unwrap();
        let agents: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(agents["agents"].as_array().unwrap().len(), 1);
        assert_eq!(agents["limits"]["available_slots"], 0);
    }

    #[tokio::test]
    async fn test_rejected_reregistration_keeps_registry_entry() {
        let agents_read = |id: i64| {
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "resources/read",
                "params": {"uri": "runner://agents"}
            })
        };
        let responses = exchange(&[
            call(
                1,
                "register_agent",
                serde_json::json!({"AgentId": "runner", "AgentType": "Player"}),
            ),
            call(
                2,
                "register_agent",
                serde_json::json!({
                    "AgentId": "runner",
                    "AgentType": "Player",
                    "Config": {"ObservationProfile": "pixels"}
                }),
            ),
            agents_read(3),
            call(4, "sim_step", serde_json::json!({"AgentId": "runner", "Action": 2})),
            agents_read(5),
        ])
        .await;

        assert_eq!(responses[1]["error"]["code"], rpc_codes::INVALID_PARAMS);

        let text = responses[2]["result"]["contents"][0]["text"].as_str().unwrap();
        let agents: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(agents["agents"].as_array().unwrap().len(), 1);
        assert_eq!(agents["limits"]["available_slots"], 0);

        assert_eq!(tool_payload(&responses[3])["step_id"], 1);
        let text = responses[4]["result"]["contents"][0]["text"].as_str().unwrap();
        let agents: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(agents["agents"][0]["LastStep"], 1);
    }

    #[tokio::test]
    async fn test_rejected_first_registration_frees_slot() {
        let responses = exchange(&[
            call(
                1,
                "register_agent",
                serde_json::json!({
                    "AgentId": "runner",
                    "AgentType": "Player",
                    "Config": {"ObservationProfile": "pixels"}
                }),
            ),
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "resources/read",
                "params": {"uri": "runner://agents"}
            }),
        ])
        .await;

        assert_eq!(responses[0]["error"]["code"], rpc_codes::INVALID_PARAMS);
        let text = responses[1]["result"]["contents"][0]["text"].as_str().unwrap();
        let agents: serde_json::Value = serde_json::from_str(text).unwrap();
        assert!(agents["agents"].as_array().unwrap().is_empty());
        assert_eq!(agents["limits"]["available_slots"], 1);
    }

    #[tokio::test]
    async fn test_garbage_lines_are_skipped() {
        let env = CountingEnv::default();
        let manifest = env.manifest();
        let server = RunnerServer::new(env, manifest);

        let input = "not json\n\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"tools/list\"}\n";
        let mut output = Vec::new();
        serve(&server, input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"id\":9"));
    }
}
