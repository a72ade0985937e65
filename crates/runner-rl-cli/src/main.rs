//! Runner RL MCP Server
//!
//! Serves the headless endless-runner environment over stdio.
//!
//! Usage: `runner-rl-server [CONFIG.json]`. The config path may also come
//! from `RUNNER_RL_CONFIG`. Logs go to stderr, filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use runner_env::{EnvConfig, RunnerEnv};
use runner_rl_server::{GameEnvironment, RunnerServer};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const CONFIG_ENV: &str = "RUNNER_RL_CONFIG";

fn load_config() -> Result<EnvConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    match path {
        Some(path) => {
            info!("Loading config from {}", path);
            EnvConfig::from_file(&path).with_context(|| format!("invalid config {}", path))
        }
        None => Ok(EnvConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries the protocol
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config()?;
    info!(
        seed = config.seed,
        tick_rate = config.tick_rate,
        "Building runner environment"
    );

    let env = RunnerEnv::new(config)?;
    let manifest = env.manifest();
    info!("Serving {} v{}", manifest.name, manifest.version);

    let server = RunnerServer::new(env, manifest);
    server.run_stdio().await?;
    Ok(())
}
