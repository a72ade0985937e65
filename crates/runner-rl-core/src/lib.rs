//! # runner-rl-core
//!
//! Core types shared by the endless-runner RL crates.
//!
//! This crate provides the vocabulary used between the simulation, the
//! headless environment and the MCP server:
//! - Agent types and registration
//! - Observation and action schemas
//! - Reward components
//! - Environment manifest

pub mod action;
pub mod agent;
pub mod error;
pub mod manifest;
pub mod observation;
pub mod reward;

pub use action::{Action, ActionSpace, LaneAction};
pub use agent::{AgentConfig, AgentEntry, AgentId, AgentManifest, AgentStatus, AgentType};
pub use error::{Result, RunnerError, error_codes};
pub use manifest::{Capabilities, GameManifest};
pub use observation::{GameEvent, Observation, StepResult, TerminationReason};
pub use reward::{Reward, RewardComponentDef, RewardComponents};
