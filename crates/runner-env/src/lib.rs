//! Headless endless-runner world for RL training
//!
//! This crate provides:
//! - Seeded procedural obstacle and pickup generation
//! - Ray queries and collision tests against the generated world
//! - `GameEnvironment` implementation driving a `runner-sim` session

pub mod config;
pub mod env;
pub mod world;

pub use config::{EnvConfig, WorldConfig};
pub use env::{RunnerEnv, Trajectory, TrajectoryStep};
pub use world::{Aabb, Contact, Entity, EntityKind, World};
