//! # runner-sim
//!
//! Engine-independent gameplay logic for the endless runner.
//!
//! This crate provides:
//! - The lane / vertical-motion locomotion state machine
//! - Probe-based perception and reward shaping for the RL agent
//! - Character, consumable and session bookkeeping
//! - Input translation for manual control
//!
//! Everything the engine used to own (transform, animator, audio, physics)
//! is reached through the traits in [`presentation`], [`perception`] and
//! [`track`].

pub mod agent;
pub mod character;
pub mod config;
pub mod consumable;
pub mod context;
pub mod input;
pub mod locomotion;
pub mod perception;
pub mod presentation;
pub mod reward;
pub mod session;
pub mod track;

pub use agent::{EpisodePhase, RunnerAgent};
pub use character::Character;
pub use config::{
    CharacterConfig, LocomotionConfig, ObservationMode, PerceptionConfig, RewardConfig,
    RunnerConfig, TrackConfig,
};
pub use consumable::{Consumable, ConsumableKind};
pub use context::SimulationContext;
pub use input::{Intent, Key, SwipeTracker, TouchPhase};
pub use locomotion::{LaneDirection, LaneState, Locomotion, MotionArc, VerticalMotion};
pub use perception::{FeatureVector, RayCaster, RayHit, RayPerception, TargetKind};
pub use presentation::{
    AnimationClip, AnimationFlag, AnimationParam, AnimationSink, AudioCue, AudioSink,
    PositionTarget, PresentationEvent, RecordingRig, Rig,
};
pub use reward::{RewardAccumulator, RewardEvent};
pub use session::{GameSession, HudSnapshot};
pub use track::{FixedTrack, Track, TrackState};
