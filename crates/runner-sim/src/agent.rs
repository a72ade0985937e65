//! RL agent hooks: observation collection, action dispatch, reward and
//! termination
//!
//! Episodes move `Running -> Terminating` when the character runs out of
//! lives. Resetting back to `Running` is the caller's job.

use glam::Vec3;
use runner_rl_core::{Action, LaneAction, Reward};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::character::Character;
use crate::config::{PerceptionConfig, RewardConfig};
use crate::input::Intent;
use crate::locomotion::LaneDirection;
use crate::perception::{FeatureVector, RayCaster, RayPerception};
use crate::presentation::Rig;
use crate::reward::{RewardAccumulator, RewardEvent};
use crate::track::TrackState;

/// Episode lifecycle as seen by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    Running,
    Terminating,
}

/// Decision-making side of the character
#[derive(Debug, Clone)]
pub struct RunnerAgent {
    perception: RayPerception,
    rewards: RewardAccumulator,
    phase: EpisodePhase,
    steps: u64,
}

impl RunnerAgent {
    pub fn new(perception: PerceptionConfig, rewards: RewardConfig) -> Self {
        Self {
            perception: RayPerception::new(perception),
            rewards: RewardAccumulator::new(rewards),
            phase: EpisodePhase::Running,
            steps: 0,
        }
    }

    /// Probe the world from `origin` (character position in world space)
    pub fn collect_observations(&self, caster: &dyn RayCaster, origin: Vec3) -> FeatureVector {
        self.perception.collect(caster, origin)
    }

    /// Intent for an agent action; only lane changes are reachable
    pub fn compute_action(action: &Action) -> Option<Intent> {
        match action.lane_action() {
            LaneAction::Left => Some(Intent::ChangeLane(LaneDirection::Left)),
            LaneAction::Right => Some(Intent::ChangeLane(LaneDirection::Right)),
            LaneAction::Stay => None,
        }
    }

    /// One decision step: apply the action, credit survival, check lives.
    ///
    /// Returns true on the step the episode starts terminating.
    pub fn agent_action<R: Rig>(
        &mut self,
        action: &Action,
        character: &mut Character<R>,
        track: &dyn TrackState,
    ) -> bool {
        if let Some(intent) = Self::compute_action(action) {
            character.apply(intent, track);
        }
        self.steps += 1;
        self.rewards.add(RewardEvent::Survival);
        self.check_termination(character.lives())
    }

    /// Pickup collected
    pub fn coin_collided(&mut self) {
        self.rewards.add(RewardEvent::Pickup);
    }

    /// Obstacle hit
    pub fn obstacle_collided(&mut self) {
        self.rewards.add(RewardEvent::Collision);
    }

    /// Fires exactly once, on the transition to zero lives
    pub fn check_termination(&mut self, lives: i32) -> bool {
        if self.phase == EpisodePhase::Running && lives <= 0 {
            self.phase = EpisodePhase::Terminating;
            info!(steps = self.steps, "Episode terminating, out of lives");
            return true;
        }
        false
    }

    /// Reward accumulated since the last drain
    pub fn take_reward(&mut self) -> Reward {
        self.rewards.take()
    }

    /// Back to `Running` after the world was reinitialized
    pub fn reset(&mut self) {
        self.phase = EpisodePhase::Running;
        self.rewards.reset();
        self.steps = 0;
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn is_terminating(&self) -> bool {
        self.phase == EpisodePhase::Terminating
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn perception(&self) -> &RayPerception {
        &self.perception
    }

    pub fn perception_mut(&mut self) -> &mut RayPerception {
        &mut self.perception
    }

    pub fn rewards(&self) -> &RewardAccumulator {
        &self.rewards
    }
}
