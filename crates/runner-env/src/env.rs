//! `GameEnvironment` over a headless runner session

use async_trait::async_trait;
use glam::Vec3;
use runner_rl_core::{
    Action, ActionSpace, AgentConfig, AgentId, AgentManifest, AgentType, Capabilities, GameEvent,
    GameManifest, Observation, Result, RunnerError, StepResult, TerminationReason,
};
use runner_rl_server::GameEnvironment;
use runner_sim::{
    Consumable, ConsumableKind, GameSession, ObservationMode, PositionTarget, RecordingRig,
    RewardEvent, RunnerAgent, SimulationContext, TrackState,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::EnvConfig;
use crate::world::{Contact, EntitySnapshot, World};

/// Action substituted for observers, who only watch
const STAY: Action = Action::Discrete(2);

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    pub action: Action,
    pub ticks: u32,
}

/// Seed plus action log; replaying it reproduces the episode exactly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub seed: u64,
    pub steps: Vec<TrajectoryStep>,
}

#[derive(Debug, Clone)]
struct RegisteredAgent {
    id: AgentId,
    agent_type: AgentType,
}

/// Everything that determines future evolution, hashed for determinism checks
#[derive(Serialize)]
struct StateSnapshot {
    seed: u64,
    tick: u64,
    steps: u64,
    distance: f32,
    speed: f32,
    lane: usize,
    position: [f32; 3],
    vertical_offset: f32,
    jumping: bool,
    sliding: bool,
    lives: i32,
    coins: u32,
    score: u64,
    consumables: Vec<(ConsumableKind, f32)>,
    entities: Vec<EntitySnapshot>,
}

/// Headless endless-runner environment
pub struct RunnerEnv {
    config: EnvConfig,
    session: GameSession<RecordingRig>,
    agent: RunnerAgent,
    world: World,
    registered: Option<RegisteredAgent>,
    seed: u64,
    tick: u64,
    truncated: bool,
    trajectory: Vec<TrajectoryStep>,
}

impl RunnerEnv {
    /// Build the environment and start the first episode
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;

        let session = GameSession::new(&config.runner, RecordingRig::new());
        let agent = RunnerAgent::new(
            config.runner.perception.clone(),
            config.runner.reward.clone(),
        );
        let world = World::new(config.world.clone(), &config.runner.locomotion, config.seed);
        let seed = config.seed;

        let mut env = Self {
            config,
            session,
            agent,
            world,
            registered: None,
            seed,
            tick: 0,
            truncated: false,
            trajectory: Vec::new(),
        };
        env.start_episode(seed);
        Ok(env)
    }

    /// Regenerate the world, restart the run and skip the start countdown
    fn start_episode(&mut self, seed: u64) {
        self.seed = seed;
        self.world.reseed(seed);
        self.session.reset_all();
        self.agent.reset();
        self.tick = 0;
        self.truncated = false;
        self.trajectory.clear();

        let ctx = SimulationContext::running(self.config.delta_time());
        let countdown_ticks =
            (self.session.track.time_to_start().unwrap_or(0.0) * self.config.tick_rate as f32)
                .ceil() as u32;
        for _ in 0..countdown_ticks + 2 {
            if self.session.track.is_moving() {
                break;
            }
            self.session.tick(&ctx);
        }

        self.world.advance(self.session.track.world_distance());
        self.session.character.rig_mut().drain_events();
        info!(seed, "Episode started");
    }

    /// Character position in world space
    fn origin(&self) -> Vec3 {
        let local = self.session.character.rig().local_position();
        Vec3::new(local.x, local.y, self.session.track.world_distance())
    }

    fn observe(&self) -> Observation {
        Observation::from_features(
            &self
                .agent
                .collect_observations(&self.world, self.origin()),
        )
    }

    fn observation_space(&self) -> serde_json::Value {
        let perception = self.agent.perception().config();
        serde_json::json!({
            "Type": "Box",
            "shape": [perception.observation_len()],
            "low": 0.0,
            "high": 1.0,
            "mode": perception.mode,
        })
    }

    fn episode_over(&self) -> bool {
        self.agent.is_terminating() || self.truncated
    }

    /// Apply one decision and run `ticks` simulation ticks
    fn advance(&mut self, action: &Action, ticks: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.trajectory.push(TrajectoryStep {
            action: action.clone(),
            ticks,
        });

        let mut terminated =
            self.agent
                .agent_action(action, &mut self.session.character, &self.session.track);
        let ctx = SimulationContext::running(self.config.delta_time());

        for _ in 0..ticks.max(1) {
            if terminated {
                break;
            }

            self.session.tick(&ctx);
            self.tick += 1;

            let distance = self.session.track.world_distance();
            self.world.advance(distance);
            let footprint = self
                .world
                .footprint(self.origin(), self.session.character.rig().slide_footprint());
            let magnet = self
                .session
                .character
                .has_active(ConsumableKind::CoinMagnet);

            for contact in self.world.collide(&footprint, magnet) {
                events.push(self.resolve(contact));
            }

            terminated = self.agent.check_termination(self.session.character.lives());
            if let Some(max) = self.config.max_episode_ticks {
                if !terminated && self.tick >= max {
                    self.truncated = true;
                    debug!(tick = self.tick, "Episode truncated");
                    break;
                }
            }
        }

        if terminated {
            // Zero-length tick lets the session register the death
            self.session.tick(&SimulationContext::running(0.0));
            self.session.finish();
            let mut event = GameEvent::new("out_of_lives", self.tick);
            event.severity = 2;
            event.details = serde_json::json!({
                "distance": self.session.track.world_distance(),
                "score": self.session.track.score(),
            });
            events.push(event);
        }

        for presentation in self.session.character.rig_mut().drain_events() {
            let mut event = GameEvent::new("presentation", self.tick);
            event.details = serde_json::to_value(presentation).unwrap_or_default();
            events.push(event);
        }

        events
    }

    fn resolve(&mut self, contact: Contact) -> GameEvent {
        let character = &mut self.session.character;
        match contact {
            Contact::Obstacle { id, kind } => {
                let lost_life = character.hit_obstacle();
                if lost_life {
                    self.agent.obstacle_collided();
                }
                let mut event = GameEvent::new(
                    if lost_life {
                        "obstacle_hit"
                    } else {
                        "obstacle_absorbed"
                    },
                    self.tick,
                );
                event.severity = u8::from(lost_life);
                event.details = serde_json::json!({
                    "id": id,
                    "kind": kind,
                    "lives": character.lives(),
                });
                event
            }
            Contact::Pickup { id } => {
                character.collect_coin();
                self.agent.coin_collided();
                let mut event = GameEvent::new(RewardEvent::Pickup.component(), self.tick);
                event.details = serde_json::json!({ "id": id, "coins": character.coins() });
                event
            }
            Contact::PowerUp { id, kind } => {
                character.use_consumable(Consumable::new(kind));
                let mut event = GameEvent::new("power_up", self.tick);
                event.details = serde_json::json!({ "id": id, "kind": kind });
                event
            }
        }
    }

    fn compute_hash(&self) -> Result<String> {
        let character = &self.session.character;
        let locomotion = character.locomotion();
        let snapshot = StateSnapshot {
            seed: self.seed,
            tick: self.tick,
            steps: self.agent.steps(),
            distance: self.session.track.world_distance(),
            speed: self.session.track.speed(),
            lane: locomotion.lane().index,
            position: character.rig().local_position().to_array(),
            vertical_offset: locomotion.vertical_offset(),
            jumping: locomotion.is_jumping(),
            sliding: locomotion.is_sliding(),
            lives: character.lives(),
            coins: character.coins(),
            score: self.session.track.score(),
            consumables: character
                .consumables()
                .iter()
                .map(|c| (c.kind, c.remaining()))
                .collect(),
            entities: self.world.snapshot(),
        };

        let json = serde_json::to_string(&snapshot)?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }

    fn require_agent(&self, agent_id: &AgentId) -> Result<&RegisteredAgent> {
        self.registered
            .as_ref()
            .filter(|a| &a.id == agent_id)
            .ok_or_else(|| RunnerError::AgentNotRegistered(agent_id.clone()))
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn session(&self) -> &GameSession<RecordingRig> {
        &self.session
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Action log of the current episode
    pub fn trajectory(&self) -> Trajectory {
        Trajectory {
            seed: self.seed,
            steps: self.trajectory.clone(),
        }
    }
}

#[async_trait]
impl GameEnvironment for RunnerEnv {
    async fn register_agent(
        &mut self,
        agent_id: AgentId,
        agent_type: AgentType,
        config: AgentConfig,
    ) -> Result<AgentManifest> {
        if let Some(existing) = &self.registered {
            if existing.id != agent_id {
                return Err(RunnerError::ResourceExhausted(format!(
                    "Runner already driven by {}",
                    existing.id
                )));
            }
        }

        let mode = ObservationMode::from_profile(&config.observation_profile).ok_or_else(|| {
            RunnerError::Config(format!(
                "Unknown observation profile: {}",
                config.observation_profile
            ))
        })?;
        self.agent.perception_mut().set_mode(mode);
        self.registered = Some(RegisteredAgent {
            id: agent_id.clone(),
            agent_type: agent_type.clone(),
        });
        info!(agent = %agent_id, ?agent_type, ?mode, "Agent registered");

        Ok(AgentManifest {
            agent_id,
            agent_type,
            observation_space: self.observation_space(),
            action_space: serde_json::to_value(ActionSpace::lanes())?,
            reward_components: self
                .agent
                .rewards()
                .component_defs()
                .into_iter()
                .map(|c| c.name)
                .collect(),
        })
    }

    async fn deregister_agent(&mut self, agent_id: &AgentId) -> Result<()> {
        self.require_agent(agent_id)?;
        self.registered = None;
        info!(agent = %agent_id, "Agent deregistered");
        Ok(())
    }

    async fn step(&mut self, agent_id: &AgentId, action: Action, ticks: u32) -> Result<StepResult> {
        let observer = self.require_agent(agent_id)?.agent_type == AgentType::Observer;
        if self.episode_over() {
            return Err(RunnerError::EpisodeTerminated);
        }
        if matches!(&action, Action::Continuous(values) if values.is_empty()) {
            return Err(RunnerError::InvalidAction("empty action vector".into()));
        }

        let action = if observer { STAY } else { action };
        let events = self.advance(&action, ticks);
        let reward = self.agent.take_reward();
        let done = self.agent.is_terminating();

        let termination_reason = if done {
            Some(TerminationReason::Failure)
        } else if self.truncated {
            Some(TerminationReason::Timeout)
        } else {
            None
        };

        Ok(StepResult {
            agent_id: agent_id.clone(),
            step_id: self.agent.steps(),
            tick: self.tick,
            observation: self.observe(),
            reward: reward.value,
            reward_components: reward.components,
            done,
            truncated: self.truncated,
            termination_reason,
            events,
            state_hash: Some(self.compute_hash()?),
        })
    }

    async fn reset(&mut self, seed: Option<u64>) -> Result<Observation> {
        let seed = seed.unwrap_or_else(|| self.seed.wrapping_add(1));
        self.start_episode(seed);
        Ok(self.observe())
    }

    async fn state_hash(&mut self) -> Result<String> {
        self.compute_hash()
    }

    async fn save_trajectory(&self, path: &str) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.trajectory())?;
        tokio::fs::write(path, json).await?;
        info!(path, steps = self.trajectory.len(), "Trajectory saved");
        Ok(())
    }

    async fn load_trajectory(&mut self, path: &str) -> Result<()> {
        let json = tokio::fs::read(path).await?;
        let trajectory: Trajectory = serde_json::from_slice(&json)?;

        self.start_episode(trajectory.seed);
        for step in &trajectory.steps {
            if self.episode_over() {
                break;
            }
            self.advance(&step.action, step.ticks);
        }
        self.agent.take_reward();
        info!(
            path,
            steps = trajectory.steps.len(),
            tick = self.tick,
            "Trajectory replayed"
        );
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!(
            distance = self.session.track.world_distance(),
            score = self.session.track.score(),
            "Environment shutting down"
        );
        Ok(())
    }

    fn manifest(&self) -> GameManifest {
        GameManifest {
            name: "endless-runner".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            capabilities: Capabilities {
                multi_agent: false,
                max_agents: 1,
                agent_types: vec!["Observer".into(), "Player".into()],
                deterministic: true,
                save_replay: true,
                headless: true,
            },
            default_observation_space: Some(self.observation_space()),
            default_action_space: Some(ActionSpace::lanes()),
            reward_components: self.agent.rewards().component_defs(),
            tick_rate: self.config.tick_rate,
            max_episode_ticks: self.config.max_episode_ticks,
            ..Default::default()
        }
    }
}
