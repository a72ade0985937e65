//! The controlled character: locomotion plus lives, currency and power-ups

use tracing::{debug, info};

use crate::config::{CharacterConfig, LocomotionConfig};
use crate::consumable::{Consumable, ConsumableKind};
use crate::context::SimulationContext;
use crate::input::Intent;
use crate::locomotion::Locomotion;
use crate::presentation::{AnimationClip, AnimationFlag, AudioCue, Rig};
use crate::track::{Track, TrackState};

/// A runner character bound to its presentation rig
#[derive(Debug)]
pub struct Character<R: Rig> {
    config: CharacterConfig,
    locomotion: Locomotion<R>,
    lives: i32,
    coins: u32,
    premium: u32,
    invincible_cheat: bool,
    /// Held consumable waiting to be used
    pub inventory: Option<Consumable>,
    active: Vec<Consumable>,
}

impl<R: Rig> Character<R> {
    pub fn new(config: CharacterConfig, locomotion: LocomotionConfig, rig: R) -> Self {
        let lives = config.max_life;
        Self {
            config,
            locomotion: Locomotion::new(locomotion, rig),
            lives,
            coins: 0,
            premium: 0,
            invincible_cheat: false,
            inventory: None,
            active: Vec::new(),
        }
    }

    /// Full lives, center lane
    pub fn init(&mut self) {
        self.locomotion.reset();
        self.lives = self.config.max_life;
    }

    /// Called at the beginning of a run or rerun
    pub fn begin(&mut self) {
        self.locomotion.rig_mut().set_flag(AnimationFlag::Dead, false);
        self.locomotion.reset();
        self.active.clear();
    }

    /// Called when a run ends
    pub fn end(&mut self) {
        self.clean_consumables();
    }

    /// End every active consumable
    pub fn clean_consumables(&mut self) {
        for consumable in std::mem::take(&mut self.active) {
            self.end_effect(consumable.kind);
        }
    }

    pub fn start_running(&mut self) {
        let rig = self.locomotion.rig_mut();
        rig.play(AnimationClip::RunStart);
        rig.set_flag(AnimationFlag::Moving, true);
    }

    pub fn stop_moving(&mut self, track: &mut Track) {
        track.stop_move();
        self.locomotion
            .rig_mut()
            .set_flag(AnimationFlag::Moving, false);
    }

    /// Route a control intent into the state machine
    pub fn apply(&mut self, intent: Intent, track: &dyn TrackState) {
        match intent {
            Intent::ChangeLane(direction) => self.locomotion.change_lane(direction, track),
            Intent::Jump => self.locomotion.jump(track),
            Intent::Slide => self.locomotion.slide(track),
        }
    }

    /// Advance locomotion one tick
    pub fn tick(&mut self, track: &dyn TrackState, ctx: &SimulationContext) {
        self.locomotion.tick(track, ctx);
    }

    /// Register an obstacle hit. Returns whether a life was lost.
    pub fn hit_obstacle(&mut self) -> bool {
        if self.is_invincible() {
            debug!("Obstacle hit absorbed by invincibility");
            return false;
        }
        self.lives -= 1;
        info!(lives = self.lives, "Obstacle hit");
        true
    }

    pub fn collect_coin(&mut self) {
        self.coins += 1;
    }

    pub fn collect_premium(&mut self) {
        self.premium += 1;
    }

    /// Use the held consumable if it can be used now
    pub fn use_inventory(&mut self) -> bool {
        match self.inventory.take() {
            Some(consumable) if self.can_use(consumable.kind) => {
                self.use_consumable(consumable);
                true
            }
            other => {
                self.inventory = other;
                false
            }
        }
    }

    /// Whether `kind` would have any effect right now
    pub fn can_use(&self, kind: ConsumableKind) -> bool {
        match kind {
            ConsumableKind::ExtraLife => self.lives < self.config.max_life,
            _ => true,
        }
    }

    /// Activate a consumable; re-using an active kind restarts its timer
    pub fn use_consumable(&mut self, mut consumable: Consumable) {
        self.locomotion
            .rig_mut()
            .play_one_shot(AudioCue::PowerUpUse);

        if let Some(existing) = self.active.iter_mut().find(|c| c.kind == consumable.kind) {
            existing.reset_time();
            return;
        }

        consumable.start();
        self.start_effect(consumable.kind);
        debug!(kind = ?consumable.kind, "Consumable started");
        self.active.push(consumable);
    }

    fn start_effect(&mut self, kind: ConsumableKind) {
        if kind == ConsumableKind::ExtraLife && self.lives < self.config.max_life {
            self.lives += 1;
        }
    }

    fn end_effect(&mut self, kind: ConsumableKind) {
        debug!(?kind, "Consumable ended");
    }

    /// Advance consumable timers and drop expired ones.
    /// Returns the kinds that ended this tick.
    pub fn tick_consumables(&mut self, delta_time: f32) -> Vec<ConsumableKind> {
        for consumable in &mut self.active {
            consumable.tick(delta_time);
        }

        let (expired, still_active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active)
                .into_iter()
                .partition(|c| !c.is_active());
        self.active = still_active;

        expired
            .into_iter()
            .map(|c| {
                self.end_effect(c.kind);
                c.kind
            })
            .collect()
    }

    pub fn has_active(&self, kind: ConsumableKind) -> bool {
        self.active.iter().any(|c| c.kind == kind)
    }

    pub fn consumables(&self) -> &[Consumable] {
        &self.active
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_cheat || self.has_active(ConsumableKind::Invincibility)
    }

    pub fn cheat_invincible(&mut self, invincible: bool) {
        self.invincible_cheat = invincible;
    }

    pub fn is_cheat_invincible(&self) -> bool {
        self.invincible_cheat
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn set_lives(&mut self, lives: i32) {
        self.lives = lives;
    }

    pub fn max_life(&self) -> i32 {
        self.config.max_life
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn premium(&self) -> u32 {
        self.premium
    }

    pub fn vertical_movement_enabled(&self) -> bool {
        self.config.vertical_movement_enabled
    }

    pub fn locomotion(&self) -> &Locomotion<R> {
        &self.locomotion
    }

    pub fn locomotion_mut(&mut self) -> &mut Locomotion<R> {
        &mut self.locomotion
    }

    pub fn rig(&self) -> &R {
        self.locomotion.rig()
    }

    pub fn rig_mut(&mut self) -> &mut R {
        self.locomotion.rig_mut()
    }
}
