//! Game-session controller: run boundaries, pause, deaths and HUD data

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::character::Character;
use crate::config::RunnerConfig;
use crate::consumable::ConsumableKind;
use crate::context::SimulationContext;
use crate::presentation::{AnimationFlag, Rig};
use crate::track::{Track, TrackState};

/// Everything a HUD needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub coins: u32,
    pub premium: u32,
    /// One entry per heart, true when filled
    pub hearts: Vec<bool>,
    pub score: u64,
    pub multiplier: u32,
    /// Whole meters run
    pub distance: u64,
    /// Countdown digit while the run has not started
    pub countdown: Option<u32>,
    /// Countdown digit scale, shrinking within each second
    pub countdown_scale: f32,
    pub inventory: Option<ConsumableKind>,
    pub active_consumables: Vec<ConsumableKind>,
}

/// Drives one character on one track
#[derive(Debug)]
pub struct GameSession<R: Rig> {
    pub track: Track,
    pub character: Character<R>,
    finished: bool,
    paused: bool,
    was_moving: bool,
    dead: bool,
    time_since_start: f32,
    selection_done: bool,
}

impl<R: Rig> GameSession<R> {
    pub fn new(config: &RunnerConfig, rig: R) -> Self {
        Self {
            track: Track::new(config.track.clone()),
            character: Character::new(config.character.clone(), config.locomotion.clone(), rig),
            finished: true,
            paused: false,
            was_moving: false,
            dead: false,
            time_since_start: 0.0,
            selection_done: false,
        }
    }

    /// Enter the game state: clear the continue guard and start a run
    pub fn enter(&mut self) {
        self.selection_done = false;
        self.start_game();
    }

    /// Leave the game state
    pub fn exit(&mut self) {
        self.character.end();
        self.track.end();
    }

    /// Start a run. Fresh runs restore full lives; reruns keep the count.
    pub fn start_game(&mut self) {
        if !self.track.is_rerun() {
            self.time_since_start = 0.0;
            self.character.init();
        }

        self.track.begin();
        self.character.begin();
        self.finished = false;
        self.paused = false;
        self.dead = false;
        info!(
            rerun = self.track.is_rerun(),
            lives = self.character.lives(),
            "Run started"
        );
    }

    /// Advance the session one tick. Returns `None` once finished.
    pub fn tick(&mut self, ctx: &SimulationContext) -> Option<HudSnapshot> {
        if self.finished {
            return None;
        }

        let ctx = if self.paused {
            SimulationContext::paused()
        } else {
            *ctx
        };

        let bonus = if self.character.has_active(ConsumableKind::Score2x) {
            2
        } else {
            1
        };
        if self.track.update(ctx.delta_time, bonus) {
            self.character.start_running();
        }
        self.character.tick(&self.track, &ctx);

        self.time_since_start += ctx.delta_time;

        if self.character.lives() <= 0 && !self.dead {
            self.dead = true;
            self.character.clean_consumables();
            self.character.rig_mut().set_flag(AnimationFlag::Dead, true);
            info!(
                distance = self.track.world_distance(),
                score = self.track.score(),
                "Character died"
            );
        }

        let ended = self.character.tick_consumables(ctx.delta_time);
        if !ended.is_empty() {
            debug!(?ended, "Consumables expired");
        }

        Some(self.hud())
    }

    /// Current HUD data
    pub fn hud(&self) -> HudSnapshot {
        let lives = self.character.lives();
        let (countdown, countdown_scale) = match self.track.time_to_start() {
            Some(t) => (Some(t.ceil() as u32), 1.0 - (t - t.floor())),
            None => (None, 0.0),
        };

        HudSnapshot {
            coins: self.character.coins(),
            premium: self.character.premium(),
            hearts: (0..self.character.max_life().max(0))
                .map(|i| lives > i)
                .collect(),
            score: self.track.score(),
            multiplier: self.track.multiplier(),
            distance: self.track.world_distance().floor() as u64,
            countdown,
            countdown_scale,
            inventory: self.character.inventory.as_ref().map(|c| c.kind),
            active_consumables: self.character.consumables().iter().map(|c| c.kind).collect(),
        }
    }

    /// Pause the run. No-op when finished or already paused.
    pub fn pause(&mut self) {
        if self.finished || self.paused {
            return;
        }
        self.paused = true;
        self.was_moving = self.track.is_moving();
        self.track.stop_move();
        debug!(was_moving = self.was_moving, "Paused");
    }

    /// Resume a paused run, restarting the track only if it was moving
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.was_moving {
            self.track.start_move();
        }
        debug!("Resumed");
    }

    /// Stop and restart from scratch
    pub fn reset_all(&mut self) {
        self.finished = true;
        self.track.stop_move();
        self.track.set_rerun(false);
        self.exit();
        self.enter();
    }

    /// Run is over; stop the track and wait for a continue or game over
    pub fn finish(&mut self) {
        self.finished = true;
        self.track.stop_move();
    }

    /// Continue with one life. Only the first continue selection counts.
    pub fn second_wind(&mut self) -> bool {
        if self.selection_done {
            return false;
        }
        self.selection_done = true;
        self.character.set_lives(1);
        self.track.set_rerun(true);
        self.start_game();
        true
    }

    /// Give up on the run
    pub fn game_over(&mut self) {
        self.finish();
        self.exit();
        info!(score = self.track.score(), "Game over");
    }

    /// Abandon the run from the pause menu
    pub fn quit(&mut self) {
        self.paused = false;
        self.finished = true;
        self.exit();
        self.track.set_rerun(false);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn time_since_start(&self) -> f32 {
        self.time_since_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackConfig;
    use crate::consumable::Consumable;
    use crate::input::Intent;
    use crate::presentation::RecordingRig;

    fn session() -> GameSession<RecordingRig> {
        let config = RunnerConfig {
            track: TrackConfig {
                countdown: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = GameSession::new(&config, RecordingRig::new());
        session.enter();
        session
    }

    fn run_for(session: &mut GameSession<RecordingRig>, seconds: f32) {
        let steps = (seconds * 60.0).round() as usize;
        for _ in 0..steps {
            session.tick(&SimulationContext::running(1.0 / 60.0));
        }
    }

    #[test]
    fn test_countdown_then_running() {
        let mut s = session();
        let hud = s.tick(&SimulationContext::running(0.1)).unwrap();
        assert_eq!(hud.countdown, Some(1));
        assert_eq!(hud.hearts, vec![true, true, true]);

        run_for(&mut s, 1.0);
        assert!(s.track.is_moving());
        assert_eq!(s.character.rig().last_flag(AnimationFlag::Moving), Some(true));
        assert!(s.hud().distance >= 2);
        assert_eq!(s.hud().countdown, None);
    }

    #[test]
    fn test_pause_resume_restores_motion() {
        let mut s = session();
        run_for(&mut s, 1.0);

        s.pause();
        assert!(s.is_paused());
        assert!(!s.track.is_moving());
        let distance = s.track.world_distance();
        run_for(&mut s, 1.0);
        assert_eq!(s.track.world_distance(), distance);

        s.pause();
        s.resume();
        assert!(s.track.is_moving());
    }

    #[test]
    fn test_pause_holds_stalled_jump() {
        let mut s = session();
        run_for(&mut s, 1.0);

        s.character.apply(Intent::Jump, &s.track);
        run_for(&mut s, 0.1);
        let height = s.character.locomotion().vertical_offset();
        assert!(height > 0.0);

        s.pause();
        run_for(&mut s, 1.0);
        assert_eq!(s.character.locomotion().vertical_offset(), height);
        assert!(s.character.locomotion().is_jumping());

        // Stopped without pausing, the jump sinks back to the ground
        s.resume();
        s.track.stop_move();
        run_for(&mut s, 1.0);
        assert!(!s.character.locomotion().is_jumping());
        assert_eq!(s.character.locomotion().vertical_offset(), 0.0);
    }

    #[test]
    fn test_pause_ignored_when_finished() {
        let mut s = session();
        s.finish();
        s.pause();
        assert!(!s.is_paused());
        assert!(s.tick(&SimulationContext::running(0.1)).is_none());
    }

    #[test]
    fn test_death_and_second_wind() {
        let mut s = session();
        run_for(&mut s, 1.0);
        s.character
            .use_consumable(Consumable::new(ConsumableKind::CoinMagnet));
        s.character.set_lives(0);
        s.tick(&SimulationContext::running(0.1));

        assert!(s.is_dead());
        assert!(s.character.consumables().is_empty());
        assert_eq!(s.character.rig().last_flag(AnimationFlag::Dead), Some(true));
        assert_eq!(s.hud().hearts, vec![false, false, false]);

        s.finish();
        let distance = s.track.world_distance();
        assert!(s.second_wind());
        assert_eq!(s.character.lives(), 1);
        assert!(!s.is_dead());
        assert_eq!(s.track.world_distance(), distance);
        assert!(!s.second_wind());
    }

    #[test]
    fn test_reset_all_starts_fresh() {
        let mut s = session();
        run_for(&mut s, 2.0);
        s.character.hit_obstacle();

        s.reset_all();
        assert!(!s.is_finished());
        assert_eq!(s.track.world_distance(), 0.0);
        assert_eq!(s.character.lives(), 3);
        assert_eq!(s.time_since_start(), 0.0);
    }
}
