//! Lane and vertical-motion state machine
//!
//! Jump and slide progress is measured in world distance rather than time,
//! so an arc covers the same ground regardless of how fast the track runs.
//! The arc length is fixed when the motion starts.
//!
//! Priority between vertical motions is asymmetric: a jump cancels an
//! active slide, a slide never interrupts a jump.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::LocomotionConfig;
use crate::context::SimulationContext;
use crate::presentation::{AnimationFlag, AnimationParam, AudioCue, Rig};
use crate::track::TrackState;

/// Rate at which a stalled jump settles back to the ground, units/s
pub const GROUNDING_SPEED: f32 = 80.0;

/// Offsets this close to zero count as grounded
pub const GROUND_EPSILON: f32 = 1e-5;

/// Animation playback speed per unit of track speed over arc length
pub const TRACK_SPEED_TO_JUMP_ANIM_SPEED_RATIO: f32 = 0.6;

/// Lateral lane change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    pub fn delta(self) -> isize {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }
}

/// Current lane and the lateral offset it maps to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneState {
    pub index: usize,
    pub target_offset: f32,
}

/// Distance window of an in-flight jump or slide
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionArc {
    pub start_distance: f32,
    /// Effective length, sampled once from the speed ratio at start
    pub length: f32,
}

impl MotionArc {
    /// Start an arc at the track's current distance
    pub fn start(track: &dyn TrackState, base_length: f32) -> Self {
        Self {
            start_distance: track.world_distance(),
            length: base_length * (1.0 + track.speed_ratio()),
        }
    }

    /// Fraction of the arc covered at `world_distance`, clamped to `[0, 1]`
    pub fn progress(&self, world_distance: f32) -> f32 {
        if self.length <= 0.0 {
            return 1.0;
        }
        ((world_distance - self.start_distance) / self.length).clamp(0.0, 1.0)
    }
}

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerticalMotion {
    #[default]
    Grounded,
    Jumping(MotionArc),
    Sliding(MotionArc),
}

/// Move `current` toward `target` by at most `max_delta`
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

fn move_towards_scalar(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Locomotion state machine driving a [`Rig`]
#[derive(Debug)]
pub struct Locomotion<R: Rig> {
    config: LocomotionConfig,
    lane: LaneState,
    motion: VerticalMotion,
    /// Height the body is steering toward
    vertical_offset: f32,
    rig: R,
}

impl<R: Rig> Locomotion<R> {
    /// Create a grounded state machine in the center lane
    pub fn new(config: LocomotionConfig, rig: R) -> Self {
        let mut locomotion = Self {
            lane: LaneState {
                index: 0,
                target_offset: 0.0,
            },
            config,
            motion: VerticalMotion::Grounded,
            vertical_offset: 0.0,
            rig,
        };
        locomotion.reset();
        locomotion
    }

    /// Return to the center lane, grounded, with the body at rest
    pub fn reset(&mut self) {
        let center = self.config.center_lane();
        self.lane = LaneState {
            index: center,
            target_offset: self.lane_offset(center),
        };
        if matches!(self.motion, VerticalMotion::Sliding(_)) {
            self.rig.set_slide_footprint(false);
        }
        self.motion = VerticalMotion::Grounded;
        self.vertical_offset = 0.0;
        self.rig.set_local_position(Vec3::ZERO);
    }

    fn lane_offset(&self, index: usize) -> f32 {
        (index as f32 - self.config.center_lane() as f32) * self.config.lane_spacing
    }

    /// Shift one lane. No-op while the track is stopped or at the border.
    pub fn change_lane(&mut self, direction: LaneDirection, track: &dyn TrackState) {
        if !track.is_moving() {
            return;
        }

        let target = self.lane.index as isize + direction.delta();
        if target < 0 || target >= self.config.lane_count as isize {
            return;
        }

        let index = target as usize;
        self.lane = LaneState {
            index,
            target_offset: self.lane_offset(index),
        };
        trace!(lane = index, "Lane changed");
    }

    /// Start a jump, cancelling any slide. No-op while already jumping.
    pub fn jump(&mut self, track: &dyn TrackState) {
        if self.is_jumping() {
            return;
        }
        if self.is_sliding() {
            self.stop_sliding();
        }

        let arc = MotionArc::start(track, self.config.jump_length);
        let anim_speed = TRACK_SPEED_TO_JUMP_ANIM_SPEED_RATIO * (track.speed() / arc.length);

        self.rig.set_param(AnimationParam::JumpSpeed, anim_speed);
        self.rig.set_flag(AnimationFlag::Jumping, true);
        self.rig.play_one_shot(AudioCue::Jump);
        self.motion = VerticalMotion::Jumping(arc);
        debug!(start = arc.start_distance, length = arc.length, "Jump started");
    }

    /// Start a slide. No-op while sliding or jumping.
    pub fn slide(&mut self, track: &dyn TrackState) {
        if self.is_sliding() || self.is_jumping() {
            return;
        }

        let arc = MotionArc::start(track, self.config.slide_length);
        let anim_speed = TRACK_SPEED_TO_JUMP_ANIM_SPEED_RATIO * (track.speed() / arc.length);

        self.rig.set_param(AnimationParam::JumpSpeed, anim_speed);
        self.rig.set_flag(AnimationFlag::Sliding, true);
        self.rig.play_one_shot(AudioCue::Slide);
        self.rig.set_slide_footprint(true);
        self.motion = VerticalMotion::Sliding(arc);
        debug!(start = arc.start_distance, length = arc.length, "Slide started");
    }

    /// End a slide. Idempotent.
    pub fn stop_sliding(&mut self) {
        if !self.is_sliding() {
            return;
        }
        self.rig.set_flag(AnimationFlag::Sliding, false);
        self.rig.set_slide_footprint(false);
        self.motion = VerticalMotion::Grounded;
    }

    fn land(&mut self) {
        self.motion = VerticalMotion::Grounded;
        self.vertical_offset = 0.0;
        self.rig.set_flag(AnimationFlag::Jumping, false);
    }

    /// Advance one simulation tick
    pub fn tick(&mut self, track: &dyn TrackState, ctx: &SimulationContext) {
        let distance = track.world_distance();

        if let VerticalMotion::Sliding(arc) = self.motion {
            if arc.progress(distance) >= 1.0 {
                self.stop_sliding();
            }
        }

        if let VerticalMotion::Jumping(arc) = self.motion {
            if track.is_moving() {
                let progress = arc.progress(distance);
                if progress >= 1.0 {
                    self.land();
                } else {
                    self.vertical_offset = (progress * PI).sin() * self.config.jump_height;
                }
            } else if !ctx.audio_paused {
                self.vertical_offset = move_towards_scalar(
                    self.vertical_offset,
                    0.0,
                    GROUNDING_SPEED * ctx.delta_time,
                );
                if self.vertical_offset.abs() <= GROUND_EPSILON {
                    self.land();
                }
            }
        }

        let target = Vec3::new(self.lane.target_offset, self.vertical_offset, 0.0);
        let position = move_towards(
            self.rig.local_position(),
            target,
            self.config.lane_change_speed * ctx.delta_time,
        );
        self.rig.set_local_position(position);
    }

    pub fn lane(&self) -> LaneState {
        self.lane
    }

    pub fn motion(&self) -> VerticalMotion {
        self.motion
    }

    pub fn is_jumping(&self) -> bool {
        matches!(self.motion, VerticalMotion::Jumping(_))
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.motion, VerticalMotion::Sliding(_))
    }

    /// Height the body is steering toward this tick
    pub fn vertical_offset(&self) -> f32 {
        self.vertical_offset
    }

    /// Target position combining lane offset and vertical offset
    pub fn target_position(&self) -> Vec3 {
        Vec3::new(self.lane.target_offset, self.vertical_offset, 0.0)
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{PositionTarget, RecordingRig};
    use crate::track::FixedTrack;

    fn locomotion() -> Locomotion<RecordingRig> {
        Locomotion::new(LocomotionConfig::default(), RecordingRig::new())
    }

    #[test]
    fn test_lane_changes_stay_in_bounds() {
        let mut loco = locomotion();
        let track = FixedTrack::default();
        assert_eq!(loco.lane().index, 1);

        loco.change_lane(LaneDirection::Left, &track);
        assert_eq!(loco.lane().index, 0);
        assert_eq!(loco.lane().target_offset, -1.0);

        let before = loco.lane();
        loco.change_lane(LaneDirection::Left, &track);
        assert_eq!(loco.lane(), before);

        for _ in 0..5 {
            loco.change_lane(LaneDirection::Right, &track);
            assert!(loco.lane().index <= 2);
        }
        assert_eq!(loco.lane().index, 2);
        assert_eq!(loco.lane().target_offset, 1.0);
    }

    #[test]
    fn test_lane_change_ignored_when_track_stopped() {
        let mut loco = locomotion();
        let track = FixedTrack {
            moving: false,
            ..Default::default()
        };
        loco.change_lane(LaneDirection::Right, &track);
        assert_eq!(loco.lane().index, 1);
        assert_eq!(loco.lane().target_offset, 0.0);
    }

    #[test]
    fn test_jump_cancels_slide() {
        let mut loco = locomotion();
        let track = FixedTrack::default();

        loco.slide(&track);
        assert!(loco.is_sliding());
        assert!(loco.rig().slide_footprint());

        loco.jump(&track);
        assert!(loco.is_jumping());
        assert!(!loco.is_sliding());
        assert!(!loco.rig().slide_footprint());
        assert_eq!(loco.rig().last_flag(AnimationFlag::Sliding), Some(false));
        assert_eq!(loco.rig().last_flag(AnimationFlag::Jumping), Some(true));
    }

    #[test]
    fn test_slide_during_jump_is_noop() {
        let mut loco = locomotion();
        let track = FixedTrack::default();

        loco.jump(&track);
        loco.slide(&track);
        assert!(loco.is_jumping());
        assert!(!loco.is_sliding());
        assert_eq!(loco.rig().audio_count(AudioCue::Slide), 0);
    }

    #[test]
    fn test_jump_side_effects_fire_once() {
        let mut loco = locomotion();
        let track = FixedTrack::default();

        loco.jump(&track);
        loco.jump(&track);
        loco.jump(&track);
        assert_eq!(loco.rig().audio_count(AudioCue::Jump), 1);

        let jump_flags = loco
            .rig()
            .events()
            .iter()
            .filter(|e| matches!(e, crate::PresentationEvent::Flag { flag: AnimationFlag::Jumping, on: true }))
            .count();
        assert_eq!(jump_flags, 1);
    }

    #[test]
    fn test_jump_progress_and_peak() {
        let mut loco = locomotion();
        let mut track = FixedTrack::default();
        let ctx = SimulationContext::running(0.0);

        loco.jump(&track);
        let VerticalMotion::Jumping(arc) = loco.motion() else {
            panic!("expected jumping");
        };
        assert_eq!(arc.length, 2.0);

        track.world_distance = 1.0;
        assert_eq!(arc.progress(track.world_distance), 0.5);
        loco.tick(&track, &ctx);
        assert!((loco.vertical_offset() - 1.2).abs() < 1e-6);

        track.world_distance = 2.0;
        assert_eq!(arc.progress(track.world_distance), 1.0);
        loco.tick(&track, &ctx);
        assert!(!loco.is_jumping());
        assert_eq!(loco.vertical_offset(), 0.0);
        assert_eq!(loco.rig().last_flag(AnimationFlag::Jumping), Some(false));
    }

    #[test]
    fn test_arc_length_fixed_at_start() {
        let mut loco = locomotion();
        let mut track = FixedTrack {
            speed_ratio: 0.5,
            ..Default::default()
        };
        let ctx = SimulationContext::running(0.0);

        loco.jump(&track);
        track.speed_ratio = 1.0;
        track.world_distance = 2.9;
        loco.tick(&track, &ctx);
        assert!(loco.is_jumping());

        track.world_distance = 3.0;
        loco.tick(&track, &ctx);
        assert!(!loco.is_jumping());
    }

    #[test]
    fn test_slide_completes_by_distance() {
        let mut loco = locomotion();
        let mut track = FixedTrack::default();
        let ctx = SimulationContext::running(0.0);

        loco.slide(&track);
        track.world_distance = 1.9;
        loco.tick(&track, &ctx);
        assert!(loco.is_sliding());

        track.world_distance = 2.0;
        loco.tick(&track, &ctx);
        assert!(!loco.is_sliding());
        assert!(!loco.rig().slide_footprint());

        loco.stop_sliding();
        assert_eq!(
            loco.rig()
                .events()
                .iter()
                .filter(|e| matches!(e, crate::PresentationEvent::Flag { flag: AnimationFlag::Sliding, on: false }))
                .count(),
            1
        );
    }

    #[test]
    fn test_stalled_jump_settles_to_ground() {
        let mut loco = locomotion();
        let mut track = FixedTrack::default();

        loco.jump(&track);
        track.world_distance = 1.0;
        loco.tick(&track, &SimulationContext::running(0.0));
        assert!((loco.vertical_offset() - 1.2).abs() < 1e-6);

        track.moving = false;
        loco.tick(&track, &SimulationContext::paused());
        assert!(loco.is_jumping());
        assert!((loco.vertical_offset() - 1.2).abs() < 1e-6);

        loco.tick(&track, &SimulationContext::running(0.01));
        assert!(loco.is_jumping());
        assert!((loco.vertical_offset() - 0.4).abs() < 1e-4);

        loco.tick(&track, &SimulationContext::running(0.01));
        assert!(!loco.is_jumping());
        assert_eq!(loco.vertical_offset(), 0.0);
    }

    #[test]
    fn test_body_moves_toward_target_at_capped_speed() {
        let mut loco = locomotion();
        let track = FixedTrack::default();

        loco.change_lane(LaneDirection::Right, &track);
        loco.tick(&track, &SimulationContext::running(0.25));
        let position = loco.rig().local_position();
        assert!((position.x - 0.25).abs() < 1e-6);

        loco.tick(&track, &SimulationContext::running(1.0));
        assert_eq!(loco.rig().local_position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_reset_returns_to_center() {
        let mut loco = locomotion();
        let track = FixedTrack::default();
        loco.change_lane(LaneDirection::Left, &track);
        loco.slide(&track);
        loco.tick(&track, &SimulationContext::running(1.0));

        loco.reset();
        assert_eq!(loco.lane().index, 1);
        assert_eq!(loco.motion(), VerticalMotion::Grounded);
        assert!(!loco.rig().slide_footprint());
        assert_eq!(loco.rig().local_position(), Vec3::ZERO);
    }
}
