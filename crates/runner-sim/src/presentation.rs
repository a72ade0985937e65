//! Presentation capabilities injected into the character
//!
//! The simulation never renders, animates or plays audio itself. It fires
//! one-way notifications into these sinks and moves a [`PositionTarget`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Boolean animator parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationFlag {
    Moving,
    Jumping,
    Sliding,
    Dead,
}

/// Float animator parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationParam {
    /// Playback speed of the jump and slide clips
    JumpSpeed,
}

/// Clips started directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationClip {
    RunStart,
}

/// One-shot audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    Jump,
    Slide,
    PowerUpUse,
}

/// Receives animation state changes
pub trait AnimationSink {
    fn set_flag(&mut self, flag: AnimationFlag, on: bool);
    fn set_param(&mut self, param: AnimationParam, value: f32);
    fn play(&mut self, clip: AnimationClip);
}

/// Receives one-shot audio triggers
pub trait AudioSink {
    fn play_one_shot(&mut self, cue: AudioCue);
}

/// The character body the state machine moves
///
/// Positions are local to the runner: x is lateral, y is height above
/// the ground, z stays at zero.
pub trait PositionTarget {
    fn local_position(&self) -> Vec3;
    fn set_local_position(&mut self, position: Vec3);
    /// Shrink (`true`) or restore (`false`) the collision footprint
    fn set_slide_footprint(&mut self, sliding: bool);
}

/// Everything the character needs from its host
pub trait Rig: AnimationSink + AudioSink + PositionTarget {}

impl<T: AnimationSink + AudioSink + PositionTarget> Rig for T {}

/// A single notification captured by [`RecordingRig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresentationEvent {
    Flag { flag: AnimationFlag, on: bool },
    Param { param: AnimationParam, value: f32 },
    Play { clip: AnimationClip },
    Audio { cue: AudioCue },
}

/// Headless rig that holds the body state and records every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingRig {
    position: Vec3,
    slide_footprint: bool,
    events: Vec<PresentationEvent>,
}

impl RecordingRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the collider is currently in its slide footprint
    pub fn slide_footprint(&self) -> bool {
        self.slide_footprint
    }

    pub fn events(&self) -> &[PresentationEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty
    pub fn drain_events(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    /// How many times `cue` was played
    pub fn audio_count(&self, cue: AudioCue) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresentationEvent::Audio { cue: c } if *c == cue))
            .count()
    }

    /// Last value written to `flag`, if any
    pub fn last_flag(&self, flag: AnimationFlag) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            PresentationEvent::Flag { flag: f, on } if *f == flag => Some(*on),
            _ => None,
        })
    }
}

impl AnimationSink for RecordingRig {
    fn set_flag(&mut self, flag: AnimationFlag, on: bool) {
        self.events.push(PresentationEvent::Flag { flag, on });
    }

    fn set_param(&mut self, param: AnimationParam, value: f32) {
        self.events.push(PresentationEvent::Param { param, value });
    }

    fn play(&mut self, clip: AnimationClip) {
        self.events.push(PresentationEvent::Play { clip });
    }
}

impl AudioSink for RecordingRig {
    fn play_one_shot(&mut self, cue: AudioCue) {
        self.events.push(PresentationEvent::Audio { cue });
    }
}

impl PositionTarget for RecordingRig {
    fn local_position(&self) -> Vec3 {
        self.position
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_slide_footprint(&mut self, sliding: bool) {
        self.slide_footprint = sliding;
    }
}
