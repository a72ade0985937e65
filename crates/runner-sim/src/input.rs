//! Manual input translation: keyboard presses and touch swipes to intents

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::locomotion::LaneDirection;

/// Locomotion request produced by any control source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    ChangeLane(LaneDirection),
    Jump,
    Slide,
}

/// Arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Intent for a key press; Up and Down need vertical movement enabled
    pub fn intent(self, vertical_enabled: bool) -> Option<Intent> {
        match self {
            Key::Left => Some(Intent::ChangeLane(LaneDirection::Left)),
            Key::Right => Some(Intent::ChangeLane(LaneDirection::Right)),
            Key::Up if vertical_enabled => Some(Intent::Jump),
            Key::Down if vertical_enabled => Some(Intent::Slide),
            Key::Up | Key::Down => None,
        }
    }
}

/// Touch phases for a single finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
}

/// Swipe threshold as a fraction of screen width
pub const SWIPE_THRESHOLD: f32 = 0.01;

/// Turns single-finger swipes into intents
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    screen_width: f32,
    start: Vec2,
    swiping: bool,
}

impl SwipeTracker {
    pub fn new(screen_width: f32) -> Self {
        Self {
            screen_width: screen_width.max(1.0),
            start: Vec2::ZERO,
            swiping: false,
        }
    }

    /// Feed one frame of touch input.
    ///
    /// The swipe test runs before the phase is handled, so a touch that
    /// begins and ends on consecutive frames still registers.
    pub fn update(&mut self, phase: TouchPhase, position: Vec2) -> Option<Intent> {
        let mut intent = None;

        if self.swiping {
            // Both axes are scaled by width so vertical swipes need the same travel
            let diff = (position - self.start) / self.screen_width;
            if diff.length() > SWIPE_THRESHOLD {
                intent = Some(if diff.y.abs() > diff.x.abs() {
                    if diff.y < 0.0 { Intent::Slide } else { Intent::Jump }
                } else if diff.x < 0.0 {
                    Intent::ChangeLane(LaneDirection::Left)
                } else {
                    Intent::ChangeLane(LaneDirection::Right)
                });
                self.swiping = false;
            }
        }

        match phase {
            TouchPhase::Began => {
                self.start = position;
                self.swiping = true;
            }
            TouchPhase::Ended => self.swiping = false,
            TouchPhase::Moved | TouchPhase::Stationary => {}
        }

        intent
    }
}
