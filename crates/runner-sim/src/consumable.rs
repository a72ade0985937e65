//! Timed power-ups

use serde::{Deserialize, Serialize};

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumableKind {
    /// Pulls nearby pickups in
    CoinMagnet,
    /// Obstacle hits cost no life
    Invincibility,
    /// Doubles score gain
    Score2x,
    /// Restores one life, ends immediately
    ExtraLife,
}

impl ConsumableKind {
    /// Seconds the effect lasts
    pub fn default_duration(self) -> f32 {
        match self {
            ConsumableKind::CoinMagnet => 15.0,
            ConsumableKind::Invincibility => 5.0,
            ConsumableKind::Score2x => 15.0,
            ConsumableKind::ExtraLife => 0.0,
        }
    }
}

/// An owned power-up, either in the inventory or active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub kind: ConsumableKind,
    pub duration: f32,
    time_active: f32,
    active: bool,
}

impl Consumable {
    pub fn new(kind: ConsumableKind) -> Self {
        Self::with_duration(kind, kind.default_duration())
    }

    pub fn with_duration(kind: ConsumableKind, duration: f32) -> Self {
        Self {
            kind,
            duration,
            time_active: 0.0,
            active: false,
        }
    }

    pub(crate) fn start(&mut self) {
        self.active = true;
        self.time_active = 0.0;
    }

    /// Restart the timer when the same kind is used again
    pub fn reset_time(&mut self) {
        self.time_active = 0.0;
    }

    /// Advance the timer, deactivating once the duration elapsed
    pub fn tick(&mut self, delta_time: f32) {
        if !self.active {
            return;
        }
        self.time_active += delta_time;
        if self.time_active >= self.duration {
            self.active = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds left before expiry
    pub fn remaining(&self) -> f32 {
        (self.duration - self.time_active).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_after_duration() {
        let mut c = Consumable::with_duration(ConsumableKind::Score2x, 1.0);
        c.start();
        c.tick(0.6);
        assert!(c.is_active());
        assert!((c.remaining() - 0.4).abs() < 1e-6);

        c.reset_time();
        c.tick(0.6);
        assert!(c.is_active());
        c.tick(0.5);
        assert!(!c.is_active());
    }

    #[test]
    fn test_inactive_does_not_tick() {
        let mut c = Consumable::new(ConsumableKind::CoinMagnet);
        c.tick(100.0);
        assert!(!c.is_active());
        assert_eq!(c.remaining(), 15.0);
    }
}
