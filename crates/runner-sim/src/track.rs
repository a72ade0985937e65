//! Track advancement: world distance, speed curve and score

use tracing::{debug, info};

use crate::config::TrackConfig;

/// Read-only view of track advancement
///
/// The locomotion state machine samples this; it never mutates it.
pub trait TrackState {
    /// Total forward progress, monotonically increasing
    fn world_distance(&self) -> f32;
    /// Current forward speed, units/s
    fn speed(&self) -> f32;
    /// Speed normalized to `[0, 1]` between minimum and maximum speed
    fn speed_ratio(&self) -> f32;
    /// Whether the track is advancing this tick
    fn is_moving(&self) -> bool;
}

/// The running track for one character
#[derive(Debug, Clone)]
pub struct Track {
    config: TrackConfig,
    world_distance: f32,
    speed: f32,
    moving: bool,
    /// Seconds left on the start countdown; negative once started
    time_to_start: f32,
    score: u64,
    score_remainder: f32,
    multiplier: u32,
    rerun: bool,
}

impl Track {
    /// Create a stopped track at distance zero
    pub fn new(config: TrackConfig) -> Self {
        let speed = config.min_speed;
        Self {
            config,
            world_distance: 0.0,
            speed,
            moving: false,
            time_to_start: -1.0,
            score: 0,
            score_remainder: 0.0,
            multiplier: 1,
            rerun: false,
        }
    }

    /// Start a run. A rerun keeps distance, speed and score.
    pub fn begin(&mut self) {
        if !self.rerun {
            self.world_distance = 0.0;
            self.speed = self.config.min_speed;
            self.score = 0;
            self.score_remainder = 0.0;
            self.multiplier = 1;
        }
        self.moving = false;
        self.time_to_start = self.config.countdown;
        info!(
            rerun = self.rerun,
            distance = self.world_distance,
            "Track run beginning"
        );
    }

    /// Stop the run
    pub fn end(&mut self) {
        self.moving = false;
        self.time_to_start = -1.0;
    }

    /// Resume advancing
    pub fn start_move(&mut self) {
        self.moving = true;
    }

    /// Stop advancing; motions stall until movement resumes
    pub fn stop_move(&mut self) {
        self.moving = false;
    }

    /// Advance by `delta_time` seconds.
    ///
    /// `score_bonus` multiplies score gain on top of the speed multiplier.
    /// Returns true on the tick the start countdown completes.
    pub fn update(&mut self, delta_time: f32, score_bonus: u32) -> bool {
        if self.time_to_start >= 0.0 {
            self.time_to_start -= delta_time;
            if self.time_to_start < 0.0 {
                self.start_move();
                debug!("Countdown finished, track moving");
                return true;
            }
            return false;
        }

        if !self.moving {
            return false;
        }

        let scaled_speed = self.speed * delta_time;
        self.world_distance += scaled_speed;

        if self.speed < self.config.max_speed {
            self.speed = (self.speed + self.config.acceleration * delta_time)
                .min(self.config.max_speed);
        }

        self.multiplier =
            1 + (self.speed_ratio() * self.config.speed_step as f32).floor() as u32;

        self.score_remainder += scaled_speed * (self.multiplier * score_bonus.max(1)) as f32;
        let whole = self.score_remainder.floor();
        self.score += whole as u64;
        self.score_remainder -= whole;

        false
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Seconds left on the countdown, `None` once the run started
    pub fn time_to_start(&self) -> Option<f32> {
        (self.time_to_start >= 0.0).then_some(self.time_to_start)
    }

    pub fn is_rerun(&self) -> bool {
        self.rerun
    }

    pub fn set_rerun(&mut self, rerun: bool) {
        self.rerun = rerun;
    }
}

impl TrackState for Track {
    fn world_distance(&self) -> f32 {
        self.world_distance
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn speed_ratio(&self) -> f32 {
        let span = self.config.max_speed - self.config.min_speed;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.speed - self.config.min_speed) / span).clamp(0.0, 1.0)
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

/// Track with directly assigned values, for driving the state machine by hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTrack {
    pub world_distance: f32,
    pub speed: f32,
    pub speed_ratio: f32,
    pub moving: bool,
}

impl Default for FixedTrack {
    fn default() -> Self {
        Self {
            world_distance: 0.0,
            speed: 5.0,
            speed_ratio: 0.0,
            moving: true,
        }
    }
}

impl TrackState for FixedTrack {
    fn world_distance(&self) -> f32 {
        self.world_distance
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_then_moves() {
        let mut track = Track::new(TrackConfig::default());
        track.begin();
        assert!(!track.is_moving());
        assert_eq!(track.time_to_start(), Some(3.0));

        assert!(!track.update(2.0, 1));
        assert!(track.update(1.5, 1));
        assert!(track.is_moving());
        assert_eq!(track.time_to_start(), None);

        track.update(1.0, 1);
        assert!((track.world_distance() - 5.0).abs() < 1e-5);
        assert!(track.speed() > 5.0);
    }

    #[test]
    fn test_speed_ratio_and_multiplier() {
        let mut track = Track::new(TrackConfig {
            acceleration: 100.0,
            countdown: 0.0,
            ..Default::default()
        });
        track.begin();
        track.update(0.01, 1);
        track.update(1.0, 1);

        assert_eq!(track.speed(), 10.0);
        assert_eq!(track.speed_ratio(), 1.0);
        assert_eq!(track.multiplier(), 5);
    }

    #[test]
    fn test_stopped_track_does_not_advance() {
        let mut track = Track::new(TrackConfig {
            countdown: 0.0,
            ..Default::default()
        });
        track.begin();
        track.update(0.01, 1);
        track.stop_move();
        track.update(1.0, 1);
        assert_eq!(track.world_distance(), 0.0);
        assert_eq!(track.score(), 0);
    }

    #[test]
    fn test_rerun_keeps_progress() {
        let mut track = Track::new(TrackConfig {
            countdown: 0.0,
            ..Default::default()
        });
        track.begin();
        track.update(0.01, 1);
        track.update(2.0, 2);
        let distance = track.world_distance();
        let score = track.score();
        assert!(score >= 20);

        track.set_rerun(true);
        track.begin();
        assert_eq!(track.world_distance(), distance);
        assert_eq!(track.score(), score);

        track.set_rerun(false);
        track.begin();
        assert_eq!(track.world_distance(), 0.0);
        assert_eq!(track.score(), 0);
    }
}
