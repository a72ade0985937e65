//! Directional distance probes and their normalization into features
//!
//! Each probe yields a scalar in `[0, 1]`: 1.0 when nothing is within range
//! or when the hit is a pickup, `(range - distance) / range` for anything
//! else. Unknown target kinds are obstacles.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{ObservationMode, PerceptionConfig};

/// Fixed-order probe results
pub type FeatureVector = Vec<f32>;

/// What a probe ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Pickup,
    Obstacle,
}

impl TargetKind {
    /// Classify a collider tag; anything unrecognized is an obstacle
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "pickup" | "coin" | "fish" | "premium" => TargetKind::Pickup,
            _ => TargetKind::Obstacle,
        }
    }
}

/// Result of a single ray cast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Distance along the ray to the hit
    pub distance: f32,
    pub kind: TargetKind,
}

/// World ray query
pub trait RayCaster {
    /// Cast from `origin` along normalized `direction`, up to `max_range`
    fn cast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<RayHit>;
}

impl<F> RayCaster for F
where
    F: Fn(Vec3, Vec3, f32) -> Option<RayHit>,
{
    fn cast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<RayHit> {
        self(origin, direction, max_range)
    }
}

/// Normalize one probe result into a feature value
pub fn normalize_hit(hit: Option<RayHit>, max_range: f32) -> f32 {
    match hit {
        None => 1.0,
        Some(RayHit {
            kind: TargetKind::Pickup,
            ..
        }) => 1.0,
        Some(RayHit { distance, .. }) => ((max_range - distance) / max_range).clamp(0.0, 1.0),
    }
}

/// Cast parallel rays from a grid of lateral positions and heights.
///
/// Rays start at `(lateral, origin.y + height, origin.z)` and travel along
/// `forward`. Results are ordered height-major: every lateral offset at the
/// first height, then every lateral offset at the next.
pub fn probe(
    caster: &dyn RayCaster,
    origin: Vec3,
    lateral_offsets: &[f32],
    heights: &[f32],
    forward: Vec3,
    max_range: f32,
) -> FeatureVector {
    let direction = forward.normalize_or_zero();
    heights
        .iter()
        .flat_map(|&height| {
            lateral_offsets.iter().map(move |&lateral| {
                let start = Vec3::new(lateral, origin.y + height, origin.z);
                normalize_hit(caster.cast(start, direction, max_range), max_range)
            })
        })
        .collect()
}

/// Direction of an angled probe; 90 degrees is straight ahead (+z), 0 is +x
pub fn ray_direction(angle_degrees: f32, range: f32, start_height: f32, end_height: f32) -> Vec3 {
    let radians = angle_degrees.to_radians();
    let end = Vec3::new(radians.cos() * range, end_height - start_height, radians.sin() * range);
    end.normalize_or_zero()
}

/// The agent's probe battery
#[derive(Debug, Clone)]
pub struct RayPerception {
    config: PerceptionConfig,
}

impl RayPerception {
    pub fn new(config: PerceptionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn set_mode(&mut self, mode: ObservationMode) {
        self.config.mode = mode;
    }

    /// Angled rays from one start height, one value per configured angle
    pub fn perceive(&self, caster: &dyn RayCaster, origin: Vec3, height: f32) -> FeatureVector {
        let range = self.config.range;
        let start = origin + Vec3::Y * height;
        self.config
            .angles
            .iter()
            .map(|&angle| {
                let direction = ray_direction(angle, range, height, self.config.end_height);
                normalize_hit(caster.cast(start, direction, range), range)
            })
            .collect()
    }

    /// Angled battery: low-height results then high-height results
    pub fn angled_features(&self, caster: &dyn RayCaster, origin: Vec3) -> FeatureVector {
        let mut features = self.perceive(caster, origin, self.config.low_height);
        features.extend(self.perceive(caster, origin, self.config.high_height));
        features
    }

    /// Parallel battery straight ahead from the configured lane positions
    pub fn lane_features(&self, caster: &dyn RayCaster, origin: Vec3) -> FeatureVector {
        probe(
            caster,
            origin,
            &self.config.lane_offsets,
            &[self.config.lane_low_height, self.config.lane_high_height],
            Vec3::Z,
            self.config.range,
        )
    }

    /// Observation vector in the active mode
    pub fn collect(&self, caster: &dyn RayCaster, origin: Vec3) -> FeatureVector {
        match self.config.mode {
            ObservationMode::Angled => self.angled_features(caster, origin),
            ObservationMode::Lanes => self.lane_features(caster, origin),
        }
    }
}
