//! Procedural track contents: obstacles, pickups and power-ups
//!
//! World space: x is lateral (lane offsets, center lane at 0), y is height
//! above the ground, z is distance along the track. The character sits at
//! `z = world_distance`.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use runner_sim::{ConsumableKind, LocomotionConfig, RayCaster, RayHit, TargetKind};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::WorldConfig;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box from a bottom-center point and its size
    pub fn from_base(base: Vec3, size: Vec3) -> Self {
        let half = Vec3::new(size.x * 0.5, 0.0, size.z * 0.5);
        Self {
            min: base - half,
            max: base + half + Vec3::Y * size.y,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }

    /// Slab test. Returns the entry distance along `direction`, or zero when
    /// `origin` starts inside the box.
    pub fn ray_intersect(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_range;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < f32::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// What occupies a slot on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum EntityKind {
    /// Knee-high, can be jumped over
    LowObstacle,
    /// Raised bar, can be slid under
    HighObstacle,
    /// Full-height block, only a lane change avoids it
    Block,
    /// Coin
    Pickup,
    /// Activates a consumable on contact
    PowerUp { kind: ConsumableKind },
}

impl EntityKind {
    pub fn target_kind(self) -> TargetKind {
        match self {
            EntityKind::Pickup | EntityKind::PowerUp { .. } => TargetKind::Pickup,
            _ => TargetKind::Obstacle,
        }
    }

    pub fn is_obstacle(self) -> bool {
        self.target_kind() == TargetKind::Obstacle
    }
}

/// A placed box
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u64,
    pub kind: EntityKind,
    pub lane: usize,
    pub bounds: Aabb,
    /// Obstacles register a single hit
    pub hit: bool,
}

/// Something the character touched this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Obstacle { id: u64, kind: EntityKind },
    Pickup { id: u64 },
    PowerUp { id: u64, kind: ConsumableKind },
}

/// Serializable view of an entity, used for state hashing
#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub id: u64,
    pub kind: EntityKind,
    pub lane: usize,
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub hit: bool,
}

/// Obstacle heights
const LOW_OBSTACLE_HEIGHT: f32 = 0.5;
const HIGH_OBSTACLE_BOTTOM: f32 = 0.9;
const HIGH_OBSTACLE_TOP: f32 = 2.5;
const BLOCK_HEIGHT: f32 = 2.5;

const POWERUP_KINDS: [ConsumableKind; 4] = [
    ConsumableKind::CoinMagnet,
    ConsumableKind::Invincibility,
    ConsumableKind::Score2x,
    ConsumableKind::ExtraLife,
];

/// Seeded procedural world
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    lane_count: usize,
    lane_spacing: f32,
    rng: StdRng,
    entities: Vec<Entity>,
    next_row: f32,
    next_id: u64,
}

impl World {
    pub fn new(config: WorldConfig, locomotion: &LocomotionConfig, seed: u64) -> Self {
        let next_row = config.safe_start;
        Self {
            config,
            lane_count: locomotion.lane_count,
            lane_spacing: locomotion.lane_spacing,
            rng: StdRng::seed_from_u64(seed),
            entities: Vec::new(),
            next_row,
            next_id: 0,
        }
    }

    /// Discard everything and regenerate from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.entities.clear();
        self.next_row = self.config.safe_start;
        self.next_id = 0;
    }

    /// Lateral position of a lane center
    pub fn lane_x(&self, lane: usize) -> f32 {
        let center = self.lane_count.saturating_sub(1) / 2;
        (lane as f32 - center as f32) * self.lane_spacing
    }

    /// Spawn rows ahead of `distance` and drop entities left behind
    pub fn advance(&mut self, distance: f32) {
        while self.next_row < distance + self.config.spawn_ahead {
            let z = self.next_row;
            self.spawn_row(z);
            self.next_row += self.config.row_spacing;
        }

        let cutoff = distance - self.config.cull_behind;
        self.entities.retain(|e| e.bounds.max.z >= cutoff);
    }

    fn spawn_row(&mut self, z: f32) {
        let mut lanes: Vec<usize> = (0..self.lane_count).collect();
        lanes.shuffle(&mut self.rng);

        // At least one lane always stays open
        let blocked = self.rng.gen_range(0..self.lane_count.max(1));
        for (slot, &lane) in lanes.iter().enumerate() {
            let kind = if slot < blocked {
                match self.rng.gen_range(0..3) {
                    0 => EntityKind::LowObstacle,
                    1 => EntityKind::HighObstacle,
                    _ => EntityKind::Block,
                }
            } else if self.rng.gen_bool(self.config.powerup_probability) {
                let kind = POWERUP_KINDS[self.rng.gen_range(0..POWERUP_KINDS.len())];
                EntityKind::PowerUp { kind }
            } else if self.rng.gen_bool(self.config.pickup_probability) {
                EntityKind::Pickup
            } else {
                continue;
            };
            self.place(kind, lane, z);
        }
    }

    /// Put an entity in `lane` at distance `z`
    pub fn place(&mut self, kind: EntityKind, lane: usize, z: f32) -> u64 {
        let x = self.lane_x(lane);
        let c = &self.config;
        let bounds = match kind {
            EntityKind::LowObstacle => Aabb::from_base(
                Vec3::new(x, 0.0, z),
                Vec3::new(c.obstacle_width, LOW_OBSTACLE_HEIGHT, c.obstacle_depth),
            ),
            EntityKind::HighObstacle => Aabb::from_base(
                Vec3::new(x, HIGH_OBSTACLE_BOTTOM, z),
                Vec3::new(
                    c.obstacle_width,
                    HIGH_OBSTACLE_TOP - HIGH_OBSTACLE_BOTTOM,
                    c.obstacle_depth,
                ),
            ),
            EntityKind::Block => Aabb::from_base(
                Vec3::new(x, 0.0, z),
                Vec3::new(c.obstacle_width, BLOCK_HEIGHT, c.obstacle_depth),
            ),
            EntityKind::Pickup | EntityKind::PowerUp { .. } => Aabb::from_base(
                Vec3::new(x, 0.25, z),
                Vec3::splat(c.pickup_size),
            ),
        };

        let id = self.next_id;
        self.next_id += 1;
        trace!(id, ?kind, lane, z, "Spawned");
        self.entities.push(Entity {
            id,
            kind,
            lane,
            bounds,
            hit: false,
        });
        id
    }

    /// Character collider at `position` (x lateral, y feet height, z distance)
    pub fn footprint(&self, position: Vec3, sliding: bool) -> Aabb {
        let height = if sliding {
            self.config.slide_height
        } else {
            self.config.character_height
        };
        Aabb::from_base(
            position,
            Vec3::new(
                self.config.character_half_width * 2.0,
                height,
                self.config.character_half_width * 2.0,
            ),
        )
    }

    /// Resolve contacts for one tick. Pickups and power-ups are removed,
    /// obstacles are marked so they register only once.
    ///
    /// With `magnet` set, pickups within the magnet radius are collected too.
    pub fn collide(&mut self, footprint: &Aabb, magnet: bool) -> Vec<Contact> {
        let center = footprint.center();
        let radius = self.config.magnet_radius;
        let mut contacts = Vec::new();

        self.entities.retain_mut(|entity| {
            let touching = footprint.overlaps(&entity.bounds);
            match entity.kind {
                EntityKind::Pickup => {
                    if touching || (magnet && entity.bounds.center().distance(center) <= radius) {
                        contacts.push(Contact::Pickup { id: entity.id });
                        return false;
                    }
                }
                EntityKind::PowerUp { kind } => {
                    if touching {
                        contacts.push(Contact::PowerUp {
                            id: entity.id,
                            kind,
                        });
                        return false;
                    }
                }
                kind => {
                    if touching && !entity.hit {
                        entity.hit = true;
                        contacts.push(Contact::Obstacle {
                            id: entity.id,
                            kind,
                        });
                    }
                }
            }
            true
        });

        contacts
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities
            .iter()
            .map(|e| EntitySnapshot {
                id: e.id,
                kind: e.kind,
                lane: e.lane,
                min: e.bounds.min.to_array(),
                max: e.bounds.max.to_array(),
                hit: e.hit,
            })
            .collect()
    }
}

impl RayCaster for World {
    fn cast(&self, origin: Vec3, direction: Vec3, max_range: f32) -> Option<RayHit> {
        self.entities
            .iter()
            .filter_map(|e| {
                e.bounds
                    .ray_intersect(origin, direction, max_range)
                    .map(|distance| RayHit {
                        distance,
                        kind: e.kind.target_kind(),
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
