//! Pooled hazard spawner
//!
//! Hazards live in a fixed arena of slots owned by their spawner. Free slots
//! are tracked by index; growing the pool appends a slot. A hazard is either in
//! the free list or active in the world, never both, and only its spawner
//! moves it between the two.

use std::collections::VecDeque;

use glam::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::body::{Pose, RigidBody, SimpleBody};
use super::gating::{CheckpointGated, CheckpointGating};
use super::question::QuestionDisplay;
use super::schedule::{TaskId, TaskQueue};
use crate::config::SpawnerConfig;
use crate::sample_range;

/// Spawner identity within a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnerId(pub usize);

/// Hazard slot index within its spawner's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HazardId(pub usize);

/// Why a hazard went back to the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetireReason {
    /// Lived for its full lifetime
    Expired,
    /// Dropped too far below its spawner
    Fell,
}

/// Spawner-level notifications
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardEvent {
    Released { hazard: HazardId, position: Vec3 },
    Retired { hazard: HazardId, reason: RetireReason },
}

/// A pooled hazard (rolling ball, falling rock, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
///
/// Pool membership is owned by the spawner; outside code only gets the body.
pub struct Hazard {
    id: HazardId,
    origin: SpawnerId,
    active: bool,
    /// Seconds since release
    age: f32,
    /// Spawner height at release, for the despawn depth check
    spawn_height: f32,
    body: SimpleBody,
}

impl Hazard {
    pub fn id(&self) -> HazardId {
        self.id
    }

    pub fn origin(&self) -> SpawnerId {
        self.origin
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn spawn_height(&self) -> f32 {
        self.spawn_height
    }

    pub fn body(&self) -> &SimpleBody {
        &self.body
    }
}

#[derive(Debug, Clone, Copy)]
enum SpawnTask {
    Release,
}

/// Timed hazard release from a reusable pool
#[derive(Debug)]
pub struct HazardSpawner {
    id: SpawnerId,
    gating: CheckpointGating,
    origin: Vec3,
    half_width: f32,
    min_spawn_time: f32,
    max_spawn_time: f32,
    min_height_offset: f32,
    max_height_offset: f32,
    can_grow: bool,
    lifetime: f32,
    despawn_depth: f32,
    forward_force: f32,

    slots: Vec<Hazard>,
    free: VecDeque<usize>,

    spawning: bool,
    clock: f64,
    tasks: TaskQueue<SpawnTask>,
    pending: Option<TaskId>,
    events: Vec<HazardEvent>,
}

impl HazardSpawner {
    pub fn new(id: SpawnerId, config: &SpawnerConfig, gating: CheckpointGating) -> Self {
        let mut spawner = Self {
            id,
            spawning: gating.active_by_default,
            gating,
            origin: config.position,
            half_width: config.footprint_width * config.horizontal_range_multiplier * 0.5,
            min_spawn_time: config.min_spawn_time,
            max_spawn_time: config.max_spawn_time,
            min_height_offset: config.min_height_offset,
            max_height_offset: config.max_height_offset,
            can_grow: config.can_grow,
            lifetime: config.lifetime,
            despawn_depth: config.despawn_depth,
            forward_force: config.forward_force,
            slots: Vec::with_capacity(config.pool_size),
            free: VecDeque::with_capacity(config.pool_size),
            clock: 0.0,
            tasks: TaskQueue::new(),
            pending: None,
            events: Vec::new(),
        };

        for _ in 0..config.pool_size {
            let slot = spawner.push_slot();
            spawner.free.push_back(slot);
        }
        if config.pool_size == 0 && !config.can_grow {
            log::warn!("Spawner {} has an empty pool and cannot grow", id.0);
        }

        spawner
    }

    fn push_slot(&mut self) -> usize {
        let index = self.slots.len();
        self.slots.push(Hazard {
            id: HazardId(index),
            origin: self.id,
            active: false,
            age: 0.0,
            spawn_height: self.origin.y,
            body: SimpleBody::default(),
        });
        index
    }

    pub fn id(&self) -> SpawnerId {
        self.id
    }

    /// Begin the periodic release loop
    pub fn start_spawning(&mut self) {
        if self.spawning {
            return;
        }
        self.spawning = true;
        log::info!("Spawner {} started", self.id.0);
    }

    /// Stop the release loop, cancelling any pending release
    pub fn stop_spawning(&mut self) {
        if let Some(task) = self.pending.take() {
            self.tasks.cancel(task);
        }
        if self.spawning {
            self.spawning = false;
            log::info!("Spawner {} stopped", self.id.0);
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// When the next periodic release is due, if one is scheduled
    pub fn next_release_at(&self) -> Option<f64> {
        self.pending.and(self.tasks.next_deadline())
    }

    /// Advance hazards and the release loop by `dt` seconds
    pub fn tick(&mut self, dt: f32, rng: &mut dyn RngCore) {
        self.clock += f64::from(dt);

        let push = Vec3::new(0.0, 0.0, -self.forward_force);
        for index in 0..self.slots.len() {
            let hazard = &mut self.slots[index];
            if !hazard.active {
                continue;
            }
            hazard.age += dt;
            hazard.body.apply_force(push);

            let dropped = hazard.spawn_height - hazard.body.pose.position.y;
            let age = hazard.age;
            if dropped > self.despawn_depth {
                self.retire(HazardId(index), RetireReason::Fell);
            } else if age >= self.lifetime {
                self.retire(HazardId(index), RetireReason::Expired);
            }
        }

        if !self.spawning {
            return;
        }
        // One release per tick at most, even with a zero delay
        if let Some(SpawnTask::Release) = self.tasks.pop_due(self.clock) {
            self.pending = None;
            self.release(rng);
        }
        if self.pending.is_none() {
            let delay = sample_range(rng, self.min_spawn_time, self.max_spawn_time);
            self.pending = Some(
                self.tasks
                    .schedule(self.clock + f64::from(delay), SpawnTask::Release),
            );
        }
    }

    /// Release one hazard right away, outside the periodic loop
    pub fn release_now(&mut self, rng: &mut dyn RngCore) -> Option<HazardId> {
        self.release(rng)
    }

    fn release(&mut self, rng: &mut dyn RngCore) -> Option<HazardId> {
        let Some(index) = self.acquire() else {
            log::debug!("Spawner {} pool exhausted, skipping release", self.id.0);
            return None;
        };

        let position = self.sample_position(rng);
        let hazard = &mut self.slots[index];
        hazard.body.halt();
        hazard.body.force = Vec3::ZERO;
        hazard.body.torque = Vec3::ZERO;
        hazard.body.set_kinematic(false);
        hazard.body.set_pose(Pose::at(position));
        hazard.age = 0.0;
        hazard.spawn_height = self.origin.y;
        hazard.active = true;

        self.events.push(HazardEvent::Released {
            hazard: hazard.id,
            position,
        });
        Some(hazard.id)
    }

    fn acquire(&mut self) -> Option<usize> {
        if let Some(index) = self.free.pop_front() {
            return Some(index);
        }
        if self.can_grow {
            return Some(self.push_slot());
        }
        None
    }

    fn sample_position(&self, rng: &mut dyn RngCore) -> Vec3 {
        let x = sample_range(
            rng,
            self.origin.x - self.half_width,
            self.origin.x + self.half_width,
        );
        let y = self.origin.y + sample_range(rng, self.min_height_offset, self.max_height_offset);
        Vec3::new(x, y, self.origin.z)
    }

    /// Return an active hazard to the pool. Returns false if it was not active.
    pub fn retire(&mut self, id: HazardId, reason: RetireReason) -> bool {
        let Some(hazard) = self.slots.get_mut(id.0) else {
            return false;
        };
        if !hazard.active {
            return false;
        }

        hazard.body.halt();
        hazard.body.force = Vec3::ZERO;
        hazard.body.torque = Vec3::ZERO;
        hazard.active = false;
        self.free.push_back(id.0);
        self.events.push(HazardEvent::Retired { hazard: id, reason });
        true
    }

    pub fn hazard(&self, id: HazardId) -> Option<&Hazard> {
        self.slots.get(id.0)
    }

    /// Body of a released hazard, for syncing the physics engine's state.
    /// `None` for pooled or unknown ids.
    pub fn body_mut(&mut self, id: HazardId) -> Option<&mut SimpleBody> {
        self.slots
            .get_mut(id.0)
            .filter(|h| h.active)
            .map(|h| &mut h.body)
    }

    pub fn active_hazards(&self) -> impl Iterator<Item = &Hazard> {
        self.slots.iter().filter(|h| h.active)
    }

    pub fn active_bodies_mut(&mut self) -> impl Iterator<Item = &mut SimpleBody> {
        self.slots
            .iter_mut()
            .filter(|h| h.active)
            .map(|h| &mut h.body)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|h| h.active).count()
    }

    /// Pooled hazards ready for release
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total slots in the arena
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_pooled(&self, id: HazardId) -> bool {
        self.free.contains(&id.0)
    }

    pub fn drain_events(&mut self) -> Vec<HazardEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CheckpointGated for HazardSpawner {
    fn gating(&self) -> &CheckpointGating {
        &self.gating
    }

    fn is_active(&self) -> bool {
        self.spawning
    }

    fn activate(&mut self, _display: &mut dyn QuestionDisplay) {
        self.start_spawning();
    }

    fn deactivate(&mut self, _display: &mut dyn QuestionDisplay) {
        self.stop_spawning();
    }
}
