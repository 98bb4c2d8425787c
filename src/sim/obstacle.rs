//! Checkpoint-gated moving obstacle
//!
//! Slides along world X around its start position while active.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::gating::{CheckpointGated, CheckpointGating};
use super::question::QuestionDisplay;
use crate::config::ObstacleConfig;
use crate::consts::OBSTACLE_ARRIVE_EPSILON;

/// Obstacle identity within a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub usize);

/// Movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleMotion {
    /// Sinusoidal offset, `multiplier` scales the angular rate
    Smooth { multiplier: f32 },
    /// Constant-speed back-and-forth between the two extremes
    Linear,
}

#[derive(Debug, Clone)]
pub struct MovingObstacle {
    id: ObstacleId,
    gating: CheckpointGating,
    motion: ObstacleMotion,
    start: Vec3,
    position: Vec3,
    speed: f32,
    distance: f32,
    moving_right: bool,
    elapsed: f32,
    moving: bool,
}

impl MovingObstacle {
    pub fn new(id: ObstacleId, config: &ObstacleConfig, gating: CheckpointGating) -> Self {
        Self {
            id,
            moving: gating.active_by_default,
            gating,
            motion: config.motion,
            start: config.position,
            position: config.position,
            speed: config.move_speed,
            distance: config.move_distance,
            moving_right: config.start_moving_right,
            elapsed: 0.0,
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn start_moving(&mut self) {
        self.moving = true;
    }

    pub fn stop_moving(&mut self) {
        self.moving = false;
    }

    pub fn tick(&mut self, dt: f32) {
        if !self.moving {
            return;
        }

        match self.motion {
            ObstacleMotion::Smooth { multiplier } => {
                self.elapsed += dt;
                let offset = (self.elapsed * self.speed * multiplier).sin() * self.distance;
                self.position = self.start + Vec3::X * offset;
            }
            ObstacleMotion::Linear => {
                let direction = if self.moving_right { 1.0 } else { -1.0 };
                let target = self.start + Vec3::X * (self.distance * direction);

                let to_target = target - self.position;
                let step = self.speed * dt;
                let remaining = to_target.length();
                self.position = if remaining <= step || remaining == 0.0 {
                    target
                } else {
                    self.position + to_target / remaining * step
                };

                if self.position.distance(target) < OBSTACLE_ARRIVE_EPSILON {
                    self.moving_right = !self.moving_right;
                }
            }
        }
    }
}

impl CheckpointGated for MovingObstacle {
    fn gating(&self) -> &CheckpointGating {
        &self.gating
    }

    fn is_active(&self) -> bool {
        self.moving
    }

    fn activate(&mut self, _display: &mut dyn QuestionDisplay) {
        self.start_moving();
    }

    fn deactivate(&mut self, _display: &mut dyn QuestionDisplay) {
        self.stop_moving();
    }
}
