//! Checkpoints and their trigger zones
//!
//! Checkpoints are authored once when the course is built and never change.
//! They are compared by id. Each one owns a trigger zone that fires the first
//! time the player passes through it and is consumed afterwards.

use serde::{Deserialize, Serialize};

use super::body::Pose;

/// Stable checkpoint identity (index into the course's track)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckpointId(pub u32);

/// A spatial marker with a respawn pose and a time budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    /// Where the player is placed on respawn
    pub respawn_pose: Pose,
    /// Seconds allowed to reach the next checkpoint
    pub time_limit: f32,
}

/// All checkpoints of a course, in authoring order
#[derive(Debug, Clone, Default)]
pub struct CheckpointTrack {
    checkpoints: Vec<Checkpoint>,
    /// Trigger zone still live (not yet passed)
    armed: Vec<bool>,
}

impl CheckpointTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a checkpoint and return its id
    pub fn push(&mut self, respawn_pose: Pose, time_limit: f32) -> CheckpointId {
        let id = CheckpointId(self.checkpoints.len() as u32);
        self.checkpoints.push(Checkpoint {
            id,
            respawn_pose,
            time_limit,
        });
        self.armed.push(true);
        id
    }

    pub fn get(&self, id: CheckpointId) -> Option<&Checkpoint> {
        self.checkpoints.get(id.0 as usize)
    }

    pub fn first(&self) -> Option<&Checkpoint> {
        self.checkpoints.first()
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Whether the checkpoint's trigger zone can still fire
    pub fn is_armed(&self, id: CheckpointId) -> bool {
        self.armed.get(id.0 as usize).copied().unwrap_or(false)
    }

    /// The player entered a checkpoint zone. Returns the id the first time only.
    pub fn pass_zone(&mut self, id: CheckpointId) -> Option<CheckpointId> {
        let armed = self.armed.get_mut(id.0 as usize)?;
        if !*armed {
            return None;
        }
        *armed = false;
        Some(id)
    }
}
