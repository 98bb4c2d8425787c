//! Checkpoint-gated activation
//!
//! Hazard spawners, moving obstacles and gate chains all switch on and off as
//! the player crosses checkpoints. The membership rule lives here once;
//! consumers implement [`CheckpointGated`] and get the reaction for free.

use serde::{Deserialize, Serialize};

use super::checkpoint::CheckpointId;
use super::question::QuestionDisplay;

/// What a gated consumer should do for a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateResponse {
    Activate,
    Deactivate,
    Ignore,
}

/// Start/end checkpoint sets and the state before any notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointGating {
    pub start: Vec<CheckpointId>,
    pub end: Vec<CheckpointId>,
    pub active_by_default: bool,
}

impl CheckpointGating {
    pub fn new(start: Vec<CheckpointId>, end: Vec<CheckpointId>, active_by_default: bool) -> Self {
        Self {
            start,
            end,
            active_by_default,
        }
    }

    /// Start-set membership wins when a checkpoint is in both sets
    pub fn respond(&self, checkpoint: CheckpointId) -> GateResponse {
        if self.start.contains(&checkpoint) {
            GateResponse::Activate
        } else if self.end.contains(&checkpoint) {
            GateResponse::Deactivate
        } else {
            GateResponse::Ignore
        }
    }

    /// Every checkpoint referenced by either set
    pub fn referenced(&self) -> impl Iterator<Item = CheckpointId> + '_ {
        self.start.iter().chain(self.end.iter()).copied()
    }
}

/// A component that turns on/off with checkpoint changes
pub trait CheckpointGated {
    fn gating(&self) -> &CheckpointGating;

    fn is_active(&self) -> bool;

    fn activate(&mut self, display: &mut dyn QuestionDisplay);

    fn deactivate(&mut self, display: &mut dyn QuestionDisplay);

    /// React to a checkpoint-changed notification
    fn on_checkpoint_changed(
        &mut self,
        checkpoint: CheckpointId,
        display: &mut dyn QuestionDisplay,
    ) -> GateResponse {
        let response = self.gating().respond(checkpoint);
        match response {
            GateResponse::Activate => self.activate(display),
            GateResponse::Deactivate => self.deactivate(display),
            GateResponse::Ignore => {}
        }
        response
    }
}
