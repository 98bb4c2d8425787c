//! Progression coordinator
//!
//! Single owner of the current checkpoint, the checkpoint countdown, fall
//! detection and the respawn sequence. Other components only read its state or
//! go through [`ProgressionCoordinator::set_checkpoint`] and
//! [`ProgressionCoordinator::request_respawn`].
//!
//! Checkpoint-changed notifications are queued as [`ProgressionEvent`]s; the
//! course drains and delivers them before the triggering call returns.

use serde::{Deserialize, Serialize};

use super::body::{Motion, RigidBody};
use super::checkpoint::{Checkpoint, CheckpointId, CheckpointTrack};
use super::schedule::TaskQueue;
use crate::config::ProgressionConfig;

/// Respawn sequence state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RespawnState {
    /// No respawn in flight
    Idle,
    /// Player is being stopped and teleported
    Freezing,
    /// Player held kinematic at the respawn pose until `resume_at`
    Settling { resume_at: f64, frozen: Motion },
    /// Physics and timer being restored
    Resuming,
}

/// Why a respawn started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnCause {
    /// Checkpoint countdown reached zero
    TimeUp,
    /// Player dropped below the fall threshold
    Fell,
    /// Explicit request (trap, wrong gate, ...)
    Requested,
}

/// Notifications produced by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProgressionEvent {
    CheckpointChanged(CheckpointId),
    RespawnStarted {
        checkpoint: CheckpointId,
        cause: RespawnCause,
    },
    RespawnFinished(CheckpointId),
}

#[derive(Debug, Clone, Copy)]
enum RespawnStep {
    Resume,
}

/// Checkpoint/timer/respawn state machine
#[derive(Debug)]
pub struct ProgressionCoordinator<B: RigidBody> {
    player: Option<B>,
    track: CheckpointTrack,
    fall_threshold: f32,
    settle_secs: f32,
    current: Option<CheckpointId>,
    remaining_time: f32,
    timer_running: bool,
    respawn: RespawnState,
    /// Seconds of simulation seen by this coordinator
    clock: f64,
    tasks: TaskQueue<RespawnStep>,
    events: Vec<ProgressionEvent>,
}

impl<B: RigidBody> ProgressionCoordinator<B> {
    pub fn new(player: Option<B>, track: CheckpointTrack, config: &ProgressionConfig) -> Self {
        if player.is_none() {
            log::warn!("No player body configured - progression disabled");
        }
        if track.is_empty() {
            log::warn!("No checkpoints configured - timer and respawn disabled");
        }

        Self {
            player,
            track,
            fall_threshold: config.fall_threshold,
            settle_secs: config.respawn_settle_secs.max(0.0),
            current: None,
            remaining_time: 0.0,
            timer_running: false,
            respawn: RespawnState::Idle,
            clock: 0.0,
            tasks: TaskQueue::new(),
            events: Vec::new(),
        }
    }

    /// No player to drive: every operation is a no-op
    pub fn is_inert(&self) -> bool {
        self.player.is_none()
    }

    /// Make `id` the current checkpoint. Returns true if it changed (and a
    /// notification was queued).
    pub fn set_checkpoint(&mut self, id: CheckpointId) -> bool {
        if self.is_inert() {
            log::debug!("Ignoring checkpoint {:?}: no player", id);
            return false;
        }
        let Some(checkpoint) = self.track.get(id) else {
            log::warn!("Unknown checkpoint {:?}", id);
            return false;
        };
        if self.current == Some(id) {
            return false;
        }

        self.current = Some(id);
        self.remaining_time = checkpoint.time_limit;
        // The resume step restarts the timer if a respawn is in flight
        self.timer_running = !self.is_respawning();
        log::info!("Checkpoint {} reached ({:.1}s)", id.0, self.remaining_time);
        self.events.push(ProgressionEvent::CheckpointChanged(id));
        true
    }

    /// The player entered a checkpoint's trigger zone
    pub fn pass_checkpoint_zone(&mut self, id: CheckpointId) -> bool {
        if self.is_inert() {
            return false;
        }
        match self.track.pass_zone(id) {
            Some(id) => self.set_checkpoint(id),
            None => false,
        }
    }

    /// Advance timers by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.is_inert() {
            return;
        }
        self.clock += f64::from(dt);

        if let Some(RespawnStep::Resume) = self.tasks.pop_due(self.clock) {
            self.finish_respawn();
            return;
        }
        if self.is_respawning() {
            return;
        }

        if self.timer_running {
            self.remaining_time -= dt;
            if self.remaining_time <= 0.0 {
                self.remaining_time = 0.0;
                self.begin_respawn(RespawnCause::TimeUp);
            }
        }

        let fell = self
            .player
            .as_ref()
            .is_some_and(|p| p.pose().position.y < self.fall_threshold);
        if fell {
            self.begin_respawn(RespawnCause::Fell);
        }
    }

    /// Send the player back to the current checkpoint. Returns true if a new
    /// respawn sequence started.
    pub fn request_respawn(&mut self) -> bool {
        self.begin_respawn(RespawnCause::Requested)
    }

    fn begin_respawn(&mut self, cause: RespawnCause) -> bool {
        if self.is_respawning() {
            log::debug!("Respawn already in flight, ignoring {:?}", cause);
            return false;
        }
        let Some(id) = self.current else {
            return false;
        };
        let Some(pose) = self.track.get(id).map(|c| c.respawn_pose) else {
            return false;
        };
        let Some(player) = self.player.as_mut() else {
            return false;
        };

        self.respawn = RespawnState::Freezing;
        self.timer_running = false;

        let frozen = player.motion();
        player.halt();
        player.set_kinematic(true);
        player.set_pose(pose);

        let resume_at = self.clock + f64::from(self.settle_secs);
        self.tasks.schedule(resume_at, RespawnStep::Resume);
        self.respawn = RespawnState::Settling { resume_at, frozen };

        log::info!("Respawning at checkpoint {} ({:?})", id.0, cause);
        self.events.push(ProgressionEvent::RespawnStarted {
            checkpoint: id,
            cause,
        });
        true
    }

    fn finish_respawn(&mut self) {
        self.respawn = RespawnState::Resuming;

        if let Some(player) = self.player.as_mut() {
            player.set_kinematic(false);
        }

        if let Some(id) = self.current {
            self.remaining_time = self.track.get(id).map_or(0.0, |c| c.time_limit);
            self.timer_running = true;
            self.respawn = RespawnState::Idle;
            log::info!("Respawn finished at checkpoint {}", id.0);
            self.events.push(ProgressionEvent::RespawnFinished(id));
            // Forced re-broadcast of the same checkpoint so gated systems re-derive state
            self.events.push(ProgressionEvent::CheckpointChanged(id));
        } else {
            self.respawn = RespawnState::Idle;
        }
    }

    /// Take queued notifications in emission order
    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn current_checkpoint(&self) -> Option<&Checkpoint> {
        self.current.and_then(|id| self.track.get(id))
    }

    pub fn current_checkpoint_id(&self) -> Option<CheckpointId> {
        self.current
    }

    pub fn remaining_time(&self) -> f32 {
        self.remaining_time
    }

    /// Countdown as whole seconds for a HUD
    pub fn remaining_seconds(&self) -> u32 {
        crate::ceil_seconds(self.remaining_time)
    }

    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn != RespawnState::Idle
    }

    pub fn respawn_state(&self) -> RespawnState {
        self.respawn
    }

    pub fn track(&self) -> &CheckpointTrack {
        &self.track
    }

    pub fn player(&self) -> Option<&B> {
        self.player.as_ref()
    }

    /// Mutable player access for the vehicle mover / physics sync
    pub fn player_mut(&mut self) -> Option<&mut B> {
        self.player.as_mut()
    }
}
