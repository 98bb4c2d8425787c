//! Branching quiz gate chain
//!
//! A chain owns a row of gate pairs that ride a conveyor from `slope_start`
//! towards `slope_end`. Each pair is bound to a question; the player answers by
//! driving through the left (option A) or right (option B) door. Pairs that
//! run off the end are recycled to the back of the row with a fresh question.
//!
//! Only one pair at a time owns the on-screen prompt. Frame triggers report
//! enter/exit; an exit only clears the prompt if the exiting pair still owns
//! it, so overlapping frames can't erase a newer pair's question.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::gating::{CheckpointGated, CheckpointGating};
use super::question::{QuestionBank, QuestionContent, QuestionDisplay, Side};
use crate::config::GateChainConfig;
use crate::consts::{EXTRA_GATE_PAIRS, MAX_GATE_PAIRS};

/// Chain identity within a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub usize);

/// Gate pair identity within its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub usize);

/// Chain lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainState {
    /// Gates hidden and still
    Dormant,
    /// Start checkpoint reached, waiting for `activate_chain`
    Armed,
    /// Gates visible and moving
    Running,
}

/// Result of driving through a door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceOutcome {
    /// Pair answered and removed from play
    Correct,
    /// Duplicate entry into an answered pair's correct door
    AlreadyAnswered,
    /// Wrong door: caller must request a respawn
    Incorrect,
    /// Unknown pair or inactive frame
    Ignored,
}

/// One door of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub correct: bool,
}

/// Two doors in one frame, bound to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePair {
    pub id: PairId,
    pub frame_position: Vec3,
    pub frame_rotation: Quat,
    pub left: Choice,
    pub right: Choice,
    pub question: QuestionContent,
    pub answered: bool,
    /// Frame visible and collidable
    pub frame_active: bool,
}

impl GatePair {
    fn bind(&mut self, question: QuestionContent) {
        self.left = Choice {
            correct: question.correct_is_a,
        };
        self.right = Choice {
            correct: !question.correct_is_a,
        };
        self.question = question;
        self.answered = false;
    }

    pub fn choice(&self, side: Side) -> Choice {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Notifications produced by a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEvent {
    StateChanged(ChainState),
    Answered(PairId),
    Missed(PairId),
    Recycled(PairId),
}

#[derive(Debug)]
pub struct GateChain {
    id: ChainId,
    gating: CheckpointGating,
    state: ChainState,
    bank: QuestionBank,
    slope_start: Vec3,
    direction: Vec3,
    length: f32,
    spacing: f32,
    speed: f32,
    pairs: Vec<GatePair>,
    /// Pair whose frame currently holds the player
    occupant: Option<PairId>,
    events: Vec<GateEvent>,
}

impl GateChain {
    pub fn new(
        id: ChainId,
        config: &GateChainConfig,
        gating: CheckpointGating,
        bank: QuestionBank,
    ) -> Self {
        let segment = config.slope_end - config.slope_start;
        let mut chain = Self {
            id,
            state: if gating.active_by_default {
                ChainState::Armed
            } else {
                ChainState::Dormant
            },
            gating,
            bank,
            slope_start: config.slope_start,
            direction: segment.normalize_or_zero(),
            length: segment.length(),
            spacing: config.spacing,
            speed: config.movement_speed,
            pairs: Vec::new(),
            occupant: None,
            events: Vec::new(),
        };
        chain.pre_spawn();
        chain
    }

    fn pre_spawn(&mut self) {
        if self.bank.is_empty() {
            log::warn!("Gate chain {} has an empty question bank - no gates", self.id.0);
            return;
        }
        if self.direction == Vec3::ZERO || !self.spacing.is_finite() || self.spacing <= 0.0 {
            log::warn!(
                "Gate chain {} has a degenerate segment (length {}, spacing {}) - no gates",
                self.id.0,
                self.length,
                self.spacing
            );
            return;
        }

        let needed = (self.length / self.spacing).ceil() + EXTRA_GATE_PAIRS as f32;
        if !needed.is_finite() || needed > MAX_GATE_PAIRS as f32 {
            log::warn!(
                "Gate chain {} needs {} gate pairs, max is {} - no gates",
                self.id.0,
                needed,
                MAX_GATE_PAIRS
            );
            return;
        }

        let count = needed as usize;
        let rotation = self.facing();
        for i in 0..count {
            let Some(question) = self.bank.next_question() else {
                break;
            };
            let mut pair = GatePair {
                id: PairId(i),
                frame_position: self.slope_start + self.direction * (i as f32 * self.spacing),
                frame_rotation: rotation,
                left: Choice { correct: false },
                right: Choice { correct: false },
                question: question.clone(),
                answered: false,
                frame_active: false,
            };
            pair.bind(question);
            self.pairs.push(pair);
        }
    }

    /// Frames face back up the slope, towards the oncoming player
    fn facing(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Z, -self.direction)
    }

    fn distance_along(&self, point: Vec3) -> f32 {
        (point - self.slope_start).dot(self.direction)
    }

    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn pairs(&self) -> &[GatePair] {
        &self.pairs
    }

    pub fn pair(&self, id: PairId) -> Option<&GatePair> {
        self.pairs.get(id.0)
    }

    /// Pair currently owning the prompt
    pub fn occupant(&self) -> Option<PairId> {
        self.occupant
    }

    fn set_state(&mut self, state: ChainState) {
        if self.state != state {
            self.state = state;
            self.events.push(GateEvent::StateChanged(state));
        }
    }

    /// Start checkpoint reached. A running chain keeps running.
    pub fn arm(&mut self) {
        if self.state == ChainState::Dormant {
            log::info!("Gate chain {} armed", self.id.0);
            self.set_state(ChainState::Armed);
        }
    }

    /// Show the gates and start the conveyor. Only valid once armed.
    pub fn activate_chain(&mut self) -> bool {
        if self.state != ChainState::Armed {
            log::debug!("Gate chain {} not armed ({:?})", self.id.0, self.state);
            return false;
        }
        for pair in &mut self.pairs {
            pair.frame_active = true;
        }
        log::info!("Gate chain {} running", self.id.0);
        self.set_state(ChainState::Running);
        true
    }

    /// Hide every gate, stop moving and drop the prompt
    pub fn deactivate_chain(&mut self, display: &mut dyn QuestionDisplay) {
        self.occupant = None;
        for pair in &mut self.pairs {
            pair.frame_active = false;
        }
        display.hide();
        if self.state != ChainState::Dormant {
            log::info!("Gate chain {} dormant", self.id.0);
        }
        self.set_state(ChainState::Dormant);
    }

    /// The player entered a pair's frame trigger
    pub fn set_current_question(&mut self, id: PairId, display: &mut dyn QuestionDisplay) {
        let Some(pair) = self.pairs.get(id.0) else {
            return;
        };
        if !pair.frame_active || self.occupant == Some(id) {
            return;
        }

        self.occupant = Some(id);
        if !pair.answered {
            display.show_question(&pair.question);
        }
    }

    /// The player left a pair's frame trigger
    pub fn clear_current_question(&mut self, id: PairId, display: &mut dyn QuestionDisplay) {
        if self.occupant != Some(id) {
            // A later pair already took over the prompt
            return;
        }
        self.occupant = None;
        display.hide();
    }

    /// The player drove through one of a pair's doors
    pub fn choose(
        &mut self,
        id: PairId,
        side: Side,
        display: &mut dyn QuestionDisplay,
    ) -> ChoiceOutcome {
        let Some(pair) = self.pairs.get_mut(id.0) else {
            return ChoiceOutcome::Ignored;
        };

        if pair.choice(side).correct {
            if pair.answered {
                return ChoiceOutcome::AlreadyAnswered;
            }
            if !pair.frame_active {
                return ChoiceOutcome::Ignored;
            }
            pair.answered = true;
            pair.frame_active = false;
            self.events.push(GateEvent::Answered(id));
            self.clear_current_question(id, display);
            ChoiceOutcome::Correct
        } else {
            if !pair.frame_active {
                return ChoiceOutcome::Ignored;
            }
            self.events.push(GateEvent::Missed(id));
            ChoiceOutcome::Incorrect
        }
    }

    /// Move the conveyor and recycle pairs that ran off the end
    pub fn tick(&mut self, dt: f32, display: &mut dyn QuestionDisplay) {
        if self.state != ChainState::Running || self.pairs.is_empty() {
            return;
        }

        let step = self.direction * (self.speed * dt);
        let limit = self.length + self.spacing;
        for index in 0..self.pairs.len() {
            self.pairs[index].frame_position += step;
            if self.distance_along(self.pairs[index].frame_position) > limit {
                self.recycle(index, display);
            }
        }
    }

    fn recycle(&mut self, index: usize, display: &mut dyn QuestionDisplay) {
        let id = self.pairs[index].id;
        if self.occupant == Some(id) {
            self.clear_current_question(id, display);
        }

        // Rearmost other pair along the segment
        let rearmost = self
            .pairs
            .iter()
            .filter(|p| p.id != id)
            .map(|p| p.frame_position)
            .min_by(|a, b| self.distance_along(*a).total_cmp(&self.distance_along(*b)));
        let anchor = rearmost.unwrap_or(self.slope_start);
        let rotation = self.facing();

        let Some(question) = self.bank.next_question() else {
            return;
        };
        let pair = &mut self.pairs[index];
        pair.frame_position = anchor - self.direction * self.spacing;
        pair.frame_rotation = rotation;
        pair.bind(question);
        pair.frame_active = true;
        self.events.push(GateEvent::Recycled(id));
    }

    pub fn drain_events(&mut self) -> Vec<GateEvent> {
        std::mem::take(&mut self.events)
    }
}

impl CheckpointGated for GateChain {
    fn gating(&self) -> &CheckpointGating {
        &self.gating
    }

    fn is_active(&self) -> bool {
        self.state != ChainState::Dormant
    }

    fn activate(&mut self, _display: &mut dyn QuestionDisplay) {
        self.arm();
    }

    fn deactivate(&mut self, display: &mut dyn QuestionDisplay) {
        self.deactivate_chain(display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::checkpoint::CheckpointId;
    use crate::sim::question::PromptBoard;

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            QuestionContent::new("q0", "a", "b", true),
            QuestionContent::new("q1", "a", "b", false),
            QuestionContent::new("q2", "a", "b", true),
        ])
    }

    fn config() -> GateChainConfig {
        GateChainConfig {
            slope_start: Vec3::ZERO,
            slope_end: Vec3::new(0.0, 0.0, 30.0),
            spacing: 10.0,
            movement_speed: 5.0,
            ..Default::default()
        }
    }

    fn running_chain() -> GateChain {
        let mut chain = GateChain::new(ChainId(0), &config(), CheckpointGating::default(), bank());
        chain.arm();
        assert!(chain.activate_chain());
        chain
    }

    #[test]
    fn test_pre_spawn_layout() {
        let chain = GateChain::new(ChainId(0), &config(), CheckpointGating::default(), bank());
        // ceil(30 / 10) + 3
        assert_eq!(chain.pairs().len(), 6);
        assert_eq!(chain.state(), ChainState::Dormant);
        for (i, pair) in chain.pairs().iter().enumerate() {
            assert_eq!(pair.frame_position, Vec3::new(0.0, 0.0, i as f32 * 10.0));
            assert!(!pair.frame_active);
            assert_eq!(pair.question.prompt, format!("q{}", i % 3));
            assert_ne!(pair.left.correct, pair.right.correct);
            assert_eq!(pair.left.correct, pair.question.correct_is_a);
        }
    }

    #[test]
    fn test_empty_bank_is_inert() {
        let mut chain = GateChain::new(
            ChainId(0),
            &config(),
            CheckpointGating::default(),
            QuestionBank::default(),
        );
        assert!(chain.pairs().is_empty());
        chain.arm();
        chain.activate_chain();
        let mut board = PromptBoard::default();
        chain.tick(1.0, &mut board);
        assert_eq!(chain.choose(PairId(0), Side::Left, &mut board), ChoiceOutcome::Ignored);
    }

    #[test]
    fn test_activate_requires_armed() {
        let mut chain = GateChain::new(ChainId(0), &config(), CheckpointGating::default(), bank());
        assert!(!chain.activate_chain());
        assert!(chain.pairs().iter().all(|p| !p.frame_active));
        chain.arm();
        assert!(chain.activate_chain());
        assert!(chain.pairs().iter().all(|p| p.frame_active));
        assert!(!chain.activate_chain());
    }

    #[test]
    fn test_checkpoint_lifecycle() {
        let gating = CheckpointGating::new(vec![CheckpointId(2)], vec![CheckpointId(3)], false);
        let mut chain = GateChain::new(ChainId(0), &config(), gating, bank());
        let mut board = PromptBoard::default();

        chain.on_checkpoint_changed(CheckpointId(2), &mut board);
        assert_eq!(chain.state(), ChainState::Armed);
        chain.activate_chain();
        chain.set_current_question(PairId(0), &mut board);
        assert!(board.visible.is_some());

        // Re-broadcast of the start checkpoint keeps the chain running
        chain.on_checkpoint_changed(CheckpointId(2), &mut board);
        assert_eq!(chain.state(), ChainState::Running);

        chain.on_checkpoint_changed(CheckpointId(3), &mut board);
        assert_eq!(chain.state(), ChainState::Dormant);
        assert!(board.visible.is_none());
        assert_eq!(chain.occupant(), None);
        assert!(chain.pairs().iter().all(|p| !p.frame_active));
    }

    #[test]
    fn test_overlapping_frames_keep_newest_prompt() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();

        chain.set_current_question(PairId(0), &mut board);
        chain.set_current_question(PairId(1), &mut board);
        // Stale exit from the first frame
        chain.clear_current_question(PairId(0), &mut board);
        assert_eq!(chain.occupant(), Some(PairId(1)));
        assert_eq!(board.prompt(), Some("q1"));

        chain.clear_current_question(PairId(1), &mut board);
        assert_eq!(chain.occupant(), None);
        assert!(board.visible.is_none());
    }

    #[test]
    fn test_reentering_occupant_does_not_reshow() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        chain.set_current_question(PairId(2), &mut board);
        chain.set_current_question(PairId(2), &mut board);
        assert_eq!(board.shows, 1);
    }

    #[test]
    fn test_correct_choice_is_idempotent() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        chain.set_current_question(PairId(0), &mut board);

        // q0: correct is A (left)
        assert_eq!(chain.choose(PairId(0), Side::Left, &mut board), ChoiceOutcome::Correct);
        let after_once = chain.pair(PairId(0)).cloned().unwrap();
        assert!(after_once.answered);
        assert!(!after_once.frame_active);
        assert_eq!(chain.occupant(), None);
        assert!(board.visible.is_none());

        assert_eq!(
            chain.choose(PairId(0), Side::Left, &mut board),
            ChoiceOutcome::AlreadyAnswered
        );
        let after_twice = chain.pair(PairId(0)).unwrap();
        assert_eq!(after_twice.answered, after_once.answered);
        assert_eq!(after_twice.frame_active, after_once.frame_active);
        assert_eq!(chain.occupant(), None);
    }

    #[test]
    fn test_correct_choice_keeps_other_occupant() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        chain.set_current_question(PairId(1), &mut board);
        chain.choose(PairId(0), Side::Left, &mut board);
        assert_eq!(chain.occupant(), Some(PairId(1)));
        assert_eq!(board.prompt(), Some("q1"));
    }

    #[test]
    fn test_incorrect_choice_leaves_pair_open() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        // q1: correct is B (right)
        assert_eq!(
            chain.choose(PairId(1), Side::Left, &mut board),
            ChoiceOutcome::Incorrect
        );
        let pair = chain.pair(PairId(1)).unwrap();
        assert!(!pair.answered);
        assert!(pair.frame_active);
    }

    #[test]
    fn test_answered_pair_shows_no_prompt() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        chain.choose(PairId(0), Side::Left, &mut board);
        // Frame is gone, trigger no longer fires
        chain.set_current_question(PairId(0), &mut board);
        assert_eq!(board.shows, 0);
        assert_eq!(chain.occupant(), None);
    }

    #[test]
    fn test_conveyor_moves_only_when_running() {
        let mut chain = GateChain::new(ChainId(0), &config(), CheckpointGating::default(), bank());
        let mut board = PromptBoard::default();
        chain.tick(1.0, &mut board);
        assert_eq!(chain.pairs()[0].frame_position, Vec3::ZERO);

        chain.arm();
        chain.tick(1.0, &mut board);
        assert_eq!(chain.pairs()[0].frame_position, Vec3::ZERO);

        chain.activate_chain();
        chain.tick(1.0, &mut board);
        assert_eq!(chain.pairs()[0].frame_position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_recycle_moves_pair_behind_row() {
        let mut chain = running_chain();
        let mut board = PromptBoard::default();
        chain.choose(PairId(5), Side::Left, &mut board); // q2 correct is A
        chain.set_current_question(PairId(4), &mut board);
        assert_eq!(chain.occupant(), Some(PairId(4)));
        chain.drain_events();

        // Limit is 30 + 10. Pair 4 steps from 40 to 41 and is recycled behind
        // pair 0 (now at 1); pair 5 steps past 50 and lands behind pair 4.
        chain.tick(0.2, &mut board);

        let pair4 = chain.pair(PairId(4)).unwrap();
        assert!((pair4.frame_position.z - -9.0).abs() < 1e-4);
        // Seventh question handed out: 6 mod 3
        assert_eq!(pair4.question.prompt, "q0");
        assert!(pair4.frame_active);
        assert_eq!(chain.occupant(), None);
        assert!(board.visible.is_none());

        let pair5 = chain.pair(PairId(5)).unwrap();
        assert!((pair5.frame_position.z - -19.0).abs() < 1e-4);
        assert_eq!(pair5.question.prompt, "q1");
        assert!(!pair5.answered);
        assert!(pair5.frame_active);
        assert!(pair5.right.correct);

        let events = chain.drain_events();
        assert_eq!(
            events,
            vec![GateEvent::Recycled(PairId(4)), GateEvent::Recycled(PairId(5))]
        );
    }

    #[test]
    fn test_frames_face_up_slope() {
        let chain = running_chain();
        let forward = chain.pairs()[0].frame_rotation * Vec3::Z;
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-4);
    }

    #[test]
    fn test_recycled_pair_faces_up_slope() {
        // Slope runs along +X so the facing is a real rotation, not a flip of Z
        let sideways = GateChainConfig {
            slope_end: Vec3::new(30.0, 0.0, 0.0),
            ..config()
        };
        let mut chain = GateChain::new(ChainId(0), &sideways, CheckpointGating::default(), bank());
        chain.arm();
        assert!(chain.activate_chain());
        let mut board = PromptBoard::default();
        chain.pairs[4].frame_rotation = Quat::IDENTITY;

        chain.tick(0.2, &mut board);

        let pair4 = chain.pair(PairId(4)).unwrap();
        assert!((pair4.frame_position - Vec3::new(-9.0, 0.0, 0.0)).length() < 1e-4);
        let forward = pair4.frame_rotation * Vec3::Z;
        assert!((forward - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-4);
        assert!(chain
            .drain_events()
            .contains(&GateEvent::Recycled(PairId(4))));
    }

    #[test]
    fn test_oversized_chain_is_inert() {
        for spacing in [1e-30, 0.1, f32::NAN] {
            let tiny = GateChainConfig {
                spacing,
                ..config()
            };
            let mut chain =
                GateChain::new(ChainId(0), &tiny, CheckpointGating::default(), bank());
            assert!(chain.pairs().is_empty(), "spacing {} spawned pairs", spacing);

            chain.arm();
            assert!(chain.activate_chain());
            let mut board = PromptBoard::default();
            chain.tick(1.0, &mut board);
            assert!(chain.pairs().is_empty());
            assert!(chain.drain_events().iter().all(|e| !matches!(e, GateEvent::Recycled(_))));
        }
    }

    #[test]
    fn test_pair_count_at_cap() {
        // 30 / 0.12 = 250, plus 3 extras, still under the cap
        let dense = GateChainConfig {
            spacing: 0.12,
            ..config()
        };
        let chain = GateChain::new(ChainId(0), &dense, CheckpointGating::default(), bank());
        assert!(chain.pairs().len() <= MAX_GATE_PAIRS);
        assert!(chain.pairs().len() >= 250);
    }
}
