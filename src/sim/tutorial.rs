//! Stand-alone tutorial gate
//!
//! A single fixed gate pair that teaches the quiz mechanic. Answering it
//! correctly starts the linked gate chain.

use serde::{Deserialize, Serialize};

use super::gates::{ChainId, Choice, ChoiceOutcome};
use super::question::{QuestionBank, QuestionContent, QuestionDisplay, Side};

/// Tutorial identity within a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TutorialId(pub usize);

#[derive(Debug, Clone)]
pub struct TutorialGate {
    id: TutorialId,
    question: Option<QuestionContent>,
    left: Choice,
    right: Choice,
    /// Chain started on a correct answer
    unlocks: Option<ChainId>,
    active: bool,
}

impl TutorialGate {
    /// Bound to the first question of `bank`; an empty bank leaves the gate inert
    pub fn new(id: TutorialId, bank: &QuestionBank, unlocks: Option<ChainId>) -> Self {
        let question = bank.first().cloned();
        if question.is_none() {
            log::warn!("Tutorial gate {} has no question - disabled", id.0);
        }
        if unlocks.is_none() {
            log::warn!("Tutorial gate {} does not unlock a gate chain", id.0);
        }
        let correct_is_a = question.as_ref().is_some_and(|q| q.correct_is_a);

        Self {
            id,
            active: question.is_some(),
            question,
            left: Choice {
                correct: correct_is_a,
            },
            right: Choice {
                correct: !correct_is_a,
            },
            unlocks,
        }
    }

    pub fn id(&self) -> TutorialId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn unlocks(&self) -> Option<ChainId> {
        self.unlocks
    }

    pub fn question(&self) -> Option<&QuestionContent> {
        self.question.as_ref()
    }

    pub fn enter(&self, display: &mut dyn QuestionDisplay) {
        if !self.active {
            return;
        }
        if let Some(question) = &self.question {
            display.show_question(question);
        }
    }

    pub fn exit(&self, display: &mut dyn QuestionDisplay) {
        if self.active {
            display.hide();
        }
    }

    /// Drive through a door. On `Correct` the caller starts [`Self::unlocks`].
    pub fn choose(&mut self, side: Side, display: &mut dyn QuestionDisplay) -> ChoiceOutcome {
        if !self.active {
            return ChoiceOutcome::Ignored;
        }
        let choice = match side {
            Side::Left => self.left,
            Side::Right => self.right,
        };
        if !choice.correct {
            return ChoiceOutcome::Incorrect;
        }

        log::info!("Tutorial gate {} completed", self.id.0);
        display.hide();
        self.active = false;
        ChoiceOutcome::Correct
    }
}
