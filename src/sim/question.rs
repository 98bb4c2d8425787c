//! Quiz questions and the prompt display surface

use serde::{Deserialize, Serialize};

/// Which of a pair's two choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Option A
    Left,
    /// Option B
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A two-option question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionContent {
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    /// Option A (left) is the right answer; otherwise option B (right) is
    pub correct_is_a: bool,
}

impl QuestionContent {
    pub fn new(
        prompt: impl Into<String>,
        option_a: impl Into<String>,
        option_b: impl Into<String>,
        correct_is_a: bool,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            option_a: option_a.into(),
            option_b: option_b.into(),
            correct_is_a,
        }
    }

    /// The side holding the correct answer
    pub fn correct_side(&self) -> Side {
        if self.correct_is_a { Side::Left } else { Side::Right }
    }
}

/// Ordered question bank handed out round-robin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<QuestionContent>,
    #[serde(skip)]
    cursor: usize,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuestionContent>) -> Self {
        Self {
            questions,
            cursor: 0,
        }
    }

    /// Next question; the i-th call returns question `i mod len`
    pub fn next_question(&mut self) -> Option<QuestionContent> {
        if self.questions.is_empty() {
            return None;
        }
        let question = self.questions[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.questions.len();
        Some(question)
    }

    pub fn first(&self) -> Option<&QuestionContent> {
        self.questions.first()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Prompt panel owned by the view layer
pub trait QuestionDisplay {
    fn show(&mut self, prompt: &str, option_a: &str, option_b: &str);
    fn hide(&mut self);

    fn show_question(&mut self, question: &QuestionContent) {
        self.show(&question.prompt, &question.option_a, &question.option_b);
    }
}

/// A prompt currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
}

/// In-memory display that remembers what is on screen
#[derive(Debug, Clone, Default)]
pub struct PromptBoard {
    pub visible: Option<Prompt>,
    pub shows: u32,
    pub hides: u32,
}

impl PromptBoard {
    /// Prompt text currently shown, if any
    pub fn prompt(&self) -> Option<&str> {
        self.visible.as_ref().map(|p| p.prompt.as_str())
    }
}

impl QuestionDisplay for PromptBoard {
    fn show(&mut self, prompt: &str, option_a: &str, option_b: &str) {
        log::debug!("Show question: {} [{} | {}]", prompt, option_a, option_b);
        self.shows += 1;
        self.visible = Some(Prompt {
            prompt: prompt.to_string(),
            option_a: option_a.to_string(),
            option_b: option_b.to_string(),
        });
    }

    fn hide(&mut self) {
        self.hides += 1;
        self.visible = None;
    }
}
