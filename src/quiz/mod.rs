pub mod error;
pub mod pools;
pub mod round;
pub mod session;
pub mod summary;

use std::fmt;

pub use error::QuizError;

/// One labeled row of a sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleRecord {
    pub event_text: String,
    pub problem_text: String,
    pub suffering_text: String,
    pub explanation_text: String,
}

impl ExampleRecord {
    pub fn new(
        event_text: impl Into<String>,
        problem_text: impl Into<String>,
        suffering_text: impl Into<String>,
        explanation_text: impl Into<String>,
    ) -> Self {
        Self {
            event_text: event_text.into(),
            problem_text: problem_text.into(),
            suffering_text: suffering_text.into(),
            explanation_text: explanation_text.into(),
        }
    }

    /// A record can back a question only if it has an event and at least one example.
    pub fn is_usable(&self) -> bool {
        !self.event_text.is_empty()
            && (!self.problem_text.is_empty() || !self.suffering_text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Label {
    #[default]
    Problem,
    Suffering,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Problem, Label::Suffering];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Problem => "問題",
            Label::Suffering => "苦しみ",
        }
    }

    /// Parses the text of an answer button. English names are accepted too.
    pub fn from_text(text: &str) -> Option<Label> {
        let text = text.trim();
        Label::ALL.into_iter().find(|label| {
            text == label.as_str() || text.eq_ignore_ascii_case(label.english_name())
        })
    }

    fn english_name(&self) -> &'static str {
        match self {
            Label::Problem => "problem",
            Label::Suffering => "suffering",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty level. Level 2 shows the correct answer and explanation on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    One,
    Two,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::One, Level::Two];

    pub fn number(&self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
        }
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Level::Two)
    }

    /// Text of the level choice button.
    pub fn button_text(&self) -> &'static str {
        match self {
            Level::One => "レベル1（結果のみ表示）",
            Level::Two => "レベル2（不正解時に正解・解説を表示）",
        }
    }

    pub fn from_text(text: &str) -> Option<Level> {
        let text = text.trim();
        Level::ALL
            .into_iter()
            .find(|level| text == level.button_text() || text == level.number().to_string())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "レベル{}", self.number())
    }
}

/// One item of a round. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Question {
    pub event_text: String,
    pub example_text: String,
    pub correct_label: Label,
    pub explanation_text: String,
}

/// Snapshot of a missed question together with what the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrongAnswer {
    pub event_text: String,
    pub example_text: String,
    pub correct_label: Label,
    pub explanation_text: String,
    pub chosen_label: Label,
}

impl WrongAnswer {
    pub fn new(question: &Question, chosen_label: Label) -> Self {
        Self {
            event_text: question.event_text.clone(),
            example_text: question.example_text.clone(),
            correct_label: question.correct_label,
            explanation_text: question.explanation_text.clone(),
            chosen_label,
        }
    }
}
