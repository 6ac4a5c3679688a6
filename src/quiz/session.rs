use rand::Rng;

use crate::quiz::round::build_round;
use crate::quiz::summary::RoundSummary;
use crate::quiz::{ExampleRecord, Label, Question, QuizError, WrongAnswer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    NotStarted,
    Answering,
    AnswerShown,
    Completed,
}

/// What the last answer did. Only kept while the answer is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    /// The question that was missed, `None` when the answer was right.
    pub missed: Option<Question>,
}

/// One quiz attempt of one user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    phase: Phase,
    questions: Vec<Question>,
    current_index: usize,
    correct_count: usize,
    wrong_answers: Vec<WrongAnswer>,
    hard: bool,
    last_feedback: Option<Feedback>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh round from `pool`, dropping whatever the session held before.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        pool: &[ExampleRecord],
        hard: bool,
        count: usize,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        if pool.is_empty() {
            return Err(QuizError::NoData);
        }

        let questions = build_round(pool, count, rng);
        if questions.is_empty() {
            return Err(QuizError::NoData);
        }

        *self = Self {
            phase: Phase::Answering,
            questions,
            hard,
            ..Self::default()
        };
        log::debug!(
            "Round started with {} questions (hard: {})",
            self.questions.len(),
            hard
        );
        Ok(())
    }

    pub fn current_question(&self) -> Result<&Question, QuizError> {
        match self.phase {
            Phase::Answering | Phase::AnswerShown => self.question_at_cursor("current_question"),
            phase => Err(QuizError::InvalidState {
                operation: "current_question",
                phase,
            }),
        }
    }

    /// `(current_index, total)`: questions already answered and advanced past, and the round size.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index, self.questions.len())
    }

    /// Records the answer to the current question. Each question takes exactly one answer.
    pub fn submit_answer(&mut self, chosen_label: Label) -> Result<Feedback, QuizError> {
        self.expect_phase(Phase::Answering, "submit_answer")?;

        let question = self.question_at_cursor("submit_answer")?.clone();
        let correct = question.correct_label == chosen_label;
        let feedback = if correct {
            self.correct_count += 1;
            Feedback {
                correct,
                missed: None,
            }
        } else {
            self.wrong_answers.push(WrongAnswer::new(&question, chosen_label));
            Feedback {
                correct,
                missed: Some(question),
            }
        };
        log::debug!(
            "Question {} answered with {}: correct = {}",
            self.current_index + 1,
            chosen_label,
            correct
        );

        self.last_feedback = Some(feedback.clone());
        self.phase = Phase::AnswerShown;
        Ok(feedback)
    }

    /// Moves past the answered question, completing the round after the last one.
    pub fn advance(&mut self) -> Result<Phase, QuizError> {
        self.expect_phase(Phase::AnswerShown, "advance")?;

        self.current_index += 1;
        self.last_feedback = None;
        self.phase = if self.current_index == self.questions.len() {
            log::debug!(
                "Round completed: {}/{}",
                self.correct_count,
                self.questions.len()
            );
            Phase::Completed
        } else {
            Phase::Answering
        };
        Ok(self.phase)
    }

    pub fn summarize(&self) -> Result<RoundSummary, QuizError> {
        if self.phase != Phase::Completed {
            return Err(QuizError::IncompleteRound);
        }
        Ok(RoundSummary::new(
            self.correct_count,
            self.questions.len(),
            self.hard,
            &self.wrong_answers,
        ))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_hard(&self) -> bool {
        self.hard
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn wrong_answers(&self) -> &[WrongAnswer] {
        &self.wrong_answers
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    fn question_at_cursor(&self, operation: &'static str) -> Result<&Question, QuizError> {
        self.questions
            .get(self.current_index)
            .ok_or(QuizError::InvalidState {
                operation,
                phase: self.phase,
            })
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<(), QuizError> {
        if self.phase != expected {
            return Err(QuizError::InvalidState {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }
}
