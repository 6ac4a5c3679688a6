use crate::quiz::WrongAnswer;

/// Final tally of a completed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: usize,
    pub total: usize,
    pub percent: usize,
    /// Missed questions in the order they were missed. Only filled on the hard level.
    pub review: Vec<WrongAnswer>,
}

impl RoundSummary {
    pub fn new(score: usize, total: usize, hard: bool, wrong_answers: &[WrongAnswer]) -> Self {
        let review = if hard {
            wrong_answers.to_vec()
        } else {
            Vec::new()
        };
        Self {
            score,
            total,
            percent: percent(score, total),
            review,
        }
    }
}

/// Floored percentage, 0 for an empty round.
pub fn percent(score: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    100 * score / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Label, Question};

    fn misses(count: usize) -> Vec<WrongAnswer> {
        (0..count)
            .map(|i| {
                let question = Question {
                    event_text: format!("event {i}"),
                    example_text: format!("example {i}"),
                    correct_label: Label::Suffering,
                    explanation_text: String::new(),
                };
                WrongAnswer::new(&question, Label::Problem)
            })
            .collect()
    }

    #[test]
    fn percent_is_floored() {
        assert_eq!(percent(7, 10), 70);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn easy_level_hides_the_review() {
        let summary = RoundSummary::new(7, 10, false, &misses(3));
        assert!(summary.review.is_empty());
        assert_eq!(summary.percent, 70);
    }

    #[test]
    fn hard_level_keeps_misses_in_order() {
        let wrong = misses(3);
        let summary = RoundSummary::new(7, 10, true, &wrong);
        assert_eq!(summary.review, wrong);
        assert_eq!(summary.review[0].event_text, "event 0");
        assert_eq!(summary.review[2].event_text, "event 2");
    }
}
