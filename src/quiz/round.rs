use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::{ExampleRecord, Label, Question};

/// Known mis-transcriptions in the source sheets and what they should read.
const TEXT_CORRECTIONS: [(&str, &str); 1] = [("親切心に踏み出されました", "親切心が踏みにじられた")];

/// Replaces `text` when its trimmed form is a known mis-transcription.
pub fn apply_corrections(text: &str) -> String {
    let trimmed = text.trim();
    TEXT_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == trimmed)
        .map(|(_, corrected)| corrected.to_string())
        .unwrap_or_else(|| text.to_string())
}

/// Samples up to `count` records from `pool` without replacement and turns each into a question.
///
/// A short pool is not an error: the round just gets smaller.
pub fn build_round<R: Rng + ?Sized>(
    pool: &[ExampleRecord],
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let chosen = pool.choose_multiple(rng, count).collect::<Vec<_>>();
    chosen
        .into_iter()
        .map(|record| {
            let prefer_problem = rng.gen_bool(0.5);
            question_from_record(record, prefer_problem)
        })
        .collect()
}

/// Picks which example of `record` is shown.
///
/// The coin only decides whether the problem text gets a chance first; a record
/// without a suffering text always falls back to its problem text.
pub fn question_from_record(record: &ExampleRecord, prefer_problem: bool) -> Question {
    let (example_text, correct_label) = if prefer_problem && !record.problem_text.is_empty() {
        (&record.problem_text, Label::Problem)
    } else if !record.suffering_text.is_empty() {
        (&record.suffering_text, Label::Suffering)
    } else {
        (&record.problem_text, Label::Problem)
    };

    Question {
        event_text: apply_corrections(&record.event_text),
        example_text: apply_corrections(example_text),
        correct_label,
        explanation_text: record.explanation_text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(size: usize) -> Vec<ExampleRecord> {
        (0..size)
            .map(|i| {
                ExampleRecord::new(
                    format!("event {i}"),
                    format!("problem {i}"),
                    format!("suffering {i}"),
                    format!("why {i}"),
                )
            })
            .collect()
    }

    #[test]
    fn round_size_is_min_of_pool_and_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for (size, count) in [(12, 10), (3, 10), (10, 10), (0, 10), (5, 0)] {
            let round = build_round(&pool(size), count, &mut rng);
            assert_eq!(round.len(), size.min(count), "pool {size}, count {count}");
        }
    }

    #[test]
    fn records_are_never_repeated() {
        let records = pool(30);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let round = build_round(&records, 25, &mut rng);
            let events = round.iter().map(|q| &q.event_text).collect::<HashSet<_>>();
            assert_eq!(events.len(), round.len());
        }
    }

    #[test]
    fn example_text_matches_the_correct_label() {
        let records = pool(20);
        let mut rng = StdRng::seed_from_u64(42);
        for question in build_round(&records, 20, &mut rng) {
            let source = records
                .iter()
                .find(|r| r.event_text == question.event_text)
                .unwrap();
            let expected = match question.correct_label {
                Label::Problem => &source.problem_text,
                Label::Suffering => &source.suffering_text,
            };
            assert_eq!(&question.example_text, expected);
            assert_eq!(question.explanation_text, source.explanation_text);
        }
    }

    #[test]
    fn both_labels_show_up_over_many_rounds() {
        let records = pool(50);
        let mut rng = StdRng::seed_from_u64(3);
        let labels = build_round(&records, 50, &mut rng)
            .into_iter()
            .map(|q| q.correct_label)
            .collect::<HashSet<_>>();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn missing_suffering_always_yields_problem() {
        let record = ExampleRecord::new("event", "problem", "", "");
        for prefer_problem in [true, false] {
            let question = question_from_record(&record, prefer_problem);
            assert_eq!(question.correct_label, Label::Problem);
            assert_eq!(question.example_text, "problem");
        }
    }

    #[test]
    fn missing_problem_always_yields_suffering() {
        let record = ExampleRecord::new("event", "", "suffering", "");
        for prefer_problem in [true, false] {
            let question = question_from_record(&record, prefer_problem);
            assert_eq!(question.correct_label, Label::Suffering);
            assert_eq!(question.example_text, "suffering");
        }
    }

    #[test]
    fn coin_decides_when_both_examples_exist() {
        let record = ExampleRecord::new("event", "problem", "suffering", "");
        assert_eq!(question_from_record(&record, true).correct_label, Label::Problem);
        assert_eq!(question_from_record(&record, false).correct_label, Label::Suffering);
    }

    #[test]
    fn corrections_apply_to_event_and_example_only() {
        let record = ExampleRecord::new(
            " 親切心に踏み出されました ",
            "",
            "親切心に踏み出されました",
            "親切心に踏み出されました",
        );
        let question = question_from_record(&record, false);
        assert_eq!(question.event_text, "親切心が踏みにじられた");
        assert_eq!(question.example_text, "親切心が踏みにじられた");
        assert_eq!(question.explanation_text, "親切心に踏み出されました");
    }

    #[test]
    fn uncorrected_text_passes_through_untouched() {
        assert_eq!(apply_corrections("  そのまま "), "  そのまま ");
    }
}
