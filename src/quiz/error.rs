use crate::quiz::session::Phase;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    /// The chosen pool has no usable records.
    #[error("no data available for this level")]
    NoData,
    #[error("`{operation}` is not allowed while the session is {phase:?}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },
    #[error("the round is not completed yet")]
    IncompleteRound,
    #[error("there is no sheet number {0}")]
    UnknownSheet(usize),
    #[error("none of the selected sheets contain usable rows")]
    EmptySelection,
}
