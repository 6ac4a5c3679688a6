use std::path::PathBuf;

pub const DATA_VAR: &str = "QUIZ_DATA";
pub const QUESTION_COUNT_VAR: &str = "QUIZ_QUESTION_COUNT";

const DEFAULT_DATA_PATH: &str = "data";
const DEFAULT_QUESTION_COUNT: usize = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("QUIZ_QUESTION_COUNT must be a positive number, got {0:?}")]
    InvalidQuestionCount(String),
}

/// Settings read from the environment. The bot token itself is read by teloxide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory of CSV sheets, or a single CSV file.
    pub data_path: PathBuf,
    pub question_count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_path = lookup(DATA_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let question_count = match lookup(QUESTION_COUNT_VAR) {
            None => DEFAULT_QUESTION_COUNT,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(count) if count > 0 => count,
                _ => return Err(ConfigError::InvalidQuestionCount(raw)),
            },
        };

        Ok(Self {
            data_path,
            question_count,
        })
    }
}
