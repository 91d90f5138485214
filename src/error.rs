//! Error types for the survey core.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not enough data: {0}")]
    InsufficientData(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SurveyError {
    fn from(e: serde_json::Error) -> Self {
        SurveyError::Parse(e.to_string())
    }
}

impl From<basic_toml::Error> for SurveyError {
    fn from(e: basic_toml::Error) -> Self {
        SurveyError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
