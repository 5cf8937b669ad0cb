//! Error types for the commission engine

use thiserror::Error;

/// Errors raised by the engine, its loaders and its configuration
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Parse error in {context}: {reason}")]
    Parse { context: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(context: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Parse {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type EngineResult<T> = Result<T, EngineError>;
