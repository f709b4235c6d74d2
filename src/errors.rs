//! Error types for the bingo draw service
//!
//! Game parameter and sequence errors are recovered close to where they
//! happen (the caller falls back to defaults). Sink errors are logged by the
//! scheduler. Everything that reaches the caller of `DrawScheduler::start`
//! is a `BingoError`.

/// Root error type for all bingo operations
#[derive(Debug, thiserror::Error)]
pub enum BingoError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Sequence error: {0}")]
    Sequence(#[from] SequenceError),

    #[error("Sink delivery error: {0}")]
    Sink(#[from] SinkError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration and parameter validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl ConfigurationError {
    pub fn invalid_value(field: &str, value: impl ToString, reason: &str) -> Self {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Custom draw sequence validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("sequence must contain exactly 75 numbers (found {found})")]
    WrongCount { found: usize },

    #[error("all numbers must be in the range 1-75 (invalid: {})", join_values(.values))]
    OutOfRange { values: Vec<i64> },

    #[error("sequence contains duplicated numbers: {}", join_values(.values))]
    Duplicates { values: Vec<i64> },
}

fn join_values(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Event sink delivery errors
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

// Convenience type alias for Results
pub type BingoResult<T> = Result<T, BingoError>;
