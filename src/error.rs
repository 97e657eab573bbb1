//! Ошибки пайплайна

use thiserror::Error;

/// Поле исходной таблицы не соответствует ожидаемому формату
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: String, value: String },

    #[error("{field}: value {value} is negative")]
    NegativeValue { field: String, value: f64 },

    #[error("{field}: value {value} must be positive")]
    NonPositiveValue { field: String, value: f64 },

    #[error("field {field} is empty")]
    EmptyField { field: String },

    #[error("no WIDTHxHEIGHT token in screen resolution '{0}'")]
    MissingResolution(String),

    #[error("screen size must be positive, got {0}")]
    InvalidScreenSize(f64),

    #[error("malformed storage segment '{0}'")]
    InvalidStorageSegment(String),

    #[error("storage size {gb} GB in '{text}' is out of range")]
    StorageOverflow { text: String, gb: f64 },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ошибка в конкретной строке: весь батч отклоняется
    #[error("row {index}: {source}")]
    Row {
        index: usize,
        #[source]
        source: ParseError,
    },

    #[error("Empty dataset")]
    EmptyTable,

    #[error("{0}")]
    InvalidQuery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
