//! Error types for quex.

use thiserror::Error;

use crate::schema::Dialect;

/// The main error type for quex operations.
#[derive(Debug, Error)]
pub enum QuexError {
    /// The dataset exposes no usable columns, so nothing can be bound.
    #[error("Dataset '{dataset}' has no usable columns to build queries from")]
    InsufficientSchema { dataset: String },

    /// Requested category does not exist for the active dialect.
    #[error("Unknown category '{category}' for the {dialect} dialect")]
    UnknownCategory { category: String, dialect: Dialect },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Dataset upload error.
    #[error("Upload error: {0}")]
    Upload(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuexError {
    /// Create an insufficient-schema error for the given dataset.
    pub fn insufficient(dataset: impl Into<String>) -> Self {
        Self::InsufficientSchema {
            dataset: dataset.into(),
        }
    }

    /// Create an unknown-category error.
    pub fn unknown_category(category: impl Into<String>, dialect: Dialect) -> Self {
        Self::UnknownCategory {
            category: category.into(),
            dialect,
        }
    }
}

/// Result type alias for quex operations.
pub type QuexResult<T> = Result<T, QuexError>;
