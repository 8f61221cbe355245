//! Error types for the policy assistant.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! document loading, retrieval, generation and prompt errors.

use thiserror::Error;

/// Unified error type for the policy assistant.
///
/// All fallible functions return `Result<T, AppError>`. The three pipeline
/// kinds (`DocumentLoad`, `RetrievalUnavailable`, `GenerationUnavailable`)
/// are surfaced to the caller as-is and are never retried internally.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured policy document is missing, unreadable or conflicting
    #[error("Document load error: {0}")]
    DocumentLoad(String),

    /// Embedding model or similarity index failure
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Language-generation service failure
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Coarse error category, for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    DocumentLoad,
    RetrievalUnavailable,
    GenerationUnavailable,
    Prompt,
    Serialization,
    Other,
}

impl AppError {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::DocumentLoad(_) => ErrorKind::DocumentLoad,
            Self::RetrievalUnavailable(_) => ErrorKind::RetrievalUnavailable,
            Self::GenerationUnavailable(_) => ErrorKind::GenerationUnavailable,
            Self::Prompt(_) => ErrorKind::Prompt,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
