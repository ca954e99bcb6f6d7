//! Error types for Speider.

use thiserror::Error;

/// Library-level error type for Speider operations.
#[derive(Error, Debug)]
pub enum SpeiderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unavailable ({source_kind}): {reason}")]
    Source { source_kind: String, reason: String },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Text generation failed: {0}")]
    Generator(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SpeiderError {
    /// Build a `Source` error for a provider failure.
    pub fn source(source_kind: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Self::Source {
            source_kind: source_kind.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Speider operations.
pub type Result<T> = std::result::Result<T, SpeiderError>;
