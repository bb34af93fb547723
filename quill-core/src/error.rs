//! Error types for quill-core.

use thiserror::Error;

use crate::pipeline::{PipelineState, Stage};

/// Result type alias using quill-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the pipeline or its collaborators.
#[derive(Error, Debug)]
pub enum Error {
    /// Text generation failed inside a stage
    #[error("Generation failed during {stage}: {message}")]
    Generation { stage: String, message: String },

    /// LLM API error
    #[error("LLM API error: {provider} - {message}")]
    LlmApi { provider: String, message: String },

    /// Search transport error (absorbed by stages, surfaced by providers)
    #[error("Search error: {0}")]
    Search(String),

    /// Timeout during an external call
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while writing artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage tried to overwrite a field written by an earlier stage
    #[error("Field '{field}' was already written by an earlier stage")]
    SlotAlreadyFilled { field: &'static str },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a generation error attributed to a stage.
    pub fn generation(stage: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Generation {
            stage: stage.to_string(),
            message: message.into(),
        }
    }

    /// Create an LLM API error.
    pub fn llm_api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LlmApi {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// A fatal collaborator failure, carrying the partial state for inspection.
#[derive(Error, Debug)]
#[error("pipeline failed at stage {stage}: {source}")]
pub struct PipelineFailure {
    /// Stage that was executing when the failure happened
    pub stage: Stage,
    /// Everything the earlier stages produced
    pub state: Box<PipelineState>,
    /// The underlying collaborator error
    #[source]
    pub source: Error,
}

impl PipelineFailure {
    pub fn new(stage: Stage, state: PipelineState, source: Error) -> Self {
        Self {
            stage,
            state: Box::new(state),
            source,
        }
    }
}
