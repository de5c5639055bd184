//! Error types for linkedin-agent-mcp.

use thiserror::Error;

/// Result type for linkedin-agent-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for linkedin-agent-mcp.
#[derive(Debug, Error)]
pub enum Error {
    /// Request failed schema-level validation (e.g. missing target role).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// LLM generation failure. Recovered inside the optimizers via fallback;
    /// never surfaces as a failure of a whole request.
    #[error("generation error: {0}")]
    Generation(#[from] crate::generate::GenerationError),

    /// Unexpected failure inside an optimizer. Recovered by the orchestrator
    /// and recorded in that tool's result.
    #[error("tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid parameters.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
