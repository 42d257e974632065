//! Error types shared across Reelcut crates.

use std::path::PathBuf;

/// Top-level error type for Reelcut operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    /// Malformed input rejected before any state mutation.
    #[error("Validation error: {reason}")]
    Validation { reason: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// An external collaborator refused the request (for example, no credits left).
    #[error("Rejected: {reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ReelError.
pub type ReelResult<T> = Result<T, ReelError>;

impl ReelError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by retrying with corrected input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
