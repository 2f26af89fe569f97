//! Error types for the advisor workspace.
//!
//! Library crates use [`AdvisorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Completion-service failures are not represented here: they are a typed
//! value (`CompletionError`) that the orchestrator turns into a degraded
//! result, so they never surface as an `AdvisorError` on their own.

use std::path::PathBuf;

/// Top-level error type for advisor operations.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A referenced record (profile, question, ...) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed input rejected at the boundary.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Persistence adapter error.
    #[error("storage error: {0}")]
    Storage(String),

    /// A generation degraded and the caller asked not to accept degraded output.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AdvisorError>;

impl AdvisorError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a not-found error for `entity` with the given identifier.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a not-found signal (as opposed to a failure).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AdvisorError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = AdvisorError::not_found("profile", 42);
        assert_eq!(err.to_string(), "profile not found: 42");
        assert!(err.is_not_found());

        let err = AdvisorError::validation("mission must not be blank");
        assert!(err.to_string().contains("mission must not be blank"));
        assert!(!err.is_not_found());
    }
}
