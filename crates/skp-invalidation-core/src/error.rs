//! Error types for invalidation operations

use thiserror::Error;

/// Main error type for all invalidation operations
#[derive(Error, Debug, Clone)]
pub enum InvalidationError {
    /// Invalid engine or rule configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Rule pattern failed to compile
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A rule with the same name is already registered
    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    /// A rule condition failed
    #[error("condition of rule `{rule}` failed: {message}")]
    Guard { rule: String, message: String },

    /// Backend operation failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Process-wide engine used before installation
    #[error("invalidation engine not initialized")]
    NotInitialized,
}

impl InvalidationError {
    /// Whether this error was raised while registering policy rather than
    /// while handling a write
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            InvalidationError::Configuration(_)
                | InvalidationError::InvalidPattern { .. }
                | InvalidationError::DuplicateRule(_)
        )
    }

    /// Shorthand for a guard failure raised from inside a rule condition
    pub fn guard(rule: impl Into<String>, message: impl Into<String>) -> Self {
        InvalidationError::Guard {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for invalidation operations
pub type Result<T> = std::result::Result<T, InvalidationError>;
