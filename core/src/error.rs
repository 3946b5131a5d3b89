//! Error types for schema validation.
//!
//! Every check in the engine reports a [`ValidationError`]: a human path such
//! as `--server.port` or `argument <count>` plus a message that already starts
//! with that path. Callers distinguish failures by message shape, not by
//! variant. [`SchemaError`] adds the one escape hatch the engine does not own:
//! errors raised by user transforms.

use serde::Serialize;
use thiserror::Error;

/// Boxed error used for transform and action failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A validation failure at a specific path.
///
/// # Examples
///
/// ```
/// use schema_args_core::ValidationError;
///
/// let err = ValidationError::new("--port", "--port must be at least 1024");
/// assert_eq!(err.path, "--port");
/// assert_eq!(err.to_string(), "--port must be at least 1024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable location (`--server.port`, `argument <file>`).
    pub path: String,
    /// Full message, including the path prefix.
    pub message: String,
}

impl ValidationError {
    /// Creates an error from a path and a complete message.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an error whose message is `"<path> <detail>"`.
    pub fn at(path: &str, detail: impl AsRef<str>) -> Self {
        Self::new(path, format!("{path} {}", detail.as_ref()))
    }

    /// Returns the message with the leading path removed.
    ///
    /// ```
    /// use schema_args_core::ValidationError;
    ///
    /// let err = ValidationError::at("argument <n>", "must be a number");
    /// assert_eq!(err.detail(), "must be a number");
    /// ```
    pub fn detail(&self) -> &str {
        self.message
            .strip_prefix(self.path.as_str())
            .map(|rest| rest.trim_start_matches(':').trim_start())
            .unwrap_or(&self.message)
    }
}

/// Errors produced by [`Schema::parse`](crate::Schema::parse).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The value failed a check owned by the engine.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A transform failed with its own error type; passed through untouched.
    #[error(transparent)]
    Custom(BoxError),
}

impl SchemaError {
    /// Wraps an arbitrary error raised inside a transform.
    pub fn custom(err: impl Into<BoxError>) -> Self {
        Self::Custom(err.into())
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Custom(_) => None,
        }
    }
}

/// Convenience alias for schema parse results.
pub type Result<T> = std::result::Result<T, SchemaError>;
