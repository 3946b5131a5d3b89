//! Error types for argument parsing and dispatch.
//!
//! Everything a user can get wrong on the command line is a
//! [`ValidationError`]; the message already carries the flag or argument it
//! is about. The remaining variants cover failures the parser does not own:
//! transform errors, broken CLI definitions and failed command actions.

use schema_args_core::{BoxError, LayoutError, SchemaError, ValidationError};
use thiserror::Error;

/// Errors that can occur while parsing an argument vector.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input: unknown flag, constraint violation, arity mismatch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema transform failed with its own error type.
    #[error(transparent)]
    Transform(BoxError),

    /// The CLI or command definition itself is invalid.
    #[error("invalid definition: {0}")]
    Definition(String),

    /// A command action reported failure.
    #[error("command `{command}` failed: {source}")]
    Action {
        command: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// Validation error whose message starts with `path`.
    pub(crate) fn at(path: &str, detail: impl AsRef<str>) -> Self {
        Self::Validation(ValidationError::at(path, detail))
    }

    /// Validation error with a free-form message.
    pub(crate) fn invalid(path: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(path, message))
    }

    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Validation(err) => Self::Validation(err),
            SchemaError::Custom(err) => Self::Transform(err),
        }
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Definition(err.to_string())
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_keep_their_kind() {
        let validation: Error = SchemaError::from(ValidationError::at("--port", "is required")).into();
        assert_eq!(validation.to_string(), "--port is required");
        assert!(validation.as_validation().is_some());

        let custom: Error = SchemaError::custom("lookup failed").into();
        assert!(matches!(custom, Error::Transform(_)));
        assert_eq!(custom.to_string(), "lookup failed");
    }

    #[test]
    fn test_layout_error_is_definition() {
        let err: Error = LayoutError::VariadicNotLast("files".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid definition: variadic argument <files> must be the last positional"
        );
    }
}
