//! Positional layout checks.

use thiserror::Error;

use crate::positional::PositionalSchema;

/// A positional layout that cannot be parsed unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("variadic argument <{0}> must be the last positional")]
    VariadicNotLast(String),

    #[error("duplicate positional name <{0}>")]
    DuplicateName(String),

    #[error("positional names must not be empty")]
    EmptyName,
}

/// Checks that at most one variadic exists and that it comes last.
///
/// A second variadic always fails as [`LayoutError::VariadicNotLast`] on the
/// first one.
///
/// # Examples
///
/// ```
/// use schema_args_core::{LayoutError, Positional, PositionalSchema, Schema, Variadic, validate_layout};
///
/// let ok: Vec<PositionalSchema> = vec![
///     Positional::new("src", Schema::string()).into(),
///     Variadic::new("rest", Schema::string()).into(),
/// ];
/// assert!(validate_layout(&ok).is_ok());
///
/// let bad: Vec<PositionalSchema> = vec![
///     Variadic::new("rest", Schema::string()).into(),
///     Positional::new("src", Schema::string()).into(),
/// ];
/// assert_eq!(validate_layout(&bad), Err(LayoutError::VariadicNotLast("rest".into())));
/// ```
pub fn validate_layout(positionals: &[PositionalSchema]) -> Result<(), LayoutError> {
    let mut seen: Vec<&str> = Vec::with_capacity(positionals.len());

    for (index, entry) in positionals.iter().enumerate() {
        let name = entry.name();
        if name.is_empty() {
            return Err(LayoutError::EmptyName);
        }
        if seen.contains(&name) {
            return Err(LayoutError::DuplicateName(name.to_string()));
        }
        seen.push(name);

        if entry.is_variadic() && index + 1 != positionals.len() {
            return Err(LayoutError::VariadicNotLast(name.to_string()));
        }
    }

    Ok(())
}
