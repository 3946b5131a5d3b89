//! Positional and rest resolution.

use schema_args_core::PositionalSchema;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Matches leftover tokens against a positional layout.
///
/// Returns `(positionals, rest)`. Fixed positionals take one token each by
/// index; a trailing variadic takes everything after them. With an empty
/// layout the tokens come back untyped as strings and `rest` is empty.
pub(crate) fn resolve_positionals(
    layout: &[PositionalSchema],
    tokens: Vec<String>,
) -> Result<(Vec<Value>, Vec<Value>)> {
    if layout.is_empty() {
        debug!(count = tokens.len(), "no positional layout, passing tokens through");
        return Ok((tokens.into_iter().map(Value::String).collect(), Vec::new()));
    }

    let has_variadic = layout.iter().any(PositionalSchema::is_variadic);
    if !has_variadic && tokens.len() > layout.len() {
        let extras = tokens[layout.len()..]
            .iter()
            .map(|t| format!("\"{t}\""))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::invalid(
            "arguments",
            format!(
                "Too many arguments: {extras} (expected at most {})",
                layout.len()
            ),
        ));
    }

    let mut positionals = Vec::with_capacity(layout.len());
    let mut rest = Vec::new();
    for (index, entry) in layout.iter().enumerate() {
        match entry {
            PositionalSchema::Single(positional) => {
                let token = tokens.get(index).map(String::as_str);
                let value = positional.parse(token)?;
                positionals.push(value.unwrap_or(Value::Null));
            }
            PositionalSchema::Variadic(variadic) => {
                let remaining = tokens.get(index..).unwrap_or_default();
                debug!(name = variadic.name(), count = remaining.len(), "variadic batch");
                rest = variadic.parse(remaining)?;
            }
        }
    }
    Ok((positionals, rest))
}

#[cfg(test)]
mod tests {
    use schema_args_core::{Positional, Schema, Variadic};
    use serde_json::json;

    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run_layout() -> Vec<PositionalSchema> {
        vec![
            Positional::new("task", Schema::string()).into(),
            Positional::new("count", Schema::number()).into(),
            Variadic::new("files", Schema::string()).into(),
        ]
    }

    #[test]
    fn test_fixed_then_variadic_split() {
        let (positionals, rest) =
            resolve_positionals(&run_layout(), tokens(&["run", "3", "a", "b"])).unwrap();
        assert_eq!(positionals, vec![json!("run"), json!(3)]);
        assert_eq!(rest, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_empty_variadic_batch() {
        let (_, rest) = resolve_positionals(&run_layout(), tokens(&["run", "3"])).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_missing_required_positional() {
        let err = resolve_positionals(&run_layout(), tokens(&["run"])).unwrap_err();
        assert_eq!(err.to_string(), "argument <count> is required");
    }

    #[test]
    fn test_surplus_tokens_without_variadic() {
        let layout: Vec<PositionalSchema> = vec![Positional::new("src", Schema::string()).into()];
        let err = resolve_positionals(&layout, tokens(&["a", "b", "c"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Too many arguments: \"b\", \"c\" (expected at most 1)"
        );
    }

    #[test]
    fn test_optional_positional_reads_as_null() {
        let layout: Vec<PositionalSchema> =
            vec![Positional::new("dest", Schema::string().optional()).into()];
        let (positionals, _) = resolve_positionals(&layout, Vec::new()).unwrap();
        assert_eq!(positionals, vec![Value::Null]);
    }

    #[test]
    fn test_no_layout_passes_tokens_through_untyped() {
        let (positionals, rest) = resolve_positionals(&[], tokens(&["1", "x"])).unwrap();
        assert_eq!(positionals, vec![json!("1"), json!("x")]);
        assert!(rest.is_empty());
    }
}
