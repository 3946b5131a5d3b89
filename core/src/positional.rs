//! Positional argument schemas.
//!
//! A [`Positional`] wraps a value schema and consumes exactly one token. A
//! [`Variadic`] consumes every remaining token as one batch and always
//! produces a sequence: an empty batch is `[]` (or the explicit default),
//! never "required".

use serde_json::Value;

use crate::error::{Result, SchemaError, ValidationError};
use crate::types::Schema;

/// A named single-token positional argument.
///
/// # Examples
///
/// ```
/// use schema_args_core::{Positional, Schema};
/// use serde_json::json;
///
/// let count = Positional::new("count", Schema::number());
/// assert_eq!(count.parse(Some("3")).unwrap(), Some(json!(3)));
///
/// let err = count.parse(None).unwrap_err();
/// assert_eq!(err.to_string(), "argument <count> is required");
/// ```
#[derive(Debug, Clone)]
pub struct Positional {
    name: String,
    schema: Schema,
}

impl Positional {
    pub fn new(name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Path used in messages: `argument <name>`.
    pub fn label(&self) -> String {
        format!("argument <{}>", self.name)
    }

    /// Validates one token; `None` goes through the schema's
    /// default/optional/required resolution.
    pub fn parse(&self, token: Option<&str>) -> Result<Option<Value>> {
        let raw = token.map(|t| Value::String(t.to_string()));
        self.schema.parse(raw.as_ref(), &self.label())
    }
}

/// A trailing positional that takes all remaining tokens.
///
/// # Examples
///
/// ```
/// use schema_args_core::{Schema, Variadic};
/// use serde_json::json;
///
/// let ids = Variadic::new("ids", Schema::number());
/// let tokens = vec!["1".to_string(), "x".to_string()];
///
/// assert_eq!(ids.parse(&[]).unwrap(), Vec::<serde_json::Value>::new());
/// assert_eq!(
///     ids.parse(&tokens).unwrap_err().to_string(),
///     "Argument <ids>: item 1 must be a number, got \"x\""
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Variadic {
    name: String,
    item: Schema,
    default: Option<Vec<Value>>,
    description: Option<String>,
}

impl Variadic {
    pub fn new(name: impl Into<String>, item: impl Into<Schema>) -> Self {
        Self {
            name: name.into(),
            item: item.into(),
            default: None,
            description: None,
        }
    }

    /// Items returned when no tokens remain.
    pub fn with_default(mut self, items: Vec<Value>) -> Self {
        self.default = Some(items);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item(&self) -> &Schema {
        &self.item
    }

    pub fn default_items(&self) -> Option<&[Value]> {
        self.default.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn label(&self) -> String {
        format!("argument <{}>", self.name)
    }

    /// Validates every token with the item schema.
    ///
    /// Item failures drop the inner path and are reported as
    /// `Argument <name>: item <i> <detail>`. Transform errors pass through.
    pub fn parse(&self, tokens: &[String]) -> Result<Vec<Value>> {
        if tokens.is_empty() {
            return Ok(self.default.clone().unwrap_or_default());
        }

        let label = self.label();
        let mut items = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.iter().enumerate() {
            let raw = Value::String(token.clone());
            match self.item.parse(Some(&raw), &label) {
                Ok(value) => items.push(value.unwrap_or(Value::Null)),
                Err(SchemaError::Validation(err)) => {
                    let message = format!("Argument <{}>: item {index} {}", self.name, err.detail());
                    return Err(ValidationError::new(label.as_str(), message).into());
                }
                Err(custom) => return Err(custom),
            }
        }
        Ok(items)
    }
}

/// One entry of a positional layout.
#[derive(Debug, Clone)]
pub enum PositionalSchema {
    Single(Positional),
    Variadic(Variadic),
}

impl PositionalSchema {
    pub fn name(&self) -> &str {
        match self {
            Self::Single(p) => p.name(),
            Self::Variadic(v) => v.name(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Single(p) => p.schema().description(),
            Self::Variadic(v) => v.description(),
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Self::Variadic(_))
    }

    /// Whether the layout needs a token here for the parse to succeed.
    pub fn is_required(&self) -> bool {
        match self {
            Self::Single(p) => p.schema().is_required(),
            Self::Variadic(_) => false,
        }
    }
}

impl From<Positional> for PositionalSchema {
    fn from(positional: Positional) -> Self {
        Self::Single(positional)
    }
}

impl From<Variadic> for PositionalSchema {
    fn from(variadic: Variadic) -> Self {
        Self::Variadic(variadic)
    }
}
