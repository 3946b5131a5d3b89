//! Union disambiguation.
//!
//! Variants are tried in declaration order, except that number variants go
//! first so `"42"` reads as the number `42` when both a number and a string
//! would accept it. The first variant that validates wins.
//!
//! When every variant fails, the most informative failure is reported
//! instead of the first one. Each failed variant gets a specificity score:
//!
//! - fixed-shape object variant, object input: `10` per input key that the
//!   shape knows, plus `5` if one of the variant's required fields is missing;
//! - any other variant whose kind matches the runtime kind of the input: `1`.
//!
//! The highest score wins (ties keep try order). A top score of zero means
//! nothing came close, and a generic "accepts multiple formats" error lists
//! one example per variant.
//!
//! # Examples
//!
//! ```
//! use schema_args_core::Schema;
//! use serde_json::json;
//!
//! let source: Schema = Schema::union([
//!     Schema::object()
//!         .field("type", Schema::string().choices(["git"]))
//!         .field("url", Schema::string())
//!         .into(),
//!     Schema::object()
//!         .field("type", Schema::string().choices(["path"]))
//!         .field("dir", Schema::string())
//!         .into(),
//! ])
//! .into();
//!
//! let err = source.parse(Some(&json!({"type": "bogus"})), "--source").unwrap_err();
//! assert!(err.to_string().starts_with("--source.type must be one of"));
//! ```

use serde_json::Value;

use crate::error::{Result, SchemaError, ValidationError};
use crate::types::{Schema, SchemaKind, UnionSchema};

pub(crate) fn parse_union(union: &UnionSchema, raw: &Value, path: &str) -> Result<Value> {
    let mut failures: Vec<(u32, ValidationError)> = Vec::new();

    for variant in try_order(union) {
        match variant.parse(Some(raw), path) {
            Ok(value) => return Ok(value.unwrap_or(Value::Null)),
            Err(SchemaError::Validation(err)) => failures.push((specificity(variant, raw), err)),
            Err(custom) => return Err(custom),
        }
    }

    // Stable: equal scores keep try order.
    failures.sort_by(|a, b| b.0.cmp(&a.0));
    match failures.into_iter().next() {
        Some((score, err)) if score > 0 => Err(err.into()),
        _ => Err(generic_error(union, path).into()),
    }
}

/// Resolves absent input through the first variant that does not require a
/// value (a boolean, an optional or defaulted variant, or a union holding
/// one).
pub(crate) fn parse_absent(union: &UnionSchema, path: &str) -> Result<Option<Value>> {
    match try_order(union).into_iter().find(|variant| !variant.is_required()) {
        Some(variant) => variant.parse(None, path),
        None => Err(ValidationError::at(path, "is required").into()),
    }
}

/// Declaration order with number variants moved to the front.
pub fn try_order(union: &UnionSchema) -> Vec<&Schema> {
    let mut ordered: Vec<&Schema> = union.variants.iter().collect();
    ordered.sort_by_key(|variant| variant.kind() != SchemaKind::Number);
    ordered
}

fn runtime_kind(raw: &Value) -> Option<SchemaKind> {
    match raw {
        Value::Bool(_) => Some(SchemaKind::Boolean),
        Value::Number(_) => Some(SchemaKind::Number),
        Value::String(_) => Some(SchemaKind::String),
        Value::Array(_) => Some(SchemaKind::Array),
        Value::Object(_) => Some(SchemaKind::Object),
        Value::Null => None,
    }
}

/// How close a failed variant came to matching `raw`.
pub fn specificity(variant: &Schema, raw: &Value) -> u32 {
    match (variant, raw) {
        (Schema::Object(object), Value::Object(input)) => {
            let known = input.keys().filter(|k| object.shape.contains_key(*k)).count();
            let missing_required = object
                .shape
                .iter()
                .any(|(key, field)| field.is_required() && !input.contains_key(key));
            10 * known as u32 + if missing_required { 5 } else { 0 }
        }
        (Schema::Object(_), _) => 0,
        (Schema::Record(_), Value::Object(_)) => 1,
        (other, raw) => u32::from(runtime_kind(raw) == Some(other.kind())),
    }
}

fn example_for(variant: &Schema, path: &str, out: &mut Vec<String>) {
    if let Some(example) = variant.example_text() {
        out.push(example.to_string());
        return;
    }
    let example = match variant {
        Schema::String(s) => match s.choices.first() {
            Some(first) => format!("{path} {first}"),
            None => format!("{path} <text>"),
        },
        Schema::Number(_) => format!("{path} 42"),
        Schema::Boolean(_) => path.to_string(),
        Schema::Array(_) => format!("{path} a,b"),
        Schema::Object(o) => match o.keys().next() {
            Some(key) => format!("{path}.{key} <value>"),
            None => format!("{path}.<key> <value>"),
        },
        Schema::Record(_) => format!("{path}.<key> <value>"),
        Schema::Union(u) => {
            for nested in &u.variants {
                example_for(nested, path, out);
            }
            return;
        }
    };
    out.push(example);
}

fn generic_error(union: &UnionSchema, path: &str) -> ValidationError {
    let mut examples = Vec::new();
    for variant in &union.variants {
        example_for(variant, path, &mut examples);
    }
    examples.dedup();
    ValidationError::at(
        path,
        format!("accepts multiple formats, for example: {}", examples.join(" | ")),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn boolean_or_object() -> Schema {
        Schema::union([
            Schema::boolean().with_default(true).into(),
            Schema::object().field("js", Schema::boolean()).into(),
        ])
        .into()
    }

    #[test]
    fn test_number_is_tried_before_string() {
        let schema: Schema = Schema::union([Schema::string().into(), Schema::number().into()]).into();
        assert_eq!(schema.parse(Some(&json!("42")), "--x").unwrap(), Some(json!(42)));
        assert_eq!(schema.parse(Some(&json!("abc")), "--x").unwrap(), Some(json!("abc")));
    }

    #[test]
    fn test_boolean_or_object_union() {
        let schema = boolean_or_object();
        assert_eq!(schema.parse(Some(&json!("false")), "--cfg").unwrap(), Some(json!(false)));
        assert_eq!(
            schema.parse(Some(&json!({"js": "true"})), "--cfg").unwrap(),
            Some(json!({"js": true}))
        );
        assert_eq!(schema.parse(None, "--cfg").unwrap(), Some(json!(true)));
    }

    #[test]
    fn test_object_variant_error_wins_when_keys_match() {
        let schema = boolean_or_object();
        let err = schema
            .parse(Some(&json!({"js": "maybe"})), "--cfg")
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("--cfg.js must be a boolean"), "{err}");
    }

    #[test]
    fn test_matching_runtime_kind_scores_one() {
        let boolean: Schema = Schema::boolean().into();
        let object: Schema = Schema::object().field("a", Schema::string()).into();
        assert_eq!(specificity(&boolean, &json!(true)), 1);
        assert_eq!(specificity(&boolean, &json!("x")), 0);
        assert_eq!(specificity(&object, &json!({"a": 1, "b": 2})), 10);
        assert_eq!(specificity(&object, &json!({"b": 2})), 5);
    }

    #[test]
    fn test_generic_error_lists_examples() {
        let schema: Schema = Schema::union([
            Schema::number().into(),
            Schema::object().field("dir", Schema::string()).into(),
        ])
        .into();
        let err = schema.parse(Some(&json!("abc")), "--cache").unwrap_err().to_string();
        assert!(err.starts_with("--cache accepts multiple formats"), "{err}");
        assert!(err.contains("--cache 42"), "{err}");
        assert!(err.contains("--cache.dir <value>"), "{err}");
    }

    #[test]
    fn test_loose_union_field_is_not_a_missing_required_field() {
        let variant: Schema = Schema::object()
            .field("name", Schema::string())
            .field(
                "cache",
                Schema::union([
                    Schema::boolean().into(),
                    Schema::object().field("dir", Schema::string()).into(),
                ]),
            )
            .into();
        assert_eq!(specificity(&variant, &json!({"name": "x"})), 10);
        assert_eq!(specificity(&variant, &json!({"cache": true})), 15);
    }

    #[test]
    fn test_array_variant_lists_every_bad_item() {
        let schema: Schema = Schema::union([
            Schema::boolean().into(),
            Schema::array(Schema::number()).into(),
        ])
        .into();
        let err = schema.parse(Some(&json!(["1", "x", "y"])), "--ids").unwrap_err().to_string();
        assert_eq!(
            err,
            "--ids has 2 invalid items: --ids[1] must be a number, got \"x\"; \
             --ids[2] must be a number, got \"y\""
        );
    }
}
