//! Value validation and coercion.
//!
//! [`Schema::parse`] turns a raw, JSON-ish value (usually strings collected
//! from argv) into a validated value. The algorithm is the same for every
//! kind:
//!
//! 1. Absent input (`None` or `null`) resolves to the default, then to "no
//!    value" when optional, then to `false` for booleans, then to the first
//!    union variant that tolerates absence, and otherwise fails as required.
//! 2. Present input is coerced, then checked in a fixed order (choices,
//!    bounds, pattern). The first failing check wins.
//! 3. Transforms run on the result in chaining order.
//!
//! # Examples
//!
//! ```
//! use schema_args_core::Schema;
//! use serde_json::json;
//!
//! let port: Schema = Schema::number().min(1024.0).max(65535.0).into();
//! assert_eq!(port.parse(Some(&json!("8080")), "--port").unwrap(), Some(json!(8080)));
//!
//! let err = port.parse(Some(&json!("80")), "--port").unwrap_err();
//! assert!(err.to_string().contains("1024"));
//! ```

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError, ValidationError};
use crate::suggest::did_you_mean;
use crate::types::{
    ArraySchema, Bound, NumberSchema, ObjectSchema, RecordSchema, Schema, StringSchema,
};
use crate::union;

/// Largest integer that survives a round trip through `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl Schema {
    /// Validates `raw` at `path`.
    ///
    /// Returns `Ok(None)` only when the input is absent and the schema is
    /// optional without a default.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Validation`] when a check fails, or
    /// [`SchemaError::Custom`] when a transform fails with its own error.
    pub fn parse(&self, raw: Option<&Value>, path: &str) -> Result<Option<Value>> {
        let meta = self.meta();
        let value = match raw.filter(|v| !v.is_null()) {
            None => match (&meta.default, meta.optional, self) {
                (Some(default), _, _) => default.clone(),
                (None, true, _) => return Ok(None),
                (None, false, Schema::Boolean(_)) => Value::Bool(false),
                (None, false, Schema::Union(u)) => match union::parse_absent(u, path)? {
                    Some(value) => value,
                    None => return Ok(None),
                },
                (None, false, _) => return Err(ValidationError::at(path, "is required").into()),
            },
            Some(raw) => self.check(raw, path)?,
        };

        let mut value = value;
        for transform in &meta.transforms {
            value = transform.apply(value)?;
        }
        Ok(Some(value))
    }

    fn check(&self, raw: &Value, path: &str) -> Result<Value> {
        match self {
            Schema::String(s) => check_string(s, raw, path).map_err(Into::into),
            Schema::Number(n) => check_number(n, raw, path).map_err(Into::into),
            Schema::Boolean(_) => coerce_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| {
                    ValidationError::at(
                        path,
                        format!("must be a boolean (true/false), got {}", describe(raw)),
                    )
                    .into()
                }),
            Schema::Array(a) => check_array(a, raw, path),
            Schema::Object(o) => check_object(o, raw, path),
            Schema::Record(r) => check_record(r, raw, path),
            Schema::Union(u) => union::parse_union(u, raw, path),
        }
    }
}

/// Renders a raw value for messages: strings quoted, everything else as JSON.
pub(crate) fn describe(raw: &Value) -> String {
    match raw {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn fail<T>(path: &str, bound: &Bound<T>, detail: String) -> ValidationError {
    match &bound.message {
        Some(message) => ValidationError::new(path, format!("{path}: {message}")),
        None => ValidationError::at(path, detail),
    }
}

fn check_string(
    schema: &StringSchema,
    raw: &Value,
    path: &str,
) -> std::result::Result<Value, ValidationError> {
    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(ValidationError::at(
                path,
                format!("must be a string, got {}", describe(other)),
            ));
        }
    };

    if !schema.choices.is_empty() && !schema.choices.contains(&text) {
        let listed = schema
            .choices
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let hint = did_you_mean(&text, schema.choices.iter().map(String::as_str));
        return Err(ValidationError::at(
            path,
            format!("must be one of {listed}; got \"{text}\".{hint}"),
        ));
    }

    let len = text.chars().count();
    if let Some(min) = &schema.min_length {
        if len < min.value {
            return Err(fail(
                path,
                min,
                format!("must be at least {} characters", min.value),
            ));
        }
    }
    if let Some(max) = &schema.max_length {
        if len > max.value {
            return Err(fail(
                path,
                max,
                format!("must be at most {} characters", max.value),
            ));
        }
    }

    if let Some(pattern) = &schema.pattern {
        if !pattern.regex.is_match(&text) {
            return Err(match &pattern.message {
                Some(message) => ValidationError::new(path, format!("{path}: {message}")),
                None => ValidationError::at(
                    path,
                    format!("must match pattern {}", pattern.regex.as_str()),
                ),
            });
        }
    }

    Ok(Value::String(text))
}

/// Parses a number the permissive way: surrounding whitespace, a leading
/// sign and scientific notation are accepted; non-finite results are not.
pub(crate) fn coerce_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integral values become JSON integers so `3` never reads back as `3.0`.
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn format_number(n: f64) -> String {
    number_value(n).to_string()
}

fn check_number(
    schema: &NumberSchema,
    raw: &Value,
    path: &str,
) -> std::result::Result<Value, ValidationError> {
    let Some(n) = coerce_number(raw) else {
        return Err(ValidationError::at(
            path,
            format!("must be a number, got {}", describe(raw)),
        ));
    };

    if let Some(min) = &schema.min {
        if n < min.value {
            return Err(fail(
                path,
                min,
                format!("must be at least {}", format_number(min.value)),
            ));
        }
    }
    if let Some(max) = &schema.max {
        if n > max.value {
            return Err(fail(
                path,
                max,
                format!("must be at most {}", format_number(max.value)),
            ));
        }
    }
    if let Some(int) = &schema.int {
        if n.fract() != 0.0 {
            return Err(fail(path, int, "must be an integer".to_string()));
        }
    }
    if let Some(positive) = &schema.positive {
        if n <= 0.0 {
            return Err(fail(path, positive, "must be positive".to_string()));
        }
    }
    if let Some(negative) = &schema.negative {
        if n >= 0.0 {
            return Err(fail(path, negative, "must be negative".to_string()));
        }
    }

    Ok(number_value(n))
}

/// Boolean literals: `true`, `"true"`, `"1"`, `1` and their false twins.
pub(crate) fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => {
            let n = n.as_f64()?;
            if n == 1.0 {
                Some(true)
            } else if n == 0.0 {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Splits array input: sequences pass through, strings split on commas with
/// empty pieces dropped, anything else becomes a one-item sequence.
///
/// ```
/// use schema_args_core::array_items;
/// use serde_json::json;
///
/// assert_eq!(array_items(&json!("a, b,,c")), vec![json!("a"), json!("b"), json!("c")]);
/// assert_eq!(array_items(&json!(3)), vec![json!(3)]);
/// ```
pub fn array_items(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(|piece| Value::String(piece.to_string()))
            .collect(),
        other => vec![other.clone()],
    }
}

fn check_array(schema: &ArraySchema, raw: &Value, path: &str) -> Result<Value> {
    let items = array_items(raw);

    if let Some(min) = &schema.min_length {
        if items.len() < min.value {
            return Err(fail(path, min, format!("must have at least {} items", min.value)).into());
        }
    }
    if let Some(max) = &schema.max_length {
        if items.len() > max.value {
            return Err(fail(path, max, format!("must have at most {} items", max.value)).into());
        }
    }

    let mut parsed = Vec::with_capacity(items.len());
    let mut failures: Vec<ValidationError> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}[{index}]");
        match schema.item.parse(Some(item), &item_path) {
            Ok(value) => parsed.push(value.unwrap_or(Value::Null)),
            Err(SchemaError::Validation(err)) => failures.push(err),
            Err(custom) => return Err(custom),
        }
    }

    match failures.len() {
        0 => Ok(Value::Array(parsed)),
        n => {
            let listed = failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let noun = if n == 1 { "item" } else { "items" };
            Err(ValidationError::at(path, format!("has {n} invalid {noun}: {listed}")).into())
        }
    }
}

fn check_object(schema: &ObjectSchema, raw: &Value, path: &str) -> Result<Value> {
    let valid_keys = || schema.keys().collect::<Vec<_>>().join(", ");
    let Value::Object(input) = raw else {
        return Err(ValidationError::at(
            path,
            format!("must be an object with keys: {}", valid_keys()),
        )
        .into());
    };

    if let Some(unknown) = input.keys().find(|k| !schema.shape.contains_key(*k)) {
        let hint = did_you_mean(unknown, schema.keys());
        return Err(ValidationError::at(
            path,
            format!(
                "does not accept key \"{unknown}\". Valid keys: {}.{hint}",
                valid_keys()
            ),
        )
        .into());
    }

    let mut out = Map::new();
    for (key, field) in &schema.shape {
        let field_path = format!("{path}.{key}");
        if let Some(value) = field.parse(input.get(key), &field_path)? {
            out.insert(key.clone(), value);
        }
    }
    Ok(Value::Object(out))
}

fn check_record(schema: &RecordSchema, raw: &Value, path: &str) -> Result<Value> {
    let Value::Object(input) = raw else {
        return Err(ValidationError::at(
            path,
            format!("must be an object (use {path}.<key> <value>)"),
        )
        .into());
    };

    let mut out = Map::new();
    for (key, value) in input {
        let field_path = format!("{path}.{key}");
        if let Some(value) = schema.value.parse(Some(value), &field_path)? {
            out.insert(key.clone(), value);
        }
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use regex::Regex;
    use serde_json::json;

    use super::*;

    fn parse(schema: impl Into<Schema>, raw: Value) -> Result<Option<Value>> {
        schema.into().parse(Some(&raw), "--value")
    }

    fn message(result: Result<Option<Value>>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_absent_value_resolution_order() {
        let required: Schema = Schema::string().into();
        let optional: Schema = Schema::string().optional().into();
        let defaulted: Schema = Schema::string().optional().with_default("x").into();
        let flag: Schema = Schema::boolean().into();

        assert_eq!(
            required.parse(None, "--name").unwrap_err().to_string(),
            "--name is required"
        );
        assert_eq!(optional.parse(None, "--name").unwrap(), None);
        assert_eq!(defaulted.parse(None, "--name").unwrap(), Some(json!("x")));
        assert_eq!(flag.parse(None, "--flag").unwrap(), Some(json!(false)));
        assert_eq!(optional.parse(Some(&Value::Null), "--name").unwrap(), None);
    }

    #[test]
    fn test_default_round_trips_for_every_kind() {
        let cases: Vec<(Schema, Value)> = vec![
            (Schema::string().with_default("a").into(), json!("a")),
            (Schema::number().with_default(2.5).into(), json!(2.5)),
            (Schema::boolean().with_default(true).into(), json!(true)),
            (Schema::array(Schema::string()).with_default(json!(["x"])).into(), json!(["x"])),
            (
                Schema::object().field("a", Schema::string()).with_default(json!({"a": "b"})).into(),
                json!({"a": "b"}),
            ),
            (Schema::record(Schema::number()).with_default(json!({})).into(), json!({})),
            (
                Schema::union([Schema::number().into(), Schema::string().into()])
                    .with_default(7)
                    .into(),
                json!(7),
            ),
        ];

        for (schema, expected) in cases {
            assert_eq!(schema.parse(None, "--x").unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_number_coercion_is_permissive() {
        assert_eq!(parse(Schema::number(), json!("1e3")).unwrap(), Some(json!(1000)));
        assert_eq!(parse(Schema::number(), json!("-2.5")).unwrap(), Some(json!(-2.5)));
        assert_eq!(parse(Schema::number(), json!(" 42 ")).unwrap(), Some(json!(42)));
        assert!(message(parse(Schema::number(), json!("abc"))).contains("must be a number"));
        assert!(parse(Schema::number(), json!("inf")).is_err());
        assert!(parse(Schema::number(), json!("")).is_err());
    }

    #[test]
    fn test_number_constraints_first_failure_wins() {
        let schema = Schema::number().min(1.0).int().positive();
        assert_eq!(message(parse(schema.clone(), json!("0.5"))), "--value must be at least 1");
        assert_eq!(message(parse(schema, json!("1.5"))), "--value must be an integer");
        assert_eq!(
            message(parse(Schema::number().negative_msg("use a negative offset"), json!(3))),
            "--value: use a negative offset"
        );
    }

    #[test]
    fn test_boolean_literals() {
        for raw in [json!(true), json!("true"), json!("1"), json!(1)] {
            assert_eq!(parse(Schema::boolean(), raw).unwrap(), Some(json!(true)));
        }
        for raw in [json!(false), json!("false"), json!("0"), json!(0)] {
            assert_eq!(parse(Schema::boolean(), raw).unwrap(), Some(json!(false)));
        }
        assert!(message(parse(Schema::boolean(), json!("yes"))).contains("must be a boolean"));
    }

    #[test]
    fn test_string_check_order() {
        let schema = Schema::string()
            .choices(["alpha", "beta"])
            .min_length(10)
            .regex(Regex::new("^z").unwrap());

        let err = message(parse(schema.clone(), json!("gamma")));
        assert!(err.contains("must be one of \"alpha\", \"beta\""), "{err}");

        // Choice passes, so the length bound reports before the pattern.
        let err = message(parse(schema, json!("alpha")));
        assert_eq!(err, "--value must be at least 10 characters");
    }

    #[test]
    fn test_choice_suggestion() {
        let schema = Schema::string().choices(["production", "staging"]);
        let err = message(parse(schema, json!("prod")));
        assert!(err.contains("Did you mean \"production\"?"), "{err}");
    }

    #[test]
    fn test_regex_custom_message() {
        let schema = Schema::string().regex_msg(Regex::new("^[a-z]+$").unwrap(), "lowercase only");
        assert_eq!(message(parse(schema, json!("ABC"))), "--value: lowercase only");
    }

    #[test]
    fn test_array_comma_split_matches_sequence() {
        let schema: Schema = Schema::array(Schema::string()).into();
        let split = schema.parse(Some(&json!("a, b,,c")), "--items").unwrap();
        let listed = schema.parse(Some(&json!(["a", "b", "c"])), "--items").unwrap();
        assert_eq!(split, Some(json!(["a", "b", "c"])));
        assert_eq!(split, listed);
        assert_eq!(
            schema.parse(Some(&json!(true)), "--items").unwrap_err().to_string(),
            "--items has 1 invalid item: --items[0] must be a string, got true"
        );
    }

    #[test]
    fn test_array_reports_every_failing_index() {
        let schema = Schema::array(Schema::number());
        let err = message(parse(schema, json!("1,x,3,y")));
        assert!(err.starts_with("--value has 2 invalid items"), "{err}");
        assert!(err.contains("--value[1]"));
        assert!(err.contains("--value[3]"));
    }

    #[test]
    fn test_array_length_bounds() {
        let schema = Schema::array(Schema::string()).min_length(2).max_length(3);
        assert_eq!(
            message(parse(schema.clone(), json!("a"))),
            "--value must have at least 2 items"
        );
        assert_eq!(
            message(parse(schema, json!("a,b,c,d"))),
            "--value must have at most 3 items"
        );
    }

    #[test]
    fn test_object_rejects_unknown_keys() {
        let schema = Schema::object().field("host", Schema::string());
        let err = message(parse(schema, json!({"host": "x", "bogus": "y"})));
        assert!(err.contains("\"bogus\""), "{err}");
        assert!(err.contains("Valid keys: host"), "{err}");
    }

    #[test]
    fn test_object_parses_fields_in_shape_order() {
        let schema = Schema::object()
            .field("port", Schema::number())
            .field("tls", Schema::boolean())
            .field("name", Schema::string().optional());
        let out = parse(schema, json!({"port": "80"})).unwrap().unwrap();
        assert_eq!(out, json!({"port": 80, "tls": false}));

        let err = message(parse(
            Schema::object().field("port", Schema::number()),
            json!({}),
        ));
        assert_eq!(err, "--value.port is required");
    }

    #[test]
    fn test_record_applies_value_schema_to_every_key() {
        let schema = Schema::record(Schema::number());
        let out = parse(schema.clone(), json!({"a": "1", "b": "2"})).unwrap();
        assert_eq!(out, Some(json!({"a": 1, "b": 2})));
        assert_eq!(
            message(parse(schema, json!({"a": "z"}))),
            "--value.a must be a number, got \"z\""
        );
    }

    #[test]
    fn test_transforms_chain_in_order() {
        let schema = Schema::string()
            .transform(|v| Ok(Value::String(format!("{}-f", v.as_str().unwrap_or_default()))))
            .transform(|v| Ok(Value::String(format!("{}-g", v.as_str().unwrap_or_default()))));
        assert_eq!(parse(schema, json!("x")).unwrap(), Some(json!("x-f-g")));
    }

    #[test]
    fn test_transform_errors_pass_through() {
        #[derive(Debug, thiserror::Error)]
        #[error("host unreachable")]
        struct Unreachable;

        let schema = Schema::string().transform(|_| Err(SchemaError::custom(Unreachable)));
        let err = parse(schema, json!("x")).unwrap_err();
        assert!(matches!(err, SchemaError::Custom(_)));
        assert_eq!(err.to_string(), "host unreachable");
    }
}
