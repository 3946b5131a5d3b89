//! Dotted option paths.
//!
//! `--server.tls.cert x` addresses `server` → `tls` → `cert`. A segment in
//! single or double quotes may contain dots: `--labels.'app.io/name' web`
//! has two segments, `labels` and `app.io/name`.
//!
//! Resolution walks the option map through object shapes, record value
//! schemas and union variants to find the schema a flag ends at. That
//! schema decides the flag's arity and whether it may be negated.

use indexmap::IndexMap;
use schema_args_core::{Schema, did_you_mean};

use crate::error::{Error, Result};

/// Splits a flag name into path segments, honouring quotes.
pub(crate) fn split_path(name: &str) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in name.chars() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, '.') => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    if segments.iter().any(String::is_empty) {
        return Err(Error::at(&format!("--{name}"), "is not a valid option path"));
    }
    Ok(segments)
}

/// Renders segments back into a flag, quoting segments that contain dots.
pub(crate) fn display_path(segments: &[String]) -> String {
    let joined = segments
        .iter()
        .map(|s| {
            if s.contains('.') {
                format!("\"{s}\"")
            } else {
                s.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(".");
    format!("--{joined}")
}

/// The schema reached by `key` one level below `schema`, if any.
pub(crate) fn child<'a>(schema: &'a Schema, key: &str) -> Option<&'a Schema> {
    match schema {
        Schema::Object(object) => object.get(key),
        Schema::Record(record) => Some(record.value_schema()),
        Schema::Union(union) => union.variants().iter().find_map(|v| child(v, key)),
        _ => None,
    }
}

/// Keys a nested schema declares, in declaration order.
fn nested_keys(schema: &Schema) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    match schema {
        Schema::Object(object) => keys.extend(object.keys()),
        Schema::Union(union) => {
            for variant in union.variants() {
                for key in nested_keys(variant) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        _ => {}
    }
    keys
}

/// Looks up the schema addressed by `segments`.
///
/// The first segment must be a declared option; callers check that first
/// so they can report unknown flags with their own wording.
pub(crate) fn resolve<'a>(
    options: &'a IndexMap<String, Schema>,
    segments: &[String],
) -> Result<&'a Schema> {
    let Some((first, rest)) = segments.split_first() else {
        return Err(Error::invalid("--", "Empty option name"));
    };
    let Some(mut schema) = options.get(first) else {
        return Err(unknown_option(options, first, first));
    };

    for (depth, key) in rest.iter().enumerate() {
        let parent = display_path(&segments[..=depth]);
        schema = match child(schema, key) {
            Some(next) => next,
            None if schema.accepts_nested() => {
                let keys = nested_keys(schema);
                let hint = did_you_mean(key, keys.iter().copied());
                return Err(Error::at(
                    &parent,
                    format!(
                        "does not accept key \"{key}\". Valid keys: {}.{hint}",
                        keys.join(", ")
                    ),
                ));
            }
            None => {
                return Err(Error::at(
                    &parent,
                    format!("is a {} and does not accept nested keys", schema.kind()),
                ));
            }
        };
    }
    Ok(schema)
}

/// "Unknown option" for the flag `--<shown>`, suggesting names close to
/// `wanted` (the bare option name the user most likely meant).
pub(crate) fn unknown_option(options: &IndexMap<String, Schema>, shown: &str, wanted: &str) -> Error {
    let hint = did_you_mean(wanted, options.keys().map(String::as_str));
    let flag = format!("--{shown}");
    Error::invalid(&flag, format!("Unknown option {flag}.{hint}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> IndexMap<String, Schema> {
        let mut options = IndexMap::new();
        options.insert(
            "server".to_string(),
            Schema::object()
                .field("host", Schema::string())
                .field("port", Schema::number())
                .into(),
        );
        options.insert("labels".to_string(), Schema::record(Schema::string()).into());
        options.insert(
            "cache".to_string(),
            Schema::union([
                Schema::boolean().into(),
                Schema::object().field("dir", Schema::string()).into(),
            ])
            .into(),
        );
        options.insert("port".to_string(), Schema::number().into());
        options
    }

    fn segments(name: &str) -> Vec<String> {
        split_path(name).unwrap()
    }

    #[test]
    fn test_split_honours_quotes() {
        assert_eq!(segments("a.b.c"), ["a", "b", "c"]);
        assert_eq!(segments("labels.'app.io/name'"), ["labels", "app.io/name"]);
        assert_eq!(segments("labels.\"x.y\".z"), ["labels", "x.y", "z"]);
        assert!(split_path("a..b").is_err());
        assert!(split_path("a.").is_err());
    }

    #[test]
    fn test_display_path_quotes_dotted_segments() {
        assert_eq!(display_path(&segments("labels.'a.b'")), "--labels.\"a.b\"");
    }

    #[test]
    fn test_resolve_through_object_record_and_union() {
        let options = options();
        assert_eq!(
            resolve(&options, &segments("server.port")).unwrap().kind(),
            schema_args_core::SchemaKind::Number
        );
        assert_eq!(
            resolve(&options, &segments("labels.'a.b'")).unwrap().kind(),
            schema_args_core::SchemaKind::String
        );
        assert_eq!(
            resolve(&options, &segments("cache.dir")).unwrap().kind(),
            schema_args_core::SchemaKind::String
        );
    }

    #[test]
    fn test_unknown_nested_key_lists_siblings() {
        let err = resolve(&options(), &segments("server.hostname")).unwrap_err().to_string();
        assert_eq!(
            err,
            "--server does not accept key \"hostname\". Valid keys: host, port. Did you mean \"host\"?"
        );
    }

    #[test]
    fn test_nested_key_on_scalar() {
        let err = resolve(&options(), &segments("port.x")).unwrap_err().to_string();
        assert_eq!(err, "--port is a number and does not accept nested keys");
    }

    #[test]
    fn test_unknown_top_level_option() {
        let err = resolve(&options(), &segments("ports")).unwrap_err().to_string();
        assert_eq!(err, "Unknown option --ports. Did you mean \"port\"?");
    }
}
