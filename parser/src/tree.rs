//! Raw option tree built while scanning flags.
//!
//! The tree is allocated fresh for every parse call. It records, per
//! top-level key, whether the key was used in the simple form (`--cache x`)
//! or the dotted form (`--cache.dir x`), and refuses to mix the two unless
//! the key is a union that accepts both. In that case the later form wins
//! and replaces the earlier value.

use std::collections::HashMap;

use schema_args_core::{Schema, SchemaKind, array_items};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::path::display_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Usage {
    Simple,
    Dotted,
}

#[derive(Debug, Default)]
pub(crate) struct OptionTree {
    values: Map<String, Value>,
    usage: HashMap<String, Usage>,
}

impl OptionTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `segments`.
    ///
    /// `top` is the schema of the first segment, `leaf` the schema the path
    /// ends at. Repeated leaves accumulate into a sequence; array leaves are
    /// split on commas first so `--tags a,b --tags c` yields three items.
    pub(crate) fn assign(
        &mut self,
        segments: &[String],
        value: Value,
        top: &Schema,
        leaf: &Schema,
    ) -> Result<()> {
        let Some((key, rest)) = segments.split_first() else {
            return Ok(());
        };
        let usage = if rest.is_empty() {
            Usage::Simple
        } else {
            Usage::Dotted
        };

        match self.usage.get(key) {
            Some(previous) if *previous != usage => {
                if matches!(top, Schema::Union(_)) && top.accepts_simple() && top.accepts_nested() {
                    debug!(option = %key, ?usage, "union form switched, replacing earlier value");
                    self.values.remove(key);
                } else {
                    return Err(Error::at(
                        &format!("--{key}"),
                        format!("cannot be used both as --{key} <value> and --{key}.<key> <value>"),
                    ));
                }
            }
            _ => {}
        }
        self.usage.insert(key.clone(), usage);

        let value = if leaf.kind() == SchemaKind::Array && value.is_string() {
            Value::Array(array_items(&value))
        } else {
            value
        };

        let Some((last, middle)) = rest.split_last() else {
            accumulate(&mut self.values, key, value);
            return Ok(());
        };

        let mut node = self
            .values
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        for (depth, segment) in middle.iter().enumerate() {
            let Value::Object(object) = node else {
                return Err(conflict(segments, depth + 1));
            };
            node = object
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let Value::Object(object) = node else {
            return Err(conflict(segments, segments.len() - 1));
        };
        accumulate(object, last, value);
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Error for a dotted path running through a value that is not an object.
/// `depth` is the number of leading segments that hold that value.
fn conflict(segments: &[String], depth: usize) -> Error {
    let prefix = display_path(&segments[..depth]);
    Error::at(
        &display_path(segments),
        format!("conflicts with the earlier value given to {prefix}"),
    )
}

fn accumulate(map: &mut Map<String, Value>, key: &str, value: Value) {
    if let Some(existing) = map.get_mut(key) {
        match existing {
            Value::Array(items) => match value {
                Value::Array(more) => items.extend(more),
                other => items.push(other),
            },
            other => {
                let first = other.take();
                *other = Value::Array(vec![first, value]);
            }
        }
        return;
    }
    map.insert(key.to_string(), value);
}
