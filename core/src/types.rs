//! Schema type definitions.
//!
//! One builder per data kind ([`StringSchema`], [`NumberSchema`],
//! [`BooleanSchema`], [`ArraySchema`], [`ObjectSchema`], [`RecordSchema`],
//! [`UnionSchema`]) plus the erased [`Schema`] enum that the validator and
//! the argument parser match on.
//!
//! Modifiers (`optional`, `with_default`, `describe`, `alias`, `example`,
//! `transform`) consume the builder and return a new value. Cloning a schema
//! copies its scalar fields; transform closures are shared behind an [`Arc`]
//! and are never mutated.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;

/// Discriminant of a [`Schema`].
///
/// # Examples
///
/// ```
/// use schema_args_core::{Schema, SchemaKind};
///
/// let schema: Schema = Schema::array(Schema::string()).into();
/// assert_eq!(schema.kind(), SchemaKind::Array);
/// assert_eq!(SchemaKind::Record.to_string(), "object");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Boolean,
    Array,
    /// Object with a fixed shape.
    Object,
    /// Object accepting any key.
    Record,
    Union,
}

impl SchemaKind {
    /// JSON-ish type name shown to users. Both object kinds read as `object`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object | Self::Record => "object",
            Self::Union => "union",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type TransformFn = dyn Fn(Value) -> Result<Value, SchemaError> + Send + Sync;

/// A post-validation mapping step attached with `transform`.
#[derive(Clone)]
pub(crate) struct Transform(Arc<TransformFn>);

impl Transform {
    pub(crate) fn apply(&self, value: Value) -> Result<Value, SchemaError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// Metadata shared by every kind.
#[derive(Debug, Clone, Default)]
pub(crate) struct Meta {
    pub(crate) optional: bool,
    pub(crate) default: Option<Value>,
    pub(crate) description: Option<String>,
    pub(crate) alias: Option<char>,
    pub(crate) example: Option<String>,
    pub(crate) transforms: Vec<Transform>,
}

/// A constraint value with an optional custom failure message.
#[derive(Debug, Clone)]
pub(crate) struct Bound<T> {
    pub(crate) value: T,
    pub(crate) message: Option<String>,
}

impl<T> Bound<T> {
    fn new(value: T, message: Option<String>) -> Self {
        Self { value, message }
    }
}

/// Regex constraint for strings.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub(crate) regex: Regex,
    pub(crate) message: Option<String>,
}

/// String schema with length, pattern and choice constraints.
#[derive(Debug, Clone)]
pub struct StringSchema {
    pub(crate) meta: Meta,
    pub(crate) min_length: Option<Bound<usize>>,
    pub(crate) max_length: Option<Bound<usize>>,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) choices: Vec<String>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            meta: Meta::default(),
            min_length: None,
            max_length: None,
            pattern: None,
            choices: Vec::new(),
        }
    }

    /// Requires at least `n` characters.
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(Bound::new(n, None));
        self
    }

    pub fn min_length_msg(mut self, n: usize, message: impl Into<String>) -> Self {
        self.min_length = Some(Bound::new(n, Some(message.into())));
        self
    }

    /// Allows at most `n` characters.
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(Bound::new(n, None));
        self
    }

    pub fn max_length_msg(mut self, n: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(Bound::new(n, Some(message.into())));
        self
    }

    /// Requires the value to match `regex`.
    pub fn regex(mut self, regex: Regex) -> Self {
        self.pattern = Some(Pattern {
            regex,
            message: None,
        });
        self
    }

    pub fn regex_msg(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some(Pattern {
            regex,
            message: Some(message.into()),
        });
        self
    }

    /// Restricts the value to an ordered set of choices.
    ///
    /// Order is kept; the first choice is the one presentation layers
    /// suggest by default.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices.clear();
        for choice in choices {
            let choice = choice.into();
            if !self.choices.contains(&choice) {
                self.choices.push(choice);
            }
        }
        self
    }

    pub fn choice_list(&self) -> &[String] {
        &self.choices
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Number schema with range and sign constraints.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) meta: Meta,
    pub(crate) min: Option<Bound<f64>>,
    pub(crate) max: Option<Bound<f64>>,
    pub(crate) int: Option<Bound<()>>,
    pub(crate) positive: Option<Bound<()>>,
    pub(crate) negative: Option<Bound<()>>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(Bound::new(min, None));
        self
    }

    pub fn min_msg(mut self, min: f64, message: impl Into<String>) -> Self {
        self.min = Some(Bound::new(min, Some(message.into())));
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(Bound::new(max, None));
        self
    }

    pub fn max_msg(mut self, max: f64, message: impl Into<String>) -> Self {
        self.max = Some(Bound::new(max, Some(message.into())));
        self
    }

    pub fn int(mut self) -> Self {
        self.int = Some(Bound::new((), None));
        self
    }

    pub fn int_msg(mut self, message: impl Into<String>) -> Self {
        self.int = Some(Bound::new((), Some(message.into())));
        self
    }

    /// Requires a value strictly greater than zero.
    pub fn positive(mut self) -> Self {
        self.positive = Some(Bound::new((), None));
        self
    }

    pub fn positive_msg(mut self, message: impl Into<String>) -> Self {
        self.positive = Some(Bound::new((), Some(message.into())));
        self
    }

    /// Requires a value strictly less than zero.
    pub fn negative(mut self) -> Self {
        self.negative = Some(Bound::new((), None));
        self
    }

    pub fn negative_msg(mut self, message: impl Into<String>) -> Self {
        self.negative = Some(Bound::new((), Some(message.into())));
        self
    }
}

/// Boolean schema. Absent input reads as `false` unless optional or defaulted.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) meta: Meta,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sequence schema; every element is validated with the item schema.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub(crate) meta: Meta,
    pub(crate) item: Box<Schema>,
    pub(crate) min_length: Option<Bound<usize>>,
    pub(crate) max_length: Option<Bound<usize>>,
}

impl ArraySchema {
    pub fn new(item: impl Into<Schema>) -> Self {
        Self {
            meta: Meta::default(),
            item: Box::new(item.into()),
            min_length: None,
            max_length: None,
        }
    }

    /// Requires at least `n` items.
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(Bound::new(n, None));
        self
    }

    pub fn min_length_msg(mut self, n: usize, message: impl Into<String>) -> Self {
        self.min_length = Some(Bound::new(n, Some(message.into())));
        self
    }

    /// Allows at most `n` items.
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(Bound::new(n, None));
        self
    }

    pub fn max_length_msg(mut self, n: usize, message: impl Into<String>) -> Self {
        self.max_length = Some(Bound::new(n, Some(message.into())));
        self
    }

    pub fn item(&self) -> &Schema {
        &self.item
    }
}

/// Object schema with a fixed, ordered shape. Unknown keys are rejected.
///
/// # Examples
///
/// ```
/// use schema_args_core::Schema;
///
/// let server = Schema::object()
///     .field("host", Schema::string())
///     .field("port", Schema::number().optional());
/// assert_eq!(server.keys().collect::<Vec<_>>(), vec!["host", "port"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub(crate) meta: Meta,
    pub(crate) shape: IndexMap<String, Schema>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a field, keeping first-insertion order.
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.shape.insert(name.into(), schema.into());
        self
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.shape
    }

    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.shape.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shape.keys().map(String::as_str)
    }
}

/// Object schema accepting any key; every value uses the value schema.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub(crate) meta: Meta,
    pub(crate) value: Box<Schema>,
}

impl RecordSchema {
    pub fn new(value: impl Into<Schema>) -> Self {
        Self {
            meta: Meta::default(),
            value: Box::new(value.into()),
        }
    }

    pub fn value_schema(&self) -> &Schema {
        &self.value
    }
}

/// Ordered alternatives. See [`crate::union`] for how a variant is chosen.
#[derive(Debug, Clone, Default)]
pub struct UnionSchema {
    pub(crate) meta: Meta,
    pub(crate) variants: Vec<Schema>,
}

impl UnionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(mut self, schema: impl Into<Schema>) -> Self {
        self.variants.push(schema.into());
        self
    }

    pub fn variants(&self) -> &[Schema] {
        &self.variants
    }
}

/// A schema of any kind.
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    Record(RecordSchema),
    Union(UnionSchema),
}

impl Schema {
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    pub fn boolean() -> BooleanSchema {
        BooleanSchema::new()
    }

    pub fn array(item: impl Into<Schema>) -> ArraySchema {
        ArraySchema::new(item)
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    pub fn record(value: impl Into<Schema>) -> RecordSchema {
        RecordSchema::new(value)
    }

    /// Creates a union from a list of variants.
    ///
    /// ```
    /// use schema_args_core::Schema;
    ///
    /// let port_or_name = Schema::union([Schema::number().into(), Schema::string().into()]);
    /// assert_eq!(port_or_name.variants().len(), 2);
    /// ```
    pub fn union(variants: impl IntoIterator<Item = Schema>) -> UnionSchema {
        UnionSchema {
            meta: Meta::default(),
            variants: variants.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::String(_) => SchemaKind::String,
            Self::Number(_) => SchemaKind::Number,
            Self::Boolean(_) => SchemaKind::Boolean,
            Self::Array(_) => SchemaKind::Array,
            Self::Object(_) => SchemaKind::Object,
            Self::Record(_) => SchemaKind::Record,
            Self::Union(_) => SchemaKind::Union,
        }
    }

    pub(crate) fn meta(&self) -> &Meta {
        match self {
            Self::String(s) => &s.meta,
            Self::Number(s) => &s.meta,
            Self::Boolean(s) => &s.meta,
            Self::Array(s) => &s.meta,
            Self::Object(s) => &s.meta,
            Self::Record(s) => &s.meta,
            Self::Union(s) => &s.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Self::String(s) => &mut s.meta,
            Self::Number(s) => &mut s.meta,
            Self::Boolean(s) => &mut s.meta,
            Self::Array(s) => &mut s.meta,
            Self::Object(s) => &mut s.meta,
            Self::Record(s) => &mut s.meta,
            Self::Union(s) => &mut s.meta,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.meta().optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.meta().default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta().description.as_deref()
    }

    /// Single-letter short flag (`-x`).
    pub fn alias_char(&self) -> Option<char> {
        self.meta().alias
    }

    pub fn example_text(&self) -> Option<&str> {
        self.meta().example.as_deref()
    }

    /// Whether an absent value fails with "required".
    ///
    /// Booleans are never required: absence reads as `false`. A union is
    /// required only when every variant is.
    pub fn is_required(&self) -> bool {
        let meta = self.meta();
        if meta.optional || meta.default.is_some() {
            return false;
        }
        match self {
            Self::Boolean(_) => false,
            Self::Union(u) => u.variants.iter().all(Schema::is_required),
            _ => true,
        }
    }

    /// Whether help output should offer a `--no-<name>` form.
    ///
    /// True for a boolean defaulting to `true`, or a union holding one.
    /// The parser accepts `--no-` for any boolean; this only gates help.
    ///
    /// ```
    /// use schema_args_core::Schema;
    ///
    /// let on: Schema = Schema::boolean().with_default(true).into();
    /// let off: Schema = Schema::boolean().into();
    /// assert!(on.advertises_negation());
    /// assert!(!off.advertises_negation());
    /// ```
    pub fn advertises_negation(&self) -> bool {
        match self {
            Self::Boolean(b) => b.meta.default == Some(Value::Bool(true)),
            Self::Union(u) => u.variants.iter().any(|v| {
                matches!(v, Self::Boolean(b) if b.meta.default == Some(Value::Bool(true)))
            }),
            _ => false,
        }
    }

    /// Whether the parser accepts `--no-<name>` for this schema.
    pub fn accepts_negation(&self) -> bool {
        match self {
            Self::Boolean(_) => true,
            Self::Union(u) => u.variants.iter().any(|v| matches!(v, Self::Boolean(_))),
            _ => false,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionSchema> {
        match self {
            Self::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Whether the schema (or one of its union variants) takes nested keys.
    pub fn accepts_nested(&self) -> bool {
        match self {
            Self::Object(_) | Self::Record(_) => true,
            Self::Union(u) => u.variants.iter().any(Schema::accepts_nested),
            _ => false,
        }
    }

    /// Whether the schema accepts a plain (non-nested) value.
    pub fn accepts_simple(&self) -> bool {
        match self {
            Self::Object(_) | Self::Record(_) => false,
            Self::Union(u) => u.variants.iter().any(Schema::accepts_simple),
            _ => true,
        }
    }
}

macro_rules! impl_into_schema {
    ($($ty:ident => $variant:ident),* $(,)?) => {$(
        impl From<$ty> for Schema {
            fn from(schema: $ty) -> Self {
                Schema::$variant(schema)
            }
        }
    )*};
}

impl_into_schema!(
    StringSchema => String,
    NumberSchema => Number,
    BooleanSchema => Boolean,
    ArraySchema => Array,
    ObjectSchema => Object,
    RecordSchema => Record,
    UnionSchema => Union,
);

macro_rules! impl_modifiers {
    ($($ty:ty => |$s:ident| $meta:expr),* $(,)?) => {$(
        impl $ty {
            /// Absent input yields no value instead of failing.
            pub fn optional(mut self) -> Self {
                let $s = &mut self;
                $meta.optional = true;
                self
            }

            /// Value used when the input is absent. Wins over `optional`.
            pub fn with_default(mut self, value: impl Into<Value>) -> Self {
                let $s = &mut self;
                $meta.default = Some(value.into());
                self
            }

            pub fn describe(mut self, description: impl Into<String>) -> Self {
                let $s = &mut self;
                $meta.description = Some(description.into());
                self
            }

            /// Short flag letter, used as `-x`.
            pub fn alias(mut self, letter: char) -> Self {
                let $s = &mut self;
                $meta.alias = Some(letter);
                self
            }

            pub fn example(mut self, example: impl Into<String>) -> Self {
                let $s = &mut self;
                $meta.example = Some(example.into());
                self
            }

            /// Maps the validated value. Transforms run in chaining order.
            pub fn transform<F>(mut self, f: F) -> Self
            where
                F: Fn(Value) -> Result<Value, SchemaError> + Send + Sync + 'static,
            {
                let $s = &mut self;
                $meta.transforms.push(Transform(Arc::new(f)));
                self
            }
        }
    )*};
}

impl_modifiers!(
    StringSchema => |s| s.meta,
    NumberSchema => |s| s.meta,
    BooleanSchema => |s| s.meta,
    ArraySchema => |s| s.meta,
    ObjectSchema => |s| s.meta,
    RecordSchema => |s| s.meta,
    UnionSchema => |s| s.meta,
    Schema => |s| s.meta_mut(),
);
