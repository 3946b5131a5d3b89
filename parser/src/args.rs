//! Flag scanning and option validation for one scope.
//!
//! A scope is the option map plus positional layout of either the CLI itself
//! or one command. Parsing a scope runs in three steps:
//!
//! 1. [`scan`] walks argv once, resolving each flag to the schema it
//!    addresses, deciding its arity from that schema and collecting raw
//!    values into an [`OptionTree`]. Non-flag tokens (and everything after
//!    `--`) are collected as positional tokens.
//! 2. Every declared option is validated from the tree, in declaration
//!    order, at path `--<name>`.
//! 3. Positional tokens are matched against the layout.

use indexmap::IndexMap;
use schema_args_core::{PositionalSchema, Schema, validate_layout};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::path::{display_path, resolve, split_path, unknown_option};
use crate::positional::resolve_positionals;
use crate::token::{Token, classify, is_bool_literal, is_flag_like};
use crate::tree::OptionTree;

/// Validated result of a parse.
///
/// # Examples
///
/// ```
/// use schema_args_parser::{Cli, Outcome, Schema};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Opts {
///     port: u16,
///     verbose: bool,
/// }
///
/// let cli = Cli::new()
///     .option("port", Schema::number().with_default(8080))
///     .option("verbose", Schema::boolean().alias('V'));
///
/// let Outcome::Parsed(args) = cli.try_parse(["-V"]).unwrap() else {
///     panic!("expected parsed arguments");
/// };
/// let opts: Opts = args.options_as().unwrap();
/// assert_eq!(opts.port, 8080);
/// assert!(opts.verbose);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    /// Validated options keyed by name; optional options without a value
    /// are omitted.
    pub options: Map<String, Value>,
    /// Fixed positionals, one entry per declared positional (`null` when an
    /// optional one is absent). Raw strings when no layout is declared.
    pub positionals: Vec<Value>,
    /// Items taken by the trailing variadic positional.
    pub rest: Vec<Value>,
}

impl ParsedArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// Deserializes the option map into a caller-defined type.
    pub fn options_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.options.clone()))
    }
}

/// Parses `argv` against one scope.
pub(crate) fn parse_scope(
    options: &IndexMap<String, Schema>,
    layout: &[PositionalSchema],
    argv: &[String],
) -> Result<ParsedArgs> {
    validate_layout(layout)?;

    let Scanned { tree, tokens } = scan(argv, options)?;

    let mut validated = Map::new();
    for (key, schema) in options {
        if let Some(value) = schema.parse(tree.get(key), &format!("--{key}"))? {
            validated.insert(key.clone(), value);
        }
    }

    let (positionals, rest) = resolve_positionals(layout, tokens)?;
    Ok(ParsedArgs {
        options: validated,
        positionals,
        rest,
    })
}

struct Scanned {
    tree: OptionTree,
    tokens: Vec<String>,
}

/// A long flag resolved against the option map.
struct Flag<'s> {
    segments: Vec<String>,
    top: &'s Schema,
    leaf: &'s Schema,
    negated: bool,
}

fn scan(argv: &[String], options: &IndexMap<String, Schema>) -> Result<Scanned> {
    let mut tree = OptionTree::new();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < argv.len() {
        let token = argv[index].as_str();
        index += 1;

        match classify(token) {
            Token::Boundary => {
                trace!(count = argv.len() - index, "raw arguments after --");
                tokens.extend(argv[index..].iter().cloned());
                break;
            }
            Token::Value(value) => tokens.push(value.to_string()),
            Token::Long { name, inline } => {
                let flag = lookup_long(options, name)?;
                let label = display_path(&flag.segments);
                let value = if flag.negated {
                    if inline.is_some() {
                        return Err(Error::at(&format!("--{name}"), "does not take a value"));
                    }
                    Value::Bool(false)
                } else {
                    take_value(flag.leaf, &label, inline, argv, &mut index)?
                };
                trace!(flag = %label, negated = flag.negated, %value, "long flag");
                tree.assign(&flag.segments, value, flag.top, flag.leaf)?;
            }
            Token::Short { letters, inline } => {
                if letters.is_empty() {
                    return Err(Error::invalid(token, format!("Invalid flag {token}")));
                }
                let count = letters.chars().count();
                for (position, letter) in letters.chars().enumerate() {
                    let (key, schema) = lookup_alias(options, letter)?;
                    let flag = format!("-{letter}");
                    let value = if position + 1 == count {
                        take_value(schema, &flag, inline, argv, &mut index)?
                    } else if matches!(schema, Schema::Boolean(_)) {
                        Value::Bool(true)
                    } else {
                        return Err(Error::at(
                            &flag,
                            format!("needs a value and must come last in -{letters}"),
                        ));
                    };
                    debug!(alias = %flag, option = %key, "alias resolved");
                    tree.assign(std::slice::from_ref(key), value, schema, schema)?;
                }
            }
        }
    }

    Ok(Scanned { tree, tokens })
}

/// Resolves a long flag name, trying it as written before reading a `no-`
/// prefix as negation.
fn lookup_long<'s>(options: &'s IndexMap<String, Schema>, name: &str) -> Result<Flag<'s>> {
    if let Some(flag) = declared(options, name, false)? {
        return Ok(flag);
    }
    if let Some(stripped) = name.strip_prefix("no-") {
        if let Some(flag) = declared(options, stripped, true)? {
            let label = display_path(&flag.segments);
            if !flag.leaf.accepts_negation() {
                return Err(Error::at(&label, "cannot be negated"));
            }
            debug!(flag = %label, "negation");
            return Ok(flag);
        }
        let head = stripped.split('.').next().unwrap_or(stripped);
        return Err(unknown_option(options, name, head));
    }
    let head = name.split('.').next().unwrap_or(name);
    Err(unknown_option(options, name, head))
}

/// Returns the flag when its first segment is a declared option.
fn declared<'s>(
    options: &'s IndexMap<String, Schema>,
    name: &str,
    negated: bool,
) -> Result<Option<Flag<'s>>> {
    let segments = split_path(name)?;
    let Some(top) = segments.first().and_then(|key| options.get(key)) else {
        return Ok(None);
    };
    let leaf = resolve(options, &segments)?;
    Ok(Some(Flag {
        segments,
        top,
        leaf,
        negated,
    }))
}

/// Finds the option whose alias is `letter`. The last declaration wins.
fn lookup_alias(options: &IndexMap<String, Schema>, letter: char) -> Result<(&String, &Schema)> {
    if let Some(found) = options
        .iter()
        .rev()
        .find(|(_, schema)| schema.alias_char() == Some(letter))
    {
        return Ok(found);
    }

    let available = options
        .values()
        .filter_map(Schema::alias_char)
        .map(|c| format!("-{c}"))
        .collect::<Vec<_>>();
    let available = if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    };
    let flag = format!("-{letter}");
    Err(Error::invalid(
        &flag,
        format!("Unknown alias {flag}. Available aliases: {available}"),
    ))
}

/// Reads the value for a flag whose schema is `schema`.
///
/// Booleans toggle and only take a following boolean literal. Unions take a
/// following non-flag token when there is one and read as `true` otherwise.
/// Every other kind needs a value.
fn take_value(
    schema: &Schema,
    label: &str,
    inline: Option<&str>,
    argv: &[String],
    index: &mut usize,
) -> Result<Value> {
    if let Some(inline) = inline {
        return Ok(Value::String(inline.to_string()));
    }

    let next = argv.get(*index).map(String::as_str);
    let consumed = match (schema, next) {
        (Schema::Boolean(_), Some(next)) if is_bool_literal(next) => Some(next),
        (Schema::Boolean(_), _) => None,
        (_, Some(next)) if !is_flag_like(next) => Some(next),
        (Schema::Union(_), _) => None,
        _ => return Err(Error::at(label, "needs a value")),
    };

    match consumed {
        Some(value) => {
            *index += 1;
            Ok(Value::String(value.to_string()))
        }
        None => Ok(Value::Bool(true)),
    }
}
