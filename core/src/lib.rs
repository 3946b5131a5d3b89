//! Composable value schemas for command-line arguments.
//!
//! This crate defines the validation engine that the argument parser builds
//! on:
//!
//! - [`Schema`]: an erased schema of one kind (string, number, boolean,
//!   array, fixed-shape object, any-key record, union), built with the typed
//!   builders [`StringSchema`], [`NumberSchema`], [`ArraySchema`],
//!   [`ObjectSchema`], [`RecordSchema`] and [`UnionSchema`].
//! - [`Positional`] and [`Variadic`]: named positional arguments, joined as
//!   [`PositionalSchema`] in an ordered layout checked by
//!   [`validate_layout`].
//! - [`ValidationError`]: the single validation-layer error kind, carrying a
//!   human path (`--server.port`, `argument <count>`) and a message that
//!   starts with it.
//!
//! Raw and validated values are [`serde_json::Value`]s. Union variants are
//! chosen by the rules in [`union`]; suggestions for unknown names come from
//! [`suggest()`].
//!
//! # Example
//!
//! ```
//! use schema_args_core::*;
//! use serde_json::json;
//!
//! let server: Schema = Schema::object()
//!     .field("host", Schema::string().with_default("localhost"))
//!     .field("port", Schema::number().int().min(1.0))
//!     .into();
//!
//! let parsed = server.parse(Some(&json!({"port": "8080"})), "--server").unwrap();
//! assert_eq!(parsed, Some(json!({"host": "localhost", "port": 8080})));
//!
//! let err = server.parse(Some(&json!({"port": "0"})), "--server").unwrap_err();
//! assert_eq!(err.to_string(), "--server.port must be at least 1");
//! ```

mod error;
mod layout;
mod positional;
mod suggest;
mod types;
pub mod union;
mod validate;

pub use error::{BoxError, Result, SchemaError, ValidationError};
pub use layout::{LayoutError, validate_layout};
pub use positional::{Positional, PositionalSchema, Variadic};
pub use serde_json::Value;
pub use suggest::{did_you_mean, suggest};
pub use types::*;
pub use validate::array_items;
