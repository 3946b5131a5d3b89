//! Schema-driven command-line argument parsing.
//!
//! Options are declared as [`Schema`]s, so every flag value is validated,
//! coerced and defaulted by the same engine that validates configuration
//! files. On top of the schemas this crate adds:
//!
//! - flag scanning with `--name value`, `--name=value`, `-abc` alias bundles,
//!   `--no-name` negation and `--` boundaries;
//! - dotted paths (`--server.host example.org`, `--env."app.name" x`)
//!   that build nested objects and records;
//! - positional arguments and one trailing variadic;
//! - named [`Command`]s with their own scopes and actions;
//! - help, version and running-action handling through a [`Presenter`].
//!
//! # Example
//!
//! ```
//! use schema_args_parser::{Cli, Outcome, Schema};
//! use serde_json::json;
//!
//! let cli = Cli::new()
//!     .with_name("serve")
//!     .with_version("1.0.0")
//!     .option("port", Schema::number().int().min(1024.0).with_default(8080).alias('p'))
//!     .option("server", Schema::object().field("host", Schema::string().with_default("localhost")))
//!     .option("verbose", Schema::boolean());
//!
//! let Outcome::Parsed(args) = cli.try_parse(["-p", "9000", "--server.host", "0.0.0.0"]).unwrap() else {
//!     panic!("expected parsed arguments");
//! };
//! assert_eq!(args.get("port"), Some(&json!(9000)));
//! assert_eq!(args.get("server"), Some(&json!({"host": "0.0.0.0"})));
//! assert_eq!(args.get("verbose"), Some(&json!(false)));
//!
//! let err = cli.try_parse(["--port", "80"]).unwrap_err();
//! assert_eq!(err.to_string(), "--port must be at least 1024");
//! ```

mod args;
mod cli;
mod command;
mod config;
mod error;
mod path;
mod positional;
mod presenter;
mod token;
mod tree;

pub use args::ParsedArgs;
pub use cli::{Cli, Outcome, Parsed};
pub use command::{ActionOutcome, Command, CommandBuilder, IntoActionOutcome, PendingAction};
pub use config::{NO_EXIT_VAR, Settings};
pub use error::{Error, Result};
pub use presenter::{Presenter, TerminalPresenter, Watch, render_help};
pub use schema_args_core::{
    ArraySchema, BooleanSchema, BoxError, NumberSchema, ObjectSchema, Positional,
    PositionalSchema, RecordSchema, Schema, SchemaError, SchemaKind, StringSchema, UnionSchema,
    ValidationError, Value, Variadic,
};
