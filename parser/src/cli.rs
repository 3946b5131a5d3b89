//! The CLI orchestrator.
//!
//! [`Cli::try_parse`] dispatches one argument vector in a fixed priority
//! order and never prints or exits:
//!
//! 1. `--version` (or `-v`) with a configured version → [`Outcome::Version`].
//! 2. `--help` (or `-h`) anywhere → [`Outcome::Help`], for the command named
//!    by the token right before it when there is one.
//! 3. A leading bare word naming a command → that command's scope is parsed
//!    and its action runs → [`Outcome::Command`].
//! 4. A leading bare word naming no command while commands exist → "Unknown
//!    command" error.
//! 5. Otherwise the CLI's own options and positionals → [`Outcome::Parsed`].
//!
//! Builtin flag scans stop at `--`. `-v` and `-h` are only builtins when no
//! option of the active scope claims that alias.
//!
//! [`Cli::parse`] wraps the same dispatch with a [`Presenter`] that prints
//! help, versions and errors and decides whether to exit.

use std::collections::HashSet;

use indexmap::IndexMap;
use schema_args_core::{PositionalSchema, Schema, did_you_mean, validate_layout};
use tracing::debug;

use crate::args::{ParsedArgs, parse_scope};
use crate::command::{Command, PendingAction};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::presenter::{Presenter, TerminalPresenter, Watch};

/// Result of dispatching one argument vector.
#[derive(Debug)]
pub enum Outcome {
    /// Main options and positionals were parsed.
    Parsed(ParsedArgs),
    /// Help was requested, for a command or (with `None`) the whole CLI.
    Help { command: Option<String> },
    /// The version string was requested.
    Version(String),
    /// A command matched and its action ran. `pending` is set when the
    /// action is still running.
    Command {
        name: String,
        pending: Option<PendingAction>,
    },
}

/// What [`Cli::parse`] leaves for the caller.
///
/// Holds the main scope's arguments when they were parsed, and the
/// [`Watch`] of a command action that is still running. Dropping a running
/// `Parsed` blocks until the action finishes.
#[must_use = "a running action is only awaited through `wait` or drop"]
#[derive(Debug, Default)]
pub struct Parsed {
    args: Option<ParsedArgs>,
    running: Option<Watch>,
}

impl Parsed {
    /// The main scope's arguments; `None` when help, version or a command
    /// handled the call.
    pub fn args(&self) -> Option<&ParsedArgs> {
        self.args.as_ref()
    }

    pub fn into_args(self) -> Option<ParsedArgs> {
        self.args
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Waits for a running action, returning its failure if it had one.
    pub fn wait(self) -> Result<()> {
        match self.running {
            Some(watch) => watch.wait(),
            None => Ok(()),
        }
    }
}

/// A command-line interface definition.
///
/// # Examples
///
/// ```
/// use schema_args_parser::{Cli, Outcome, Positional, Schema, Variadic};
/// use serde_json::json;
///
/// let cli = Cli::new()
///     .with_name("runner")
///     .option("port", Schema::number().min(1024.0).max(65535.0).with_default(8080))
///     .positional(Positional::new("task", Schema::string()))
///     .positional(Variadic::new("files", Schema::string()));
///
/// let Outcome::Parsed(args) = cli.try_parse(["build", "a.rs", "b.rs", "--port", "9000"]).unwrap() else {
///     panic!("expected parsed arguments");
/// };
/// assert_eq!(args.get("port"), Some(&json!(9000)));
/// assert_eq!(args.positionals, vec![json!("build")]);
/// assert_eq!(args.rest, vec![json!("a.rs"), json!("b.rs")]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cli {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    usage: Option<String>,
    examples: Vec<String>,
    options: IndexMap<String, Schema>,
    positionals: Vec<PositionalSchema>,
    commands: Vec<Command>,
}

impl Cli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enables `--version`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Declares a top-level option. Declaring the same name again replaces it.
    pub fn option(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.options.insert(name.into(), schema.into());
        self
    }

    pub fn positional(mut self, positional: impl Into<PositionalSchema>) -> Self {
        self.positionals.push(positional.into());
        self
    }

    /// Registers a sealed command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn options(&self) -> &IndexMap<String, Schema> {
        &self.options
    }

    pub fn positionals(&self) -> &[PositionalSchema] {
        &self.positionals
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name() == name)
    }

    /// Dispatches `argv` (without the program name).
    ///
    /// All per-call state lives on the stack of this call, so one `Cli` can
    /// parse any number of vectors, including concurrently.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for bad input, [`Error::Transform`] when a
    /// transform fails, [`Error::Definition`] for an invalid CLI or command
    /// layout, [`Error::Action`] when a synchronous action fails.
    pub fn try_parse<I, S>(&self, argv: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        self.check_definition()?;

        let routed = argv
            .first()
            .filter(|token| !token.starts_with('-'))
            .and_then(|token| self.find_command(token));
        let scope = routed.map_or(&self.options, Command::options);
        let boundary = argv.iter().position(|t| t == "--").unwrap_or(argv.len());
        let head = &argv[..boundary];

        if let Some(version) = &self.version {
            let wants_version = head
                .iter()
                .any(|t| t == "--version" || (t == "-v" && !alias_taken(scope, 'v')));
            if wants_version {
                debug!("version requested");
                return Ok(Outcome::Version(version.clone()));
            }
        }

        let help_at = head
            .iter()
            .position(|t| t == "--help" || (t == "-h" && !alias_taken(scope, 'h')));
        if let Some(at) = help_at {
            let command = at
                .checked_sub(1)
                .and_then(|previous| self.find_command(&head[previous]))
                .map(|c| c.name().to_string());
            debug!(?command, "help requested");
            return Ok(Outcome::Help { command });
        }

        if let Some(command) = routed {
            debug!(command = command.name(), "routing to command");
            let args = parse_scope(command.options(), command.positionals(), &argv[1..])?;
            let pending = command.run(args)?;
            return Ok(Outcome::Command {
                name: command.name().to_string(),
                pending,
            });
        }

        if let Some(first) = argv.first() {
            if !self.commands.is_empty() && !first.starts_with('-') {
                return Err(self.unknown_command(first));
            }
        }

        debug!(count = argv.len(), "parsing main scope");
        parse_scope(&self.options, &self.positionals, &argv).map(Outcome::Parsed)
    }

    /// Dispatches `argv` and presents the outcome in the terminal.
    ///
    /// Help and version output exit with code 0, errors with code 1, unless
    /// the `NO_EXIT` environment variable is set. Returns a [`Parsed`]
    /// holding the main scope's arguments or a still-running action, or the
    /// error when exiting is disabled. A running action that fails is
    /// reported and exits with code 1 before [`Parsed::wait`] returns.
    pub fn parse<I, S>(&self, argv: I) -> Result<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_with(argv, &TerminalPresenter::new(Settings::from_env()))
    }

    /// Like [`parse`](Self::parse) with a caller-supplied presenter.
    pub fn parse_with<I, S, P>(&self, argv: I, presenter: &P) -> Result<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: Presenter + ?Sized,
    {
        match self.try_parse(argv) {
            Ok(Outcome::Parsed(args)) => Ok(Parsed {
                args: Some(args),
                running: None,
            }),
            Ok(Outcome::Help { command }) => {
                let command = command.as_deref().and_then(|name| self.find_command(name));
                presenter.help(self, command);
                presenter.exit(0, None);
                Ok(Parsed::default())
            }
            Ok(Outcome::Version(version)) => {
                presenter.version(&version);
                presenter.exit(0, None);
                Ok(Parsed::default())
            }
            Ok(Outcome::Command { pending, .. }) => Ok(Parsed {
                args: None,
                running: pending.map(|pending| presenter.watch(pending)),
            }),
            Err(err) => {
                presenter.exit(1, Some(&err));
                Err(err)
            }
        }
    }

    fn check_definition(&self) -> Result<()> {
        validate_layout(&self.positionals)?;
        let mut seen = HashSet::new();
        for command in &self.commands {
            if !seen.insert(command.name()) {
                return Err(Error::Definition(format!(
                    "duplicate command `{}`",
                    command.name()
                )));
            }
        }
        Ok(())
    }

    fn unknown_command(&self, name: &str) -> Error {
        let names: Vec<&str> = self.commands.iter().map(Command::name).collect();
        let hint = did_you_mean(name, names.iter().copied());
        Error::invalid(
            "command",
            format!(
                "Unknown command \"{name}\".{hint} Available commands: {}",
                names.join(", ")
            ),
        )
    }
}

fn alias_taken(options: &IndexMap<String, Schema>, letter: char) -> bool {
    options.values().any(|schema| schema.alias_char() == Some(letter))
}
