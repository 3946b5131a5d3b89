//! Presentation hook.
//!
//! The parser never prints or exits on its own. [`Cli::parse_with`] hands
//! help requests, version requests, errors and still-running actions to a
//! [`Presenter`]. [`TerminalPresenter`] is the plain default used by
//! [`Cli::parse`].

use std::fmt::{self, Write as _};
use std::thread::{self, JoinHandle};

use indexmap::IndexMap;
use schema_args_core::{PositionalSchema, Schema};
use tracing::debug;

use crate::cli::Cli;
use crate::command::{Command, PendingAction};
use crate::config::Settings;
use crate::error::{Error, Result};

/// Receives everything [`Cli::parse_with`] would otherwise print or exit on.
pub trait Presenter {
    /// Shows help for `command`, or for the whole CLI when `None`.
    fn help(&self, cli: &Cli, command: Option<&Command>);

    fn version(&self, version: &str);

    /// Reports `error` (if any) and terminates with `code`. Implementations
    /// that do not terminate simply return.
    fn exit(&self, code: i32, error: Option<&Error>);

    /// Takes ownership of an action that is still running and returns the
    /// guard that owns its outcome. Must not block.
    fn watch(&self, pending: PendingAction) -> Watch;
}

/// A still-running action being watched on its own thread.
///
/// The watcher is joined by [`wait`](Self::wait), or when the guard is
/// dropped, so a failure is reported before the process moves on.
#[must_use = "dropping a Watch blocks until the action finishes"]
pub struct Watch {
    command: String,
    handle: Option<JoinHandle<Result<()>>>,
}

impl Watch {
    /// Runs `watcher` on a new thread for the action of `command`.
    pub fn spawn<F>(command: impl Into<String>, watcher: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            command: command.into(),
            handle: Some(thread::spawn(watcher)),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Blocks until the watcher finishes and returns the action's result.
    pub fn wait(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(Error::Action {
                    command: self.command.clone(),
                    source: "watcher thread panicked".into(),
                })
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("command", &self.command)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

/// Prints to stdout/stderr and exits the process unless
/// [`Settings::no_exit`] is set.
#[derive(Debug, Clone, Default)]
pub struct TerminalPresenter {
    settings: Settings,
}

impl TerminalPresenter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Presenter for TerminalPresenter {
    fn help(&self, cli: &Cli, command: Option<&Command>) {
        print!("{}", render_help(cli, command));
    }

    fn version(&self, version: &str) {
        println!("{version}");
    }

    fn exit(&self, code: i32, error: Option<&Error>) {
        if let Some(err) = error {
            eprintln!("error: {err}");
        }
        if self.settings.no_exit {
            debug!(code, "exit suppressed");
            return;
        }
        std::process::exit(code);
    }

    fn watch(&self, pending: PendingAction) -> Watch {
        let presenter = self.clone();
        let command = pending.command().to_string();
        debug!(command = %command, "watching pending action");
        Watch::spawn(command, move || {
            let result = pending.wait();
            if let Err(err) = &result {
                presenter.exit(1, Some(err));
            }
            result
        })
    }
}

/// Renders a plain help screen.
///
/// # Examples
///
/// ```
/// use schema_args_parser::{Cli, Schema, render_help};
///
/// let cli = Cli::new()
///     .with_name("serve")
///     .option("port", Schema::number().alias('p').describe("Port to bind"));
///
/// let help = render_help(&cli, None);
/// assert!(help.contains("Usage: serve [options]"));
/// assert!(help.contains("-p, --port <number>"));
/// ```
pub fn render_help(cli: &Cli, command: Option<&Command>) -> String {
    let program = cli.name().unwrap_or("cli");
    let mut out = String::new();

    match command {
        Some(command) => {
            let usage = command.usage().map(str::to_string).unwrap_or_else(|| {
                generated_usage(&format!("{program} {}", command.name()), command.positionals(), false)
            });
            let _ = writeln!(out, "Usage: {usage}");
            if let Some(description) = command.description() {
                let _ = writeln!(out, "\n{description}");
            }
            arguments_section(&mut out, command.positionals());
            options_section(&mut out, command.options(), &[]);
            examples_section(&mut out, command.examples());
        }
        None => {
            match cli.version() {
                Some(version) => {
                    let _ = writeln!(out, "{program} {version}");
                }
                None => {
                    let _ = writeln!(out, "{program}");
                }
            }
            if let Some(description) = cli.description() {
                let _ = writeln!(out, "{description}");
            }
            let usage = cli.usage().map(str::to_string).unwrap_or_else(|| {
                generated_usage(program, cli.positionals(), !cli.commands().is_empty())
            });
            let _ = writeln!(out, "\nUsage: {usage}");

            if !cli.commands().is_empty() {
                let rows = cli
                    .commands()
                    .iter()
                    .map(|c| (c.name().to_string(), c.description().unwrap_or_default().to_string()))
                    .collect::<Vec<_>>();
                section(&mut out, "Commands", &rows);
            }
            arguments_section(&mut out, cli.positionals());

            let mut builtins = vec![builtin(cli.options(), 'h', "help", "Show help")];
            if cli.version().is_some() {
                builtins.push(builtin(cli.options(), 'v', "version", "Show version"));
            }
            options_section(&mut out, cli.options(), &builtins);
            examples_section(&mut out, cli.examples());
        }
    }
    out
}

fn generated_usage(program: &str, positionals: &[PositionalSchema], has_commands: bool) -> String {
    let mut parts = vec![program.to_string()];
    if has_commands {
        parts.push("<command>".to_string());
    }
    parts.push("[options]".to_string());
    for entry in positionals {
        parts.push(match entry {
            PositionalSchema::Variadic(v) => format!("[{}...]", v.name()),
            PositionalSchema::Single(p) if p.schema().is_required() => format!("<{}>", p.name()),
            PositionalSchema::Single(p) => format!("[{}]", p.name()),
        });
    }
    parts.join(" ")
}

fn builtin(options: &IndexMap<String, Schema>, letter: char, long: &str, text: &str) -> (String, String) {
    let taken = options.values().any(|s| s.alias_char() == Some(letter));
    let flag = if taken {
        format!("    --{long}")
    } else {
        format!("-{letter}, --{long}")
    };
    (flag, text.to_string())
}

fn arguments_section(out: &mut String, positionals: &[PositionalSchema]) {
    let rows = positionals
        .iter()
        .map(|entry| {
            let name = match entry {
                PositionalSchema::Variadic(v) => format!("{}...", v.name()),
                PositionalSchema::Single(p) => p.name().to_string(),
            };
            (name, entry.description().unwrap_or_default().to_string())
        })
        .collect::<Vec<_>>();
    section(out, "Arguments", &rows);
}

fn options_section(
    out: &mut String,
    options: &IndexMap<String, Schema>,
    builtins: &[(String, String)],
) {
    let mut rows = Vec::new();
    for (name, schema) in options {
        option_rows(&format!("--{name}"), schema, true, &mut rows);
    }
    rows.extend(builtins.iter().cloned());
    section(out, "Options", &rows);
}

fn option_rows(flag: &str, schema: &Schema, top: bool, rows: &mut Vec<(String, String)>) {
    let alias = match (top, schema.alias_char()) {
        (true, Some(letter)) => format!("-{letter}, "),
        (true, None) => "    ".to_string(),
        (false, _) => "    ".to_string(),
    };

    let mut text = schema.description().unwrap_or_default().to_string();
    if let Some(default) = schema.default_value() {
        if !text.is_empty() {
            text.push(' ');
        }
        let _ = write!(text, "(default: {default})");
    }

    match schema {
        Schema::Object(object) => {
            for (key, field) in object.shape() {
                option_rows(&format!("{flag}.{key}"), field, false, rows);
            }
            return;
        }
        Schema::Record(record) => {
            let hint = value_hint(record.value_schema());
            rows.push((format!("{alias}{flag}.<key> {hint}").trim_end().to_string(), text));
            return;
        }
        _ => {}
    }

    let hint = value_hint(schema);
    rows.push((format!("{alias}{flag} {hint}").trim_end().to_string(), text));
    if schema.advertises_negation() {
        let negated = flag.replacen("--", "--no-", 1);
        rows.push((format!("    {negated}"), String::new()));
    }
}

fn value_hint(schema: &Schema) -> String {
    match schema {
        Schema::String(s) if !s.choice_list().is_empty() => format!("<{}>", s.choice_list().join("|")),
        Schema::String(_) => "<text>".to_string(),
        Schema::Number(_) => "<number>".to_string(),
        Schema::Boolean(_) => String::new(),
        Schema::Array(_) => "<list>".to_string(),
        Schema::Object(_) | Schema::Record(_) => "<key=value>".to_string(),
        Schema::Union(_) => "[value]".to_string(),
    }
}

fn examples_section(out: &mut String, examples: &[String]) {
    if examples.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nExamples:");
    for example in examples {
        let _ = writeln!(out, "  {example}");
    }
}

fn section(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    let _ = writeln!(out, "\n{title}:");
    for (left, right) in rows {
        if right.is_empty() {
            let _ = writeln!(out, "  {left}");
        } else {
            let _ = writeln!(out, "  {left:<width$}  {right}");
        }
    }
}
