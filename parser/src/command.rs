//! Commands and their actions.
//!
//! A [`Command`] is assembled with a [`CommandBuilder`] and sealed by
//! [`CommandBuilder::build`], which checks the definition. The sealed value
//! is immutable and is registered on a [`Cli`](crate::Cli) explicitly.
//!
//! Actions receive the command's [`ParsedArgs`] and may finish
//! synchronously (`()` or `Result<(), E>`) or hand back a
//! [`JoinHandle`] for work that keeps running after dispatch returns.

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use indexmap::IndexMap;
use schema_args_core::{BoxError, PositionalSchema, Schema, validate_layout};

use crate::args::ParsedArgs;
use crate::error::{Error, Result};

type ActionFn = dyn Fn(ParsedArgs) -> ActionOutcome + Send + Sync;
type Waiter = Box<dyn FnOnce() -> std::result::Result<(), BoxError> + Send>;

/// What an action produced.
pub enum ActionOutcome {
    /// The action finished.
    Done(std::result::Result<(), BoxError>),
    /// The action is still running; the waiter blocks until it finishes.
    Pending(Waiter),
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(result) => f.debug_tuple("Done").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Return types accepted from an action closure.
pub trait IntoActionOutcome {
    fn into_outcome(self) -> ActionOutcome;
}

impl IntoActionOutcome for () {
    fn into_outcome(self) -> ActionOutcome {
        ActionOutcome::Done(Ok(()))
    }
}

impl<E> IntoActionOutcome for std::result::Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> ActionOutcome {
        ActionOutcome::Done(self.map_err(Into::into))
    }
}

impl<E> IntoActionOutcome for JoinHandle<std::result::Result<(), E>>
where
    E: Into<BoxError> + Send + 'static,
{
    fn into_outcome(self) -> ActionOutcome {
        let waiter: Waiter = Box::new(move || -> std::result::Result<(), BoxError> {
            match self.join() {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err("action thread panicked".into()),
            }
        });
        ActionOutcome::Pending(waiter)
    }
}

impl IntoActionOutcome for ActionOutcome {
    fn into_outcome(self) -> ActionOutcome {
        self
    }
}

/// An action that was still running when dispatch returned.
pub struct PendingAction {
    command: String,
    waiter: Waiter,
}

impl PendingAction {
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Blocks until the action finishes.
    pub fn wait(self) -> Result<()> {
        (self.waiter)().map_err(|source| Error::Action {
            command: self.command,
            source,
        })
    }
}

impl fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAction")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// A sealed command definition.
#[derive(Clone)]
pub struct Command {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    examples: Vec<String>,
    options: IndexMap<String, Schema>,
    positionals: Vec<PositionalSchema>,
    action: Arc<ActionFn>,
}

impl Command {
    /// Starts a builder for a command called `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_args_parser::{Command, Positional, Schema};
    ///
    /// let build = Command::builder("build")
    ///     .describe("Compile the project")
    ///     .option("release", Schema::boolean().alias('r'))
    ///     .positional(Positional::new("target", Schema::string().optional()))
    ///     .action(|_args| ())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(build.name(), "build");
    /// assert!(build.options().contains_key("release"));
    /// ```
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            description: None,
            usage: None,
            examples: Vec::new(),
            options: IndexMap::new(),
            positionals: Vec::new(),
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
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

    /// Runs the action. A failed synchronous action becomes
    /// [`Error::Action`]; a running one is handed back as pending.
    pub(crate) fn run(&self, args: ParsedArgs) -> Result<Option<PendingAction>> {
        match (self.action)(args) {
            ActionOutcome::Done(Ok(())) => Ok(None),
            ActionOutcome::Done(Err(source)) => Err(Error::Action {
                command: self.name.clone(),
                source,
            }),
            ActionOutcome::Pending(waiter) => Ok(Some(PendingAction {
                command: self.name.clone(),
                waiter,
            })),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options.keys().collect::<Vec<_>>())
            .field("positionals", &self.positionals.len())
            .finish_non_exhaustive()
    }
}

/// Accumulates a command definition until [`build`](Self::build).
pub struct CommandBuilder {
    name: String,
    description: Option<String>,
    usage: Option<String>,
    examples: Vec<String>,
    options: IndexMap<String, Schema>,
    positionals: Vec<PositionalSchema>,
    action: Option<Arc<ActionFn>>,
}

impl CommandBuilder {
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    /// Declares an option. Declaring the same name again replaces it.
    pub fn option(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.options.insert(name.into(), schema.into());
        self
    }

    pub fn positional(mut self, positional: impl Into<PositionalSchema>) -> Self {
        self.positionals.push(positional.into());
        self
    }

    pub fn action<F, R>(mut self, action: F) -> Self
    where
        F: Fn(ParsedArgs) -> R + Send + Sync + 'static,
        R: IntoActionOutcome,
    {
        let action: Arc<ActionFn> = Arc::new(move |args: ParsedArgs| action(args).into_outcome());
        self.action = Some(action);
        self
    }

    /// Seals the command.
    ///
    /// # Errors
    ///
    /// [`Error::Definition`] when the name is empty or starts with `-`, no
    /// action was attached, or the positional layout is invalid.
    pub fn build(self) -> Result<Command> {
        if self.name.is_empty() || self.name.starts_with('-') {
            return Err(Error::Definition(format!(
                "invalid command name `{}`",
                self.name
            )));
        }
        let Some(action) = self.action else {
            return Err(Error::Definition(format!(
                "command `{}` has no action",
                self.name
            )));
        };
        validate_layout(&self.positionals)?;

        Ok(Command {
            name: self.name,
            description: self.description,
            usage: self.usage,
            examples: self.examples,
            options: self.options,
            positionals: self.positionals,
            action,
        })
    }
}
