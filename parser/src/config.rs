//! Presenter settings.
//!
//! Settings can be deserialized from a config file or read from the
//! environment:
//!
//! ```yaml
//! no_exit: true
//! ```

use serde::{Deserialize, Serialize};

/// Environment variable that keeps the terminal presenter from exiting.
pub const NO_EXIT_VAR: &str = "NO_EXIT";

/// Behaviour of the [`TerminalPresenter`](crate::TerminalPresenter).
///
/// # Examples
///
/// ```
/// use schema_args_parser::Settings;
///
/// let settings = Settings::from_lookup(|key| (key == "NO_EXIT").then(|| "1".to_string()));
/// assert!(settings.no_exit);
/// assert!(!Settings::default().no_exit);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Return errors to the caller instead of terminating the process.
    pub no_exit: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            no_exit: lookup(NO_EXIT_VAR).is_some_and(|value| is_enabled(&value)),
        }
    }
}

/// Any non-empty value other than `0` or `false` enables a flag variable.
fn is_enabled(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}
