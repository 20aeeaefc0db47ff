//! Configuration errors raised by level and plugin registration.
//!
//! The public registration methods on [`Logger`](crate::Logger) never return
//! these: they reset the logger and report the error through its own `error`
//! level. Use the `try_*` variants to receive them as values instead.

/// A malformed level or plugin registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `level()` was called with a blank name.
    MissingLevelName,
    /// `plugin()` was called with a blank name.
    MissingPluginName,
    /// An options-only registration targeted a plugin that does not exist,
    /// so there is no transform to attach the options to.
    NotATransform(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingLevelName => write!(f, "level(): 'name' argument is required"),
            ConfigError::MissingPluginName => write!(f, "plugin(): 'name' argument is required"),
            ConfigError::NotATransform(name) => {
                write!(f, "plugin(): '{name}' is not registered, a transform is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result alias for registration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Returns whether `name` can identify a level or plugin.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}
