//! Centralized configuration for quark-log.
//!
//! `LoggerConfig` covers the choices the pipeline leaves open: whether the
//! terminal sink renders styles, whether the logger starts enabled, when the
//! side-channel handler runs, and what a panicking plugin does to an
//! emission. It can be built programmatically or read from the environment.

use std::env;

use crate::detection::{DisplayContext, Stream};

/// When the side-channel handler set with
/// [`Logger::set_handler`](crate::Logger::set_handler) runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandlerPolicy {
    /// Only for emissions made while the logger is enabled
    #[default]
    WhenEnabled,
    /// For every emission, even while the logger is disabled
    Always,
}

/// What happens when a plugin transform panics mid-composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PluginFailure {
    /// The panic unwinds out of the emission call
    #[default]
    Propagate,
    /// The panic is caught and the plugin contributes nothing
    Isolate,
}

/// Configuration for a [`Logger`](crate::Logger) and its terminal sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Override display context (None = auto-detect)
    pub context: Option<DisplayContext>,
    /// Force styled (`Some(true)`) or plain (`Some(false)`) output,
    /// regardless of the terminal (None = auto-detect)
    pub force_color: Option<bool>,
    /// Force plain text mode (no styling)
    pub force_plain: bool,
    /// Whether the logger starts in the enabled state
    pub start_enabled: bool,
    /// When the side-channel handler runs
    pub handler_policy: HandlerPolicy,
    /// Plugin panic handling
    pub plugin_failure: PluginFailure,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            context: None,
            force_color: None,
            force_plain: false,
            start_enabled: true,
            handler_policy: HandlerPolicy::WhenEnabled,
            plugin_failure: PluginFailure::Propagate,
        }
    }
}

impl LoggerConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `QUARK_LOG_FORCE_COLOR` | (set) | Force styled output |
    /// | `QUARK_LOG_PLAIN` | (set) | Force plain output |
    /// | `NO_COLOR` | (set) | Disable colors (standard) |
    /// | `QUARK_LOG` | off/0/false | Start disabled |
    /// | `QUARK_LOG_HANDLER` | always/enabled | Handler policy |
    /// | `QUARK_LOG_PLUGIN_PANICS` | isolate/propagate | Plugin panic policy |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Display mode
        if lookup("QUARK_LOG_FORCE_COLOR").is_some() {
            config.force_color = Some(true);
        }
        if lookup("QUARK_LOG_PLAIN").is_some() || lookup("NO_COLOR").is_some() {
            config.force_plain = true;
        }

        // State
        if let Some(val) = lookup("QUARK_LOG") {
            config.start_enabled = !matches!(val.to_lowercase().as_str(), "off" | "0" | "false");
        }

        if let Some(val) = lookup("QUARK_LOG_HANDLER") {
            config.handler_policy = match val.to_lowercase().as_str() {
                "always" => HandlerPolicy::Always,
                // "enabled" and any other value keep the default
                _ => HandlerPolicy::WhenEnabled,
            };
        }

        if let Some(val) = lookup("QUARK_LOG_PLUGIN_PANICS") {
            config.plugin_failure = match val.to_lowercase().as_str() {
                "isolate" | "catch" => PluginFailure::Isolate,
                _ => PluginFailure::Propagate,
            };
        }

        config
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    /// Force color output on or off
    #[must_use]
    pub fn force_color(mut self, force: bool) -> Self {
        self.force_color = Some(force);
        self
    }

    /// Enable plain text mode (no styling)
    #[must_use]
    pub fn plain_mode(mut self) -> Self {
        self.force_plain = true;
        self
    }

    /// Set display context explicitly
    #[must_use]
    pub fn with_context(mut self, context: DisplayContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Start the logger disabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.start_enabled = false;
        self
    }

    /// Set the handler policy
    #[must_use]
    pub fn with_handler_policy(mut self, policy: HandlerPolicy) -> Self {
        self.handler_policy = policy;
        self
    }

    /// Set the plugin panic policy
    #[must_use]
    pub fn with_plugin_failure(mut self, failure: PluginFailure) -> Self {
        self.plugin_failure = failure;
        self
    }

    // ─────────────────────────────────────────────────
    // Resolution Methods
    // ─────────────────────────────────────────────────

    /// Resolve the stdout display context based on config and environment
    #[must_use]
    pub fn resolve_context(&self) -> DisplayContext {
        self.resolve_context_for(Stream::Stdout)
    }

    /// Resolve the display context of one output stream
    #[must_use]
    pub fn resolve_context_for(&self, stream: Stream) -> DisplayContext {
        match (self.force_plain, self.force_color) {
            (true, _) | (false, Some(false)) => DisplayContext::new_plain(),
            (false, Some(true)) => DisplayContext::new_styled(),
            (false, None) => self
                .context
                .unwrap_or_else(|| DisplayContext::detect_for(stream)),
        }
    }

    /// Check if styled output should be used on stdout
    #[must_use]
    pub fn should_style(&self) -> bool {
        self.resolve_context().is_styled()
    }

    /// Check if styled output should be used on `stream`
    #[must_use]
    pub fn should_style_stream(&self, stream: Stream) -> bool {
        self.resolve_context_for(stream).is_styled()
    }
}
