//! The logger: level dispatch, plugin registry and lifecycle.
//!
//! A [`Logger`] owns its registries behind one lock and an injected
//! [`Sink`]. Every emission goes through [`Logger::emit`]:
//!
//! 1. the enabled flag is checked (a disabled logger does nothing else);
//! 2. the level's options are looked up in the dispatch table;
//! 3. the side-channel handler sees the raw arguments;
//! 4. plugins are composed ([`compose`](crate::compose::compose));
//! 5. the result is rendered ([`render`](crate::render::render)) and handed
//!    to the sink operation for the level.
//!
//! The lock is released before step 3, so handlers and plugins may read the
//! logger (for example [`Logger::level_names`]) without deadlocking.
//!
//! # Example
//!
//! ```ignore
//! use quark_log::{LevelOptions, Logger, StyleMap, args};
//!
//! let logger = Logger::new();
//! logger.level("log", LevelOptions::styled(StyleMap::new().with("color", "red")));
//! logger.log(args!["Test in red", { "test": true }]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::compose::compose;
use crate::config::{HandlerPolicy, LoggerConfig};
use crate::console::ConsoleSink;
use crate::error::{ConfigError, ConfigResult};
use crate::levels::LevelRegistry;
use crate::logging::targets;
use crate::options::{LevelOptions, Options, PluginOptions};
use crate::plugin::{LevelInfo, Plugin, PluginArg, PluginRegistry};
use crate::render::{Line, render};
use crate::sink::{Sink, SinkMethod, dispatch};

/// Side-channel callback receiving the raw arguments of an emission.
pub type Handler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Result of one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A log, info or custom level line reached the sink.
    Printed,
    /// A warn or error line reached the sink.
    Severe,
    /// The logger is off; nothing ran.
    Disabled,
    /// No level with that name is registered.
    UnknownLevel,
    /// No sink is attached; plugins ran but nothing was written.
    Detached,
}

impl Outcome {
    /// `true` for printed lines and for the detached no-op.
    ///
    /// Warn and error lines report failure so callers can short-circuit on
    /// severity.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Printed | Self::Detached)
    }
}

struct LoggerState {
    enabled: bool,
    levels: LevelRegistry,
    plugins: PluginRegistry,
    handler: Option<Handler>,
}

/// Leveled, styled console logger with composable plugins.
pub struct Logger {
    sink: Option<Arc<dyn Sink>>,
    config: LoggerConfig,
    state: Mutex<LoggerState>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Logger")
            .field("enabled", &state.enabled)
            .field("levels", &state.levels.names().collect::<Vec<_>>())
            .field("plugins", &state.plugins.names().collect::<Vec<_>>())
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to the terminal, configured from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::from_env())
    }

    /// Logger writing to the terminal with an explicit configuration.
    #[must_use]
    pub fn with_config(config: LoggerConfig) -> Self {
        let sink: Arc<dyn Sink> = Arc::new(ConsoleSink::from_config(&config));
        Self::build(Some(sink), config)
    }

    /// Logger writing to `sink` with the default configuration.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn Sink>) -> Self {
        Self::build(Some(sink), LoggerConfig::default())
    }

    /// Logger writing to `sink` with an explicit configuration.
    #[must_use]
    pub fn with_sink_and_config(sink: Arc<dyn Sink>, config: LoggerConfig) -> Self {
        Self::build(Some(sink), config)
    }

    /// Logger with no output sink; emissions run plugins and write nothing.
    #[must_use]
    pub fn detached() -> Self {
        Self::build(None, LoggerConfig::default())
    }

    fn build(sink: Option<Arc<dyn Sink>>, config: LoggerConfig) -> Self {
        let state = LoggerState {
            enabled: config.start_enabled,
            levels: LevelRegistry::new(),
            plugins: PluginRegistry::new(),
            handler: None,
        };
        Self {
            sink,
            config,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoggerState> {
        // Every mutation completes under the guard, so a poisoned state is
        // still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────

    /// Enables output.
    pub fn on(&self) -> &Self {
        self.state().enabled = true;
        self
    }

    /// Disables output; emissions become no-ops until [`on`](Self::on).
    pub fn off(&self) -> &Self {
        self.state().enabled = false;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    /// Drops every plugin and custom level and clears built-in level options.
    ///
    /// The enabled flag and the handler are kept.
    pub fn reset(&self) -> &Self {
        {
            let mut state = self.state();
            state.levels.reset();
            state.plugins.clear();
        }
        log::debug!(target: targets::REGISTRY, "levels and plugins reset");
        self
    }

    // ─────────────────────────────────────────────────
    // Levels
    // ─────────────────────────────────────────────────

    /// Adds a level or merges `options` into an existing one.
    ///
    /// A blank name resets the logger and reports the problem on `error`.
    pub fn level(&self, name: &str, options: LevelOptions) -> &Self {
        match self.try_level(name, options) {
            Ok(this) => this,
            Err(err) => self.fail(err),
        }
    }

    /// [`level`](Self::level) returning the error instead of reporting it.
    pub fn try_level(&self, name: &str, options: LevelOptions) -> ConfigResult<&Self> {
        self.state().levels.register(name, options)?;
        log::debug!(target: targets::REGISTRY, "level '{}' registered", name);
        Ok(self)
    }

    #[must_use]
    pub fn has_level(&self, name: &str) -> bool {
        self.state().levels.contains(name)
    }

    /// Registered level names, built-ins first.
    #[must_use]
    pub fn level_names(&self) -> Vec<String> {
        self.state().levels.names().map(str::to_string).collect()
    }

    /// Current options of a level.
    #[must_use]
    pub fn level_options(&self, name: &str) -> Option<LevelOptions> {
        self.state()
            .levels
            .get(name)
            .map(|level| level.options().clone())
    }

    // ─────────────────────────────────────────────────
    // Plugins
    // ─────────────────────────────────────────────────

    /// Registers `transform` under `name` with options `{ enabled: true, ..options }`.
    pub fn plugin(&self, name: &str, transform: impl Plugin + 'static, options: Options) -> &Self {
        self.register_plugin(name, PluginArg::transform(transform), options)
    }

    /// Merges `options` into the already registered plugin `name`.
    ///
    /// The plugin's transform is untouched. An `"enabled": false` entry
    /// disables the plugin.
    pub fn plugin_options(&self, name: &str, options: Options) -> &Self {
        self.register_plugin(name, PluginArg::Options(options), Options::new())
    }

    /// General plugin registration; see [`PluginRegistry::register`].
    ///
    /// Configuration errors reset the logger and are reported on `error`.
    pub fn register_plugin(&self, name: &str, arg: PluginArg, options: Options) -> &Self {
        match self.try_register_plugin(name, arg, options) {
            Ok(this) => this,
            Err(err) => self.fail(err),
        }
    }

    /// [`register_plugin`](Self::register_plugin) returning the error instead
    /// of reporting it.
    pub fn try_register_plugin(
        &self,
        name: &str,
        arg: PluginArg,
        options: Options,
    ) -> ConfigResult<&Self> {
        let registration = self.state().plugins.register(name, arg, options)?;
        log::debug!(target: targets::PLUGIN, "plugin '{}': {:?}", name, registration);
        Ok(self)
    }

    /// Registered plugin names in composition order.
    #[must_use]
    pub fn plugin_names(&self) -> Vec<String> {
        self.state().plugins.names().map(str::to_string).collect()
    }

    /// Current options of a plugin.
    #[must_use]
    pub fn plugin_options_of(&self, name: &str) -> Option<PluginOptions> {
        self.state()
            .plugins
            .get(name)
            .map(|plugin| plugin.options().clone())
    }

    // ─────────────────────────────────────────────────
    // Handler
    // ─────────────────────────────────────────────────

    /// Sets the side-channel callback run with the raw arguments of each
    /// emission, before any plugin.
    ///
    /// Whether it also runs while the logger is off is decided by
    /// [`HandlerPolicy`].
    pub fn set_handler<F>(&self, handler: F) -> &Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.state().handler = Some(Arc::new(handler));
        self
    }

    pub fn clear_handler(&self) -> &Self {
        self.state().handler = None;
        self
    }

    // ─────────────────────────────────────────────────
    // Emission
    // ─────────────────────────────────────────────────

    /// Emits `args` on the level called `name`.
    pub fn emit<I>(&self, name: &str, args: I) -> Outcome
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let messages: Vec<Value> = args.into_iter().map(Into::into).collect();

        let (enabled, options, plugins, handler) = {
            let state = self.state();
            (
                state.enabled,
                state.levels.get(name).map(|level| level.options().clone()),
                state.plugins.as_slice().to_vec(),
                state.handler.clone(),
            )
        };

        if !enabled {
            if self.config.handler_policy == HandlerPolicy::Always {
                if let Some(handler) = &handler {
                    handler(&messages);
                }
            }
            return Outcome::Disabled;
        }

        let Some(options) = options else {
            log::warn!(target: targets::REGISTRY, "emit on unregistered level '{}'", name);
            return Outcome::UnknownLevel;
        };

        if let Some(handler) = &handler {
            handler(&messages);
        }

        let level = LevelInfo::new(name, options);
        let composition = compose(&plugins, &level, messages, self.config.plugin_failure);

        let Some(sink) = &self.sink else {
            return Outcome::Detached;
        };

        let line = render(&level, composition, sink.supports_styles());
        let method = SinkMethod::for_level(name);
        dispatch(sink.as_ref(), method, &line);

        if method.is_severe() {
            Outcome::Severe
        } else {
            Outcome::Printed
        }
    }

    pub fn log<I>(&self, args: I) -> Outcome
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit("log", args)
    }

    pub fn info<I>(&self, args: I) -> Outcome
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit("info", args)
    }

    pub fn warn<I>(&self, args: I) -> Outcome
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit("warn", args)
    }

    pub fn error<I>(&self, args: I) -> Outcome
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit("error", args)
    }

    /// Writes an empty line to the sink's `log` operation.
    ///
    /// Plugins and level styles are not applied.
    pub fn br(&self) -> Outcome {
        if !self.is_enabled() {
            return Outcome::Disabled;
        }
        match &self.sink {
            Some(sink) => {
                sink.log(&Line::empty("log"));
                Outcome::Printed
            }
            None => Outcome::Detached,
        }
    }

    // ─────────────────────────────────────────────────
    // Pass-through commands
    // ─────────────────────────────────────────────────

    pub fn group(&self, label: &str) -> &Self {
        if let Some(sink) = &self.sink {
            sink.group(label);
        }
        self
    }

    pub fn group_end(&self) -> &Self {
        if let Some(sink) = &self.sink {
            sink.group_end();
        }
        self
    }

    pub fn time(&self, label: &str) -> &Self {
        if let Some(sink) = &self.sink {
            sink.time(label);
        }
        self
    }

    pub fn time_end(&self, label: &str) -> &Self {
        if let Some(sink) = &self.sink {
            sink.time_end(label);
        }
        self
    }

    /// Resets the logger and reports `err` through its own `error` level.
    fn fail(&self, err: ConfigError) -> &Self {
        log::warn!(target: targets::REGISTRY, "configuration error: {}", err);
        self.reset();
        self.error([err.to_string()]);
        self
    }
}
