//! Leveled, styled console output with composable message plugins.
//!
//! A [`Logger`] dispatches messages through named levels (`log`, `info`,
//! `warn`, `error` plus any custom level), lets registered plugins add
//! prefixes, suffixes and styles, and hands the rendered [`Line`] to a
//! [`Sink`].
//!
//! - [`Logger`] - enabled flag, level table, plugin registry, handler
//! - [`Plugin`] - message transform contract, [`plugin_fn`] for closures
//! - [`style`] - inline style maps and their `prop: value;` form
//! - [`render`] - the template/marker protocol sinks consume
//! - [`ConsoleSink`] - terminal output via `console`
//! - [`testing::TestSink`] - capture sink for assertions
//! - [`logging`] - `log` and `tracing` bridges
//!
//! # Example
//!
//! ```ignore
//! use quark_log::plugins::{NamespacePlugin, TimePlugin};
//! use quark_log::{LevelOptions, Logger, Options, StyleMap, args};
//!
//! let logger = Logger::new();
//! logger
//!     .level("success", LevelOptions::styled(StyleMap::new().with("color", "green")))
//!     .plugin("time", TimePlugin, Options::new())
//!     .plugin("namespace", NamespacePlugin, Options::new().with("name", "deploy"));
//!
//! logger.emit("success", args!["released", { "version": "1.4.0" }]);
//! logger.plugin_options("time", Options::new().with("enabled", false));
//! logger.warn(["cache is cold"]);
//! ```
//!
//! # Design Principles
//!
//! - Registration never fails loudly: errors reset the logger and are
//!   reported on its own `error` level (`try_*` variants return them)
//! - Plugins see the messages left by the plugins before them
//! - Level styles always win over plugin styles
//! - The style-marker protocol stays structured until the sink boundary

#![forbid(unsafe_code)]

pub mod compose;
pub mod config;
pub mod console;
pub mod detection;
pub mod error;
pub mod levels;
pub mod logger;
pub mod logging;
pub mod options;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod sink;
pub mod style;
pub mod testing;

pub use config::{HandlerPolicy, LoggerConfig, PluginFailure};
pub use crate::console::ConsoleSink;
pub use detection::DisplayContext;
pub use error::{ConfigError, ConfigResult};
pub use logger::{Handler, Logger, Outcome};
pub use options::{LevelOptions, Options, PluginOptions};
pub use plugin::{LevelInfo, Plugin, PluginArg, PluginResult, Registration, plugin_fn};
pub use render::{Line, Piece, Segment, Template};
pub use sink::{Sink, SinkMethod};
pub use style::StyleMap;

pub use serde_json;
pub use serde_json::Value;

/// Builds an argument list from JSON-like literals.
///
/// ```ignore
/// logger.log(args!["Test in red", { "test": true }, 42]);
/// ```
#[macro_export]
macro_rules! args {
    ($($tt:tt)*) => {
        $crate::__flatten_args($crate::serde_json::json!([$($tt)*]))
    };
}

#[doc(hidden)]
#[must_use]
pub fn __flatten_args(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
