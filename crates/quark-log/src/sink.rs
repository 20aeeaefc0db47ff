//! The output sink capability.
//!
//! A [`Sink`] is whatever ultimately displays a rendered [`Line`]: a
//! terminal ([`ConsoleSink`](crate::console::ConsoleSink)), a capture buffer
//! ([`TestSink`](crate::testing::TestSink)), or anything else implementing
//! the trait. It is handed to the logger at construction.

use serde::Serialize;

use crate::render::Line;

/// Built-in level names, each with a like-named sink operation.
pub const BUILTIN_LEVELS: [&str; 4] = ["log", "info", "warn", "error"];

/// Sink operation a line is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkMethod {
    Log,
    Info,
    Warn,
    Error,
    /// Generic text operation used for custom levels.
    Print,
}

impl SinkMethod {
    /// Picks the native operation for a built-in level, [`Print`](Self::Print) otherwise.
    #[must_use]
    pub fn for_level(name: &str) -> Self {
        match name {
            "log" => Self::Log,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Print,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Print => "print",
        }
    }

    /// Warn and error lines signal failure to the caller.
    #[must_use]
    pub fn is_severe(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

/// Returns whether `name` is one of the four built-in levels.
#[must_use]
pub fn is_builtin_level(name: &str) -> bool {
    BUILTIN_LEVELS.contains(&name)
}

/// Console-like output capability.
///
/// Every print operation receives the same [`Line`] shape: a template
/// possibly holding style markers, the style arguments those markers
/// consume in order, and the non-textual extras the sink formats itself.
/// The level operations default to [`print`](Self::print).
pub trait Sink: Send + Sync {
    /// Whether this sink renders inline styles.
    ///
    /// When `false` the logger strips every marker and drops the style
    /// arguments before the line reaches the sink.
    fn supports_styles(&self) -> bool;

    /// Generic text operation.
    fn print(&self, line: &Line);

    fn log(&self, line: &Line) {
        self.print(line);
    }

    fn info(&self, line: &Line) {
        self.print(line);
    }

    fn warn(&self, line: &Line) {
        self.print(line);
    }

    fn error(&self, line: &Line) {
        self.print(line);
    }

    /// Opens an output group.
    fn group(&self, _label: &str) {}

    /// Closes the innermost output group.
    fn group_end(&self) {}

    /// Starts a named timer.
    fn time(&self, _label: &str) {}

    /// Stops a named timer and reports the elapsed time.
    fn time_end(&self, _label: &str) {}
}

/// Calls the sink operation selected by `method`.
pub fn dispatch(sink: &dyn Sink, method: SinkMethod, line: &Line) {
    match method {
        SinkMethod::Log => sink.log(line),
        SinkMethod::Info => sink.info(line),
        SinkMethod::Warn => sink.warn(line),
        SinkMethod::Error => sink.error(line),
        SinkMethod::Print => sink.print(line),
    }
}
