//! Styled/plain context detection
//!
//! Determines whether inline styles should be rendered, based on the
//! environment and on whether the output stream is a terminal. Stdout and
//! stderr are checked separately.

use console::Term;

/// Terminal output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Log, info and custom levels
    Stdout,
    /// Warn and error levels
    Stderr,
}

/// Display context representing the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayContext {
    /// Plain text output (pipes, CI, dumb terminals)
    Plain,
    /// Styled output for a human at a terminal
    #[default]
    Styled,
}

impl DisplayContext {
    /// Create a plain (unstyled) context
    #[must_use]
    pub fn new_plain() -> Self {
        Self::Plain
    }

    /// Create a styled context
    #[must_use]
    pub fn new_styled() -> Self {
        Self::Styled
    }

    /// Auto-detect the display context of stdout from environment
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_for(Stream::Stdout)
    }

    /// Auto-detect the display context of one output stream
    #[must_use]
    pub fn detect_for(stream: Stream) -> Self {
        if should_enable_styles_on(stream) {
            Self::Styled
        } else {
            Self::Plain
        }
    }

    /// Check if styles are rendered in this context
    #[must_use]
    pub fn is_styled(&self) -> bool {
        matches!(self, Self::Styled)
    }

    /// Check if this is a plain context
    #[must_use]
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

/// Determine if the environment asks for plain output
#[must_use]
pub fn is_plain_context() -> bool {
    plain_requested(|key| std::env::var(key).ok())
}

fn plain_requested(lookup: impl Fn(&str) -> Option<String>) -> bool {
    lookup("QUARK_LOG_PLAIN").is_some()
        || lookup("NO_COLOR").is_some()
        || lookup("CI").is_some()
        || lookup("TERM").is_some_and(|term| term == "dumb")
}

/// Determine if styled output should be enabled on stdout
#[must_use]
pub fn should_enable_styles() -> bool {
    should_enable_styles_on(Stream::Stdout)
}

/// Determine if styled output should be enabled on `stream`
#[must_use]
pub fn should_enable_styles_on(stream: Stream) -> bool {
    // Explicit enable always wins
    if std::env::var("QUARK_LOG_FORCE_COLOR").is_ok() {
        return true;
    }

    if is_plain_context() {
        return false;
    }

    match stream {
        Stream::Stdout => Term::stdout().is_term() && console::colors_enabled(),
        Stream::Stderr => Term::stderr().is_term() && console::colors_enabled_stderr(),
    }
}
