//! Testing utilities for quark-log output
//!
//! Provides `TestSink` for capturing and asserting on emitted lines.

mod test_sink;

pub use test_sink::{SinkCall, TestSink};

/// Remove ANSI escape sequences from captured terminal output
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes::strip(text.as_bytes())).into_owned()
}
