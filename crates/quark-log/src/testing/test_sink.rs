//! TestSink for capturing output in tests
//!
//! Records every sink call instead of writing anywhere, so tests can assert
//! on the exact template, style arguments and extras a logger produced.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::render::Line;
use crate::sink::{Sink, SinkMethod};

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SinkCall {
    Line { method: SinkMethod, line: Line },
    Group { label: String },
    GroupEnd,
    Time { label: String },
    TimeEnd { label: String },
}

/// A sink that captures calls for assertion
#[derive(Debug)]
pub struct TestSink {
    calls: Mutex<Vec<SinkCall>>,
    styled: bool,
}

impl TestSink {
    /// Create a capturing sink that reports plain (unstyled) output
    #[must_use]
    pub fn new() -> Self {
        Self::with_styles(false)
    }

    /// Create a capturing sink that reports styled output
    #[must_use]
    pub fn new_styled() -> Self {
        Self::with_styles(true)
    }

    fn with_styles(styled: bool) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            styled,
        }
    }

    fn record(&self, call: SinkCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// All recorded calls, in order
    #[must_use]
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of recorded calls of any kind
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Recorded print calls with the operation they went to
    #[must_use]
    pub fn lines(&self) -> Vec<(SinkMethod, Line)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Line { method, line } => Some((method, line)),
                _ => None,
            })
            .collect()
    }

    /// The most recent print call
    #[must_use]
    pub fn last_line(&self) -> Option<(SinkMethod, Line)> {
        self.lines().pop()
    }

    /// Marker-free text of every printed line
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lines().iter().map(|(_, line)| line.text()).collect()
    }

    /// Printed text as a single string
    #[must_use]
    pub fn output_string(&self) -> String {
        self.texts().join("\n")
    }

    /// Check if output contains a string
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.output_string().contains(needle)
    }

    /// Check if output matches a regex pattern
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        match regex::Regex::new(pattern) {
            Ok(re) => re.is_match(&self.output_string()),
            Err(_) => false,
        }
    }

    /// Assert that output contains a string
    ///
    /// # Panics
    ///
    /// Panics if the output does not contain the needle string.
    pub fn assert_contains(&self, needle: &str) {
        assert!(
            self.contains(needle),
            "Output did not contain '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert that output does NOT contain a string
    ///
    /// # Panics
    ///
    /// Panics if the output contains the needle string.
    pub fn assert_not_contains(&self, needle: &str) {
        assert!(
            !self.contains(needle),
            "Output unexpectedly contained '{}'. Actual output:\n{}",
            needle,
            self.output_string()
        );
    }

    /// Assert a specific number of recorded calls
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match expected.
    pub fn assert_call_count(&self, expected: usize) {
        let actual = self.call_count();
        assert_eq!(
            actual,
            expected,
            "Expected {} calls but got {}. Calls:\n{:#?}",
            expected,
            actual,
            self.calls()
        );
    }

    /// Recorded calls as pretty JSON, for snapshot comparisons
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.calls()).unwrap_or_default()
    }

    /// Clear the recorded calls
    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }
}

impl Default for TestSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TestSink {
    fn supports_styles(&self) -> bool {
        self.styled
    }

    fn print(&self, line: &Line) {
        self.record(SinkCall::Line {
            method: SinkMethod::Print,
            line: line.clone(),
        });
    }

    fn log(&self, line: &Line) {
        self.record(SinkCall::Line {
            method: SinkMethod::Log,
            line: line.clone(),
        });
    }

    fn info(&self, line: &Line) {
        self.record(SinkCall::Line {
            method: SinkMethod::Info,
            line: line.clone(),
        });
    }

    fn warn(&self, line: &Line) {
        self.record(SinkCall::Line {
            method: SinkMethod::Warn,
            line: line.clone(),
        });
    }

    fn error(&self, line: &Line) {
        self.record(SinkCall::Line {
            method: SinkMethod::Error,
            line: line.clone(),
        });
    }

    fn group(&self, label: &str) {
        self.record(SinkCall::Group {
            label: label.to_string(),
        });
    }

    fn group_end(&self) {
        self.record(SinkCall::GroupEnd);
    }

    fn time(&self, label: &str) {
        self.record(SinkCall::Time {
            label: label.to_string(),
        });
    }

    fn time_end(&self, label: &str) {
        self.record(SinkCall::TimeEnd {
            label: label.to_string(),
        });
    }
}
