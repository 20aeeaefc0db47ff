//! Ready-made plugins.
//!
//! - [`TimePlugin`] prefixes each line with the local wall-clock time
//! - [`NamespacePlugin`] prefixes each line with a styled `[Name]` badge
//!
//! ```ignore
//! use quark_log::{Logger, Options};
//! use quark_log::plugins::{NamespacePlugin, TimePlugin};
//!
//! let logger = Logger::new();
//! logger
//!     .plugin("time", TimePlugin, Options::new())
//!     .plugin("namespace", NamespacePlugin, Options::new().with("name", "api"));
//! logger.info(["listening"]);
//! ```

mod namespace;
mod time;

pub use self::namespace::NamespacePlugin;
pub use self::time::{TimePlugin, format_clock};

/// Uppercases the first character of `text`.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
