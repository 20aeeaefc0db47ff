//! Integration with the `log` and `tracing` ecosystems.
//!
//! The crate reports its own diagnostics (registration, configuration
//! errors, isolated plugin panics) through the `log` facade under the
//! targets in [`targets`]. In the other direction, two bridges route
//! application records into a [`Logger`](crate::Logger):
//!
//! - [`LogBridge`] - a `log::Log` implementation
//! - [`QuarkLayer`] - a `tracing_subscriber` layer
//!
//! Both drop records coming from the crate's own targets so a logger can
//! never feed its diagnostics back into itself.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use quark_log::Logger;
//! use quark_log::logging::LogBridge;
//!
//! let logger = Arc::new(Logger::new());
//! LogBridge::init(logger, log::Level::Info)?;
//! log::info!("routed through quark-log");
//! ```

mod bridge;
mod layer;

pub use bridge::LogBridge;
pub use layer::QuarkLayer;

/// Log targets used by the crate's own diagnostics.
pub mod targets {
    /// Root target for all quark-log diagnostics.
    pub const ROOT: &str = "quark_log";

    /// Level and plugin registration.
    pub const REGISTRY: &str = "quark_log::registry";

    /// Plugin composition.
    pub const PLUGIN: &str = "quark_log::plugin";

    /// Output sinks.
    pub const SINK: &str = "quark_log::sink";

    /// Whether `target` is one of the crate's own targets.
    #[must_use]
    pub fn is_internal(target: &str) -> bool {
        target == ROOT
            || target
                .strip_prefix(ROOT)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// Level a bridged record lands on when it has no built-in counterpart.
///
/// `name` (for example `debug`) is used when registered on the logger,
/// otherwise the record goes to `log`.
fn custom_or_log(logger: &crate::Logger, name: &'static str) -> &'static str {
    if logger.has_level(name) { name } else { "log" }
}
