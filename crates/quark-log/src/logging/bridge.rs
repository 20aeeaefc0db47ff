//! `log` crate bridge.
//!
//! Routes records from the `log` facade into a [`Logger`], so libraries
//! logging through `log::info!` end up on the same styled console.
//!
//! ```ignore
//! use std::sync::Arc;
//! use quark_log::Logger;
//! use quark_log::logging::LogBridge;
//!
//! LogBridge::init(Arc::new(Logger::new()), log::Level::Debug)?;
//! ```

use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

use super::{custom_or_log, targets};
use crate::Logger;

/// A `log::Log` implementation that emits records on a [`Logger`].
pub struct LogBridge {
    logger: Arc<Logger>,
    min_level: Level,
}

impl LogBridge {
    /// Create a bridge forwarding records at `min_level` and above.
    #[must_use]
    pub fn new(logger: Arc<Logger>, min_level: Level) -> Self {
        Self { logger, min_level }
    }

    /// Install a bridge as the global logger.
    ///
    /// Returns an error if a logger has already been set.
    pub fn init(logger: Arc<Logger>, min_level: Level) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(logger, min_level)))?;
        log::set_max_level(min_level.to_level_filter());
        Ok(())
    }

    /// The logger records are routed to.
    #[must_use]
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Level name a record of `level` is emitted on.
    #[must_use]
    pub fn level_name(&self, level: Level) -> &'static str {
        match level {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => custom_or_log(&self.logger, "debug"),
            Level::Trace => custom_or_log(&self.logger, "trace"),
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level && !targets::is_internal(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("{}", record.args());
        self.logger.emit(self.level_name(record.level()), [message]);
    }

    fn flush(&self) {}
}
