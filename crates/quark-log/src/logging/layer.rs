//! Tracing subscriber integration.
//!
//! Provides a tracing `Layer` that emits events on a [`Logger`], with the
//! event message followed by its fields as `key=value` pairs.

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{custom_or_log, targets};
use crate::Logger;

/// A tracing layer that routes events into a [`Logger`].
pub struct QuarkLayer {
    logger: Arc<Logger>,
    include_fields: bool,
    include_spans: bool,
}

impl QuarkLayer {
    /// Create a layer emitting on `logger`, with fields and span names.
    #[must_use]
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            include_fields: true,
            include_spans: true,
        }
    }

    /// Toggle `key=value` field rendering.
    #[must_use]
    pub fn with_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }

    /// Toggle the `span=outer::inner` field.
    #[must_use]
    pub fn with_spans(mut self, include: bool) -> Self {
        self.include_spans = include;
        self
    }

    fn level_name(&self, level: Level) -> &'static str {
        if level == Level::ERROR {
            "error"
        } else if level == Level::WARN {
            "warn"
        } else if level == Level::INFO {
            "info"
        } else if level == Level::DEBUG {
            custom_or_log(&self.logger, "debug")
        } else {
            custom_or_log(&self.logger, "trace")
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldCollector {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            if self.message.is_none() {
                self.message = Some(value);
            }
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, value.to_string());
    }
}

impl<S> Layer<S> for QuarkLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if targets::is_internal(metadata.target()) {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let scope = if self.include_spans {
            ctx.event_scope(event)
        } else {
            None
        };
        if let Some(scope) = scope {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                collector
                    .fields
                    .push(("span".to_string(), spans.join("::")));
            }
        }

        let mut text = collector
            .message
            .unwrap_or_else(|| metadata.name().to_string());
        if self.include_fields {
            for (key, value) in &collector.fields {
                text.push_str(&format!(" {key}={value}"));
            }
        }

        self.logger.emit(self.level_name(*metadata.level()), [text]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkMethod;
    use crate::testing::TestSink;
    use tracing_subscriber::prelude::*;

    fn capture(layer: impl FnOnce(Arc<Logger>) -> QuarkLayer, body: impl FnOnce()) -> Arc<TestSink> {
        let sink = Arc::new(TestSink::new());
        let logger = Arc::new(Logger::with_sink(sink.clone()));
        let subscriber = tracing_subscriber::registry().with(layer(logger));
        tracing::subscriber::with_default(subscriber, body);
        sink
    }

    #[test]
    fn test_layer_message_and_fields() {
        let sink = capture(QuarkLayer::new, || {
            tracing::info!(target: "app", user = "ada", attempts = 3, "signed in");
        });

        let (method, line) = sink.last_line().unwrap();
        assert_eq!(method, SinkMethod::Info);
        assert_eq!(line.text(), "signed in user=ada attempts=3");
    }

    #[test]
    fn test_layer_without_fields() {
        let sink = capture(
            |logger| QuarkLayer::new(logger).with_fields(false),
            || tracing::warn!(target: "app", code = 7, "slow request"),
        );

        let (method, line) = sink.last_line().unwrap();
        assert_eq!(method, SinkMethod::Warn);
        assert_eq!(line.text(), "slow request");
    }

    #[test]
    fn test_layer_span_names() {
        let sink = capture(QuarkLayer::new, || {
            let outer = tracing::info_span!("request");
            let _outer = outer.enter();
            let inner = tracing::info_span!("db");
            let _inner = inner.enter();
            tracing::error!(target: "app", "query failed");
        });

        let (method, line) = sink.last_line().unwrap();
        assert_eq!(method, SinkMethod::Error);
        assert_eq!(line.text(), "query failed span=request::db");
    }

    #[test]
    fn test_layer_debug_falls_back_to_log() {
        let sink = capture(QuarkLayer::new, || tracing::debug!(target: "app", "verbose"));

        let (method, line) = sink.last_line().unwrap();
        assert_eq!(method, SinkMethod::Log);
        assert_eq!(line.text(), "verbose");
    }

    #[test]
    fn test_layer_drops_internal_targets() {
        let sink = capture(QuarkLayer::new, || {
            tracing::warn!(target: "quark_log::plugin", "plugin panicked");
        });
        sink.assert_call_count(0);
    }
}
