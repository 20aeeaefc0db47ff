//! Plugin composition.
//!
//! Runs every enabled plugin in registration order and folds their
//! contributions into one [`Composition`]:
//!
//! - a non-empty replacement message list becomes the input of the next
//!   plugin, so plugins see the cumulative list rather than the original;
//! - each non-empty `before` fragment is wrapped in a style-marker pair;
//! - each non-empty `after` fragment is kept as plain text;
//! - every invocation adds exactly one style slot, empty if the plugin
//!   returned no styles.

use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::config::PluginFailure;
use crate::logging::targets;
use crate::plugin::{LevelInfo, PluginResult, RegisteredPlugin};
use crate::render::Template;
use crate::style::StyleMap;

/// Aggregate of all plugin contributions for one emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    pub messages: Vec<Value>,
    /// Marker-wrapped prefixes, in plugin order.
    pub before: Vec<Template>,
    pub after: Vec<String>,
    /// One style map per plugin invocation.
    pub styles: Vec<StyleMap>,
}

impl Composition {
    /// A composition with no plugin contributions.
    #[must_use]
    pub fn from_messages(messages: Vec<Value>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    fn absorb(&mut self, result: PluginResult) {
        if let Some(messages) = result.messages.filter(|m| !m.is_empty()) {
            self.messages = messages;
        }
        if let Some(before) = result.before.filter(|b| !b.is_empty()) {
            self.before.push(Template::wrapped(before));
        }
        if let Some(after) = result.after.filter(|a| !a.is_empty()) {
            self.after.push(after);
        }
        self.styles.push(result.styles.unwrap_or_default());
    }
}

/// Applies `plugins` to `messages` for the given level.
///
/// With [`PluginFailure::Propagate`] a panicking transform unwinds out of
/// this call. With [`PluginFailure::Isolate`] the panic is caught and the
/// plugin contributes nothing, not even a style slot.
pub fn compose(
    plugins: &[RegisteredPlugin],
    level: &LevelInfo,
    messages: Vec<Value>,
    failure: PluginFailure,
) -> Composition {
    let mut composition = Composition::from_messages(messages);

    for plugin in plugins.iter().filter(|plugin| plugin.options().enabled()) {
        let result = match failure {
            PluginFailure::Propagate => plugin.apply(&composition.messages, level),
            PluginFailure::Isolate => {
                let messages = &composition.messages;
                match panic::catch_unwind(AssertUnwindSafe(|| plugin.apply(messages, level))) {
                    Ok(result) => result,
                    Err(_) => {
                        log::warn!(
                            target: targets::PLUGIN,
                            "plugin '{}' panicked on level '{}', ignoring its output",
                            plugin.name(),
                            level.name
                        );
                        continue;
                    }
                }
            }
        };
        composition.absorb(result);
    }

    composition
}
