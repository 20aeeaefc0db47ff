use serde_json::Value;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::options::PluginOptions;
use crate::plugin::{LevelInfo, Plugin, PluginResult};

/// Prefixes lines with `[HH:MM:SS]` in local time.
///
/// Falls back to UTC when the local offset cannot be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimePlugin;

impl Plugin for TimePlugin {
    fn transform(
        &self,
        _messages: &[Value],
        _options: &PluginOptions,
        _level: &LevelInfo,
    ) -> PluginResult {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        PluginResult::new().before(format!("[{}]", format_clock(now)))
    }
}

/// Formats the wall-clock part of `moment` as `HH:MM:SS`.
#[must_use]
pub fn format_clock(moment: OffsetDateTime) -> String {
    let clock = format_description!("[hour]:[minute]:[second]");
    moment.format(clock).unwrap_or_else(|_| {
        format!(
            "{:02}:{:02}:{:02}",
            moment.hour(),
            moment.minute(),
            moment.second()
        )
    })
}
