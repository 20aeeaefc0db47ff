use serde_json::Value;

use super::capitalize;
use crate::options::PluginOptions;
use crate::plugin::{LevelInfo, Plugin, PluginResult};
use crate::style::StyleMap;

/// Prefixes lines with a `[name]` badge styled per level.
///
/// Options: `name` (string, no badge when absent or empty), `capitalize`
/// (bool) and `styles` (object overriding the badge styles).
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespacePlugin;

impl NamespacePlugin {
    /// Badge styles shared by every level.
    #[must_use]
    pub fn default_styles() -> StyleMap {
        StyleMap::new()
            .with("color", "white")
            .with("background", "#000000")
            .with("padding", "3px 5px")
    }

    /// Badge styles specific to a built-in level; empty for custom levels.
    #[must_use]
    pub fn level_styles(level: &str) -> StyleMap {
        match level {
            "log" => StyleMap::new().with("background", "#000000"),
            "info" => StyleMap::new().with("background", "#219bff"),
            "warn" => StyleMap::new()
                .with("background", "#ffea2d")
                .with("color", "inherit"),
            "error" => StyleMap::new().with("background", "#e52d34"),
            _ => StyleMap::new(),
        }
    }
}

impl Plugin for NamespacePlugin {
    fn transform(
        &self,
        _messages: &[Value],
        options: &PluginOptions,
        level: &LevelInfo,
    ) -> PluginResult {
        let Some(name) = options.get_str("name").filter(|name| !name.is_empty()) else {
            return PluginResult::new().before("").styles(StyleMap::new());
        };

        let name = if options.get_bool("capitalize").unwrap_or(false) {
            capitalize(name)
        } else {
            name.to_string()
        };

        let mut styles = Self::default_styles();
        styles.extend(&Self::level_styles(&level.name));
        if let Some(custom) = options.get("styles").and_then(StyleMap::from_value) {
            styles.extend(&custom);
        }

        PluginResult::new()
            .before(format!("[{name}]"))
            .styles(styles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{LevelOptions, Options};
    use serde_json::json;

    fn run(options: Options, level: &str) -> PluginResult {
        NamespacePlugin.transform(
            &[],
            &PluginOptions::from_options(options),
            &LevelInfo::new(level, LevelOptions::new()),
        )
    }

    #[test]
    fn test_without_name() {
        let result = run(Options::new(), "log");
        assert_eq!(result.before.as_deref(), Some(""));
        assert_eq!(result.styles, Some(StyleMap::new()));
    }

    #[test]
    fn test_empty_name_is_no_name() {
        let result = run(Options::new().with("name", ""), "info");
        assert_eq!(result.before.as_deref(), Some(""));
    }

    #[test]
    fn test_badge_and_level_styles() {
        let result = run(Options::new().with("name", "api"), "info");
        assert_eq!(result.before.as_deref(), Some("[api]"));

        let styles = result.styles.unwrap();
        assert_eq!(styles.get("color"), Some(&json!("white")));
        assert_eq!(styles.get("background"), Some(&json!("#219bff")));
        assert_eq!(styles.get("padding"), Some(&json!("3px 5px")));
    }

    #[test]
    fn test_warn_inherits_color() {
        let styles = run(Options::new().with("name", "api"), "warn").styles.unwrap();
        assert_eq!(styles.get("color"), Some(&json!("inherit")));
        assert_eq!(styles.get("background"), Some(&json!("#ffea2d")));
    }

    #[test]
    fn test_custom_level_keeps_defaults() {
        let styles = run(Options::new().with("name", "api"), "success").styles.unwrap();
        assert_eq!(styles, NamespacePlugin::default_styles());
    }

    #[test]
    fn test_capitalize_and_user_styles() {
        let result = run(
            Options::new()
                .with("name", "worker")
                .with("capitalize", true)
                .with("styles", json!({ "background": "purple", "fontWeight": "bold" })),
            "error",
        );

        assert_eq!(result.before.as_deref(), Some("[Worker]"));
        let styles = result.styles.unwrap();
        assert_eq!(styles.get("background"), Some(&json!("purple")));
        assert_eq!(styles.get("fontWeight"), Some(&json!("bold")));
        assert_eq!(styles.get("color"), Some(&json!("white")));
    }
}
