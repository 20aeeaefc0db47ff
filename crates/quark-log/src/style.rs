//! Style maps and their inline serialization.
//!
//! A [`StyleMap`] is an ordered set of camelCase property names mapped to
//! primitive values. Serialization converts each property to kebab-case and
//! emits `property: value;` pairs in insertion order, which is the syntax
//! styling-capable sinks consume for each style marker.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Style argument that clears styling until the next marker.
pub const RESET: &str = "";

/// Ordered mapping from camelCase style property to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(Map<String, Value>);

impl StyleMap {
    /// Creates an empty style map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    /// Sets a property, keeping its original position if already present.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(property.into(), value.into());
    }

    /// Returns the value of a property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.0.get(property)
    }

    /// Returns `true` if no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Overlays `other` onto this map; keys in `other` win.
    pub fn extend(&mut self, other: &StyleMap) {
        for (property, value) in &other.0 {
            self.0.insert(property.clone(), value.clone());
        }
    }

    /// Reads a style map out of a JSON object value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(|map| Self(map.clone()))
    }
}

impl From<Map<String, Value>> for StyleMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn camel_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new("([a-z])([A-Z])").expect("camel-case boundary pattern"))
}

/// Converts a camelCase property name to kebab-case (`fontWeight` → `font-weight`).
#[must_use]
pub fn camel_to_kebab(property: &str) -> String {
    camel_boundary()
        .replace_all(property, "$1-$2")
        .to_lowercase()
}

/// Renders a style value the way it appears in an inline declaration.
fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Overrides every plugin style map with the level's styles.
///
/// The result has the same length and order as `plugin_styles`; on a key
/// collision the level value wins.
#[must_use]
pub fn merge_styles(level_styles: &StyleMap, plugin_styles: &[StyleMap]) -> Vec<StyleMap> {
    plugin_styles
        .iter()
        .map(|plugin| {
            let mut merged = plugin.clone();
            merged.extend(level_styles);
            merged
        })
        .collect()
}

/// Serializes a style map into `property: value;` pairs.
#[must_use]
pub fn serialize_styles(styles: &StyleMap) -> String {
    let mut out = String::new();
    for (property, value) in styles.iter() {
        out.push_str(&camel_to_kebab(property));
        out.push_str(": ");
        out.push_str(&value_text(value));
        out.push(';');
    }
    out
}

/// Serializes each map followed by a [`RESET`] marker, flattened.
#[must_use]
pub fn serialize_style_list(styles: &[StyleMap]) -> Vec<String> {
    styles
        .iter()
        .flat_map(|map| [serialize_styles(map), RESET.to_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("fontWeight"), "font-weight");
        assert_eq!(camel_to_kebab("backgroundColor"), "background-color");
        assert_eq!(camel_to_kebab("color"), "color");
        assert_eq!(camel_to_kebab("borderTopLeftRadius"), "border-top-left-radius");
    }

    #[test]
    fn test_serialize_preserves_order() {
        let styles = StyleMap::new()
            .with("fontWeight", "bold")
            .with("color", "red");
        assert_eq!(serialize_styles(&styles), "font-weight: bold;color: red;");
    }

    #[test]
    fn test_serialize_non_string_values() {
        let styles = StyleMap::new().with("opacity", 0.5).with("zIndex", 3);
        assert_eq!(serialize_styles(&styles), "opacity: 0.5;z-index: 3;");
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(serialize_styles(&StyleMap::new()), "");
    }

    #[test]
    fn test_serialize_list_appends_resets() {
        let list = vec![
            StyleMap::new().with("color", "red"),
            StyleMap::new(),
        ];
        assert_eq!(
            serialize_style_list(&list),
            vec!["color: red;", "", "", ""]
        );
    }

    #[test]
    fn test_merge_level_wins() {
        let level = StyleMap::new().with("color", "red");
        let plugins = vec![
            StyleMap::new().with("color", "white").with("padding", "3px"),
            StyleMap::new(),
        ];

        let merged = merge_styles(&level, &plugins);
        assert_eq!(merged.len(), 2);
        assert_eq!(serialize_styles(&merged[0]), "color: red;padding: 3px;");
        assert_eq!(serialize_styles(&merged[1]), "color: red;");
    }

    #[test]
    fn test_set_keeps_position() {
        let mut styles = StyleMap::new().with("color", "red").with("padding", "1px");
        styles.set("color", "blue");
        assert_eq!(serialize_styles(&styles), "color: blue;padding: 1px;");
    }

    #[test]
    fn test_from_value() {
        let value = serde_json::json!({ "color": "red" });
        let styles = StyleMap::from_value(&value).unwrap();
        assert_eq!(styles.get("color"), Some(&Value::from("red")));
        assert!(StyleMap::from_value(&Value::from(3)).is_none());
    }
}
