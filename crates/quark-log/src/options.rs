//! Option bags for levels and plugins.
//!
//! Both kinds of options carry a typed part the pipeline reads (a level's
//! styles, a plugin's enabled flag) plus an open [`Options`] bag for
//! anything else callers or plugins want to pass along. Updates merge
//! shallowly: keys present in the update overwrite, all others are kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::style::StyleMap;

/// Ordered, open key/value bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a key, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow merge: every key of `update` overwrites the same key here.
    pub fn merge(&mut self, update: Options) {
        for (key, value) in update.0 {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Options
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

/// Options attached to a level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelOptions {
    styles: Option<StyleMap>,
    values: Options,
}

impl LevelOptions {
    /// Creates options with no styles and no extra values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options carrying only a style map.
    #[must_use]
    pub fn styled(styles: StyleMap) -> Self {
        Self::new().with_styles(styles)
    }

    #[must_use]
    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = Some(styles);
        self
    }

    /// Adds an extra value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.set(key, value);
        self
    }

    /// The level's style map, if any.
    #[must_use]
    pub fn styles(&self) -> Option<&StyleMap> {
        self.styles.as_ref()
    }

    #[must_use]
    pub fn values(&self) -> &Options {
        &self.values
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Shallow merge used when a level is registered again.
    ///
    /// A style map in `update` replaces the current one as a whole.
    pub fn merge(&mut self, update: LevelOptions) {
        if let Some(styles) = update.styles {
            self.styles = Some(styles);
        }
        self.values.merge(update.values);
    }
}

/// Key in a plugin option bag that toggles the plugin.
pub const ENABLED_KEY: &str = "enabled";

/// Options attached to a registered plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginOptions {
    enabled: bool,
    values: Options,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginOptions {
    /// Enabled, with no extra values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            values: Options::new(),
        }
    }

    /// `{ enabled: true, ..options }`.
    #[must_use]
    pub fn from_options(options: Options) -> Self {
        let mut this = Self::new();
        this.merge(options);
        this
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn values(&self) -> &Options {
        &self.values
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get_str(key)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get_bool(key)
    }

    /// Shallow merge; a boolean `"enabled"` key toggles the plugin.
    pub fn merge(&mut self, mut update: Options) {
        match update.remove(ENABLED_KEY) {
            Some(Value::Bool(enabled)) => self.enabled = enabled,
            Some(other) => {
                self.values.set(ENABLED_KEY, other);
            }
            None => {}
        }
        self.values.merge(update);
    }
}

impl From<Options> for PluginOptions {
    fn from(options: Options) -> Self {
        Self::from_options(options)
    }
}
