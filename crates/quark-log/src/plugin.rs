//! Plugin contract and registry.
//!
//! A plugin is a named [`Plugin`] transform plus [`PluginOptions`]. On every
//! emission the logger runs the enabled plugins in registration order; each
//! may replace the message list and contribute a prefix, a suffix and a
//! style map (see [`compose`](crate::compose)).
//!
//! # Example
//!
//! ```ignore
//! use quark_log::{Logger, Options, PluginResult, plugin_fn};
//!
//! let logger = Logger::new();
//! logger.plugin(
//!     "tag",
//!     plugin_fn(|_msgs, options, _level| {
//!         PluginResult::new().before(format!("<{}>", options.get_str("tag").unwrap_or("?")))
//!     }),
//!     Options::new().with("tag", "db"),
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult, is_valid_name};
use crate::options::{LevelOptions, Options, PluginOptions};
use crate::style::StyleMap;

/// The level an emission fires on, as seen by plugins.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelInfo {
    pub name: String,
    pub options: LevelOptions,
}

impl LevelInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, options: LevelOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// What a plugin contributes to one emission. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginResult {
    /// Replacement message list for the following plugins and the renderer.
    pub messages: Option<Vec<Value>>,
    /// Fragment rendered ahead of the messages.
    pub before: Option<String>,
    /// Fragment rendered after the messages.
    pub after: Option<String>,
    /// Styles applied to this plugin's `before` fragment.
    pub styles: Option<StyleMap>,
}

impl PluginResult {
    /// An empty contribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(mut self, messages: Vec<Value>) -> Self {
        self.messages = Some(messages);
        self
    }

    #[must_use]
    pub fn before(mut self, fragment: impl Into<String>) -> Self {
        self.before = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn after(mut self, fragment: impl Into<String>) -> Self {
        self.after = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn styles(mut self, styles: StyleMap) -> Self {
        self.styles = Some(styles);
        self
    }
}

/// A message transform.
///
/// Implementations may read their options and the level but must not
/// mutate the logger. Side effects such as reading the clock are fine.
pub trait Plugin: Send + Sync {
    fn transform(
        &self,
        messages: &[Value],
        options: &PluginOptions,
        level: &LevelInfo,
    ) -> PluginResult;
}

/// Adapter turning a closure into a [`Plugin`].
pub struct FnPlugin<F>(F);

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&[Value], &PluginOptions, &LevelInfo) -> PluginResult + Send + Sync,
{
    fn transform(
        &self,
        messages: &[Value],
        options: &PluginOptions,
        level: &LevelInfo,
    ) -> PluginResult {
        (self.0)(messages, options, level)
    }
}

impl<F> fmt::Debug for FnPlugin<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnPlugin")
    }
}

/// Wraps a closure as a plugin.
pub fn plugin_fn<F>(f: F) -> FnPlugin<F>
where
    F: Fn(&[Value], &PluginOptions, &LevelInfo) -> PluginResult + Send + Sync,
{
    FnPlugin(f)
}

/// Second argument of a plugin registration.
#[derive(Clone)]
pub enum PluginArg {
    /// Create or replace the plugin with this transform.
    Transform(Arc<dyn Plugin>),
    /// Merge these options into an already registered plugin.
    Options(Options),
}

impl PluginArg {
    pub fn transform(plugin: impl Plugin + 'static) -> Self {
        Self::Transform(Arc::new(plugin))
    }
}

impl From<Options> for PluginArg {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl From<Arc<dyn Plugin>> for PluginArg {
    fn from(plugin: Arc<dyn Plugin>) -> Self {
        Self::Transform(plugin)
    }
}

impl fmt::Debug for PluginArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(_) => f.write_str("Transform(..)"),
            Self::Options(options) => f.debug_tuple("Options").field(options).finish(),
        }
    }
}

/// A plugin as stored in the registry.
#[derive(Clone)]
pub struct RegisteredPlugin {
    pub(crate) name: String,
    pub(crate) transform: Arc<dyn Plugin>,
    pub(crate) options: PluginOptions,
}

impl RegisteredPlugin {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Runs the transform with this plugin's options.
    pub fn apply(&self, messages: &[Value], level: &LevelInfo) -> PluginResult {
        self.transform.transform(messages, &self.options, level)
    }
}

impl fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// What a successful registration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    Replaced,
    OptionsUpdated,
}

/// Plugins in registration order.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<RegisteredPlugin>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or updates the plugin called `name`.
    ///
    /// `PluginArg::Options` only merges into an existing plugin and leaves its
    /// transform alone. `PluginArg::Transform` installs the transform with
    /// options `{ enabled: true, ..options }`; a replaced plugin keeps its
    /// position in the composition order.
    pub fn register(
        &mut self,
        name: &str,
        arg: PluginArg,
        options: Options,
    ) -> ConfigResult<Registration> {
        if !is_valid_name(name) {
            return Err(ConfigError::MissingPluginName);
        }

        let existing = self.plugins.iter().position(|plugin| plugin.name == name);

        match (arg, existing) {
            (PluginArg::Options(update), Some(index)) => {
                self.plugins[index].options.merge(update);
                Ok(Registration::OptionsUpdated)
            }
            (PluginArg::Options(_), None) => Err(ConfigError::NotATransform(name.to_string())),
            (PluginArg::Transform(transform), Some(index)) => {
                let plugin = &mut self.plugins[index];
                plugin.transform = transform;
                plugin.options = PluginOptions::from_options(options);
                Ok(Registration::Replaced)
            }
            (PluginArg::Transform(transform), None) => {
                self.plugins.push(RegisteredPlugin {
                    name: name.to_string(),
                    transform,
                    options: PluginOptions::from_options(options),
                });
                Ok(Registration::Added)
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredPlugin> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|plugin| plugin.name.as_str())
    }

    /// Plugins in composition order.
    #[must_use]
    pub fn as_slice(&self) -> &[RegisteredPlugin] {
        &self.plugins
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn clear(&mut self) {
        self.plugins.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(tag: &'static str) -> PluginArg {
        PluginArg::transform(plugin_fn(move |_, _, _| PluginResult::new().before(tag)))
    }

    fn level() -> LevelInfo {
        LevelInfo::new("log", LevelOptions::new())
    }

    #[test]
    fn test_register_adds_enabled_plugin() {
        let mut registry = PluginRegistry::new();
        let outcome = registry
            .register("a", prefix("A"), Options::new().with("x", 1))
            .unwrap();

        assert_eq!(outcome, Registration::Added);
        let plugin = registry.get("a").unwrap();
        assert!(plugin.options().enabled());
        assert_eq!(plugin.options().get("x"), Some(&Value::from(1)));
    }

    #[test]
    fn test_options_update_keeps_transform() {
        let mut registry = PluginRegistry::new();
        registry
            .register("a", prefix("A"), Options::new().with("x", 1).with("y", 2))
            .unwrap();
        let before = Arc::clone(&registry.get("a").unwrap().transform);

        let outcome = registry
            .register("a", Options::new().with("x", 10).into(), Options::new())
            .unwrap();
        assert_eq!(outcome, Registration::OptionsUpdated);

        let plugin = registry.get("a").unwrap();
        assert!(Arc::ptr_eq(&before, &plugin.transform));
        assert_eq!(plugin.options().get("x"), Some(&Value::from(10)));
        assert_eq!(plugin.options().get("y"), Some(&Value::from(2)));
    }

    #[test]
    fn test_options_for_unknown_plugin_fails() {
        let mut registry = PluginRegistry::new();
        let err = registry
            .register("ghost", Options::new().into(), Options::new())
            .unwrap_err();
        assert_eq!(err, ConfigError::NotATransform("ghost".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_blank_name_fails() {
        let mut registry = PluginRegistry::new();
        assert_eq!(
            registry.register(" ", prefix("A"), Options::new()).unwrap_err(),
            ConfigError::MissingPluginName
        );
    }

    #[test]
    fn test_replace_resets_options_and_keeps_position() {
        let mut registry = PluginRegistry::new();
        registry
            .register("a", prefix("A"), Options::new().with("enabled", false).with("x", 1))
            .unwrap();
        registry.register("b", prefix("B"), Options::new()).unwrap();

        let outcome = registry.register("a", prefix("A2"), Options::new()).unwrap();
        assert_eq!(outcome, Registration::Replaced);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["a", "b"]);

        let plugin = registry.get("a").unwrap();
        assert!(plugin.options().enabled());
        assert!(plugin.options().get("x").is_none());
        assert_eq!(plugin.apply(&[], &level()).before.as_deref(), Some("A2"));
    }

    #[test]
    fn test_clear() {
        let mut registry = PluginRegistry::new();
        registry.register("a", prefix("A"), Options::new()).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.names().count(), 0);
    }

    #[test]
    fn test_plugin_result_builder() {
        let result = PluginResult::new()
            .before("[x]")
            .after("!")
            .styles(StyleMap::new().with("color", "red"))
            .messages(vec![Value::from("m")]);
        assert_eq!(result.before.as_deref(), Some("[x]"));
        assert_eq!(result.after.as_deref(), Some("!"));
        assert_eq!(result.messages.as_ref().map(Vec::len), Some(1));
        assert!(result.styles.is_some());
    }
}
