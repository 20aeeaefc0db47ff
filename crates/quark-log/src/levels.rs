//! Level registry.
//!
//! Holds the named levels a logger can emit on. The four built-in levels
//! always exist; custom levels are added by registration and dropped on
//! reset. The registry is the dispatch table consulted by
//! [`Logger::emit`](crate::Logger::emit).

use crate::error::{ConfigError, ConfigResult, is_valid_name};
use crate::options::LevelOptions;
use crate::sink::{BUILTIN_LEVELS, is_builtin_level};

/// A named level and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    name: String,
    options: LevelOptions,
}

impl Level {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn options(&self) -> &LevelOptions {
        &self.options
    }

    /// Whether the sink has a native operation for this level.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        is_builtin_level(&self.name)
    }
}

/// Ordered set of levels.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRegistry {
    levels: Vec<Level>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRegistry {
    /// Creates a registry holding only the built-in levels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: BUILTIN_LEVELS
                .iter()
                .map(|name| Level {
                    name: (*name).to_string(),
                    options: LevelOptions::new(),
                })
                .collect(),
        }
    }

    /// Adds a level or merges `options` into an existing one.
    pub fn register(&mut self, name: &str, options: LevelOptions) -> ConfigResult<&Level> {
        if !is_valid_name(name) {
            return Err(ConfigError::MissingLevelName);
        }

        let index = match self.levels.iter().position(|level| level.name == name) {
            Some(index) => {
                self.levels[index].options.merge(options);
                index
            }
            None => {
                self.levels.push(Level {
                    name: name.to_string(),
                    options,
                });
                self.levels.len() - 1
            }
        };

        Ok(&self.levels[index])
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Level names in registration order, built-ins first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|level| level.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Drops custom levels and clears every built-in's options.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleMap;
    use serde_json::Value;

    #[test]
    fn test_new_has_builtins() {
        let registry = LevelRegistry::new();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["log", "info", "warn", "error"]);
        assert!(registry.get("log").is_some_and(Level::is_builtin));
    }

    #[test]
    fn test_register_custom_level() {
        let mut registry = LevelRegistry::new();
        let level = registry
            .register("bold", LevelOptions::styled(StyleMap::new().with("fontWeight", "bold")))
            .unwrap();

        assert_eq!(level.name(), "bold");
        assert!(!level.is_builtin());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_register_existing_merges() {
        let mut registry = LevelRegistry::new();
        registry
            .register("log", LevelOptions::new().with("a", 1))
            .unwrap();
        registry
            .register("log", LevelOptions::new().with("b", 2))
            .unwrap();

        let options = registry.get("log").unwrap().options();
        assert_eq!(options.get("a"), Some(&Value::from(1)));
        assert_eq!(options.get("b"), Some(&Value::from(2)));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_register_blank_name_fails() {
        let mut registry = LevelRegistry::new();
        assert_eq!(
            registry.register("", LevelOptions::new()).unwrap_err(),
            ConfigError::MissingLevelName
        );
        assert_eq!(registry, LevelRegistry::new());
    }

    #[test]
    fn test_reset_restores_builtins() {
        let mut registry = LevelRegistry::new();
        registry
            .register("log", LevelOptions::styled(StyleMap::new().with("color", "red")))
            .unwrap();
        registry.register("custom", LevelOptions::new()).unwrap();

        registry.reset();
        assert_eq!(registry, LevelRegistry::new());
        assert!(!registry.contains("custom"));
        assert!(registry.get("log").unwrap().options().styles().is_none());
    }
}
