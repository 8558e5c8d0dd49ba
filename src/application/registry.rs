// src/application/registry.rs
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::SourcePlugin;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

/// Builds a plugin from its optional settings table.
pub type PluginFactory =
    Box<dyn Fn(Option<&toml::Value>) -> DomainResult<Box<dyn SourcePlugin>> + Send + Sync>;

/// Name to factory mapping, iterated in name order.
#[derive(Default)]
pub struct PluginRegistry {
    factories: BTreeMap<String, PluginFactory>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`. The first registration of a name wins; returns
    /// whether this call registered it.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(Option<&toml::Value>) -> DomainResult<Box<dyn SourcePlugin>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            debug!("Plugin already registered, keeping first: {}", name);
            return false;
        }
        self.factories.insert(name, Box::new(factory));
        true
    }

    /// Construct the plugin registered as `name`, bound to `config`.
    #[instrument(skip(self, config), level = "debug")]
    pub fn create(
        &self,
        name: &str,
        config: Option<&toml::Value>,
    ) -> DomainResult<Box<dyn SourcePlugin>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DomainError::UnknownPlugin(name.to_string()))?;
        factory(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn list_plugins(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::bookmark::Bookmark;
    use crate::domain::plugin::PluginConfig;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    pub(crate) struct NoConfig;

    impl PluginConfig for NoConfig {
        fn load(&mut self) -> DomainResult<()> {
            Ok(())
        }
        fn save(&self) -> DomainResult<toml::Value> {
            Ok(toml::Value::Table(Default::default()))
        }
        fn profile_path(&self) -> Option<PathBuf> {
            None
        }
    }

    /// Returns a fixed list of bookmarks
    #[derive(Debug)]
    pub(crate) struct StaticPlugin {
        pub name: String,
        pub bookmarks: Vec<Bookmark>,
        pub config: NoConfig,
    }

    impl StaticPlugin {
        pub fn new(name: &str, bookmarks: Vec<Bookmark>) -> Self {
            Self {
                name: name.to_string(),
                bookmarks,
                config: NoConfig,
            }
        }
    }

    impl SourcePlugin for StaticPlugin {
        fn name(&self) -> &str {
            &self.name
        }
        fn get_bookmarks(&mut self) -> Vec<Bookmark> {
            self.bookmarks.clone()
        }
        fn config(&self) -> &dyn PluginConfig {
            &self.config
        }
        fn set_config(&mut self, _raw: Option<&toml::Value>) -> DomainResult<()> {
            Ok(())
        }
    }

    #[test]
    fn given_unregistered_name_when_create_then_unknown_plugin_and_nothing_built() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let mut registry = PluginRegistry::new();
        registry.register("chrome", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StaticPlugin::new("Chrome", vec![])) as Box<dyn SourcePlugin>)
        });

        let result = registry.create("opera", None);

        assert!(matches!(result, Err(DomainError::UnknownPlugin(name)) if name == "opera"));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn given_duplicate_registration_when_create_then_first_factory_wins() {
        let mut registry = PluginRegistry::new();
        let first = registry.register("chrome", |_| {
            Ok(Box::new(StaticPlugin::new("First", vec![])) as Box<dyn SourcePlugin>)
        });
        let second = registry.register("chrome", |_| {
            Ok(Box::new(StaticPlugin::new("Second", vec![])) as Box<dyn SourcePlugin>)
        });

        let plugin = registry.create("chrome", None).unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(plugin.name(), "First");
        assert_eq!(registry.list_plugins(), vec!["chrome"]);
    }

    #[test]
    fn given_config_when_create_then_factory_receives_it() {
        let mut registry = PluginRegistry::new();
        registry.register("echo", |raw| {
            let name = raw
                .and_then(|v| v.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("unset")
                .to_string();
            Ok(Box::new(StaticPlugin::new(&name, vec![])) as Box<dyn SourcePlugin>)
        });
        let raw: toml::Value = toml::from_str("name = \"configured\"").unwrap();

        assert_eq!(registry.create("echo", Some(&raw)).unwrap().name(), "configured");
        assert_eq!(registry.create("echo", None).unwrap().name(), "unset");
        assert!(registry.contains("echo"));
    }
}
