// src/application/aggregator.rs
use crate::application::registry::PluginRegistry;
use crate::domain::bookmark::{remove_duplicates, Bookmark};
use crate::domain::plugin::SourcePlugin;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, instrument, warn};

/// Active plugins of one aggregation pass, in registry order.
#[derive(Debug, Default)]
pub struct Aggregator {
    plugins: Vec<Box<dyn SourcePlugin>>,
}

impl Aggregator {
    pub fn new(plugins: Vec<Box<dyn SourcePlugin>>) -> Self {
        Self { plugins }
    }

    /// Instantiate every registered plugin with its settings table; plugins that cannot
    /// be built are logged and skipped.
    #[instrument(skip_all, level = "debug")]
    pub fn init(registry: &PluginRegistry, plugin_settings: &BTreeMap<String, toml::Value>) -> Self {
        let mut plugins = Vec::new();
        for name in registry.list_plugins() {
            match registry.create(&name, plugin_settings.get(&name)) {
                Ok(plugin) => {
                    debug!("Plugin initialized: {} ({})", name, plugin.name());
                    plugins.push(plugin);
                }
                Err(e) => error!("Could not initialize plugin {}: {}", name, e),
            }
        }
        Self { plugins }
    }

    /// Bookmarks of all plugins, deduplicated.
    #[instrument(skip(self), level = "debug")]
    pub fn get_bookmarks(&mut self) -> Vec<Bookmark> {
        let mut bookmarks = Vec::new();
        for plugin in self.plugins.iter_mut() {
            bookmarks.extend(collect(plugin.as_mut()));
        }
        let total = bookmarks.len();
        let unique = remove_duplicates(bookmarks);
        info!("Aggregated {} bookmarks ({} unique)", total, unique.len());
        unique
    }

    /// Bookmarks of the plugins displayed as `name`, deduplicated.
    #[instrument(skip(self), level = "debug")]
    pub fn get_bookmarks_by_plugin(&mut self, name: &str) -> Vec<Bookmark> {
        let mut bookmarks = Vec::new();
        for plugin in self.plugins.iter_mut().filter(|p| p.name() == name) {
            bookmarks.extend(collect(plugin.as_mut()));
        }
        remove_duplicates(bookmarks)
    }

    /// Display names of the active plugins
    pub fn list_plugins(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }
}

/// A panicking plugin yields nothing instead of aborting the pass.
fn collect(plugin: &mut dyn SourcePlugin) -> Vec<Bookmark> {
    let name = plugin.name().to_string();
    match panic::catch_unwind(AssertUnwindSafe(|| plugin.get_bookmarks())) {
        Ok(bookmarks) => {
            debug!("{} returned {} bookmarks", name, bookmarks.len());
            bookmarks
        }
        Err(_) => {
            warn!("Plugin {} panicked, skipping its bookmarks", name);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::tests::{NoConfig, StaticPlugin};
    use crate::domain::bookmark::BookmarkBuilder;
    use crate::domain::error::{DomainError, DomainResult};
    use crate::domain::plugin::PluginConfig;
    use crate::util::testing::init_test_env;
    use std::collections::HashSet;

    fn bm(title: &str, uri: &str, source: &str, tags: &[&str]) -> Bookmark {
        BookmarkBuilder::default()
            .title(title)
            .uri(uri)
            .source(source)
            .tags(tags.iter().map(|s| s.to_string()).collect::<HashSet<_>>())
            .build()
            .unwrap()
    }

    #[derive(Debug, Default)]
    struct PanickingPlugin {
        config: NoConfig,
    }

    impl SourcePlugin for PanickingPlugin {
        fn name(&self) -> &str {
            "Broken"
        }
        fn get_bookmarks(&mut self) -> Vec<Bookmark> {
            panic!("corrupt profile");
        }
        fn config(&self) -> &dyn PluginConfig {
            &self.config
        }
        fn set_config(&mut self, _raw: Option<&toml::Value>) -> DomainResult<()> {
            Ok(())
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register("chrome", |_| {
            Ok(Box::new(StaticPlugin::new(
                "Chrome",
                vec![
                    bm("Site", "https://a.org", "Chrome", &["a", "b"]),
                    bm("Only Chrome", "https://c.org", "Chrome", &[]),
                ],
            )) as Box<dyn SourcePlugin>)
        });
        registry.register("firefox", |_| {
            Ok(Box::new(StaticPlugin::new(
                "Firefox",
                vec![bm("Site", "https://a.org", "Firefox", &["b", "c"])],
            )) as Box<dyn SourcePlugin>)
        });
        registry.register("opera", |_| {
            Err(DomainError::Configuration("no profile".to_string()))
        });
        registry
    }

    #[test]
    fn given_failing_factory_when_init_then_plugin_skipped() {
        let _ = init_test_env();

        let aggregator = Aggregator::init(&registry(), &BTreeMap::new());

        assert_eq!(aggregator.list_plugins(), vec!["Chrome", "Firefox"]);
    }

    #[test]
    fn given_overlapping_sources_when_get_bookmarks_then_deduplicated_in_registry_order() {
        let _ = init_test_env();
        let mut aggregator = Aggregator::init(&registry(), &BTreeMap::new());

        let bookmarks = aggregator.get_bookmarks();

        assert_eq!(bookmarks.len(), 2);
        assert_eq!(bookmarks[0].title, "Site");
        assert_eq!(bookmarks[0].source, "Chrome");
        let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(bookmarks[0].tags, expected);
        assert_eq!(bookmarks[1].title, "Only Chrome");
    }

    #[test]
    fn given_panicking_plugin_when_get_bookmarks_then_others_still_returned() {
        let _ = init_test_env();
        let mut aggregator = Aggregator::new(vec![
            Box::new(PanickingPlugin::default()),
            Box::new(StaticPlugin::new(
                "Firefox",
                vec![
                    bm("Site", "https://a.org", "Firefox", &["x"]),
                    bm("Site", "https://a.org", "Firefox", &["y"]),
                ],
            )),
        ]);

        let bookmarks = aggregator.get_bookmarks();

        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].tags.len(), 2);
    }

    #[test]
    fn given_plugin_name_when_get_bookmarks_by_plugin_then_only_that_source() {
        let _ = init_test_env();
        let mut aggregator = Aggregator::init(&registry(), &BTreeMap::new());

        let firefox = aggregator.get_bookmarks_by_plugin("Firefox");
        let unknown = aggregator.get_bookmarks_by_plugin("Opera");

        assert_eq!(firefox.len(), 1);
        assert_eq!(firefox[0].source, "Firefox");
        assert!(unknown.is_empty());
    }

    #[test]
    fn given_settings_table_when_init_then_passed_to_factory() {
        let _ = init_test_env();
        let mut registry = PluginRegistry::new();
        registry.register("echo", |raw| {
            let name = raw
                .and_then(|v| v.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("unset")
                .to_string();
            Ok(Box::new(StaticPlugin::new(&name, vec![])) as Box<dyn SourcePlugin>)
        });
        let mut settings = BTreeMap::new();
        settings.insert("echo".to_string(), toml::from_str("name = \"Echo\"").unwrap());

        let aggregator = Aggregator::init(&registry, &settings);

        assert_eq!(aggregator.list_plugins(), vec!["Echo"]);
    }
}
