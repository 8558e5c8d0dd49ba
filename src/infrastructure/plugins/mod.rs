// src/infrastructure/plugins/mod.rs
pub mod chrome;
pub mod firefox;
pub mod snapshot;

use crate::application::registry::PluginRegistry;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::SourcePlugin;
use crate::domain::services::icon_cache::IconCache;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use chrome::ChromePlugin;
use firefox::FirefoxPlugin;

/// Registers the built-in browser sources, sharing one icon cache.
pub fn register_builtin_plugins(registry: &mut PluginRegistry, icons: Arc<dyn IconCache>) {
    let chrome_icons = icons.clone();
    registry.register(chrome::CONFIG_KEY, move |raw| {
        let plugin = ChromePlugin::from_settings(raw, chrome_icons.clone())?;
        Ok(Box::new(plugin) as Box<dyn SourcePlugin>)
    });

    registry.register(firefox::CONFIG_KEY, move |raw| {
        let plugin = FirefoxPlugin::from_settings(raw, icons.clone())?;
        Ok(Box::new(plugin) as Box<dyn SourcePlugin>)
    });
    debug!("Registered built-in plugins: {:?}", registry.list_plugins());
}

/// Binds a plugin's settings table to its typed config; `None` yields the default.
pub(crate) fn config_from_value<T>(raw: Option<&toml::Value>, plugin: &str) -> DomainResult<T>
where
    T: DeserializeOwned + Default,
{
    match raw {
        None => Ok(T::default()),
        Some(value) => value.clone().try_into::<T>().map_err(|e| {
            DomainError::Configuration(format!("invalid settings for plugin {}: {}", plugin, e))
        }),
    }
}

pub(crate) fn config_to_value<T: serde::Serialize>(config: &T) -> DomainResult<toml::Value> {
    toml::Value::try_from(config).map_err(|e| DomainError::Serialization(e.to_string()))
}

/// Expands a leading `~` to the home directory.
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
