// src/domain/plugin.rs
use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;
use std::fmt::Debug;
use std::path::PathBuf;

/*
   Source plugins
   A plugin knows one browser's storage format and turns its foreign records into
   `Bookmark`s. Plugins never fail towards the aggregator: any internal error is logged
   and an empty list is returned, so one broken profile cannot hide the others.

   Each plugin owns a typed configuration implementing `PluginConfig`; raw settings
   tables are bound through serde in `set_config`, never downcast at runtime.
*/

/// Capability set of a plugin's configuration
pub trait PluginConfig: Debug + Send + Sync {
    /// Resolve the profile location, auto-detecting when none is configured.
    fn load(&mut self) -> DomainResult<()>;

    /// Serialize back into a settings table
    fn save(&self) -> DomainResult<toml::Value>;

    /// Currently resolved profile location, if any
    fn profile_path(&self) -> Option<PathBuf>;
}

pub trait SourcePlugin: Debug + Send {
    /// Display name, also used as `Bookmark::source`
    fn name(&self) -> &str;

    /// Extract all bookmarks of this source. Never fails; errors yield an empty list.
    fn get_bookmarks(&mut self) -> Vec<Bookmark>;

    fn config(&self) -> &dyn PluginConfig;

    /// Rebind configuration from a raw settings table; `None` resets to auto-detection.
    fn set_config(&mut self, raw: Option<&toml::Value>) -> DomainResult<()>;
}
