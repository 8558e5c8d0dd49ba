// src/application/services/bookmark_service_impl.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::aggregator::Aggregator;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::registry::PluginRegistry;
use crate::application::services::bookmark_service::BookmarkService;
use crate::domain::bookmark::{remove_duplicates, Bookmark};
use crate::domain::repositories::bookmark_store::BookmarkStore;
use crate::domain::services::icon_cache::IconCache;
use tracing::{debug, error, info, instrument};

#[derive(Debug)]
pub struct BookmarkServiceImpl<S: BookmarkStore> {
    store: Arc<S>,
    icons: Arc<dyn IconCache>,
    registry: Arc<PluginRegistry>,
    plugin_settings: BTreeMap<String, toml::Value>,
}

impl<S: BookmarkStore> BookmarkServiceImpl<S> {
    pub fn new(
        store: Arc<S>,
        icons: Arc<dyn IconCache>,
        registry: Arc<PluginRegistry>,
        plugin_settings: BTreeMap<String, toml::Value>,
    ) -> Self {
        Self {
            store,
            icons,
            registry,
            plugin_settings,
        }
    }

    /// Plugins are created fresh for every pass.
    fn aggregator(&self) -> Aggregator {
        Aggregator::init(&self.registry, &self.plugin_settings)
    }

    /// Stored rows carry no icon path; look it up in the cache.
    fn resolve_icons(&self, bookmarks: &mut [Bookmark]) {
        for bookmark in bookmarks.iter_mut().filter(|b| !b.has_icon()) {
            match self.icons.get_icon_path(&bookmark.uri) {
                Ok(Some(path)) => bookmark.icon = path.to_string_lossy().into_owned(),
                Ok(None) => {}
                Err(e) => debug!("No icon for {}: {}", bookmark.uri, e),
            }
        }
    }
}

impl<S: BookmarkStore> BookmarkService for BookmarkServiceImpl<S> {
    #[instrument(skip(self), level = "debug")]
    fn load_bookmarks(&self, deduplicate: bool) -> ApplicationResult<Vec<Bookmark>> {
        let bookmarks = match self.store.get_bookmarks() {
            Ok(mut stored) if !stored.is_empty() => {
                debug!("Using {} stored bookmarks", stored.len());
                self.resolve_icons(&mut stored);
                stored
            }
            Ok(_) => {
                info!("Bookmark store is empty, reading browsers");
                let fresh = self.aggregator().get_bookmarks();
                if let Err(e) = self.store.update_bookmarks(&fresh) {
                    error!("Could not store bookmarks: {}", e);
                }
                fresh
            }
            Err(e) => {
                error!("Could not read bookmark store, reading browsers: {}", e);
                self.aggregator().get_bookmarks()
            }
        };

        Ok(if deduplicate {
            remove_duplicates(bookmarks)
        } else {
            bookmarks
        })
    }

    #[instrument(skip(self), level = "debug")]
    fn refresh_bookmarks(&self) -> ApplicationResult<Vec<Bookmark>> {
        let bookmarks = self.aggregator().get_bookmarks();
        self.store
            .update_bookmarks(&bookmarks)
            .map_err(|e| ApplicationError::from(e).context("update bookmark store"))?;
        info!("Stored {} bookmarks", bookmarks.len());
        Ok(bookmarks)
    }

    #[instrument(skip(self), level = "debug")]
    fn bookmarks_by_plugin(&self, name: &str) -> ApplicationResult<Vec<Bookmark>> {
        let mut aggregator = self.aggregator();
        if !aggregator.list_plugins().iter().any(|p| p == name) {
            return Err(ApplicationError::Validation(format!(
                "unknown source {}, available: {}",
                name,
                aggregator.list_plugins().join(", ")
            )));
        }
        Ok(aggregator.get_bookmarks_by_plugin(name))
    }

    fn list_plugins(&self) -> ApplicationResult<Vec<String>> {
        Ok(self.aggregator().list_plugins())
    }
}
