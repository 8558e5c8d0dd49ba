// src/infrastructure/plugins/firefox/mod.rs
mod config;
mod places;

pub use config::{detect_profile, FirefoxConfig};

use crate::domain::bookmark::{parse_tags, Bookmark};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::{PluginConfig, SourcePlugin};
use crate::domain::services::icon_cache::IconCache;
use crate::infrastructure::plugins::snapshot::DatabaseSnapshot;
use places::{PlaceRow, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const CONFIG_KEY: &str = "firefox";
pub const DISPLAY_NAME: &str = "Firefox";

#[derive(Debug)]
pub struct FirefoxPlugin {
    config: FirefoxConfig,
    icons: Arc<dyn IconCache>,
}

impl FirefoxPlugin {
    pub fn new(config: FirefoxConfig, icons: Arc<dyn IconCache>) -> Self {
        Self { config, icons }
    }

    pub fn from_settings(raw: Option<&toml::Value>, icons: Arc<dyn IconCache>) -> DomainResult<Self> {
        Ok(Self::new(FirefoxConfig::from_value(raw)?, icons))
    }

    #[instrument(skip(self), level = "debug")]
    fn extract(&mut self) -> DomainResult<Vec<Bookmark>> {
        self.config.load()?;
        let places_file = self
            .config
            .places_file()
            .ok_or_else(|| DomainError::Configuration("no Firefox profile".to_string()))?;

        // the places snapshot is released before favicons are copied
        let (rows, tree) = {
            let places = DatabaseSnapshot::open(&places_file, "firefox_places")?;
            places.require_tables(&["moz_bookmarks", "moz_places"])?;
            let rows = places::read_bookmarks(places.connection())
                .map_err(|e| e.context(places_file.display().to_string()))?;
            let tree = places::read_tree(places.connection())?;
            (rows, tree)
        };

        let favicons = self.config.favicons_file().and_then(|path| {
            open_favicons_db(&path)
                .map_err(|e| debug!("Firefox favicons unavailable: {}", e))
                .ok()
        });

        let bookmarks: Vec<Bookmark> = rows
            .into_iter()
            .filter_map(|row| self.to_bookmark(row, &tree, favicons.as_ref()))
            .collect();
        Ok(bookmarks)
    }

    /// `None` for rows without a URL
    fn to_bookmark(
        &self,
        row: PlaceRow,
        tree: &Tree,
        favicons: Option<&DatabaseSnapshot>,
    ) -> Option<Bookmark> {
        let url = row.url.filter(|u| !u.is_empty())?;
        let path = places::folder_path(row.parent, tree);

        let mut bookmark = Bookmark::new(row.title.as_str(), path.as_str(), url.as_str(), DISPLAY_NAME);
        bookmark.description = row.description.unwrap_or_default();
        bookmark.tags = row.tags.map(parse_tags).unwrap_or_default();
        bookmark.icon = self.resolve_icon(&url, favicons);
        Some(bookmark)
    }

    /// Browser icon stored through the cache, else whatever the cache already holds.
    fn resolve_icon(&self, url: &str, favicons: Option<&DatabaseSnapshot>) -> String {
        let browser_icon = favicons.and_then(|db| {
            places::lookup_icon(db.connection(), url)
                .map_err(|e| debug!("Favicon query failed for {}: {}", url, e))
                .ok()
                .flatten()
        });

        if let Some(data) = browser_icon {
            match self.icons.save_and_cache_icon(&data, url) {
                Ok(path) => return path.to_string_lossy().into_owned(),
                Err(e) => debug!("Could not cache icon for {}: {}", url, e),
            }
        }

        match self.icons.get_icon_path(url) {
            Ok(Some(path)) => path.to_string_lossy().into_owned(),
            Ok(None) => String::new(),
            Err(e) => {
                debug!("Icon cache lookup failed for {}: {}", url, e);
                String::new()
            }
        }
    }
}

fn open_favicons_db(path: &Path) -> DomainResult<DatabaseSnapshot> {
    let db = DatabaseSnapshot::open(path, "firefox_favicons")?;
    db.require_tables(&["moz_pages_w_icons", "moz_icons_to_pages", "moz_icons"])?;
    Ok(db)
}

impl SourcePlugin for FirefoxPlugin {
    fn name(&self) -> &str {
        DISPLAY_NAME
    }

    fn get_bookmarks(&mut self) -> Vec<Bookmark> {
        match self.extract() {
            Ok(bookmarks) => {
                info!("Extracted {} bookmarks from {}", bookmarks.len(), DISPLAY_NAME);
                bookmarks
            }
            Err(e @ (DomainError::Configuration(_) | DomainError::SourceUnavailable(_))) => {
                info!("{} skipped: {}", DISPLAY_NAME, e);
                Vec::new()
            }
            Err(e) => {
                warn!("{} extraction failed: {}", DISPLAY_NAME, e);
                Vec::new()
            }
        }
    }

    fn config(&self) -> &dyn PluginConfig {
        &self.config
    }

    fn set_config(&mut self, raw: Option<&toml::Value>) -> DomainResult<()> {
        self.config = FirefoxConfig::from_value(raw)?;
        Ok(())
    }
}
