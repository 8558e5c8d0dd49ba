// src/infrastructure/plugins/chrome/mod.rs
mod config;

pub use config::{detect_profile, ChromeConfig};

use crate::domain::bookmark::Bookmark;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::plugin::{PluginConfig, SourcePlugin};
use crate::domain::services::icon_cache::IconCache;
use crate::infrastructure::plugins::snapshot::DatabaseSnapshot;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const CONFIG_KEY: &str = "chrome";
pub const DISPLAY_NAME: &str = "Chrome";

const FAVICON_BY_PAGE: &str = "SELECT fb.image_data FROM favicon_bitmaps fb \
     JOIN icon_mapping im ON fb.icon_id = im.icon_id \
     WHERE im.page_url = ?1 ORDER BY fb.width DESC LIMIT 1";

const FAVICON_BY_HOST: &str = "SELECT fb.image_data FROM favicon_bitmaps fb \
     JOIN icon_mapping im ON fb.icon_id = im.icon_id \
     WHERE im.page_url LIKE ?1 ORDER BY fb.width DESC LIMIT 1";

#[derive(Debug, Deserialize)]
struct BookmarksDocument {
    #[serde(default)]
    roots: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    children: Vec<Node>,
}

/// URL leaf of the bookmark tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub title: String,
    pub url: String,
    pub path: String,
}

/// Flattens a `Bookmarks` document into its URL leaves, roots in key order.
pub(crate) fn parse_bookmarks(document: &str) -> DomainResult<Vec<Entry>> {
    let parsed: BookmarksDocument = serde_json::from_str(document)?;
    let mut entries = Vec::new();

    for (key, value) in parsed.roots {
        match serde_json::from_value::<Node>(value) {
            Ok(root) => collect(&root, &key, &mut entries),
            Err(e) => debug!("Skipping root {}: {}", key, e),
        }
    }
    Ok(entries)
}

fn collect(node: &Node, path: &str, entries: &mut Vec<Entry>) {
    for child in &node.children {
        if child.kind == "url" {
            if let Some(url) = &child.url {
                entries.push(Entry {
                    title: child.name.clone(),
                    url: url.clone(),
                    path: path.to_string(),
                });
            }
        } else if !child.children.is_empty() {
            collect(child, &format!("{}/{}", path, child.name), entries);
        }
    }
}

/// Widest bitmap mapped to `url`, else the widest for any page on the same host.
fn lookup_icon(conn: &Connection, url: &str) -> DomainResult<Option<Vec<u8>>> {
    let exact: Option<Option<Vec<u8>>> = conn
        .query_row(FAVICON_BY_PAGE, [url], |row| row.get(0))
        .optional()?;
    if let Some(data) = exact.flatten().filter(|d| !d.is_empty()) {
        return Ok(Some(data));
    }

    let Some(host) = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
    else {
        return Ok(None);
    };

    let by_host: Option<Option<Vec<u8>>> = conn
        .query_row(FAVICON_BY_HOST, [format!("%{}%", host)], |row| row.get(0))
        .optional()?;
    Ok(by_host.flatten().filter(|d| !d.is_empty()))
}

#[derive(Debug)]
pub struct ChromePlugin {
    config: ChromeConfig,
    icons: Arc<dyn IconCache>,
}

impl ChromePlugin {
    pub fn new(config: ChromeConfig, icons: Arc<dyn IconCache>) -> Self {
        Self { config, icons }
    }

    pub fn from_settings(raw: Option<&toml::Value>, icons: Arc<dyn IconCache>) -> DomainResult<Self> {
        Ok(Self::new(ChromeConfig::from_value(raw)?, icons))
    }

    #[instrument(skip(self), level = "debug")]
    fn extract(&mut self) -> DomainResult<Vec<Bookmark>> {
        self.config.load()?;
        let file = self
            .config
            .bookmarks_file()
            .ok_or_else(|| DomainError::Configuration("no Chrome profile".to_string()))?;

        let document = fs::read_to_string(&file)
            .map_err(|e| DomainError::SourceUnavailable(format!("{}: {}", file.display(), e)))?;
        let entries = parse_bookmarks(&document).map_err(|e| e.context(file.display().to_string()))?;
        debug!("Parsed {} Chrome bookmarks from {}", entries.len(), file.display());

        let favicons: OnceCell<Option<DatabaseSnapshot>> = OnceCell::new();
        let bookmarks = entries
            .into_iter()
            .map(|entry| {
                let mut bookmark = Bookmark::new(
                    entry.title.as_str(),
                    entry.path.as_str(),
                    entry.url.as_str(),
                    DISPLAY_NAME,
                );
                bookmark.icon = self.resolve_icon(&entry.url, &favicons);
                bookmark
            })
            .collect();
        Ok(bookmarks)
    }

    /// Shared cache first, then the browser's own `Favicons` database.
    fn resolve_icon(&self, url: &str, favicons: &OnceCell<Option<DatabaseSnapshot>>) -> String {
        match self.icons.get_icon_path(url) {
            Ok(Some(path)) => return path.to_string_lossy().into_owned(),
            Ok(None) => {}
            Err(e) => debug!("Icon cache lookup failed for {}: {}", url, e),
        }

        let Some(db) = favicons.get_or_init(|| self.open_favicons()) else {
            return String::new();
        };

        let data = match lookup_icon(db.connection(), url) {
            Ok(Some(data)) => data,
            Ok(None) => return String::new(),
            Err(e) => {
                debug!("Favicon query failed for {}: {}", url, e);
                return String::new();
            }
        };

        match self.icons.save_and_cache_icon(&data, url) {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                debug!("Could not cache icon for {}: {}", url, e);
                String::new()
            }
        }
    }

    fn open_favicons(&self) -> Option<DatabaseSnapshot> {
        let path = self.config.favicons_file()?;
        match open_favicons_db(&path) {
            Ok(db) => Some(db),
            Err(e) => {
                debug!("Chrome favicons unavailable: {}", e);
                None
            }
        }
    }
}

fn open_favicons_db(path: &Path) -> DomainResult<DatabaseSnapshot> {
    let db = DatabaseSnapshot::open(path, "chrome_favicons")?;
    db.require_tables(&["favicons", "favicon_bitmaps", "icon_mapping"])?;
    Ok(db)
}

impl SourcePlugin for ChromePlugin {
    fn name(&self) -> &str {
        DISPLAY_NAME
    }

    fn get_bookmarks(&mut self) -> Vec<Bookmark> {
        match self.extract() {
            Ok(bookmarks) => {
                info!("Extracted {} bookmarks from {}", bookmarks.len(), DISPLAY_NAME);
                bookmarks
            }
            Err(e @ DomainError::Configuration(_)) => {
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
        self.config = ChromeConfig::from_value(raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::icon_cache::FileIconCache;
    use crate::util::fixtures::{create_chrome_favicons, insert_chrome_icon, write_chrome_bookmarks};
    use crate::util::testing::{init_test_env, setup_test_db};
    use serde_json::json;
    use tempfile::TempDir;

    fn work_tree() -> serde_json::Value {
        json!({
            "checksum": "abc",
            "roots": {
                "bookmark_bar": {
                    "name": "Bookmarks bar", "type": "folder",
                    "children": [
                        {"name": "Work", "type": "folder", "children": [
                            {"name": "Site", "type": "url", "url": "https://example.com/page"}
                        ]}
                    ]
                },
                "sync_transaction_version": "1"
            },
            "version": 1
        })
    }

    struct Fixture {
        _db: TempDir,
        _cache: TempDir,
        profile: TempDir,
        icons: Arc<FileIconCache>,
    }

    impl Fixture {
        fn new() -> Self {
            let (db, repo) = setup_test_db();
            let cache = tempfile::tempdir().unwrap();
            let icons = Arc::new(FileIconCache::new(Arc::new(repo), cache.path().join("icons")));
            Self {
                _db: db,
                _cache: cache,
                profile: tempfile::tempdir().unwrap(),
                icons,
            }
        }

        fn plugin(&self) -> ChromePlugin {
            ChromePlugin::new(ChromeConfig::with_profile(self.profile.path()), self.icons.clone())
        }
    }

    #[test]
    fn given_nested_folder_when_parse_bookmarks_then_path_joins_root_and_folders() {
        let entries = parse_bookmarks(&work_tree().to_string()).unwrap();

        assert_eq!(
            entries,
            vec![Entry {
                title: "Site".to_string(),
                url: "https://example.com/page".to_string(),
                path: "bookmark_bar/Work".to_string(),
            }]
        );
    }

    #[test]
    fn given_several_roots_when_parse_bookmarks_then_roots_in_key_order() {
        let document = json!({"roots": {
            "synced": {"type": "folder", "children": [{"name": "S", "type": "url", "url": "https://s.org/"}]},
            "other": {"type": "folder", "children": [{"name": "O", "type": "url", "url": "https://o.org/"}]},
            "bookmark_bar": {"type": "folder", "children": [{"name": "B", "type": "url", "url": "https://b.org/"}]}
        }});

        let entries = parse_bookmarks(&document.to_string()).unwrap();

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["bookmark_bar", "other", "synced"]);
    }

    #[test]
    fn given_invalid_json_when_parse_bookmarks_then_extraction_error() {
        assert!(matches!(parse_bookmarks("{not json"), Err(DomainError::Extraction(_))));
    }

    #[test]
    fn given_profile_when_get_bookmarks_then_one_chrome_bookmark() {
        let _ = init_test_env();
        let fixture = Fixture::new();
        write_chrome_bookmarks(fixture.profile.path(), &work_tree());

        let bookmarks = fixture.plugin().get_bookmarks();

        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].title, "Site");
        assert_eq!(bookmarks[0].path, "bookmark_bar/Work");
        assert_eq!(bookmarks[0].source, "Chrome");
        assert_eq!(bookmarks[0].domain, "example.com");
        assert!(!bookmarks[0].has_icon());
    }

    #[test]
    fn given_icons_of_several_widths_when_get_bookmarks_then_widest_is_cached() {
        let _ = init_test_env();
        let fixture = Fixture::new();
        write_chrome_bookmarks(fixture.profile.path(), &work_tree());
        let conn = create_chrome_favicons(fixture.profile.path());
        insert_chrome_icon(&conn, "https://example.com/page", 16, b"small");
        insert_chrome_icon(&conn, "https://example.com/page", 32, b"large");
        drop(conn);

        let bookmarks = fixture.plugin().get_bookmarks();

        assert_eq!(fs::read(&bookmarks[0].icon).unwrap(), b"large");
    }

    #[test]
    fn given_icon_for_other_page_on_host_when_get_bookmarks_then_host_fallback() {
        let _ = init_test_env();
        let fixture = Fixture::new();
        write_chrome_bookmarks(fixture.profile.path(), &work_tree());
        let conn = create_chrome_favicons(fixture.profile.path());
        insert_chrome_icon(&conn, "https://example.com/", 16, b"host-icon");
        drop(conn);

        let bookmarks = fixture.plugin().get_bookmarks();

        assert_eq!(fs::read(&bookmarks[0].icon).unwrap(), b"host-icon");
    }

    #[test]
    fn given_cached_icon_when_get_bookmarks_then_cache_wins_over_browser() {
        let _ = init_test_env();
        let fixture = Fixture::new();
        write_chrome_bookmarks(fixture.profile.path(), &work_tree());
        let conn = create_chrome_favicons(fixture.profile.path());
        insert_chrome_icon(&conn, "https://example.com/page", 32, b"browser");
        drop(conn);
        fixture.icons.save_favicon(b"cached", "https://example.com/").unwrap();

        let bookmarks = fixture.plugin().get_bookmarks();

        assert_eq!(fs::read(&bookmarks[0].icon).unwrap(), b"cached");
    }

    #[test]
    fn given_profile_without_bookmarks_file_when_get_bookmarks_then_empty() {
        let _ = init_test_env();
        let fixture = Fixture::new();

        assert!(fixture.plugin().get_bookmarks().is_empty());
    }

    #[test]
    fn given_raw_table_when_set_config_then_profile_rebound() {
        let _ = init_test_env();
        let fixture = Fixture::new();
        let mut plugin = fixture.plugin();
        let raw: toml::Value = toml::from_str("profile_path = \"/other/Bookmarks\"").unwrap();

        plugin.set_config(Some(&raw)).unwrap();

        assert_eq!(
            plugin.config().profile_path(),
            Some(std::path::PathBuf::from("/other/Bookmarks"))
        );
    }
}
