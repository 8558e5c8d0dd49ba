// src/application/services/bookmark_service.rs
use crate::application::error::ApplicationResult;
use crate::domain::bookmark::Bookmark;
use std::fmt::Debug;

/// Service interface for reading and refreshing the aggregated bookmarks
pub trait BookmarkService: Send + Sync + Debug {
    /// Stored bookmarks with icons resolved.
    ///
    /// Falls back to a fresh aggregation when the store fails or is empty; an empty store
    /// is filled with the fresh result.
    fn load_bookmarks(&self, deduplicate: bool) -> ApplicationResult<Vec<Bookmark>>;

    /// Aggregate all plugins and replace the stored bookmarks
    fn refresh_bookmarks(&self) -> ApplicationResult<Vec<Bookmark>>;

    /// Fresh bookmarks of the single source displayed as `name`
    fn bookmarks_by_plugin(&self, name: &str) -> ApplicationResult<Vec<Bookmark>>;

    /// Display names of the plugins that could be initialized
    fn list_plugins(&self) -> ApplicationResult<Vec<String>>;
}
