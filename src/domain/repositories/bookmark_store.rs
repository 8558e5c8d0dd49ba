// src/domain/repositories/bookmark_store.rs
use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;

/// Persistent cache of the last aggregation result
pub trait BookmarkStore: std::fmt::Debug + Send + Sync {
    /// All stored bookmarks; `icon` is not persisted and comes back empty
    fn get_bookmarks(&self) -> DomainResult<Vec<Bookmark>>;

    /// Replace all stored bookmarks atomically, leaving cached favicons untouched
    fn update_bookmarks(&self, bookmarks: &[Bookmark]) -> DomainResult<()>;
}
