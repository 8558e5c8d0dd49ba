// src/domain/services/icon_cache.rs
use crate::domain::error::DomainResult;
use crate::domain::favicon::Favicon;
use std::path::PathBuf;

/// Two tier favicon cache: durable record per domain plus content-addressed files
pub trait IconCache: std::fmt::Debug + Send + Sync {
    /// Store `data` for the URL's domain unless the domain already has a record.
    fn save_favicon(&self, data: &[u8], url: &str) -> DomainResult<Favicon>;

    /// Save the record and make sure its bytes exist as a cache file; returns the file path.
    fn save_and_cache_icon(&self, data: &[u8], url: &str) -> DomainResult<PathBuf>;

    /// Cache file for the URL's domain, `None` when no icon is known.
    fn get_icon_path(&self, url: &str) -> DomainResult<Option<PathBuf>>;
}
