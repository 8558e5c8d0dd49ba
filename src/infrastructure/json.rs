// src/infrastructure/json.rs

use crate::domain::bookmark::Bookmark;
use crate::domain::error::{DomainError, DomainResult};
use serde::Serialize;
use std::io::Write;

/// Structure for serializing bookmarks to JSON output
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct JsonBookmarkView {
    pub title: String,
    pub path: String,
    pub description: String,
    pub uri: String,
    pub domain: String,
    /// Sorted for stable output
    pub tags: Vec<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl JsonBookmarkView {
    /// Create from a domain `Bookmark`
    pub fn from_domain(bookmark: &Bookmark) -> Self {
        let mut tags: Vec<String> = bookmark.tags.iter().cloned().collect();
        tags.sort();
        Self {
            title: bookmark.title.clone(),
            path: bookmark.path.clone(),
            description: bookmark.description.clone(),
            uri: bookmark.uri.clone(),
            domain: bookmark.domain.clone(),
            tags,
            source: bookmark.source.clone(),
            icon: bookmark.has_icon().then(|| bookmark.icon.clone()),
        }
    }

    /// Convert a slice of bookmarks into a vector of JSON views
    pub fn from_domain_collection(bookmarks: &[Bookmark]) -> Vec<Self> {
        bookmarks.iter().map(Self::from_domain).collect()
    }
}

/// Writes the views as a pretty printed JSON array.
///
/// Standard output is used for pipeable content without colors or formatting.
pub fn write_bookmarks_as_json<W: Write>(out: &mut W, views: &[JsonBookmarkView]) -> DomainResult<()> {
    serde_json::to_writer_pretty(&mut *out, views).map_err(|e| {
        DomainError::Serialization(format!("Failed to serialize bookmarks to JSON: {}", e))
    })?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
