// src/domain/bookmark.rs
use derive_builder::Builder;
use std::collections::{HashMap, HashSet};
use std::fmt;
use url::Url;

/// Normalized bookmark produced by every source plugin
#[derive(Builder, Clone, Debug, PartialEq, Eq, Default)]
#[builder(setter(into), default)]
pub struct Bookmark {
    pub title: String,
    /// Folder hierarchy, slash-joined
    pub path: String,
    pub description: String,
    pub uri: String,
    /// Host of `uri`, key for favicon lookup
    pub domain: String,
    pub tags: HashSet<String>,
    /// Display name of the originating plugin
    pub source: String,
    /// Path of the cached favicon file, empty if none
    pub icon: String,
}

impl Bookmark {
    pub fn new<S: AsRef<str>>(title: S, path: S, uri: S, source: S) -> Self {
        let uri = uri.as_ref().to_string();
        Self {
            title: title.as_ref().to_string(),
            path: path.as_ref().to_string(),
            domain: domain_of(&uri).unwrap_or_default(),
            uri,
            source: source.as_ref().to_string(),
            ..Default::default()
        }
    }

    /// Dedup identity
    pub fn key(&self) -> (&str, &str) {
        (&self.title, &self.uri)
    }

    pub fn has_icon(&self) -> bool {
        !self.icon.is_empty()
    }

    /// Union `other` into this bookmark's tags
    pub fn merge_tags(&mut self, other: &HashSet<String>) {
        self.tags.extend(other.iter().cloned());
    }

    /// Get formatted tag string in the format ",tag1,tag2,"
    pub fn formatted_tags(&self) -> String {
        format_tags(&self.tags)
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.source,
            self.title,
            self.uri,
            format_tags(&self.tags)
        )
    }
}

/// Host part of a URL including an explicit port, `None` for unparsable or host-less URLs.
pub fn domain_of(uri: &str) -> Option<String> {
    let parsed = Url::parse(uri).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Format a set of tags into the stored ",a,b," representation (sorted)
pub fn format_tags(tags: &HashSet<String>) -> String {
    let mut values: Vec<&str> = tags.iter().map(String::as_str).collect();
    values.sort_unstable();

    if values.is_empty() {
        ",,".to_string()
    } else {
        format!(",{},", values.join(","))
    }
}

/// Split a comma separated tag list, trimming blanks and dropping empty entries
pub fn parse_tags<S: AsRef<str>>(tag_str: S) -> HashSet<String> {
    tag_str
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Removes bookmarks sharing (title, uri), merging their tags into the first occurrence.
///
/// Only tags are merged; every other field keeps the value of the first occurrence.
pub fn remove_duplicates(bookmarks: Vec<Bookmark>) -> Vec<Bookmark> {
    let mut seen: HashMap<(String, String), usize> = HashMap::with_capacity(bookmarks.len());
    let mut result: Vec<Bookmark> = Vec::with_capacity(bookmarks.len());

    for bookmark in bookmarks {
        let key = (bookmark.title.clone(), bookmark.uri.clone());
        match seen.get(&key) {
            Some(&idx) => result[idx].merge_tags(&bookmark.tags),
            None => {
                seen.insert(key, result.len());
                result.push(bookmark);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn bm(title: &str, uri: &str, tag_values: &[&str]) -> Bookmark {
        BookmarkBuilder::default()
            .title(title)
            .uri(uri)
            .tags(tags(tag_values))
            .build()
            .unwrap()
    }

    #[test]
    fn given_url_with_port_when_domain_of_then_includes_port() {
        assert_eq!(domain_of("http://localhost:8080/x").as_deref(), Some("localhost:8080"));
        assert_eq!(domain_of("https://www.rust-lang.org/learn").as_deref(), Some("www.rust-lang.org"));
        assert_eq!(domain_of("not a url"), None);
        assert_eq!(domain_of("mailto:someone@example.com"), None);
    }

    #[test]
    fn given_new_bookmark_when_created_then_domain_is_derived() {
        let bookmark = Bookmark::new("Rust", "bookmark_bar", "https://www.rust-lang.org/", "Chrome");
        assert_eq!(bookmark.domain, "www.rust-lang.org");
        assert_eq!(bookmark.source, "Chrome");
        assert!(bookmark.tags.is_empty());
        assert!(!bookmark.has_icon());
    }

    #[test]
    fn given_duplicates_with_overlapping_tags_when_remove_duplicates_then_tags_are_union() {
        let input = vec![bm("Site", "https://a.org", &["a", "b"]), bm("Site", "https://a.org", &["b", "c"])];

        let result = remove_duplicates(input);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tags, tags(&["a", "b", "c"]));
    }

    #[test]
    fn given_duplicates_in_reverse_order_when_remove_duplicates_then_same_tag_set() {
        let input = vec![bm("Site", "https://a.org", &["b", "c"]), bm("Site", "https://a.org", &["a", "b"])];

        let result = remove_duplicates(input);

        assert_eq!(result[0].tags.len(), 3);
    }

    #[test]
    fn given_duplicates_when_remove_duplicates_then_first_occurrence_fields_win() {
        let mut first = bm("Site", "https://a.org", &[]);
        first.source = "Firefox".to_string();
        first.icon = "/cache/1".to_string();
        first.path = "Menu/".to_string();
        let mut second = bm("Site", "https://a.org", &["x"]);
        second.source = "Chrome".to_string();
        second.icon = "/cache/2".to_string();
        second.description = "other".to_string();

        let result = remove_duplicates(vec![first, second]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source, "Firefox");
        assert_eq!(result[0].icon, "/cache/1");
        assert_eq!(result[0].path, "Menu/");
        assert_eq!(result[0].description, "");
        assert_eq!(result[0].tags, tags(&["x"]));
    }

    #[test]
    fn given_mixed_bookmarks_when_remove_duplicates_then_keys_are_unique_and_order_kept() {
        let input = vec![
            bm("A", "https://a.org", &[]),
            bm("B", "https://b.org", &[]),
            bm("A", "https://a.org", &[]),
            bm("A", "https://other.org", &[]),
            bm("B", "https://b.org", &[]),
        ];

        let result = remove_duplicates(input);

        let keys: Vec<(&str, &str)> = result.iter().map(Bookmark::key).collect();
        assert_eq!(
            keys,
            vec![("A", "https://a.org"), ("B", "https://b.org"), ("A", "https://other.org")]
        );
    }

    #[test]
    fn given_title_and_uri_straddling_separator_when_remove_duplicates_then_not_merged() {
        // would collide under "title|uri" string concatenation
        let input = vec![bm("a|b", "c", &[]), bm("a", "b|c", &[])];

        let result = remove_duplicates(input);

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn given_tag_string_when_parse_tags_then_trims_and_skips_empty() {
        assert_eq!(parse_tags(" rust , cli,,"), tags(&["rust", "cli"]));
        assert!(parse_tags(",,").is_empty());
    }

    #[test]
    fn given_tags_when_format_tags_then_sorted_and_delimited() {
        assert_eq!(format_tags(&tags(&["b", "a"])), ",a,b,");
        assert_eq!(format_tags(&HashSet::new()), ",,");
        assert_eq!(parse_tags(format_tags(&tags(&["x y", "z"]))), tags(&["x y", "z"]));
    }
}
