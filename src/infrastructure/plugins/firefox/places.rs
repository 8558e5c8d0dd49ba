// src/infrastructure/plugins/firefox/places.rs
use crate::domain::error::DomainResult;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Parent id that ends the folder climb; the root itself is not part of any path.
const ROOT_ID: i64 = 1;

/// Regular bookmarks with url, description and comma joined tags.
///
/// Tag folders live below the tags root (id 4); a tag-link row shares `fk` with the
/// bookmark it tags and has the tag folder as parent.
const BOOKMARKS_QUERY: &str = "
    WITH tags AS (
        SELECT id, title FROM moz_bookmarks WHERE type = 2 AND parent = 4
    ),
    bookmark_tags AS (
        SELECT b.fk AS fk, GROUP_CONCAT(DISTINCT t.title) AS tags
        FROM moz_bookmarks b
        JOIN moz_bookmarks bt ON bt.fk = b.fk
        JOIN tags t ON bt.parent = t.id
        WHERE b.type = 1
        GROUP BY b.fk
    )
    SELECT b.id, b.parent, b.title, p.url, p.description, btg.tags
    FROM moz_bookmarks b
    LEFT JOIN moz_places p ON p.id = b.fk
    LEFT JOIN bookmark_tags btg ON btg.fk = b.fk
    WHERE b.type = 1
      AND b.title IS NOT NULL
      AND b.parent NOT IN (SELECT id FROM tags)
    ORDER BY b.id";

const TREE_QUERY: &str = "SELECT id, parent, title FROM moz_bookmarks";

const ICON_FOR_PAGE: &str = "
    SELECT ic.data
    FROM moz_pages_w_icons pg
    JOIN moz_icons_to_pages ip ON ip.page_id = pg.id
    JOIN moz_icons ic ON ic.id = ip.icon_id
    WHERE pg.page_url = ?1
    ORDER BY ic.width DESC
    LIMIT 1";

const PAGE_ID: &str = "SELECT id FROM moz_pages_w_icons WHERE page_url = ?1";

const ICONS_FOR_PAGE_ID: &str = "
    SELECT ic.data
    FROM moz_icons_to_pages ip
    JOIN moz_icons ic ON ic.id = ip.icon_id
    WHERE ip.page_id = ?1
    ORDER BY ic.width DESC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaceRow {
    pub id: i64,
    pub parent: i64,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeNode {
    pub parent: i64,
    pub title: Option<String>,
}

/// Every `moz_bookmarks` row by id: folders, bookmarks, separators
pub(crate) type Tree = HashMap<i64, TreeNode>;

/// Rows that fail to convert are logged and dropped; the others are kept.
pub(crate) fn read_bookmarks(conn: &Connection) -> DomainResult<Vec<PlaceRow>> {
    let mut stmt = conn.prepare(BOOKMARKS_QUERY)?;
    let rows: Vec<PlaceRow> = stmt
        .query_map([], |row| {
            Ok(PlaceRow {
                id: row.get(0)?,
                parent: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
                title: row.get(2)?,
                url: row.get(3)?,
                description: row.get(4)?,
                tags: row.get(5)?,
            })
        })?
        .filter_map(|row| match row {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Skipping unreadable bookmark row: {}", e);
                None
            }
        })
        .collect();
    debug!("Read {} bookmark rows", rows.len());
    Ok(rows)
}

pub(crate) fn read_tree(conn: &Connection) -> DomainResult<Tree> {
    let mut stmt = conn.prepare(TREE_QUERY)?;
    let tree: Tree = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                TreeNode {
                    parent: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
                    title: row.get(2)?,
                },
            ))
        })?
        .filter_map(|row| match row {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable folder row: {}", e);
                None
            }
        })
        .collect();
    Ok(tree)
}

/// Slash-terminated titles of the folders from the top down to `parent`.
///
/// Stops below the root, at an unknown id, or after visiting every row once.
pub(crate) fn folder_path(parent: i64, tree: &Tree) -> String {
    let mut path = String::new();
    let mut current = parent;

    for _ in 0..tree.len() {
        if current <= ROOT_ID {
            break;
        }
        let Some(node) = tree.get(&current) else {
            break;
        };
        path.insert(0, '/');
        path.insert_str(0, node.title.as_deref().unwrap_or_default());
        current = node.parent;
    }
    path
}

/// Widest non-empty icon of `page_url`.
///
/// The direct join is tried first; if it misses or fails the page's icons are ranked
/// individually and the first with data wins.
pub(crate) fn lookup_icon(conn: &Connection, page_url: &str) -> DomainResult<Option<Vec<u8>>> {
    match conn
        .query_row(ICON_FOR_PAGE, [page_url], |row| row.get::<_, Option<Vec<u8>>>(0))
        .optional()
    {
        Ok(found) => {
            if let Some(data) = found.flatten().filter(|d| !d.is_empty()) {
                return Ok(Some(data));
            }
        }
        Err(e) => debug!("Direct icon lookup failed for {}: {}", page_url, e),
    }

    let Some(page_id) = conn
        .query_row(PAGE_ID, [page_url], |row| row.get::<_, i64>(0))
        .optional()?
    else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(ICONS_FOR_PAGE_ID)?;
    let icons = stmt.query_map([page_id], |row| row.get::<_, Option<Vec<u8>>>(0))?;
    for icon in icons {
        if let Some(data) = icon?.filter(|d| !d.is_empty()) {
            return Ok(Some(data));
        }
    }
    Ok(None)
}
