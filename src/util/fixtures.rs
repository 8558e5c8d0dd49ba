// src/util/fixtures.rs
//! Minimal browser profiles for tests: Chrome `Bookmarks`/`Favicons` and Firefox
//! `places.sqlite`/`favicons.sqlite`, with just the tables the readers touch.

use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `document` as the profile's `Bookmarks` file and returns its path.
pub fn write_chrome_bookmarks(profile: &Path, document: &serde_json::Value) -> PathBuf {
    fs::create_dir_all(profile).expect("create chrome profile dir");
    let path = profile.join("Bookmarks");
    fs::write(
        &path,
        serde_json::to_vec_pretty(document).expect("serialize chrome bookmarks"),
    )
    .expect("write chrome bookmarks");
    path
}

/// Creates the profile's `Favicons` database.
pub fn create_chrome_favicons(profile: &Path) -> Connection {
    fs::create_dir_all(profile).expect("create chrome profile dir");
    let conn = Connection::open(profile.join("Favicons")).expect("open chrome favicons");
    conn.execute_batch(
        "CREATE TABLE favicons (id INTEGER PRIMARY KEY, url LONGVARCHAR NOT NULL, icon_type INTEGER DEFAULT 1);
         CREATE TABLE favicon_bitmaps (id INTEGER PRIMARY KEY, icon_id INTEGER NOT NULL,
             last_updated INTEGER DEFAULT 0, image_data BLOB, width INTEGER DEFAULT 0, height INTEGER DEFAULT 0);
         CREATE TABLE icon_mapping (id INTEGER PRIMARY KEY, page_url LONGVARCHAR NOT NULL, icon_id INTEGER);",
    )
    .expect("create chrome favicon tables");
    conn
}

/// Maps `page_url` to a new icon of the given width.
pub fn insert_chrome_icon(conn: &Connection, page_url: &str, width: i64, data: &[u8]) {
    conn.execute(
        "INSERT INTO favicons (url) VALUES (?1)",
        params![format!("{}/favicon.ico", page_url)],
    )
    .expect("insert favicon");
    let icon_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO favicon_bitmaps (icon_id, image_data, width, height) VALUES (?1, ?2, ?3, ?3)",
        params![icon_id, data, width],
    )
    .expect("insert favicon bitmap");
    conn.execute(
        "INSERT INTO icon_mapping (page_url, icon_id) VALUES (?1, ?2)",
        params![page_url, icon_id],
    )
    .expect("insert icon mapping");
}

/// Creates the profile's `places.sqlite` without any rows.
pub fn create_places(profile: &Path) -> Connection {
    fs::create_dir_all(profile).expect("create firefox profile dir");
    let conn = Connection::open(profile.join("places.sqlite")).expect("open places");
    conn.execute_batch(
        "CREATE TABLE moz_places (id INTEGER PRIMARY KEY, url LONGVARCHAR, title LONGVARCHAR,
             description TEXT, url_hash INTEGER DEFAULT 0 NOT NULL);
         CREATE TABLE moz_bookmarks (id INTEGER PRIMARY KEY, type INTEGER, fk INTEGER DEFAULT NULL,
             parent INTEGER, position INTEGER, title LONGVARCHAR, guid TEXT);",
    )
    .expect("create places tables");
    conn
}

/// Inserts a folder row (`type = 2`).
pub fn insert_folder(conn: &Connection, id: i64, parent: i64, title: &str) {
    conn.execute(
        "INSERT INTO moz_bookmarks (id, type, parent, title) VALUES (?1, 2, ?2, ?3)",
        params![id, parent, title],
    )
    .expect("insert folder");
}

/// Inserts a bookmark row (`type = 1`) and its place; returns the place id.
pub fn insert_bookmark(
    conn: &Connection,
    id: i64,
    parent: i64,
    title: Option<&str>,
    url: &str,
    description: Option<&str>,
) -> i64 {
    let place_id = place_for(conn, url, description);
    conn.execute(
        "INSERT INTO moz_bookmarks (id, type, fk, parent, title) VALUES (?1, 1, ?2, ?3, ?4)",
        params![id, place_id, parent, title],
    )
    .expect("insert bookmark");
    place_id
}

/// Tags `url` with the tag folder `tag_id` through a tag-link row.
pub fn insert_tag_link(conn: &Connection, id: i64, tag_id: i64, url: &str) {
    let place_id = place_for(conn, url, None);
    conn.execute(
        "INSERT INTO moz_bookmarks (id, type, fk, parent, title) VALUES (?1, 1, ?2, ?3, NULL)",
        params![id, place_id, tag_id],
    )
    .expect("insert tag link");
}

fn place_for(conn: &Connection, url: &str, description: Option<&str>) -> i64 {
    let existing = conn
        .query_row("SELECT id FROM moz_places WHERE url = ?1", [url], |row| {
            row.get::<_, i64>(0)
        })
        .ok();
    if let Some(id) = existing {
        return id;
    }
    conn.execute(
        "INSERT INTO moz_places (url, description) VALUES (?1, ?2)",
        params![url, description],
    )
    .expect("insert place");
    conn.last_insert_rowid()
}

/// Creates the profile's `favicons.sqlite` without any rows.
pub fn create_firefox_favicons(profile: &Path) -> Connection {
    fs::create_dir_all(profile).expect("create firefox profile dir");
    let conn = Connection::open(profile.join("favicons.sqlite")).expect("open favicons");
    conn.execute_batch(
        "CREATE TABLE moz_icons (id INTEGER PRIMARY KEY, icon_url TEXT NOT NULL,
             width INTEGER NOT NULL DEFAULT 0, data BLOB);
         CREATE TABLE moz_pages_w_icons (id INTEGER PRIMARY KEY, page_url TEXT NOT NULL);
         CREATE TABLE moz_icons_to_pages (page_id INTEGER NOT NULL, icon_id INTEGER NOT NULL,
             PRIMARY KEY (page_id, icon_id));",
    )
    .expect("create firefox favicon tables");
    conn
}

/// Attaches an icon of the given width to `page_url`; `data` may be `None`.
pub fn insert_firefox_icon(conn: &Connection, page_url: &str, width: i64, data: Option<&[u8]>) {
    let page_id = match conn.query_row(
        "SELECT id FROM moz_pages_w_icons WHERE page_url = ?1",
        [page_url],
        |row| row.get::<_, i64>(0),
    ) {
        Ok(id) => id,
        Err(_) => {
            conn.execute(
                "INSERT INTO moz_pages_w_icons (page_url) VALUES (?1)",
                [page_url],
            )
            .expect("insert page");
            conn.last_insert_rowid()
        }
    };
    conn.execute(
        "INSERT INTO moz_icons (icon_url, width, data) VALUES (?1, ?2, ?3)",
        params![format!("{}/favicon-{}.png", page_url, width), width, data],
    )
    .expect("insert icon");
    let icon_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO moz_icons_to_pages (page_id, icon_id) VALUES (?1, ?2)",
        params![page_id, icon_id],
    )
    .expect("insert icon to page");
}
