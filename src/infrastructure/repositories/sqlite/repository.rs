// src/infrastructure/repositories/sqlite/repository.rs

use diesel::prelude::*;
use tracing::{debug, instrument};

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{SqliteRepositoryError, SqliteResult};
use crate::domain::bookmark::{parse_tags, Bookmark};
use crate::domain::error::DomainResult;
use crate::domain::favicon::Favicon;
use crate::domain::repositories::bookmark_store::BookmarkStore;
use crate::domain::repositories::favicon_repository::FaviconRepository;
use crate::infrastructure::repositories::sqlite::model::{
    DbBookmark, DbFavicon, NewBookmark, NewFavicon,
};
use crate::infrastructure::repositories::sqlite::schema::{bookmarks, favicons};

/// Keeps multi-row inserts below SQLite's bound parameter limit
const INSERT_CHUNK_SIZE: usize = 500;

#[derive(Clone, Debug)]
pub struct SqliteBookmarkRepository {
    pool: ConnectionPool,
}

impl SqliteBookmarkRepository {
    /// Create a new SQLite repository with the provided connection pool
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Create a new SQLite repository with the provided database URL, running migrations
    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> SqliteResult<Self> {
        let pool = super::connection::init_pool(database_url)?;
        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> SqliteResult<PooledConnection> {
        self.pool
            .get()
            .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))
    }

    /// Number of stored favicon records
    pub fn favicon_count(&self) -> SqliteResult<i64> {
        let mut conn = self.get_connection()?;
        Ok(favicons::table.count().get_result(&mut conn)?)
    }

    fn to_domain_model(db_bookmark: DbBookmark) -> Bookmark {
        Bookmark {
            title: db_bookmark.title,
            path: db_bookmark.path,
            description: db_bookmark.description,
            uri: db_bookmark.uri,
            domain: db_bookmark.domain,
            tags: parse_tags(&db_bookmark.tags),
            source: db_bookmark.source,
            icon: String::new(),
        }
    }

    fn to_db_model(bookmark: &Bookmark) -> NewBookmark {
        NewBookmark {
            title: bookmark.title.clone(),
            path: bookmark.path.clone(),
            description: bookmark.description.clone(),
            uri: bookmark.uri.clone(),
            domain: bookmark.domain.clone(),
            tags: bookmark.formatted_tags(),
            source: bookmark.source.clone(),
        }
    }
}

impl From<DbFavicon> for Favicon {
    fn from(db: DbFavicon) -> Self {
        Favicon {
            id: Some(db.id),
            domain: db.domain,
            data: db.data,
        }
    }
}

impl BookmarkStore for SqliteBookmarkRepository {
    #[instrument(skip_all, level = "debug")]
    fn get_bookmarks(&self) -> DomainResult<Vec<Bookmark>> {
        let mut conn = self.get_connection()?;

        let rows = bookmarks::table
            .order(bookmarks::id.asc())
            .select(DbBookmark::as_select())
            .load::<DbBookmark>(&mut conn)
            .map_err(SqliteRepositoryError::DatabaseError)?;

        debug!("Loaded {} bookmarks from store", rows.len());
        Ok(rows.into_iter().map(Self::to_domain_model).collect())
    }

    #[instrument(skip_all, level = "debug", fields(count = new_bookmarks.len()))]
    fn update_bookmarks(&self, new_bookmarks: &[Bookmark]) -> DomainResult<()> {
        let mut conn = self.get_connection()?;
        let rows: Vec<NewBookmark> = new_bookmarks.iter().map(Self::to_db_model).collect();

        conn.immediate_transaction::<_, SqliteRepositoryError, _>(|conn| {
            // favicons are kept across refreshes
            let deleted = diesel::delete(bookmarks::table).execute(conn)?;
            debug!("Deleted {} stored bookmarks", deleted);

            for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
                diesel::insert_into(bookmarks::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok(())
        })?;

        debug!("Stored {} bookmarks", rows.len());
        Ok(())
    }
}

impl FaviconRepository for SqliteBookmarkRepository {
    #[instrument(skip(self), level = "debug")]
    fn get_by_domain(&self, domain: &str) -> DomainResult<Option<Favicon>> {
        let mut conn = self.get_connection()?;

        let favicon = favicons::table
            .filter(favicons::domain.eq(domain))
            .select(DbFavicon::as_select())
            .first::<DbFavicon>(&mut conn)
            .optional()
            .map_err(SqliteRepositoryError::DatabaseError)?;

        match &favicon {
            Some(f) => debug!("Found favicon in database: {} ({} bytes)", domain, f.data.len()),
            None => debug!("No favicon found in database: {}", domain),
        }
        Ok(favicon.map(Favicon::from))
    }

    #[instrument(skip(self, data), level = "debug", fields(size = data.len()))]
    fn get_or_create(&self, domain: &str, data: &[u8]) -> DomainResult<Favicon> {
        let mut conn = self.get_connection()?;

        // single write transaction: concurrent callers for the same domain serialize here
        let favicon = conn.immediate_transaction::<_, SqliteRepositoryError, _>(|conn| {
            let inserted = diesel::insert_or_ignore_into(favicons::table)
                .values(&NewFavicon { domain, data })
                .execute(conn)?;

            if inserted == 0 {
                debug!("Using existing favicon: {}", domain);
            } else {
                debug!("Saved new favicon: {}", domain);
            }

            Ok(favicons::table
                .filter(favicons::domain.eq(domain))
                .select(DbFavicon::as_select())
                .first::<DbFavicon>(conn)?)
        })?;

        Ok(favicon.into())
    }
}
