use diesel::{Insertable, Queryable, Selectable};
use std::fmt;

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbBookmark {
    pub id: i32,
    pub title: String,
    pub path: String,
    pub description: String,
    pub uri: String,
    pub domain: String,
    pub tags: String,
    pub source: String,
}

/// New bookmark for insertion
#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::bookmarks)]
pub struct NewBookmark {
    pub title: String,
    pub path: String,
    pub description: String,
    pub uri: String,
    pub domain: String,
    pub tags: String,
    pub source: String,
}

#[derive(Queryable, Selectable, Clone)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::favicons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DbFavicon {
    pub id: i32,
    pub domain: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for DbFavicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {}, domain: {}, data: {:X?}",
            self.id,
            self.domain,
            &self.data.iter().take(3).collect::<Vec<&u8>>() // Truncate and hex format
        )
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::infrastructure::repositories::sqlite::schema::favicons)]
pub struct NewFavicon<'a> {
    pub domain: &'a str,
    pub data: &'a [u8],
}
