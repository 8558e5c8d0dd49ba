// src/infrastructure/repositories/sqlite/error.rs

use crate::domain::error::DomainError;
use diesel::r2d2;
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("Diesel connection error: {0}")]
    ConnectionError(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<r2d2::Error> for SqliteRepositoryError {
    fn from(err: r2d2::Error) -> Self {
        SqliteRepositoryError::ConnectionPoolError(err.to_string())
    }
}

impl From<SqliteRepositoryError> for DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::DatabaseError(DieselError::DatabaseError(_, info)) => {
                DomainError::Repository(format!("Database error: {}", info.message()))
            }
            SqliteRepositoryError::DatabaseError(diesel_err) => {
                DomainError::Repository(format!("Database error: {}", diesel_err))
            }
            SqliteRepositoryError::ConnectionError(e) => {
                DomainError::Repository(format!("Database connection error: {}", e))
            }
            SqliteRepositoryError::ConnectionPoolError(e) => {
                DomainError::Repository(format!("Connection pool error: {}", e))
            }
            SqliteRepositoryError::IoError(e) => DomainError::Io(e),
            SqliteRepositoryError::MigrationError(e) => {
                DomainError::Repository(format!("Migration error: {}", e))
            }
        }
    }
}
