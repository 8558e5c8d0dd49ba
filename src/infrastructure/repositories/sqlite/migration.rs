// src/infrastructure/repositories/sqlite/migration.rs
use crate::infrastructure::repositories::sqlite::error::SqliteRepositoryError;
use diesel::sqlite::Sqlite;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, instrument};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Resets the database: reverts all migrations, then runs them again.
///
/// Gives tests a clean schema.
///
/// # Errors
///
/// Fails if reverting, listing or running migrations fails.
#[instrument(skip(connection), level = "debug")]
pub fn init_db(
    connection: &mut impl MigrationHarness<Sqlite>,
) -> Result<(), SqliteRepositoryError> {
    connection.revert_all_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::MigrationError(format!("Failed to revert migrations: {}", e))
    })?;

    let pending = connection.pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::MigrationError(format!("Failed to get pending migrations: {}", e))
    })?;

    pending.iter().for_each(|m| {
        debug!("Pending Migration: {}", m.name());
    });

    connection.run_pending_migrations(MIGRATIONS).map_err(|e| {
        SqliteRepositoryError::MigrationError(format!("Failed to run pending migrations: {}", e))
    })?;

    Ok(())
}
