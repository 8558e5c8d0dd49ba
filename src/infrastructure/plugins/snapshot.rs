// src/infrastructure/plugins/snapshot.rs
use crate::domain::error::{DomainError, DomainResult};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, instrument};

/// Private copy of a browser database, opened with SQLite.
///
/// Browsers keep their live databases locked, so the file (and a `-wal` sidecar if
/// present) is copied to a temporary location, flushed and closed before SQLite opens the
/// copy. The temporary files are removed on drop, after the connection is closed.
#[derive(Debug)]
pub struct DatabaseSnapshot {
    // field order matters: the connection must close before the files are removed
    conn: Connection,
    _wal: Option<TempPath>,
    _file: TempPath,
}

impl DatabaseSnapshot {
    #[instrument(level = "debug")]
    pub fn open(source: &Path, prefix: &str) -> DomainResult<Self> {
        let mut src = File::open(source).map_err(|e| {
            DomainError::SourceUnavailable(format!("{}: {}", source.display(), e))
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".sqlite")
            .tempfile()?;
        let bytes = io::copy(&mut src, tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        // closes the handle, keeps the file until the TempPath is dropped
        let file = tmp.into_temp_path();
        debug!("Copied {} bytes of {} to {}", bytes, source.display(), file.display());

        let wal = copy_wal_sidecar(source, &file)?;

        let conn = Connection::open_with_flags(
            &file,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| DomainError::SourceUnavailable(format!("{}: {}", source.display(), e)))?;

        Ok(Self {
            conn,
            _wal: wal,
            _file: file,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fails with `SourceUnavailable` unless all `tables` exist.
    pub fn require_tables(&self, tables: &[&str]) -> DomainResult<()> {
        for table in tables {
            let found: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .optional()?;
            if found.is_none() {
                return Err(DomainError::SourceUnavailable(format!(
                    "required table {} not found",
                    table
                )));
            }
        }
        Ok(())
    }
}

/// Copies `<source>-wal` next to the snapshot so SQLite replays uncheckpointed pages.
fn copy_wal_sidecar(source: &Path, snapshot: &Path) -> DomainResult<Option<TempPath>> {
    let source_wal = sidecar(source, "-wal");
    if !source_wal.exists() {
        return Ok(None);
    }

    let target = sidecar(snapshot, "-wal");
    fs::copy(&source_wal, &target)?;
    debug!("Copied WAL sidecar to {}", target.display());
    Ok(Some(TempPath::from_path(target)))
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::init_test_env;

    #[test]
    fn given_missing_file_when_open_then_source_unavailable() {
        let _ = init_test_env();
        let dir = tempfile::tempdir().unwrap();

        let result = DatabaseSnapshot::open(&dir.path().join("places.sqlite"), "test");

        assert!(matches!(result, Err(DomainError::SourceUnavailable(_))));
    }

    #[test]
    fn given_database_when_open_then_reads_copy_and_removes_it_on_drop() {
        let _ = init_test_env();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("data.sqlite");
        {
            let conn = Connection::open(&source).unwrap();
            conn.execute_batch("CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (42);")
                .unwrap();
        }

        let snapshot = DatabaseSnapshot::open(&source, "test").unwrap();
        let copy = snapshot._file.to_path_buf();
        let x: i64 = snapshot
            .connection()
            .query_row("SELECT x FROM t", [], |row| row.get(0))
            .unwrap();
        snapshot.require_tables(&["t"]).unwrap();
        let missing = snapshot.require_tables(&["t", "other"]);

        assert_eq!(x, 42);
        assert_ne!(copy, source);
        assert!(matches!(missing, Err(DomainError::SourceUnavailable(_))));
        drop(snapshot);
        assert!(!copy.exists());
        assert!(source.exists());
    }

    #[test]
    fn given_path_when_sidecar_then_appends_suffix() {
        assert_eq!(
            sidecar(Path::new("/p/places.sqlite"), "-wal"),
            PathBuf::from("/p/places.sqlite-wal")
        );
    }
}
