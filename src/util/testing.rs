// src/util/testing.rs

use std::env;
use std::sync::OnceLock;
use tempfile::TempDir;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::repositories::sqlite::migration;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkRepository;

/// Environment variables read by `config::load_settings`
pub const ENV_VARS: [&str; 2] = ["MARKS_DB_URL", "MARKS_CACHE_DIR"];

/// Global test configuration, initialized exactly once.
#[derive(Debug)]
pub struct TestEnv {
    pub log_filter: String,
}

static TEST_ENV: OnceLock<TestEnv> = OnceLock::new();

/// Initializes the global test environment exactly once and sets up logging.
pub fn init_test_env() -> &'static TestEnv {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        let data = TestEnv {
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()),
        };
        info!("Test environment initialized");
        data
    })
}

/// Logging setup only runs once; subsequent calls do nothing if `tracing` is already set.
fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["reqwest", "hyper_util", "mio", "want", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Restores the `MARKS_*` environment on drop.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            saved: ENV_VARS.iter().map(|name| (*name, env::var(name).ok())).collect(),
        }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(val) => env::set_var(name, val),
                None => env::remove_var(name),
            }
        }
    }
}

/// Creates a repository on a fresh database inside a temporary directory.
///
/// The directory must outlive the repository.
pub fn setup_test_db() -> (TempDir, SqliteBookmarkRepository) {
    let _ = init_test_env();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("marks.db");
    let repository = SqliteBookmarkRepository::from_url(db_path.to_string_lossy().as_ref())
        .expect("Failed to create SqliteBookmarkRepository");
    let mut conn = repository
        .get_connection()
        .expect("Failed to get connection from SqliteBookmarkRepository");
    migration::init_db(&mut conn).expect("Failed to initialize DB schema");
    (dir, repository)
}
