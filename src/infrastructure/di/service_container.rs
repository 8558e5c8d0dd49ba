use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::bookmark_service::BookmarkService;
use crate::application::{BookmarkServiceImpl, PluginRegistry};
use crate::config::Settings;
use crate::domain::services::icon_cache::IconCache;
use crate::infrastructure::icon_cache::FileIconCache;
use crate::infrastructure::plugins::register_builtin_plugins;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkRepository;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Production service container - single source of truth for service creation
pub struct ServiceContainer {
    pub bookmark_repository: Arc<SqliteBookmarkRepository>,
    pub icon_cache: Arc<dyn IconCache>,
    pub registry: Arc<PluginRegistry>,
    pub bookmark_service: Arc<dyn BookmarkService>,
}

impl ServiceContainer {
    /// Create all services with explicit dependency injection
    #[instrument(skip_all, level = "debug")]
    pub fn new(config: &Settings) -> ApplicationResult<Self> {
        let bookmark_repository = Self::create_repository(&config.db_url)?;

        let cache_dir = config.icon_cache_dir();
        debug!("Icon cache directory: {}", cache_dir.display());
        let icon_cache: Arc<dyn IconCache> =
            Arc::new(FileIconCache::new(bookmark_repository.clone(), cache_dir));

        let registry = Arc::new(Self::create_registry(&icon_cache));

        let bookmark_service = Arc::new(BookmarkServiceImpl::new(
            bookmark_repository.clone(),
            icon_cache.clone(),
            registry.clone(),
            config.plugins.clone(),
        ));

        Ok(Self {
            bookmark_repository,
            icon_cache,
            registry,
            bookmark_service,
        })
    }

    /// Create the repository, runs all migrations
    fn create_repository(db_url: &str) -> ApplicationResult<Arc<SqliteBookmarkRepository>> {
        let repository = SqliteBookmarkRepository::from_url(db_url).map_err(|e| {
            ApplicationError::Other(format!(
                "Failed to open bookmark store at {}: {}",
                db_url, e
            ))
        })?;
        Ok(Arc::new(repository))
    }

    fn create_registry(icon_cache: &Arc<dyn IconCache>) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        register_builtin_plugins(&mut registry, icon_cache.clone());
        registry
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("bookmark_repository", &"Arc<SqliteBookmarkRepository>")
            .field("icon_cache", &self.icon_cache)
            .field("registry", &self.registry)
            .field("bookmark_service", &"Arc<dyn BookmarkService>")
            .finish()
    }
}
