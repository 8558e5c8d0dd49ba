// src/infrastructure/icon_cache.rs
use crate::domain::bookmark::domain_of;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::favicon::{content_hash, Favicon};
use crate::domain::repositories::favicon_repository::FaviconRepository;
use crate::domain::services::icon_cache::IconCache;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// Favicon cache backed by the durable favicon table and a directory of files named by
/// the SHA-256 of their content.
#[derive(Debug)]
pub struct FileIconCache {
    repository: Arc<dyn FaviconRepository>,
    cache_dir: PathBuf,
}

impl FileIconCache {
    pub fn new<P: Into<PathBuf>>(repository: Arc<dyn FaviconRepository>, cache_dir: P) -> Self {
        Self {
            repository,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Write `data` under its content hash unless that file already exists.
    ///
    /// The file appears atomically under its final name, so readers never see partial
    /// content and racing writers of identical bytes are harmless.
    fn ensure_cached(&self, data: &[u8]) -> DomainResult<PathBuf> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            DomainError::Cache(format!(
                "could not create cache directory {}: {}",
                self.cache_dir.display(),
                e
            ))
        })?;

        let icon_path = self.cache_dir.join(content_hash(data));
        if icon_path.exists() {
            debug!("Icon already exists in cache: {}", icon_path.display());
            return Ok(icon_path);
        }

        let mut tmp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| DomainError::Cache(format!("could not create temp file: {}", e)))?;
        tmp.write_all(data)
            .map_err(|e| DomainError::Cache(format!("could not write icon to cache: {}", e)))?;

        match tmp.persist_noclobber(&icon_path) {
            Ok(_) => debug!("Cached icon: {} ({} bytes)", icon_path.display(), data.len()),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                debug!("Icon cached concurrently: {}", icon_path.display())
            }
            Err(e) => {
                return Err(DomainError::Cache(format!(
                    "could not write icon to cache: {}",
                    e.error
                )))
            }
        }
        Ok(icon_path)
    }
}

impl IconCache for FileIconCache {
    #[instrument(skip(self, data), level = "debug")]
    fn save_favicon(&self, data: &[u8], url: &str) -> DomainResult<Favicon> {
        let domain = domain_of(url).ok_or_else(|| DomainError::InvalidUrl(url.to_string()))?;
        self.repository
            .get_or_create(&domain, data)
            .map_err(|e| DomainError::Cache(format!("could not save favicon to database: {}", e)))
    }

    #[instrument(skip(self, data), level = "debug")]
    fn save_and_cache_icon(&self, data: &[u8], url: &str) -> DomainResult<PathBuf> {
        if data.is_empty() {
            return Err(DomainError::Cache("no icon data provided".to_string()));
        }

        // first writer wins: the stored bytes may differ from `data`
        let favicon = self.save_favicon(data, url)?;
        self.ensure_cached(&favicon.data)
    }

    #[instrument(skip(self), level = "debug")]
    fn get_icon_path(&self, url: &str) -> DomainResult<Option<PathBuf>> {
        let Some(domain) = domain_of(url) else {
            debug!("No domain in URL, no icon: {}", url);
            return Ok(None);
        };

        match self.repository.get_by_domain(&domain)? {
            Some(favicon) if !favicon.data.is_empty() => {
                self.ensure_cached(&favicon.data).map(Some)
            }
            _ => Ok(None),
        }
    }
}
