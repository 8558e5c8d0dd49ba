// src/domain/repositories/favicon_repository.rs
use crate::domain::error::DomainResult;
use crate::domain::favicon::Favicon;

/// Durable favicon records, at most one per domain
pub trait FaviconRepository: std::fmt::Debug + Send + Sync {
    fn get_by_domain(&self, domain: &str) -> DomainResult<Option<Favicon>>;

    /// Get-or-create: an existing record for the domain is returned unchanged and `data`
    /// is discarded. Check and insert happen atomically.
    fn get_or_create(&self, domain: &str, data: &[u8]) -> DomainResult<Favicon>;
}
