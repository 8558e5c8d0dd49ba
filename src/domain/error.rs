// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Requested plugin name was never registered
    #[error("Plugin not registered: {0}")]
    UnknownPlugin(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source file missing, locked or with an unexpected schema
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Icon cache error: {0}")]
    Cache(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        let context = context.into();
        match self {
            DomainError::Configuration(msg) => {
                DomainError::Configuration(format!("{}: {}", context, msg))
            }
            DomainError::SourceUnavailable(msg) => {
                DomainError::SourceUnavailable(format!("{}: {}", context, msg))
            }
            DomainError::Extraction(msg) => DomainError::Extraction(format!("{}: {}", context, msg)),
            DomainError::Cache(msg) => DomainError::Cache(format!("{}: {}", context, msg)),
            DomainError::Repository(msg) => DomainError::Repository(format!("{}: {}", context, msg)),
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context, msg)),
            // plugin name and url must stay intact for callers matching on them
            err @ (DomainError::UnknownPlugin(_) | DomainError::InvalidUrl(_)) => err,
            err => DomainError::Other(format!("{}: {}", context, err)),
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Extraction(format!("SQL error: {}", err))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Extraction(format!("Invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_extraction_error_when_context_then_prefixes_message() {
        let err = DomainError::Extraction("no such table".to_string()).context("places.sqlite");
        assert_eq!(err.to_string(), "Extraction failed: places.sqlite: no such table");
    }

    #[test]
    fn given_unknown_plugin_when_context_then_keeps_variant() {
        let err = DomainError::UnknownPlugin("opera".to_string()).context("create");
        assert!(matches!(err, DomainError::UnknownPlugin(name) if name == "opera"));
    }
}
