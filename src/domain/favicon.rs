// src/domain/favicon.rs
use sha2::{Digest, Sha256};
use std::fmt;

/// Durable icon record: one per site domain
#[derive(Clone, PartialEq, Eq)]
pub struct Favicon {
    pub id: Option<i32>,
    pub domain: String,
    pub data: Vec<u8>,
}

impl Favicon {
    pub fn new<S: Into<String>>(domain: S, data: Vec<u8>) -> Self {
        Self {
            id: None,
            domain: domain.into(),
            data,
        }
    }

    /// Lowercase hex SHA-256 of the icon bytes, used as cache file name
    pub fn content_hash(&self) -> String {
        content_hash(&self.data)
    }
}

pub fn content_hash(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

impl fmt::Debug for Favicon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Favicon")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("data", &format_args!("[{} bytes]", self.data.len()))
            .finish()
    }
}
