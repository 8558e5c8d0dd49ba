// src/infrastructure/http.rs
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Result of a reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlStatus {
    /// Success status, with the round trip time in milliseconds
    Reachable(u128),
    /// Non-success status code
    Status(u16),
    /// Request failed: DNS, connect, timeout or invalid URL
    Failed(String),
}

impl UrlStatus {
    pub fn is_reachable(&self) -> bool {
        matches!(self, UrlStatus::Reachable(_))
    }
}

/// Builds the client shared by a batch of checks
pub fn check_client(timeout_milliseconds: u64) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(timeout_milliseconds))
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}

/// HEAD request against `url`
#[instrument(skip(client), level = "debug")]
pub fn check_website(client: &reqwest::blocking::Client, url: &str) -> UrlStatus {
    let start = Instant::now();
    match client.head(url).send() {
        Ok(resp) if resp.status().is_success() => UrlStatus::Reachable(start.elapsed().as_millis()),
        Ok(resp) => UrlStatus::Status(resp.status().as_u16()),
        Err(e) => {
            debug!("Request to {} failed: {}", url, e);
            UrlStatus::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_invalid_url_when_check_website_then_failed() {
        let client = check_client(500);

        let status = check_website(&client, "not a url");

        assert!(matches!(status, UrlStatus::Failed(_)));
        assert!(!status.is_reachable());
    }

    #[test]
    fn given_closed_local_port_when_check_website_then_not_reachable() {
        let client = check_client(500);

        let status = check_website(&client, "http://127.0.0.1:9/");

        assert!(!status.is_reachable());
    }
}
