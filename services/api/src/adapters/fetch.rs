//! services/api/src/adapters/fetch.rs
//!
//! This module contains the outbound HTTP adapter, the concrete
//! implementation of the `PageFetchService` port. It retrieves raw page
//! HTML with `reqwest`.

use async_trait::async_trait;

use wikiquiz_core::ports::{PageFetchService, PortError, PortResult};

/// Browser-identifying User-Agent sent with every page request. Wikipedia
/// serves the full desktop markup for it.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A page-fetch adapter that implements the `PageFetchService` port.
#[derive(Clone, Default)]
pub struct HttpFetchAdapter {
    client: reqwest::Client,
}

impl HttpFetchAdapter {
    /// Creates a new `HttpFetchAdapter` with its own connection pool.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

//=========================================================================================
// `PageFetchService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PageFetchService for HttpFetchAdapter {
    /// Fetches the body of `url` as text. Transport errors and non-2xx
    /// statuses are unrecoverable here; there is no retry and no timeout
    /// beyond the client defaults.
    async fn fetch(&self, url: &str) -> PortResult<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to fetch {}: {}", url, e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(format!("Fetch of {} failed: {}", url, e)))?;

        response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to read body of {}: {}", url, e)))
    }
}
