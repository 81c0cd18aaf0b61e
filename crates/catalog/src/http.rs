//! HTTP client wrapper with timeout and retry logic.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::{CatalogError, Result};

/// HTTP client for fetching catalog documents.
pub(crate) struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    pub(crate) fn new(request_timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            max_retries,
        })
    }

    /// GET `url` and return the body as text.
    pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
        let resp = self.execute_with_retry(url).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Network(format!("HTTP {status} fetching {url}")));
        }

        Ok(resp.text().await?)
    }

    /// Send a GET with exponential backoff on timeouts and connect errors.
    async fn execute_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < self.max_retries => {
                    let backoff = Duration::from_millis(100 * 2u64.pow(attempt));
                    debug!(url, attempt, ?backoff, "retrying catalog request");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
