//! Single-page fetching

use super::types::Page;
use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Fetches one page of a paginated collection
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` with the bearer token and extract its items and cursor
    async fn fetch_page(&self, url: &str, token: &AccessToken) -> Result<Page>;
}

/// `PageFetcher` for Graph collection responses
#[derive(Debug, Clone)]
pub struct GraphPageFetcher {
    client: HttpClient,
}

impl GraphPageFetcher {
    /// Create a fetcher over the given client
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for GraphPageFetcher {
    async fn fetch_page(&self, url: &str, token: &AccessToken) -> Result<Page> {
        let response = self.client.get(url, token).await?;
        let body_text = response.text().await.map_err(Error::Http)?;

        let body: Value = serde_json::from_str(&body_text)
            .map_err(|e| Error::malformed(url, format!("invalid JSON: {e}")))?;

        let page = Page::from_body(url, body)?;
        debug!(
            "Fetched {} items from {} (next: {})",
            page.items.len(),
            url,
            page.has_next()
        );
        Ok(page)
    }
}
