//! Site and list resolution
//!
//! Turns a human site identifier and a list display name into the internal
//! ids needed to page through the list's items.

use super::endpoints::GraphEndpoints;
use super::fetcher::{GraphPageFetcher, PageFetcher};
use super::types::{ListResource, SiteDescriptor, SiteResource};
use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

/// Resolves `(site identifier, list name)` to a `SiteDescriptor`
#[derive(Debug, Clone)]
pub struct SiteResolver {
    client: HttpClient,
    endpoints: GraphEndpoints,
}

impl SiteResolver {
    /// Create a resolver
    pub fn new(client: HttpClient, endpoints: GraphEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Endpoints this resolver builds URLs from
    pub fn endpoints(&self) -> &GraphEndpoints {
        &self.endpoints
    }

    /// Resolve the site id, then the id of the first list named `list_name`.
    ///
    /// Name matching is exact and case-sensitive. Upstream failures abort
    /// immediately; there is no retry beyond what the HTTP client does.
    pub async fn resolve(
        &self,
        site_identifier: &str,
        list_name: &str,
        token: &AccessToken,
    ) -> Result<SiteDescriptor> {
        let site_id = self.resolve_site(site_identifier, token).await?;
        let list_id = self.find_list(&site_id, list_name, token).await?;

        info!("Resolved list '{}' to {} on site {}", list_name, list_id, site_id);
        Ok(SiteDescriptor::new(site_id, list_id))
    }

    /// Step 1: internal id of the site
    pub async fn resolve_site(&self, site_identifier: &str, token: &AccessToken) -> Result<String> {
        let url = self.endpoints.site(site_identifier);

        let body: Value = self.client.get_json(&url, token).await.map_err(|e| {
            if e.is_auth() {
                e
            } else {
                Error::SiteNotFound {
                    site: site_identifier.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let site: SiteResource = serde_json::from_value(body)
            .map_err(|e| Error::malformed(&url, format!("site resource: {e}")))?;
        debug!("Site '{}' has id {}", site_identifier, site.id);
        Ok(site.id)
    }

    /// Step 2: first list whose display name equals `list_name`
    pub async fn find_list(
        &self,
        site_id: &str,
        list_name: &str,
        token: &AccessToken,
    ) -> Result<String> {
        let fetcher = GraphPageFetcher::new(self.client.clone());
        let mut url = self.endpoints.lists(site_id);
        let mut visited = HashSet::new();

        loop {
            let page = fetcher.fetch_page(&url, token).await?;
            visited.insert(url.clone());

            for entry in &page.items {
                if entry.get("displayName").and_then(Value::as_str) != Some(list_name) {
                    continue;
                }
                let list: ListResource = serde_json::from_value(entry.clone())
                    .map_err(|e| Error::malformed(&url, format!("list resource: {e}")))?;
                return Ok(list.id);
            }

            match page.next_link {
                Some(next) if visited.contains(&next) => {
                    return Err(Error::malformed(
                        &url,
                        format!("next link {next} revisits an earlier page"),
                    ))
                }
                Some(next) => url = next,
                None => {
                    return Err(Error::ListNotFound {
                        list: list_name.to_string(),
                    })
                }
            }
        }
    }
}
