//! Graph URL construction

/// Public Graph v1.0 root
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Builds the URLs used to resolve a site and page through a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEndpoints {
    base_url: String,
}

impl Default for GraphEndpoints {
    fn default() -> Self {
        Self::new(GRAPH_BASE_URL)
    }
}

impl GraphEndpoints {
    /// Create endpoints rooted at `base_url` (trailing slashes are ignored)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root every other URL is built from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Site metadata by human identifier, e.g. `contoso.sharepoint.com:/sites/team`
    pub fn site(&self, site_identifier: &str) -> String {
        format!("{}/sites/{}", self.base_url, site_identifier)
    }

    /// All lists of a site
    pub fn lists(&self, site_id: &str) -> String {
        format!("{}/sites/{}/lists", self.base_url, site_id)
    }

    /// Seed URL for a list's items, with field values expanded
    pub fn list_items(&self, site_id: &str, list_id: &str) -> String {
        format!(
            "{}/sites/{}/lists/{}/items?expand=fields",
            self.base_url, site_id, list_id
        )
    }
}

#[cfg(test)]
mod endpoint_tests {
    use super::*;

    #[test]
    fn test_default_base() {
        let endpoints = GraphEndpoints::default();
        assert_eq!(
            endpoints.site("contoso.sharepoint.com:/sites/team"),
            "https://graph.microsoft.com/v1.0/sites/contoso.sharepoint.com:/sites/team"
        );
    }

    #[test]
    fn test_list_urls() {
        let endpoints = GraphEndpoints::new("http://localhost:9999/v1.0/");
        assert_eq!(endpoints.base_url(), "http://localhost:9999/v1.0");
        assert_eq!(
            endpoints.lists("site-1"),
            "http://localhost:9999/v1.0/sites/site-1/lists"
        );
        assert_eq!(
            endpoints.list_items("site-1", "list-9"),
            "http://localhost:9999/v1.0/sites/site-1/lists/list-9/items?expand=fields"
        );
    }
}
