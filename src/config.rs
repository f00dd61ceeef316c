//! Application configuration
//!
//! Configuration is layered: defaults, then an optional YAML file, then
//! environment variables, then command-line flags (applied by the CLI).

use crate::auth::{AuthConfig, DEFAULT_SCOPE};
use crate::cache::DEFAULT_CACHE_FILE;
use crate::error::{Error, Result};
use crate::graph::{GraphEndpoints, GRAPH_BASE_URL};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, StorePolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default list display name to aggregate
pub const DEFAULT_LIST_NAME: &str = "Files";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Graph API root
    pub graph_base_url: String,

    /// Human site identifier, e.g. `contoso.sharepoint.com:/sites/team`
    pub site: Option<String>,

    /// Display name of the list to aggregate
    pub list_name: String,

    /// Scopes requested for the refresh token
    pub scopes: Vec<String>,

    /// Snapshot file
    pub cache_path: PathBuf,

    /// When a refresh result replaces the snapshot
    pub store_policy: StorePolicy,

    /// Optional cap on pages per refresh
    pub max_pages: Option<usize>,

    /// Arbitrary Graph endpoint exposed through `/downstream`
    pub downstream_endpoint: Option<String>,

    /// HTTP client settings
    pub http: HttpSettings,

    /// Token source
    pub auth: AuthConfig,

    /// Server settings
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            graph_base_url: GRAPH_BASE_URL.to_string(),
            site: None,
            list_name: DEFAULT_LIST_NAME.to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            store_policy: StorePolicy::default(),
            max_pages: None,
            downstream_endpoint: None,
            http: HttpSettings::default(),
            auth: AuthConfig::default(),
            server: ServerSettings::default(),
        }
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries on throttling and 5xx
    pub max_retries: u32,
    /// Client-side request rate; `None` disables limiting
    pub requests_per_second: Option<u32>,
    /// Burst size for the rate limiter
    pub burst_size: u32,
    /// How the wait between retries grows
    pub backoff: BackoffType,
    /// First retry wait in milliseconds
    pub initial_backoff_ms: u64,
    /// Upper bound on any retry wait, including `Retry-After`
    pub max_backoff_secs: u64,
    /// Extra headers sent on every Graph request, e.g. `ConsistencyLevel`
    pub headers: HashMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            requests_per_second: Some(10),
            burst_size: 10,
            backoff: BackoffType::Exponential,
            initial_backoff_ms: 500,
            max_backoff_secs: 30,
            headers: HashMap::new(),
        }
    }
}

// ============================================================================
// Server Settings
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Load configuration: YAML file (if given) overlaid with the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_from(|key| std::env::var(key).ok())
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overlay values from environment variables read through `lookup`
    ///
    /// Recognized: `SITELIST_GRAPH_BASE_URL`, `ORG_BASE_URL`, `SITELIST_LIST_NAME`,
    /// `SITELIST_CACHE_PATH`, `SITELIST_STORE_POLICY`, `SITELIST_ACCESS_TOKEN`,
    /// `AUTHORITY` + `CLIENT_ID` + `CLIENT_SECRET`, `ENDPOINT`, `SITELIST_PORT`.
    /// A value that does not parse is a config error rather than ignored.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("SITELIST_GRAPH_BASE_URL") {
            self.graph_base_url = url;
        }
        if let Some(site) = var("ORG_BASE_URL") {
            self.site = Some(site);
        }
        if let Some(name) = var("SITELIST_LIST_NAME") {
            self.list_name = name;
        }
        if let Some(path) = var("SITELIST_CACHE_PATH") {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(policy) = var("SITELIST_STORE_POLICY") {
            self.store_policy = policy
                .parse()
                .map_err(|e| Error::config(format!("SITELIST_STORE_POLICY: {e}")))?;
        }
        if let Some(endpoint) = var("ENDPOINT") {
            self.downstream_endpoint = Some(endpoint);
        }
        if let Some(port) = var("SITELIST_PORT") {
            self.server.port = port.trim().parse().map_err(|e| {
                Error::config(format!("SITELIST_PORT: invalid port '{port}': {e}"))
            })?;
        }

        if let Some(token) = var("SITELIST_ACCESS_TOKEN") {
            self.auth = AuthConfig::Static { token };
        } else if let (Some(authority), Some(client_id), Some(secret)) =
            (var("AUTHORITY"), var("CLIENT_ID"), var("CLIENT_SECRET"))
        {
            self.auth = AuthConfig::from_authority(&authority, client_id, secret);
        }

        Ok(self)
    }

    /// Check the fields needed for a refresh session
    pub fn validate(&self) -> Result<()> {
        if self.site.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(Error::missing_field("site"));
        }
        if self.list_name.is_empty() {
            return Err(Error::missing_field("list_name"));
        }
        if self.scopes.is_empty() {
            return Err(Error::missing_field("scopes"));
        }
        url::Url::parse(&self.graph_base_url)?;
        if self.http.timeout_secs == 0 {
            return Err(Error::config("http.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// The configured site identifier
    pub fn site(&self) -> Result<&str> {
        self.site
            .as_deref()
            .ok_or_else(|| Error::missing_field("site"))
    }

    /// Graph endpoints rooted at the configured base URL
    pub fn endpoints(&self) -> GraphEndpoints {
        GraphEndpoints::new(&self.graph_base_url)
    }

    /// HTTP client configuration derived from these settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_secs(self.http.max_backoff_secs),
            );
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }

        match self.http.requests_per_second {
            Some(rps) => builder
                .rate_limit(RateLimiterConfig::new(rps, self.http.burst_size))
                .build(),
            None => builder.no_rate_limit().build(),
        }
    }
}
