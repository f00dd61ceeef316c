//! Execution engine module
//!
//! Runs refresh sessions: token, resolve, paginate, store.
//!
//! # Overview
//!
//! The engine module provides:
//! - `RefreshEngine` - Orchestrates one session with the refresh slot held
//! - `RefreshSettings` - Site, list, scopes, and store policy
//! - `RefreshOutcome` / `RefreshReport` - How a session ended

mod types;

pub use types::{RefreshOutcome, RefreshReport, RefreshSettings};

use crate::auth::{provider_from_config, TokenProvider};
use crate::cache::{Cache, RefreshGuard};
use crate::config::AppConfig;
use crate::error::Result;
use crate::graph::{GraphPageFetcher, SiteResolver};
use crate::http::HttpClient;
use crate::pagination::Paginator;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Refresh session orchestrator
pub struct RefreshEngine {
    /// HTTP client shared by every upstream call
    client: HttpClient,
    /// Token source
    tokens: Arc<dyn TokenProvider>,
    /// Site and list lookup
    resolver: SiteResolver,
    /// Cursor follower
    paginator: Paginator,
    /// Snapshot and refresh flag
    cache: Cache,
    /// What to fetch
    settings: RefreshSettings,
    /// How the most recent session ended
    last_outcome: RwLock<Option<RefreshOutcome>>,
}

impl RefreshEngine {
    /// Create an engine from its parts
    pub fn new(
        client: HttpClient,
        tokens: Arc<dyn TokenProvider>,
        resolver: SiteResolver,
        paginator: Paginator,
        cache: Cache,
        settings: RefreshSettings,
    ) -> Self {
        Self {
            client,
            tokens,
            resolver,
            paginator,
            cache,
            settings,
            last_outcome: RwLock::new(None),
        }
    }

    /// Wire up an engine from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let client = HttpClient::with_config(config.http_client_config())?;
        let tokens = provider_from_config(&config.auth, client.inner().clone());
        let resolver = SiteResolver::new(client.clone(), config.endpoints());
        let paginator = Paginator::new(Arc::new(GraphPageFetcher::new(client.clone())))
            .with_max_pages(config.max_pages);

        Ok(Self::new(
            client,
            tokens,
            resolver,
            paginator,
            Cache::new(&config.cache_path),
            RefreshSettings::from_config(config)?,
        ))
    }

    /// Get the cache
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Get the HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Get the token provider
    pub fn tokens(&self) -> &Arc<dyn TokenProvider> {
        &self.tokens
    }

    /// Get the session settings
    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Get the resolver
    pub fn resolver(&self) -> &SiteResolver {
        &self.resolver
    }

    /// Outcome of the most recent session, if one has finished
    pub async fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.last_outcome.read().await.clone()
    }

    /// Run a session in the current task
    pub async fn run(&self) -> RefreshOutcome {
        match self.cache.refresh_guard() {
            Some(guard) => self.run_guarded(guard).await,
            None => {
                info!("Refresh requested while another is running");
                RefreshOutcome::AlreadyRunning
            }
        }
    }

    /// Start a session in the background; `None` if one is already running
    pub fn spawn(self: &Arc<Self>) -> Option<JoinHandle<RefreshOutcome>> {
        let guard = self.cache.refresh_guard()?;
        let engine = Arc::clone(self);
        Some(tokio::spawn(async move { engine.run_guarded(guard).await }))
    }

    /// Start a background session only when no snapshot exists and none is running
    pub fn spawn_if_idle(self: &Arc<Self>) -> Option<JoinHandle<RefreshOutcome>> {
        if self.cache.exists() {
            return None;
        }
        self.spawn()
    }

    /// Run a session and record its outcome before releasing the refresh slot
    async fn run_guarded(&self, guard: RefreshGuard) -> RefreshOutcome {
        let outcome = self.session().await;
        *self.last_outcome.write().await = Some(outcome.clone());
        drop(guard);
        outcome
    }

    async fn session(&self) -> RefreshOutcome {
        let start = Instant::now();
        let settings = &self.settings;
        info!(
            "Starting refresh of list '{}' on site {}",
            settings.list_name, settings.site
        );

        let token = match self.tokens.token(&settings.scopes).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Token acquisition failed: {}", e);
                return RefreshOutcome::AuthFailed {
                    message: e.to_string(),
                };
            }
        };

        let descriptor = match self
            .resolver
            .resolve(&settings.site, &settings.list_name, &token)
            .await
        {
            Ok(descriptor) => descriptor,
            Err(e) if e.is_auth() => {
                warn!("Upstream rejected the token: {}", e);
                return RefreshOutcome::AuthFailed {
                    message: e.to_string(),
                };
            }
            Err(e) => {
                if e.is_resolve_error() {
                    info!("{}", e);
                } else {
                    warn!("Resolution failed: {}", e);
                }
                return RefreshOutcome::Unresolved {
                    message: e.to_string(),
                };
            }
        };

        let seed = self
            .resolver
            .endpoints()
            .list_items(&descriptor.site_id, &descriptor.list_id);
        let collected = self.paginator.collect_all(&seed, &token).await;

        let should_store = settings
            .store_policy
            .should_store(collected.complete, collected.len());

        if should_store {
            if let Err(e) = self.cache.store(&collected.items).await {
                error!("Failed to store snapshot: {}", e);
                return RefreshOutcome::StoreFailed {
                    message: e.to_string(),
                };
            }
        } else {
            warn!(
                "Keeping previous snapshot; {:?} policy rejects a partial result of {} items",
                settings.store_policy,
                collected.len()
            );
        }

        let report = RefreshReport {
            descriptor,
            items: collected.items.len(),
            pages: collected.pages,
            stored: should_store,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let outcome = match collected.error {
            None => RefreshOutcome::Completed(report),
            Some(e) => RefreshOutcome::Partial {
                report,
                error: e.to_string(),
            },
        };
        info!("{}", outcome.summary());
        outcome
    }
}

impl std::fmt::Debug for RefreshEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshEngine")
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
