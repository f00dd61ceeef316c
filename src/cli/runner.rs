//! CLI runner - executes commands

use crate::auth::AuthConfig;
use crate::cache::Cache;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::AppConfig;
use crate::engine::{RefreshEngine, RefreshOutcome};
use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Refresh {
                store_policy,
                max_pages,
            } => {
                let mut config = config;
                if let Some(policy) = store_policy {
                    config.store_policy = *policy;
                }
                if max_pages.is_some() {
                    config.max_pages = *max_pages;
                }
                self.refresh(&config).await
            }
            Commands::Show => self.show(&config).await,
            Commands::Resolve => self.resolve(&config).await,
            Commands::Status => self.status(&config).await,
            Commands::Serve { port } => {
                let port = port.unwrap_or(config.server.port);
                let engine = Arc::new(RefreshEngine::from_config(&config)?);
                crate::cli::serve(engine, config.downstream_endpoint.clone(), port).await
            }
        }
    }

    /// Layer CLI flags over file and environment configuration
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.cli.config.as_deref())?;

        if let Some(site) = &self.cli.site {
            config.site = Some(site.clone());
        }
        if let Some(list) = &self.cli.list {
            config.list_name = list.clone();
        }
        if let Some(cache) = &self.cli.cache {
            config.cache_path = cache.clone();
        }
        if let Some(url) = &self.cli.graph_url {
            config.graph_base_url = url.clone();
        }
        if let Some(token) = &self.cli.token {
            config.auth = AuthConfig::Static {
                token: token.clone(),
            };
        }

        Ok(config)
    }

    /// Run one refresh session in the foreground
    async fn refresh(&self, config: &AppConfig) -> Result<()> {
        let engine = RefreshEngine::from_config(config)?;
        let outcome = engine.run().await;

        self.emit(&outcome)?;

        match outcome {
            RefreshOutcome::Completed(_) | RefreshOutcome::Partial { .. } => Ok(()),
            RefreshOutcome::AuthFailed { message } => Err(Error::auth(message)),
            other => Err(Error::Other(other.summary())),
        }
    }

    /// Print the cached items
    async fn show(&self, config: &AppConfig) -> Result<()> {
        let cache = Cache::new(&config.cache_path);
        match cache.load().await? {
            Some(items) => self.emit(&items),
            None => Err(Error::Other(format!(
                "No snapshot at {}; run `sitelist-sync refresh` first",
                cache.path().display()
            ))),
        }
    }

    /// Resolve site and list ids
    async fn resolve(&self, config: &AppConfig) -> Result<()> {
        let engine = RefreshEngine::from_config(config)?;
        let settings = engine.settings();
        let token = engine.tokens().token(&settings.scopes).await?;
        let descriptor = engine
            .resolver()
            .resolve(&settings.site, &settings.list_name, &token)
            .await?;
        self.emit(&descriptor)
    }

    /// Snapshot and configuration summary
    async fn status(&self, config: &AppConfig) -> Result<()> {
        let cache = Cache::new(&config.cache_path);
        let items = cache.load().await?.map(|items| items.len());

        self.emit(&json!({
            "site": config.site,
            "list_name": config.list_name,
            "cache_path": cache.path(),
            "cached": items.is_some(),
            "cached_items": items,
            "cached_at": cache.modified_at().await,
            "store_policy": config.store_policy,
            "auth_configured": config.auth.is_configured(),
        }))
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let out = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{out}");
        Ok(())
    }
}
