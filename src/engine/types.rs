//! Engine types
//!
//! Settings for a refresh session and the outcome it reports.

use crate::auth::DEFAULT_SCOPE;
use crate::config::{AppConfig, DEFAULT_LIST_NAME};
use crate::error::Result;
use crate::graph::SiteDescriptor;
use crate::types::StorePolicy;
use serde::Serialize;

/// What a refresh session fetches and how it persists the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Human site identifier
    pub site: String,
    /// Display name of the target list
    pub list_name: String,
    /// Scopes requested from the token provider
    pub scopes: Vec<String>,
    /// When the result replaces the snapshot
    pub store_policy: StorePolicy,
}

impl RefreshSettings {
    /// Create settings for a site with the default list, scope, and policy
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            list_name: DEFAULT_LIST_NAME.to_string(),
            scopes: vec![DEFAULT_SCOPE.to_string()],
            store_policy: StorePolicy::default(),
        }
    }

    /// Take settings from the application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            site: config.site()?.to_string(),
            list_name: config.list_name.clone(),
            scopes: config.scopes.clone(),
            store_policy: config.store_policy,
        })
    }

    /// Set the list display name
    #[must_use]
    pub fn with_list_name(mut self, name: impl Into<String>) -> Self {
        self.list_name = name.into();
        self
    }

    /// Set the store policy
    #[must_use]
    pub fn with_store_policy(mut self, policy: StorePolicy) -> Self {
        self.store_policy = policy;
        self
    }
}

/// Statistics from a session that reached pagination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Resolved site and list
    pub descriptor: SiteDescriptor,
    /// Items collected
    pub items: usize,
    /// Pages fetched successfully
    pub pages: usize,
    /// Whether the snapshot was replaced
    pub stored: bool,
    /// Session duration in milliseconds
    pub duration_ms: u64,
}

/// How a refresh session ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Every page was fetched
    Completed(RefreshReport),
    /// Pagination stopped early; `report.stored` tells whether the partial
    /// result was persisted
    Partial {
        /// Session statistics
        report: RefreshReport,
        /// Error that stopped pagination
        error: String,
    },
    /// Site or list lookup failed
    Unresolved {
        /// User-facing message
        message: String,
    },
    /// No usable token; the user must sign in again
    AuthFailed {
        /// Reason reported by the provider or upstream
        message: String,
    },
    /// Items were fetched but the snapshot could not be written
    StoreFailed {
        /// Cache error
        message: String,
    },
    /// Another session holds the refresh slot
    AlreadyRunning,
}

impl RefreshOutcome {
    /// Every page fetched and stored
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether the user should be sent to sign in
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }

    /// Statistics, when the session got as far as pagination
    pub fn report(&self) -> Option<&RefreshReport> {
        match self {
            Self::Completed(report) | Self::Partial { report, .. } => Some(report),
            _ => None,
        }
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        match self {
            Self::Completed(r) => format!(
                "Refreshed {} items from {} pages in {}ms",
                r.items, r.pages, r.duration_ms
            ),
            Self::Partial { report, error } => format!(
                "Partial refresh: {} items from {} pages ({}); {}",
                report.items,
                report.pages,
                if report.stored { "stored" } else { "not stored" },
                error
            ),
            Self::Unresolved { message }
            | Self::AuthFailed { message }
            | Self::StoreFailed { message } => message.clone(),
            Self::AlreadyRunning => "A refresh is already running".to_string(),
        }
    }
}
