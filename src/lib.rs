// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # sitelist-sync
//!
//! Fetches every item of one SharePoint list through Microsoft Graph,
//! following `@odata.nextLink` cursors, and keeps the aggregate as a JSON
//! snapshot on disk.
//!
//! ## Features
//!
//! - **Site/List Resolution**: Human site id and list display name to Graph ids
//! - **Cursor Pagination**: Iterative, partial results on mid-stream failure
//! - **Snapshot Cache**: Atomic JSON file writes, single-refresh guard
//! - **Bearer Auth**: Static token or OAuth2 client credentials
//! - **Server Mode**: Serve the snapshot and trigger background refreshes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sitelist_sync::config::AppConfig;
//! use sitelist_sync::engine::RefreshEngine;
//!
//! #[tokio::main]
//! async fn main() -> sitelist_sync::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let engine = RefreshEngine::from_config(&config)?;
//!
//!     let outcome = engine.run().await;
//!     println!("{}", outcome.summary());
//!
//!     let items = engine.cache().load().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     RefreshEngine                         │
//! │   token() → resolve() → collect_all() → store()           │
//! └───────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────┬───────────┬─────┴───────┬───────────┬──────────┐
//! │   Auth   │   HTTP    │   Graph     │ Paginate  │  Cache   │
//! ├──────────┼───────────┼─────────────┼───────────┼──────────┤
//! │ Static   │ Bearer    │ Endpoints   │ nextLink  │ JSON     │
//! │ Client   │ Retry     │ Resolver    │ Partial   │ Atomic   │
//! │ Creds    │ Rate Limit│ Page Fetch  │ Max Pages │ Guard    │
//! └──────────┴───────────┴─────────────┴───────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Token acquisition
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Microsoft Graph endpoints, page fetching, and site resolution
pub mod graph;

/// Cursor pagination
pub mod pagination;

/// Snapshot persistence and refresh guard
pub mod cache;

/// Refresh orchestration
pub mod engine;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use cache::Cache;
pub use config::AppConfig;
pub use engine::{RefreshEngine, RefreshOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
