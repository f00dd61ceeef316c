//! CLI commands and argument parsing

use crate::types::StorePolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aggregate and cache the items of a SharePoint list through Microsoft Graph
#[derive(Parser, Debug)]
#[command(name = "sitelist-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true, env = "SITELIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Site identifier, e.g. contoso.sharepoint.com:/sites/team
    #[arg(short, long, global = true)]
    pub site: Option<String>,

    /// Display name of the list to aggregate
    #[arg(short, long, global = true)]
    pub list: Option<String>,

    /// Snapshot file
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Graph API root
    #[arg(long, global = true)]
    pub graph_url: Option<String>,

    /// Bearer token obtained from a prior sign-in
    #[arg(long, global = true, env = "SITELIST_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page of the list and update the snapshot
    Refresh {
        /// When a result replaces the snapshot: always, non-empty, complete-only
        #[arg(long)]
        store_policy: Option<StorePolicy>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print the cached snapshot
    Show,

    /// Resolve the site and list ids without fetching items
    Resolve,

    /// Show snapshot and configuration status
    Status,

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Human-readable output
    Pretty,
}
