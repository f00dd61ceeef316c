//! CLI module
//!
//! Command-line interface for refreshing and inspecting the snapshot.
//!
//! # Commands
//!
//! - `refresh` - Fetch all pages and update the snapshot
//! - `show` - Print the cached items
//! - `resolve` - Print the resolved site and list ids
//! - `status` - Snapshot and configuration summary
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, AppState};
