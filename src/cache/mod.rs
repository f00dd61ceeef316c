//! Snapshot cache module
//!
//! Persists the aggregated item collection and guards against concurrent
//! refreshes.
//!
//! # Overview
//!
//! - `Cache::load` / `Cache::store` - read and atomically replace the snapshot
//! - `Cache::try_begin_refresh` / `Cache::end_refresh` - the refresh flag
//! - `RefreshGuard` - scoped ownership of the refresh flag

mod store;

pub use store::{Cache, RefreshGuard, DEFAULT_CACHE_FILE};
