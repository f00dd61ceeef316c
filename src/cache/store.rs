//! Snapshot cache implementation
//!
//! File-based snapshot persistence with atomic writes, plus the
//! single-refresh flag.

use crate::error::{Error, Result};
use crate::types::{Item, ItemCollection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Default snapshot file name
pub const DEFAULT_CACHE_FILE: &str = "clients.json";

/// Persisted item snapshot and the refresh-in-flight flag
#[derive(Debug, Clone)]
pub struct Cache {
    /// Path to the snapshot file
    path: PathBuf,
    /// Set while a refresh session runs; shared between clones
    refreshing: Arc<AtomicBool>,
}

impl Cache {
    /// Create a cache backed by the given snapshot path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot has been stored
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// When the snapshot was last written
    pub async fn modified_at(&self) -> Option<DateTime<Utc>> {
        let metadata = tokio::fs::metadata(&self.path).await.ok()?;
        metadata.modified().ok().map(DateTime::<Utc>::from)
    }

    /// Load the last stored snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    pub async fn load(&self) -> Result<Option<ItemCollection>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(self.error(format!("Failed to read snapshot: {e}")));
            }
        };

        let value: Value = serde_json::from_str(&contents)
            .map_err(|e| self.error(format!("Failed to parse snapshot: {e}")))?;

        match value {
            Value::Array(items) => {
                debug!("Loaded {} cached items from {}", items.len(), self.path.display());
                Ok(Some(items))
            }
            _ => Err(self.error("Snapshot is not a JSON array")),
        }
    }

    /// Replace the snapshot.
    ///
    /// Writes to a temporary file in the same directory, syncs it, then
    /// renames it over the snapshot so readers never see a partial file.
    pub async fn store(&self, items: &[Item]) -> Result<()> {
        let contents = to_pretty_json(items)
            .map_err(|e| self.error(format!("Failed to serialize snapshot: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.error(format!("Failed to create cache directory: {e}")))?;
            }
        }

        let temp_path = self.temp_path();
        if let Err(e) = self.replace_with(&temp_path, &contents).await {
            // The write error is returned; a failed cleanup is only logged
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
                }
            }
            return Err(e);
        }

        info!("Stored {} items to {}", items.len(), self.path.display());
        Ok(())
    }

    /// Write `contents` to `temp_path`, sync it, and rename it over the snapshot
    async fn replace_with(&self, temp_path: &Path, contents: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(temp_path)
            .await
            .map_err(|e| self.error(format!("Failed to create temp file: {e}")))?;
        file.write_all(contents)
            .await
            .map_err(|e| self.error(format!("Failed to write snapshot: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| self.error(format!("Failed to sync snapshot: {e}")))?;
        drop(file);

        tokio::fs::rename(temp_path, &self.path)
            .await
            .map_err(|e| self.error(format!("Failed to rename snapshot: {e}")))
    }

    /// Remove the snapshot, if any
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error(format!("Failed to remove snapshot: {e}"))),
        }
    }

    // ========================================================================
    // Refresh flag
    // ========================================================================

    /// Atomically claim the refresh slot; false if a refresh is already running
    pub fn try_begin_refresh(&self) -> bool {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the refresh slot unconditionally
    pub fn end_refresh(&self) {
        self.refreshing.store(false, Ordering::Release);
    }

    /// Whether a refresh is in flight
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Claim the refresh slot for the lifetime of the returned guard
    pub fn refresh_guard(&self) -> Option<RefreshGuard> {
        if self.try_begin_refresh() {
            Some(RefreshGuard {
                flag: Arc::clone(&self.refreshing),
            })
        } else {
            None
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_CACHE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::cache(self.path.display().to_string(), message)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

/// Holds the refresh slot; releases it on drop, including on error paths and panics
#[derive(Debug)]
#[must_use = "the refresh slot is released as soon as the guard is dropped"]
pub struct RefreshGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Pretty JSON with four-space indentation
fn to_pretty_json(items: &[Item]) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    items.serialize(&mut serializer)?;
    Ok(buf)
}
