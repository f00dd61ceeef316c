//! Error types for sitelist-sync
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for sitelist-sync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Shape Errors
    // ============================================================================
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse { url: String, message: String },

    #[error("Stopped after {max_pages} pages without reaching the last page")]
    PageLimitExceeded { max_pages: usize },

    // ============================================================================
    // Resolution Errors
    // ============================================================================
    #[error("Site '{site}' could not be fetched: {reason}")]
    SiteNotFound { site: String, reason: String },

    #[error("No list with displayName '{list}' found.")]
    ListNotFound { list: String },

    // ============================================================================
    // Cache Errors
    // ============================================================================
    #[error("Cache error at {path}: {message}")]
    CacheIo { path: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, reason: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            reason: reason.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CacheIo {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Token acquisition failed, or upstream rejected the token.
    ///
    /// Callers at the boundary treat this as a signal to re-authenticate.
    pub fn is_auth(&self) -> bool {
        match self {
            Error::Auth { .. } => true,
            Error::HttpStatus { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// Network, status, or response-shape failure of a single upstream call.
    ///
    /// These stop a traversal but keep whatever was already collected.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::RateLimited { .. }
                | Error::Timeout { .. }
                | Error::MalformedResponse { .. }
                | Error::PageLimitExceeded { .. }
        )
    }

    /// Site or list lookup failed; reported to users as a plain message.
    pub fn is_resolve_error(&self) -> bool {
        matches!(self, Error::SiteNotFound { .. } | Error::ListNotFound { .. })
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for sitelist-sync
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("site");
        assert_eq!(err.to_string(), "Missing required config field: site");

        let err = Error::http_status(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_list_not_found_is_user_message() {
        let err = Error::ListNotFound {
            list: "Files".to_string(),
        };
        assert_eq!(err.to_string(), "No list with displayName 'Files' found.");
        assert!(err.is_resolve_error());
        assert!(!err.is_fetch_error());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::malformed("u", "missing 'value'").is_retryable());
    }

    #[test]
    fn test_classification() {
        assert!(Error::auth("expired").is_auth());
        assert!(Error::http_status(401, "Unauthorized").is_auth());
        assert!(!Error::http_status(403, "Forbidden").is_auth());

        assert!(Error::http_status(500, "").is_fetch_error());
        assert!(Error::malformed("u", "m").is_fetch_error());
        assert!(!Error::cache("p", "m").is_fetch_error());
    }
}
