//! Auth configuration types
//!
//! Runtime auth configuration and the bearer token handed to upstream calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default scope for reading site lists
pub const DEFAULT_SCOPE: &str = "Sites.Read.All";

/// Scope requested by the client-credentials grant.
///
/// Application tokens carry the permissions granted to the app registration;
/// the v2.0 endpoint only accepts `<resource>/.default` for this grant.
pub const APP_SCOPE: &str = "https://graph.microsoft.com/.default";

fn default_app_scope() -> String {
    APP_SCOPE.to_string()
}

/// How access tokens are obtained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No token source configured
    #[default]
    None,

    /// A token obtained elsewhere (for example by an interactive sign-in)
    Static {
        /// The bearer token
        token: String,
    },

    /// OAuth2 client credentials against a token endpoint
    ClientCredentials {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Resource scope requested from the token endpoint
        #[serde(default = "default_app_scope")]
        scope: String,
    },
}

impl AuthConfig {
    /// Build a client-credentials config from an authority URL.
    ///
    /// `https://login.microsoftonline.com/<tenant>` becomes
    /// `https://login.microsoftonline.com/<tenant>/oauth2/v2.0/token`.
    pub fn from_authority(
        authority: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::ClientCredentials {
            token_url: format!("{}/oauth2/v2.0/token", authority.trim_end_matches('/')),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: default_app_scope(),
        }
    }

    /// Check if a token source is configured
    pub fn is_configured(&self) -> bool {
        !matches!(self, AuthConfig::None)
    }
}

/// Bearer credential with optional expiration
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a new token
    pub fn new(secret: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(secret: impl Into<String>, seconds: i64) -> Self {
        Self::new(secret, Some(Utc::now() + chrono::Duration::seconds(seconds)))
    }

    /// The raw bearer value
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// When the token expires, if known
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
