//! Token providers
//!
//! A `TokenProvider` turns a list of scopes into a bearer token. The crate
//! never issues tokens itself; it either holds one handed over by a sign-in
//! flow or requests one from an OAuth2 token endpoint.

use super::types::{AccessToken, AuthConfig, APP_SCOPE};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Source of bearer tokens keyed by requested scopes
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token authorizing the given scopes
    async fn token(&self, scopes: &[String]) -> Result<AccessToken>;
}

/// Build a provider for the given config
pub fn provider_from_config(config: &AuthConfig, client: Client) -> Arc<dyn TokenProvider> {
    match config {
        AuthConfig::None => Arc::new(NoTokenProvider),
        AuthConfig::Static { token } => Arc::new(StaticTokenProvider::new(token.clone())),
        AuthConfig::ClientCredentials {
            token_url,
            client_id,
            client_secret,
            scope,
        } => Arc::new(
            ClientCredentialsProvider::with_client(
                token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
                client,
            )
            .with_scope(scope.clone()),
        ),
    }
}

/// Provider used when nothing is configured; always asks for sign-in
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokenProvider;

#[async_trait]
impl TokenProvider for NoTokenProvider {
    async fn token(&self, _scopes: &[String]) -> Result<AccessToken> {
        Err(Error::auth("no token source configured; sign in first"))
    }
}

/// Holds a single token obtained elsewhere
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    /// Create a provider for a token without known expiry
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token, None),
        }
    }

    /// Create a provider from an existing token
    pub fn from_token(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self, _scopes: &[String]) -> Result<AccessToken> {
        if self.token.secret().is_empty() {
            return Err(Error::auth("empty bearer token"));
        }
        if self.token.is_expired() {
            return Err(Error::auth("bearer token has expired; sign in again"));
        }
        Ok(self.token.clone())
    }
}

/// OAuth2 client-credentials provider with a cached application token.
///
/// Delegated scopes passed to `token` do not apply to this grant; the
/// configured resource scope (`APP_SCOPE` by default) is requested instead.
pub struct ClientCredentialsProvider {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    http_client: Client,
    cached: Arc<RwLock<Option<AccessToken>>>,
}

impl ClientCredentialsProvider {
    /// Create a provider with its own HTTP client
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::with_client(token_url, client_id, client_secret, Client::new())
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_client(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: APP_SCOPE.to_string(),
            http_client,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Request a different resource scope
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    async fn fetch_new_token(&self) -> Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("invalid token response: {e}")))?;
        Ok(token_response.into_access_token())
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn token(&self, _scopes: &[String]) -> Result<AccessToken> {
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.clone());
            }
        }

        let mut cached = self.cached.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.clone());
        }

        debug!("Requesting new application token for {}", self.scope);
        let token = self.fetch_new_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

impl std::fmt::Debug for ClientCredentialsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsProvider")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_access_token(self) -> AccessToken {
        match self.expires_in {
            Some(secs) => AccessToken::expires_in(self.access_token, secs),
            None => AccessToken::new(self.access_token, None),
        }
    }
}
