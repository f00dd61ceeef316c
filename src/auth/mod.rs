//! Authentication module
//!
//! Supports: static bearer tokens and OAuth2 client credentials
//!
//! Token issuance is delegated to an identity provider; this module only
//! obtains tokens for a set of scopes and caches them until they expire.

mod provider;
mod types;

pub use provider::{
    provider_from_config, ClientCredentialsProvider, NoTokenProvider, StaticTokenProvider,
    TokenProvider,
};
pub use types::{AccessToken, AuthConfig, APP_SCOPE, DEFAULT_SCOPE};
