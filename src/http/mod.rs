//! HTTP client module
//!
//! Every upstream call goes through `HttpClient`, which attaches the bearer
//! token, enforces the per-request timeout, and applies retry and rate
//! limiting policy.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
