//! Common types used throughout sitelist-sync
//!
//! Shared type aliases and small enums used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A single list item as returned by the upstream API. Opaque to this crate.
pub type Item = JsonValue;

/// Items aggregated across pages, in arrival order
pub type ItemCollection = Vec<Item>;

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Store Policy
// ============================================================================

/// Decides whether the result of a refresh session replaces the cached snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorePolicy {
    /// Store whatever was collected, even an empty partial result
    Always,
    /// Store complete results, and partial results holding at least one item
    #[default]
    NonEmpty,
    /// Store only complete traversals
    CompleteOnly,
}

impl StorePolicy {
    /// Whether a result with the given shape should be persisted
    pub fn should_store(self, complete: bool, item_count: usize) -> bool {
        match self {
            StorePolicy::Always => true,
            StorePolicy::NonEmpty => complete || item_count > 0,
            StorePolicy::CompleteOnly => complete,
        }
    }
}

impl std::str::FromStr for StorePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "always" => Ok(StorePolicy::Always),
            "non_empty" => Ok(StorePolicy::NonEmpty),
            "complete_only" => Ok(StorePolicy::CompleteOnly),
            other => Err(format!("unknown store policy: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(StorePolicy::Always, true, 0 => true)]
    #[test_case(StorePolicy::Always, false, 0 => true)]
    #[test_case(StorePolicy::NonEmpty, true, 0 => true)]
    #[test_case(StorePolicy::NonEmpty, false, 0 => false)]
    #[test_case(StorePolicy::NonEmpty, false, 3 => true)]
    #[test_case(StorePolicy::CompleteOnly, false, 3 => false)]
    #[test_case(StorePolicy::CompleteOnly, true, 0 => true)]
    fn test_store_policy(policy: StorePolicy, complete: bool, items: usize) -> bool {
        policy.should_store(complete, items)
    }

    #[test]
    fn test_store_policy_from_str() {
        assert_eq!("always".parse::<StorePolicy>(), Ok(StorePolicy::Always));
        assert_eq!("non-empty".parse::<StorePolicy>(), Ok(StorePolicy::NonEmpty));
        assert_eq!(
            "complete_only".parse::<StorePolicy>(),
            Ok(StorePolicy::CompleteOnly)
        );
        assert!("sometimes".parse::<StorePolicy>().is_err());
    }

    #[test]
    fn test_store_policy_serde() {
        let policy: StorePolicy = serde_json::from_str("\"complete_only\"").unwrap();
        assert_eq!(policy, StorePolicy::CompleteOnly);
        assert_eq!(StorePolicy::default(), StorePolicy::NonEmpty);
    }
}
