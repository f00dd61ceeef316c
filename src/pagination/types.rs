//! Pagination types
//!
//! Traversal bookkeeping and the outcome of a full traversal.

use crate::error::Error;
use crate::types::{Item, ItemCollection};

/// Tracks progress during one traversal
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched successfully so far
    pub pages: usize,
    /// URL of the page to fetch next
    pub cursor: Option<String>,
    /// Total items fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Start a traversal at `seed_url`
    pub fn starting_at(seed_url: impl Into<String>) -> Self {
        Self {
            cursor: Some(seed_url.into()),
            ..Default::default()
        }
    }

    /// Record a fetched page and move the cursor
    pub fn advance(&mut self, item_count: usize, next: Option<String>) {
        self.pages += 1;
        self.total_fetched += item_count as u64;
        self.done = next.is_none();
        self.cursor = next;
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }
}

/// Result of driving a traversal to its end
///
/// A traversal that stopped early still carries the items collected before
/// the failure, with `complete == false` and the error that stopped it.
#[derive(Debug)]
pub struct CollectOutcome {
    /// Items from every successful page, in page order
    pub items: ItemCollection,
    /// Number of pages fetched successfully
    pub pages: usize,
    /// Whether the last page was reached
    pub complete: bool,
    /// The error that ended the traversal early
    pub error: Option<Error>,
}

impl CollectOutcome {
    /// Traversal reached the last page
    pub fn complete(items: Vec<Item>, pages: usize) -> Self {
        Self {
            items,
            pages,
            complete: true,
            error: None,
        }
    }

    /// Traversal stopped at `error`
    pub fn partial(items: Vec<Item>, pages: usize, error: Error) -> Self {
        Self {
            items,
            pages,
            complete: false,
            error: Some(error),
        }
    }

    /// Whether the traversal stopped early
    pub fn is_partial(&self) -> bool {
        !self.complete
    }

    /// Number of items collected
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
