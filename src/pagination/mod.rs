//! Pagination module
//!
//! Drives a `PageFetcher` through `@odata.nextLink` cursors with an explicit
//! loop, so arbitrarily long collections use constant stack. A failure part
//! way through keeps the items already collected.

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{CollectOutcome, PaginationState};

#[cfg(test)]
mod tests;
