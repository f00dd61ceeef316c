//! Cursor-following traversal

use super::types::{CollectOutcome, PaginationState};
use crate::auth::AccessToken;
use crate::error::Error;
use crate::graph::PageFetcher;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Follows next-page cursors until the last page or the first failure
#[derive(Clone)]
pub struct Paginator {
    fetcher: Arc<dyn PageFetcher>,
    max_pages: Option<usize>,
}

impl Paginator {
    /// Create a paginator with no page cap
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_pages: None,
        }
    }

    /// Stop (incomplete) after this many pages
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Collect every item reachable from `seed_url`.
    ///
    /// Never fails: a fetch or shape error stops the traversal and the items
    /// gathered so far are returned as a partial outcome.
    pub async fn collect_all(&self, seed_url: &str, token: &AccessToken) -> CollectOutcome {
        let mut state = PaginationState::starting_at(seed_url);
        let mut items = Vec::new();
        let mut visited = HashSet::new();

        while let Some(url) = state.cursor.take() {
            if let Some(max_pages) = self.max_pages {
                if state.pages >= max_pages {
                    warn!("Page limit of {} reached before the last page", max_pages);
                    return CollectOutcome::partial(
                        items,
                        state.pages,
                        Error::PageLimitExceeded { max_pages },
                    );
                }
            }

            let page = match self.fetcher.fetch_page(&url, token).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(
                        "Pagination stopped at page {} after {} items: {}",
                        state.pages + 1,
                        items.len(),
                        e
                    );
                    return CollectOutcome::partial(items, state.pages, e);
                }
            };

            visited.insert(url.clone());

            // A cursor back to any fetched page would cycle forever
            if let Some(next) = page.next_link.as_deref().filter(|n| visited.contains(*n)) {
                let err = Error::malformed(&url, format!("next link {next} revisits an earlier page"));
                items.extend(page.items);
                state.mark_done();
                warn!("{}", err);
                return CollectOutcome::partial(items, state.pages + 1, err);
            }

            debug!("Page {}: {} items", state.pages + 1, page.items.len());
            let count = page.items.len();
            items.extend(page.items);
            state.advance(count, page.next_link);
        }

        info!(
            "Pagination complete: {} items across {} pages",
            items.len(),
            state.pages
        );
        CollectOutcome::complete(items, state.pages)
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}
