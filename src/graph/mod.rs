//! Microsoft Graph site-list access
//!
//! - `GraphEndpoints` - URL construction for sites, lists, and list items
//! - `PageFetcher` / `GraphPageFetcher` - one GET, one `Page`
//! - `SiteResolver` - site identifier and list name to internal ids

mod endpoints;
mod fetcher;
mod resolver;
mod types;

pub use endpoints::{GraphEndpoints, GRAPH_BASE_URL};
pub use fetcher::{GraphPageFetcher, PageFetcher};
pub use resolver::SiteResolver;
pub use types::{ListResource, Page, SiteDescriptor, SiteResource, NEXT_LINK_KEY, VALUE_KEY};
