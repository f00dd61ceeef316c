//! Tests for pagination module

use super::*;
use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::graph::{GraphPageFetcher, Page, PageFetcher};
use crate::http::{HttpClient, HttpClientConfig};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Canned response for one URL
enum Scripted {
    Page(Page),
    Status(u16),
    MissingValue,
}

/// Fetcher that serves canned responses and counts calls
#[derive(Default)]
struct ScriptedFetcher {
    responses: HashMap<String, Scripted>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, ids: &[i64], next: Option<&str>) -> Self {
        let items = ids.iter().map(|id| json!({ "id": id })).collect();
        self.responses.insert(
            url.to_string(),
            Scripted::Page(Page::new(items, next.map(ToString::to_string))),
        );
        self
    }

    fn status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), Scripted::Status(status));
        self
    }

    fn missing_value(mut self, url: &str) -> Self {
        self.responses
            .insert(url.to_string(), Scripted::MissingValue);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, url: &str, _token: &AccessToken) -> Result<Page> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url) {
            Some(Scripted::Page(page)) => Ok(page.clone()),
            Some(Scripted::Status(status)) => Err(Error::http_status(*status, "scripted")),
            Some(Scripted::MissingValue) => Err(Error::malformed(url, "missing 'value'")),
            None => Err(Error::http_status(404, format!("unscripted url {url}"))),
        }
    }
}

fn token() -> AccessToken {
    AccessToken::new("t", None)
}

fn ids(items: &[serde_json::Value]) -> Vec<i64> {
    items.iter().filter_map(|i| i["id"].as_i64()).collect()
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state_advance() {
    let mut state = PaginationState::starting_at("p1");
    assert_eq!(state.cursor.as_deref(), Some("p1"));
    assert!(!state.done);

    state.advance(3, Some("p2".to_string()));
    assert_eq!(state.pages, 1);
    assert_eq!(state.total_fetched, 3);
    assert_eq!(state.cursor.as_deref(), Some("p2"));

    state.advance(2, None);
    assert_eq!(state.pages, 2);
    assert_eq!(state.total_fetched, 5);
    assert!(state.done);
    assert!(state.cursor.is_none());
}

// ============================================================================
// Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_collect_concatenates_pages_in_order() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("p1", &[1, 2], Some("p2"))
            .page("p2", &[3], Some("p3"))
            .page("p3", &[4, 5], None),
    );
    let paginator = Paginator::new(fetcher.clone());

    let outcome = paginator.collect_all("p1", &token()).await;

    assert!(outcome.complete);
    assert!(outcome.error.is_none());
    assert_eq!(ids(&outcome.items), vec![1, 2, 3, 4, 5]);
    assert_eq!(outcome.pages, 3);
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn test_single_page_without_cursor() {
    let fetcher = Arc::new(ScriptedFetcher::default().page("only", &[7], None));
    let outcome = Paginator::new(fetcher.clone())
        .collect_all("only", &token())
        .await;

    assert!(outcome.complete);
    assert_eq!(ids(&outcome.items), vec![7]);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_duplicates_are_kept() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("p1", &[1, 1], Some("p2"))
            .page("p2", &[1], None),
    );
    let outcome = Paginator::new(fetcher).collect_all("p1", &token()).await;
    assert_eq!(ids(&outcome.items), vec![1, 1, 1]);
}

#[tokio::test]
async fn test_http_error_keeps_earlier_pages() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("p1", &[1], Some("p2"))
            .page("p2", &[2], Some("p3"))
            .status("p3", 500)
            .page("p4", &[4], None),
    );
    let outcome = Paginator::new(fetcher.clone())
        .collect_all("p1", &token())
        .await;

    assert!(outcome.is_partial());
    assert_eq!(ids(&outcome.items), vec![1, 2]);
    assert_eq!(outcome.pages, 2);
    assert!(matches!(
        outcome.error,
        Some(Error::HttpStatus { status: 500, .. })
    ));
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test]
async fn test_schema_error_keeps_earlier_pages() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("p1", &[1], Some("p2"))
            .missing_value("p2"),
    );
    let outcome = Paginator::new(fetcher).collect_all("p1", &token()).await;

    assert!(outcome.is_partial());
    assert_eq!(ids(&outcome.items), vec![1]);
    assert!(matches!(
        outcome.error,
        Some(Error::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_failure_on_first_page_is_empty_partial() {
    let fetcher = Arc::new(ScriptedFetcher::default().status("p1", 401));
    let outcome = Paginator::new(fetcher).collect_all("p1", &token()).await;

    assert!(outcome.is_partial());
    assert!(outcome.is_empty());
    assert_eq!(outcome.pages, 0);
}

#[tokio::test]
async fn test_many_pages_do_not_grow_the_stack() {
    let mut fetcher = ScriptedFetcher::default();
    let total = 5_000;
    for n in 0..total {
        let url = format!("p{n}");
        let next = (n + 1 < total).then(|| format!("p{}", n + 1));
        fetcher = fetcher.page(&url, &[n], next.as_deref());
    }
    let fetcher = Arc::new(fetcher);

    let outcome = Paginator::new(fetcher.clone())
        .collect_all("p0", &token())
        .await;

    assert!(outcome.complete);
    assert_eq!(outcome.len(), total as usize);
    assert_eq!(fetcher.calls(), total as usize);
}

#[tokio::test]
async fn test_max_pages_cap() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("p1", &[1], Some("p2"))
            .page("p2", &[2], Some("p3"))
            .page("p3", &[3], None),
    );
    let outcome = Paginator::new(fetcher.clone())
        .with_max_pages(Some(2))
        .collect_all("p1", &token())
        .await;

    assert!(outcome.is_partial());
    assert_eq!(ids(&outcome.items), vec![1, 2]);
    assert!(matches!(
        outcome.error,
        Some(Error::PageLimitExceeded { max_pages: 2 })
    ));
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_self_referencing_cursor_stops() {
    let fetcher = Arc::new(ScriptedFetcher::default().page("loop", &[1], Some("loop")));
    let outcome = Paginator::new(fetcher.clone())
        .collect_all("loop", &token())
        .await;

    assert!(outcome.is_partial());
    assert_eq!(ids(&outcome.items), vec![1]);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_cursor_cycle_stops() {
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .page("a", &[1], Some("b"))
            .page("b", &[2], Some("c"))
            .page("c", &[3], Some("a")),
    );
    let outcome = Paginator::new(fetcher.clone())
        .collect_all("a", &token())
        .await;

    assert!(outcome.is_partial());
    assert_eq!(ids(&outcome.items), vec![1, 2, 3]);
    assert_eq!(outcome.pages, 3);
    assert!(matches!(
        outcome.error,
        Some(Error::MalformedResponse { .. })
    ));
    assert_eq!(fetcher.calls(), 3);
}

// ============================================================================
// Against a mock Graph server
// ============================================================================

#[tokio::test]
async fn test_collect_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [{"id": 2}]})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": 1}],
            "@odata.nextLink": format!("{}/items?page=2", server.uri())
        })))
        .mount(&server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .no_rate_limit()
            .max_retries(0)
            .build(),
    )
    .unwrap();
    let paginator = Paginator::new(Arc::new(GraphPageFetcher::new(client)));

    let outcome = paginator
        .collect_all(&format!("{}/items", server.uri()), &token())
        .await;

    assert!(outcome.complete);
    assert_eq!(outcome.items, vec![json!({"id": 1}), json!({"id": 2})]);
}
