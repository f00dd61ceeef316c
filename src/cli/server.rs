//! HTTP server mode
//!
//! Serves the cached snapshot and starts background refreshes. Sign-in is
//! handled elsewhere; auth failures are answered with 401 and `"login": true`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AccessToken;
use crate::engine::{RefreshEngine, RefreshOutcome};
use crate::error::{Error, Result};

/// App state shared across handlers
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RefreshEngine>,
    downstream_endpoint: Option<String>,
}

impl AppState {
    /// Create handler state
    pub fn new(engine: Arc<RefreshEngine>, downstream_endpoint: Option<String>) -> Self {
        Self {
            engine,
            downstream_endpoint,
        }
    }
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    login: bool,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            login: false,
        }
    }
}

impl ApiResponse<()> {
    fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            login: false,
        }
    }

    fn login_required(msg: impl Into<String>) -> Self {
        Self {
            login: true,
            ..Self::error(msg)
        }
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(index))
        .route("/site", get(get_site))
        .route("/refresh", post(start_refresh))
        .route("/downstream", get(call_downstream))
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(
    engine: Arc<RefreshEngine>,
    downstream_endpoint: Option<String>,
    port: u16,
) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(AppState::new(engine, downstream_endpoint))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Status, opportunistically starting a refresh when nothing is cached
async fn index(State(state): State<AppState>) -> Response {
    let engine = &state.engine;
    let cache = engine.cache();

    let mut started = false;
    if !cache.exists() {
        if let Some(response) = login_needed(engine).await {
            return response;
        }
        started = engine.spawn_if_idle().is_some();
    }

    let settings = engine.settings();
    let last_refresh = engine.last_outcome().await.map(|o| o.summary());

    (
        StatusCode::OK,
        Json(ApiResponse::success(json!({
            "site": settings.site,
            "list_name": settings.list_name,
            "refreshing": cache.is_refreshing(),
            "refresh_started": started,
            "cached": cache.exists(),
            "cached_at": cache.modified_at().await,
            "last_refresh": last_refresh,
        }))),
    )
        .into_response()
}

/// Cached items, or a not-ready answer while a refresh runs
async fn get_site(State(state): State<AppState>) -> Response {
    let cache = state.engine.cache();

    if cache.is_refreshing() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(
                "not ready: a background refresh is running",
            )),
        )
            .into_response();
    }

    match cache.load().await {
        Ok(Some(items)) => (
            StatusCode::OK,
            Json(ApiResponse::success(json!({
                "count": items.len(),
                "items": items,
            }))),
        )
            .into_response(),
        Ok(None) => {
            if let Some(response) = login_needed(&state.engine).await {
                return response;
            }
            let started = state.engine.spawn_if_idle().is_some();
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse::success(json!({
                    "status": "pending",
                    "refresh_started": started,
                }))),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        )
            .into_response(),
    }
}

/// Start a background refresh regardless of the snapshot
async fn start_refresh(State(state): State<AppState>) -> Response {
    if let Err(e) = acquire_token(&state.engine).await {
        return login_required(&e);
    }

    match state.engine.spawn() {
        Some(_) => (
            StatusCode::ACCEPTED,
            Json(ApiResponse::success(json!({ "status": "started" }))),
        )
            .into_response(),
        None => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("a refresh is already running")),
        )
            .into_response(),
    }
}

/// Fetch the configured downstream endpoint with the user's token
async fn call_downstream(State(state): State<AppState>) -> Response {
    let Some(endpoint) = state.downstream_endpoint.as_deref() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("no downstream endpoint configured")),
        )
            .into_response();
    };

    let engine = &state.engine;
    let token = match acquire_token(engine).await {
        Ok(token) => token,
        Err(e) => return login_required(&e),
    };

    match engine.client().get_json::<Value>(endpoint, &token).await {
        Ok(body) => (StatusCode::OK, Json(ApiResponse::success(body))).into_response(),
        Err(e) if e.is_auth() => login_required(&e),
        Err(e) => {
            let status = if e.is_fetch_error() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(ApiResponse::error(e.to_string()))).into_response()
        }
    }
}

async fn acquire_token(engine: &RefreshEngine) -> Result<AccessToken> {
    engine.tokens().token(&engine.settings().scopes).await
}

/// 401 when no token can be obtained or the last session was refused upstream
async fn login_needed(engine: &RefreshEngine) -> Option<Response> {
    if let Err(e) = acquire_token(engine).await {
        if e.is_auth() {
            return Some(login_required(&e));
        }
    }

    match engine.last_outcome().await {
        Some(RefreshOutcome::AuthFailed { message }) => Some(
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::login_required(message)),
            )
                .into_response(),
        ),
        _ => None,
    }
}

fn login_required(e: &Error) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::login_required(e.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NoTokenProvider, StaticTokenProvider, TokenProvider};
    use crate::cache::Cache;
    use crate::engine::RefreshSettings;
    use crate::graph::{GraphEndpoints, GraphPageFetcher, SiteResolver};
    use crate::http::{HttpClient, HttpClientConfig};
    use crate::pagination::Paginator;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(base_url: &str, dir: &TempDir) -> Arc<RefreshEngine> {
        engine_with(base_url, dir, Arc::new(StaticTokenProvider::new("tok")))
    }

    fn engine_with(
        base_url: &str,
        dir: &TempDir,
        tokens: Arc<dyn TokenProvider>,
    ) -> Arc<RefreshEngine> {
        let client = HttpClient::with_config(
            HttpClientConfig::builder()
                .no_rate_limit()
                .max_retries(0)
                .build(),
        )
        .unwrap();
        let resolver = SiteResolver::new(client.clone(), GraphEndpoints::new(base_url));
        let paginator = Paginator::new(Arc::new(GraphPageFetcher::new(client.clone())));

        Arc::new(RefreshEngine::new(
            client,
            tokens,
            resolver,
            paginator,
            Cache::new(dir.path().join("clients.json")),
            RefreshSettings::new("root"),
        ))
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(engine("http://127.0.0.1:9", &dir), None));

        let (status, body) = call(app, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_site_serves_cached_items() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine("http://127.0.0.1:9", &dir);
        engine
            .cache()
            .store(&[json!({"id": 1}), json!({"id": 2})])
            .await
            .unwrap();
        let app = router(AppState::new(engine, None));

        let (status, body) = call(app, Method::GET, "/site").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);
        assert_eq!(body["data"]["items"][1]["id"], 2);
    }

    #[tokio::test]
    async fn test_site_not_ready_while_refreshing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine("http://127.0.0.1:9", &dir);
        let _guard = engine.cache().refresh_guard().unwrap();
        let app = router(AppState::new(engine, None));

        let (status, body) = call(app, Method::GET, "/site").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_site_without_cache_starts_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine("http://127.0.0.1:9", &dir);
        let app = router(AppState::new(Arc::clone(&engine), None));

        let (status, body) = call(app, Method::GET, "/site").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["data"]["refresh_started"], true);
    }

    #[tokio::test]
    async fn test_refresh_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine("http://127.0.0.1:9", &dir);
        let _guard = engine.cache().refresh_guard().unwrap();
        let app = router(AppState::new(engine, None));

        let (status, _) = call(app, Method::POST, "/refresh").await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_downstream_passthrough() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"displayName": "Ada"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(
            engine(&server.uri(), &dir),
            Some(format!("{}/v1.0/me", server.uri())),
        ));

        let (status, body) = call(app, Method::GET, "/downstream").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["displayName"], "Ada");
    }

    #[tokio::test]
    async fn test_downstream_unauthorized_asks_for_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(
            engine(&server.uri(), &dir),
            Some(format!("{}/v1.0/me", server.uri())),
        ));

        let (status, body) = call(app, Method::GET, "/downstream").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["login"], true);
    }

    #[tokio::test]
    async fn test_missing_token_asks_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with("http://127.0.0.1:9", &dir, Arc::new(NoTokenProvider));
        let app = router(AppState::new(Arc::clone(&engine), None));

        for _ in 0..3 {
            let (status, body) = call(app.clone(), Method::GET, "/site").await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["login"], true);
        }

        let (status, body) = call(app.clone(), Method::GET, "/").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["login"], true);

        let (status, _) = call(app, Method::POST, "/refresh").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Nothing was launched
        assert!(!engine.cache().is_refreshing());
        assert!(engine.last_outcome().await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_asks_for_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/root"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&server.uri(), &dir);
        assert!(engine.run().await.needs_login());

        let app = router(AppState::new(Arc::clone(&engine), None));
        let (status, body) = call(app, Method::GET, "/site").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["login"], true);
        assert!(!engine.cache().is_refreshing());
    }

    #[tokio::test]
    async fn test_index_reports_last_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sites/root"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&server.uri(), &dir);
        engine.cache().store(&[json!({"id": 1})]).await.unwrap();
        engine.run().await;

        let app = router(AppState::new(engine, None));
        let (status, body) = call(app, Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cached"], true);
        assert_eq!(body["data"]["refresh_started"], false);
        assert!(body["data"]["last_refresh"].is_string());
    }
}
