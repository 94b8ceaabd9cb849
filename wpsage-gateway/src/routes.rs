//! Axum route handlers for the WPSage gateway API.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::Uri,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use wpsage_core::{ExecutionId, ExecutionResult, QueryResult, Snapshot};

use crate::{error::GatewayError, snapshot::collect_snapshot, state::AppState};

/// Path prefix for every route, mirroring the `wpsage/v1` REST namespace.
pub const NAMESPACE: &str = "/wp-json/wpsage/v1";

const HEALTH_MESSAGE: &str = "WPSage API is functioning correctly";

// ── Request / response types ──────────────────────────────────────────────────

/// Body of `POST /run-sql`. A body that is not a JSON object with a string
/// `query` field parses as an empty query.
#[derive(Debug, Default, Deserialize)]
pub struct SqlBody {
    #[serde(default)]
    pub query: String,
}

impl SqlBody {
    /// Parse a request body, falling back to an empty query.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

/// Body of `POST /run-php`. Parsed leniently like [`SqlBody`].
#[derive(Debug, Default, Deserialize)]
pub struct CodeBody {
    #[serde(default)]
    pub code: String,
}

impl CodeBody {
    /// Parse a request body, falling back to empty code.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

/// Result returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// Server time, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub timestamp: String,
    /// Present only when the caller supplied a non-empty `api_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_valid: Option<bool>,
}

/// The `api_key` query parameter. When the parameter repeats, the last
/// occurrence wins.
fn supplied_key(uri: &Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs.into_iter().rev().find(|(name, _)| name == "api_key").map(|(_, value)| value)
}

/// A field counts as missing when it is empty or the string `"0"`.
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// `/health` is open; the other three routes sit behind [`require_api_key`].
/// Unknown paths and methods fall through to axum's 404/405 handling.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/site-info", get(site_info))
        .route("/run-sql", post(run_sql))
        .route("/run-php", post(run_php))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let api = Router::new().route("/health", get(health)).merge(protected);

    Router::new()
        .nest(NAMESPACE, api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Reject the request with 403 unless `api_key` matches the stored key.
/// A missing parameter is treated as an empty key.
///
/// # Errors
/// Returns [`GatewayError::Forbidden`] on mismatch.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let supplied = supplied_key(request.uri()).unwrap_or_default();
    state.guard.verify(&supplied)?;
    Ok(next.run(request).await)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check. Also reports key validity when a key is
/// supplied.
pub async fn health(State(state): State<AppState>, uri: Uri) -> Json<HealthResponse> {
    let api_key_valid = supplied_key(&uri)
        .filter(|key| !is_blank(key))
        .map(|key| state.guard.matches(&key));
    Json(HealthResponse {
        status: "ok".to_owned(),
        message: HEALTH_MESSAGE.to_owned(),
        timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        api_key_valid,
    })
}

/// `GET /site-info`: full site snapshot. Always 200.
pub async fn site_info(State(state): State<AppState>) -> Json<Snapshot> {
    let site = Arc::clone(&state.site);
    let snapshot = tokio::task::spawn_blocking(move || collect_snapshot(site.as_ref()))
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "snapshot task failed; returning empty snapshot");
            Snapshot::default()
        });
    Json(snapshot)
}

/// `POST /run-sql`: run one statement against the site database.
///
/// # Errors
/// Returns [`GatewayError::InvalidQuery`] for an empty query,
/// [`GatewayError::Policy`] if the whitelist rejects it, and
/// [`GatewayError::Store`], [`GatewayError::QueryTimeout`] or
/// [`GatewayError::QueryTask`] if execution fails.
pub async fn run_sql(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueryResult>, GatewayError> {
    let SqlBody { query } = SqlBody::from_slice(&body);
    if is_blank(&query) {
        return Err(GatewayError::InvalidQuery);
    }
    state.sql_policy.check(&query)?;

    let id = ExecutionId::new();
    let wall_start = std::time::Instant::now();
    info!(%id, query_len = query.len(), "starting sql execution");

    let queries = Arc::clone(&state.queries);
    let task = tokio::task::spawn_blocking(move || queries.run_query(&query));
    let rows = match tokio::time::timeout(state.limits.timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join)) => return Err(GatewayError::QueryTask(join.to_string())),
        Err(_) => {
            return Err(GatewayError::QueryTimeout { secs: state.limits.timeout.as_secs() })
        }
    };

    info!(%id, rows = rows.len(), elapsed_ms = wall_start.elapsed().as_millis(), "sql execution complete");
    Ok(Json(rows))
}

/// `POST /run-php`: run caller-supplied code through the configured backend.
///
/// # Errors
/// Returns [`GatewayError::InvalidCode`] for empty code and
/// [`GatewayError::Executor`] if the backend refuses or fails.
pub async fn run_php(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExecutionResult>, GatewayError> {
    let CodeBody { code } = CodeBody::from_slice(&body);
    if is_blank(&code) {
        return Err(GatewayError::InvalidCode);
    }
    info!(backend = state.code.name(), code_len = code.len(), "run-php accepted");
    let result = state.code.execute(&code).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;
    use wpsage_executor::DisabledBackend;
    use wpsage_store::SqliteSite;

    use crate::auth::AuthGuard;

    fn test_state(key: &str) -> AppState {
        let site = match SqliteSite::open_in_memory() {
            Ok(s) => Arc::new(s),
            Err(e) => panic!("failed to open site: {e}"),
        };
        AppState::for_site(Arc::new(AuthGuard::new(key, false)), site, Arc::new(DisabledBackend))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = match Request::builder().uri(uri).body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let resp = match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        let bytes = match axum::body::to_bytes(resp.into_body(), 1 << 20).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => (status, v),
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn health_response_format_returns_ok_with_status_field() {
        let (status, body) = get_json(create_router(test_state("k")), "/wp-json/wpsage/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], HEALTH_MESSAGE);
        assert!(body.get("api_key_valid").is_none(), "field must be absent without a key");
        let timestamp = body["timestamp"].as_str().unwrap_or_default();
        assert!(
            chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok(),
            "timestamp must be a SQL datetime, got {timestamp}"
        );
    }

    #[tokio::test]
    async fn health_reports_key_validity_when_key_supplied() {
        let uri = "/wp-json/wpsage/v1/health?api_key=x";
        let (_, body) = get_json(create_router(test_state("x")), uri).await;
        assert_eq!(body["api_key_valid"], true);
        let (status, body) = get_json(create_router(test_state("y")), uri).await;
        assert_eq!(status, StatusCode::OK, "health stays 200 with a wrong key");
        assert_eq!(body["api_key_valid"], false);
    }

    #[tokio::test]
    async fn health_treats_empty_key_as_absent() {
        let uri = "/wp-json/wpsage/v1/health?api_key=";
        let (_, body) = get_json(create_router(test_state("x")), uri).await;
        assert!(body.get("api_key_valid").is_none());
    }

    #[tokio::test]
    async fn missing_key_on_protected_route_is_forbidden() {
        let (status, body) =
            get_json(create_router(test_state("x")), "/wp-json/wpsage/v1/site-info").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "rest_forbidden");
    }

    #[test]
    fn supplied_key_takes_last_repeated_parameter() {
        let uri: Uri = "/x?api_key=first&api_key=second".parse().unwrap_or_default();
        assert_eq!(supplied_key(&uri).as_deref(), Some("second"));
        let uri: Uri = "/x?other=1".parse().unwrap_or_default();
        assert_eq!(supplied_key(&uri), None);
        let uri: Uri = "/x?api_key=a%2Bb".parse().unwrap_or_default();
        assert_eq!(supplied_key(&uri).as_deref(), Some("a+b"));
    }

    #[test]
    fn zero_counts_as_a_missing_field() {
        assert!(is_blank(""));
        assert!(is_blank("0"));
        assert!(!is_blank("00"));
        assert!(!is_blank(" "));
        assert!(!is_blank("SELECT 0"));
    }

    #[tokio::test]
    async fn health_treats_zero_key_as_absent() {
        let uri = "/wp-json/wpsage/v1/health?api_key=0";
        let (_, body) = get_json(create_router(test_state("x")), uri).await;
        assert!(body.get("api_key_valid").is_none());
    }

    #[test]
    fn request_bodies_parse_leniently() {
        assert_eq!(SqlBody::from_slice(br#"{"query":"SELECT 1"}"#).query, "SELECT 1");
        assert_eq!(SqlBody::from_slice(b"not json").query, "");
        assert_eq!(SqlBody::from_slice(br#"{"query":5}"#).query, "");
        assert_eq!(CodeBody::from_slice(br#"{"code":"return 1;"}"#).code, "return 1;");
        assert_eq!(CodeBody::from_slice(b"").code, "");
    }

    #[test]
    fn health_response_omits_unset_key_validity() {
        let response = HealthResponse {
            status: "ok".to_owned(),
            message: HEALTH_MESSAGE.to_owned(),
            timestamp: "2024-01-01 00:00:00".to_owned(),
            api_key_valid: None,
        };
        let json = match serde_json::to_string(&response) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert!(json.contains("\"status\":\"ok\""), "missing status field");
        assert!(json.contains("\"timestamp\""), "missing timestamp field");
        assert!(!json.contains("api_key_valid"), "unset validity must be omitted");
    }
}
