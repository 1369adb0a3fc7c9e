//! HTTP surface: probes, Prometheus metrics, and the read projections
//!
//! The projection routes mirror the central backend's read API over the
//! in-process store, so the dashboard and the CLI can query an embedded
//! agent directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use podmon_lib::{
    health::{ComponentStatus, HealthRegistry},
    models::AiResolutionStatus,
    observability::AgentMetrics,
    reconcile::MemoryStore,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Rolling window for per-pod error counts in the namespace listing
const POD_ERROR_WINDOW: Duration = Duration::from_secs(60 * 60);

const DEFAULT_POD_ERROR_LIMIT: usize = 50;
const DEFAULT_RECENT_ERROR_LIMIT: usize = 20;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: AgentMetrics,
    pub store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: AgentMetrics,
        store: Arc<MemoryStore>,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            store,
        }
    }
}

/// Health check response - 200 while operational, 503 when unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - 200 if ready, 503 if not
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Dashboard headline counts
async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.stats().await)
}

/// All monitored namespaces
async fn namespaces(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.namespaces().await)
}

/// Pods of one namespace with rolling error counts
async fn namespace_pods(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    match state.store.pods_in_namespace(id, POD_ERROR_WINDOW).await {
        Some(pods) => (StatusCode::OK, Json(json!(pods))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "namespace not found"})),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

/// Recent errors of one pod, newest first
async fn pod_errors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_POD_ERROR_LIMIT);
    match state.store.pod_errors(id, limit).await {
        Some(errors) => (StatusCode::OK, Json(json!(errors))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "pod not found"})),
        ),
    }
}

/// Most recent errors across all namespaces, by priority then recency
async fn recent_errors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_ERROR_LIMIT);
    Json(state.store.recent_errors(limit).await)
}

#[derive(Debug, Deserialize)]
struct AiStatusPatch {
    status: AiResolutionStatus,
    #[serde(default)]
    steps: Option<serde_json::Value>,
}

/// Patch the AI-resolution status of one error - the only permitted
/// mutation of a persisted error
async fn patch_ai_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<AiStatusPatch>,
) -> impl IntoResponse {
    match state.store.set_ai_status(id, body.status, body.steps).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"success": true, "message": "AI status updated"})),
        ),
        Err(e) => (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))),
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/stats", get(stats))
        .route("/api/namespaces", get(namespaces))
        .route("/api/namespaces/:id/pods", get(namespace_pods))
        .route("/api/pods/:id/errors", get(pod_errors))
        .route("/api/errors/recent", get(recent_errors))
        .route("/api/errors/:id/ai-status", patch(patch_ai_status))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
