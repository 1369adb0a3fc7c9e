//! Integration tests for the agent API endpoints
//!
//! The router is reconstructed here from the same library pieces the
//! binary wires together.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use podmon_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    models::{AiResolutionStatus, CycleUpdate, ErrorCandidate, PodObservation},
    observability::AgentMetrics,
    reconcile::{MemoryStore, Reconciler},
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: AgentMetrics,
    pub store: Arc<MemoryStore>,
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;
    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;
    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(readiness))
}

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

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.stats().await)
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn recent_errors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    Json(state.store.recent_errors(query.limit.unwrap_or(20)).await)
}

#[derive(Deserialize)]
struct AiStatusPatch {
    status: AiResolutionStatus,
    #[serde(default)]
    steps: Option<serde_json::Value>,
}

async fn patch_ai_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<AiStatusPatch>,
) -> impl IntoResponse {
    match state.store.set_ai_status(id, body.status, body.steps).await {
        Ok(()) => (StatusCode::OK, Json(json!({"success": true}))),
        Err(e) => (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))),
    }
}

fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/stats", get(stats))
        .route("/api/errors/recent", get(recent_errors))
        .route("/api/errors/:id/ai-status", patch(patch_ai_status))
        .with_state(state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::COLLECTOR).await;
    health_registry.register(components::RECONCILER).await;

    let state = Arc::new(AppState {
        health_registry,
        metrics: AgentMetrics::new(),
        store: Arc::new(MemoryStore::new()),
    });
    let router = create_test_router(state.clone());

    (router, state)
}

/// Seed the store through the reconciler, the same path the agent uses.
async fn seed_error(store: &Arc<MemoryStore>) -> u64 {
    let reconciler = Reconciler::with_defaults(store.clone());
    reconciler
        .apply(CycleUpdate {
            namespace: "demo".to_string(),
            pods: vec![PodObservation {
                name: "dashboard".to_string(),
                status: "ImagePullBackOff".to_string(),
                errors: vec![ErrorCandidate {
                    message: "Pod status: ImagePullBackOff".to_string(),
                    error_type: "ImagePullBackOff".to_string(),
                }],
            }],
        })
        .await
        .unwrap();

    store.recent_errors(1).await[0].id
}

#[tokio::test]
async fn healthz_returns_ok_when_healthy() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(health["status"], "healthy");
    assert!(health["components"]["collector"].is_object());
}

#[tokio::test]
async fn healthz_returns_ok_when_degraded() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_degraded(components::COLLECTOR, "cycle aborted")
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Degraded still returns 200 (operational)
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "degraded");
}

#[tokio::test]
async fn healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::COLLECTOR, "cluster unreachable")
        .await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn readyz_flips_with_readiness() {
    let (app, state) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.health_registry.set_ready(true).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    let (app, state) = setup_test_app().await;

    state.metrics.inc_cycles();
    state.metrics.observe_cycle_latency(0.05);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("podmon_cycles_total"));
    assert!(metrics_text.contains("podmon_cycle_latency_seconds_bucket"));
}

#[tokio::test]
async fn stats_reflect_reconciled_state() {
    let (app, state) = setup_test_app().await;
    seed_error(&state.store).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(stats["total_namespaces"], 1);
    assert_eq!(stats["total_pods"], 1);
    assert_eq!(stats["error_pods"], 1);
}

#[tokio::test]
async fn recent_errors_include_pod_and_namespace_names() {
    let (app, state) = setup_test_app().await;
    seed_error(&state.store).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/errors/recent?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let errors: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(errors[0]["pod_name"], "dashboard");
    assert_eq!(errors[0]["namespace_name"], "demo");
    assert_eq!(errors[0]["priority"], "P1");
    assert_eq!(errors[0]["ai_resolution_status"], "analyzing");
}

#[tokio::test]
async fn ai_status_patch_updates_the_error() {
    let (app, state) = setup_test_app().await;
    let error_id = seed_error(&state.store).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/errors/{error_id}/ai-status"))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"status": "resolved", "steps": ["re-tagged image"]}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let error = state.store.error(error_id).await.unwrap();
    assert_eq!(error.ai_resolution_status, AiResolutionStatus::Resolved);
    assert!(error.resolved_at.is_some());
}

#[tokio::test]
async fn ai_status_patch_on_unknown_error_is_404() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/api/errors/999/ai-status")
                .header("content-type", "application/json")
                .body(Body::from(json!({"status": "analyzing"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ai_status_patch_rejects_unknown_status() {
    let (app, state) = setup_test_app().await;
    let error_id = seed_error(&state.store).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/errors/{error_id}/ai-status"))
                .header("content-type", "application/json")
                .body(Body::from(json!({"status": "fixed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Serde rejects the unknown enum value before the handler runs
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
