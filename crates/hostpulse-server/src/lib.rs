//! HTTP snapshot server for the hostpulse history store.
//!
//! Read-only by construction: every endpoint works off
//! [`MetricHistory::snapshot`] / [`MetricHistory::health_report`], so request
//! handlers never contend with the collector beyond the store's read lock and
//! never observe a partially appended tick.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Html, Json},
    routing::get,
};
use serde::Serialize;

use hostpulse_core::{HistorySnapshot, MetricHistory};

/// The embedded dashboard page served at `/`.
const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    window: usize,
    capacity: usize,
    probes: Vec<ProbeEntry>,
}

#[derive(Serialize)]
struct ProbeEntry {
    name: String,
    healthy: bool,
    failures: u64,
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// The full rolling window as JSON. Always succeeds: missing metrics are
/// already zero-filled in the store, so transport problems are the only way
/// this request can fail.
async fn handle_data(State(history): State<Arc<MetricHistory>>) -> Json<HistorySnapshot> {
    Json(history.snapshot())
}

async fn handle_health(State(history): State<Arc<MetricHistory>>) -> Json<HealthResponse> {
    let report = history.health_report();
    let probes: Vec<ProbeEntry> = report
        .probes
        .iter()
        .map(|p| ProbeEntry {
            name: p.name.to_string(),
            healthy: p.healthy,
            failures: p.failures,
        })
        .collect();
    Json(HealthResponse {
        status: report.status.to_string(),
        window: report.window,
        capacity: report.capacity,
        probes,
    })
}

/// Build the axum router.
pub fn build_router(history: Arc<MetricHistory>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/data", get(handle_data))
        .route("/health", get(handle_health))
        .with_state(history)
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(
    history: Arc<MetricHistory>,
    host: &str,
    port: u16,
) -> std::io::Result<()> {
    let app = build_router(history);
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
