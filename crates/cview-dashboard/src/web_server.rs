//! JSON API over the aggregated summary.
//!
//! Serves the same [`DashboardView`](crate::DashboardView) the console
//! draws, and lets a client trigger a refresh cycle.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::orchestrator::{Aggregator, RefreshOutcome};

/// HTTP server exposing the summary as JSON.
pub struct WebServer {
    bind_addr: String,
    aggregator: Arc<Aggregator>,
}

impl WebServer {
    pub fn new(bind_addr: String, aggregator: Arc<Aggregator>) -> Self {
        Self {
            bind_addr,
            aggregator,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/health", get(api_health))
            .route("/api/summary", get(api_summary))
            .route("/api/refresh", post(api_refresh))
            .with_state(Arc::clone(&self.aggregator))
    }

    pub async fn run(self) -> Result<(), anyhow::Error> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "HTTP summary API listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn api_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true, "service": "cview"}))
}

async fn api_summary(State(aggregator): State<Arc<Aggregator>>) -> impl IntoResponse {
    Json(aggregator.view().await)
}

/// Runs the cycle on its own task; it completes even if the client
/// disconnects.
async fn api_refresh(State(aggregator): State<Arc<Aggregator>>) -> impl IntoResponse {
    let cycle = tokio::spawn({
        let aggregator = Arc::clone(&aggregator);
        async move { aggregator.refresh().await }
    });

    let outcome = match cycle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Refresh task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"ok": false, "error": "refresh_failed"})),
            );
        }
    };

    match outcome {
        RefreshOutcome::Completed { failed_sources } => {
            let view = aggregator.view().await;
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "ok": failed_sources == 0,
                    "failedSources": failed_sources,
                    "view": view,
                })),
            )
        }
        RefreshOutcome::AlreadyRunning => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"ok": false, "error": "refresh_in_progress"})),
        ),
    }
}
