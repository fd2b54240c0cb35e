// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface for the administrative queries.
//!
//! Exposes the three read-only cluster queries plus health and metrics:
//!
//! - `GET /v1/routes/sync` - resync DNS, then fan `sync` out to all agents
//! - `GET /v1/routes/stats` - traffic statistics per reachable node
//! - `GET /v1/routes/info` - process info per reachable node
//! - `GET /healthz` - liveness
//! - `GET /metrics` - Prometheus exposition
//!
//! Registry CRUD is intentionally not served here; entity persistence and
//! its REST surface belong to the platform's entity service.

use crate::admin::AdminQuery;
use crate::errors::ClusterError;
use crate::metrics;
use crate::scatter::NodeOutcome;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Shared state of the admin HTTP surface.
pub struct AppState {
    pub admin: AdminQuery,
}

/// Build the admin router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/routes/sync", get(sync_handler))
        .route("/v1/routes/stats", get(stats_handler))
        .route("/v1/routes/info", get(info_handler))
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

struct ApiError(ClusterError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ClusterError::DirectoryUnavailable { reason } = &self.0;
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "node directory unavailable", "reason": reason })),
        )
            .into_response()
    }
}

impl From<ClusterError> for ApiError {
    fn from(err: ClusterError) -> Self {
        Self(err)
    }
}

async fn sync_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NodeOutcome>>, ApiError> {
    Ok(Json(state.admin.sync().await?))
}

async fn stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NodeOutcome>>, ApiError> {
    Ok(Json(state.admin.stats().await?))
}

async fn info_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NodeOutcome>>, ApiError> {
    Ok(Json(state.admin.info().await?))
}

async fn healthz_handler() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    metrics::gather()
}
