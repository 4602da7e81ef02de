//! HTTP API over the recommender.

use crate::error::RecommendError;
use crate::metrics::MetricsRegistry;
use crate::recommend::{Recommendation, RecommendOptions, Recommender};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub metrics: Arc<MetricsRegistry>,
    pub defaults: RecommendOptions,
}

impl AppState {
    pub fn new(
        recommender: Arc<Recommender>,
        metrics: Arc<MetricsRegistry>,
        defaults: RecommendOptions,
    ) -> Self {
        metrics
            .catalog_jobs
            .set(recommender.catalog().len() as f64);
        Self {
            recommender,
            metrics,
            defaults,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_k: Option<usize>,
    pub similarity_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub count: usize,
    pub results: Vec<Recommendation>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),
    #[error("invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Recommend(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "recommend request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommend", post(api_recommend))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API on `addr` until ctrl-c.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Job recommender listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn api_recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    state.metrics.recommend_requests_total.inc();
    let Json(req) = payload.inspect_err(|_| state.metrics.recommend_errors_total.inc())?;
    let timer = state.metrics.recommend_duration.start_timer();

    let options = RecommendOptions {
        top_k: req.top_k.unwrap_or(state.defaults.top_k),
        similarity_threshold: req
            .similarity_threshold
            .unwrap_or(state.defaults.similarity_threshold),
    };
    let recommender = Arc::clone(&state.recommender);
    // Encoding is CPU-bound; keep it off the async workers.
    let outcome =
        tokio::task::spawn_blocking(move || recommender.recommend(&req.query, options)).await;
    timer.observe_duration();

    let results = match outcome {
        Ok(Ok(results)) => results,
        Ok(Err(err)) => {
            state.metrics.recommend_errors_total.inc();
            return Err(err.into());
        }
        Err(join_err) => {
            state.metrics.recommend_errors_total.inc();
            return Err(ApiError::Internal(join_err.to_string()));
        }
    };

    state
        .metrics
        .recommend_results_total
        .inc_by(results.len() as f64);
    Ok(Json(RecommendResponse {
        count: results.len(),
        results,
    }))
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = state.recommender.catalog();
    Json(json!({ "ok": true, "jobs": catalog.len(), "dim": catalog.dim() }))
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
                .into_response()
        }
    }
}
