//! HTTP surface: `POST /ask`, `GET /health`, `GET /metrics`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlask_core::{AskPipeline, PipelineError};
use tower_http::cors::{Any, CorsLayer};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<AskPipeline>,
    metrics: Metrics,
}

impl AppState {
    pub fn new(pipeline: AskPipeline, metrics: Metrics) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskReply {
    pub query: String,
    pub results_html: String,
    pub row_count: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskReply>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        state.metrics.record_outcome(MALFORMED_REQUEST_KIND);
        ApiError::Malformed(rejection)
    })?;

    match state.pipeline.ask(&request.query).await {
        Ok(response) => {
            state.metrics.record_outcome("success");
            crate::log_event!(
                level: tracing::Level::INFO,
                event: "ask_completed",
                query: response.query.as_str(),
                rows: response.row_count
            );
            Ok(Json(AskReply {
                query: response.query.into_inner(),
                results_html: response.results_html,
                row_count: response.row_count,
            }))
        }
        Err(err) => {
            state.metrics.record_outcome(err.kind());
            crate::log_event!(
                level: tracing::Level::WARN,
                event: "ask_rejected",
                kind: err.kind(),
                detail: err.to_string()
            );
            Err(ApiError::Pipeline(err))
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// A body that is not `{"query": "<text>"}` is an input error.
const MALFORMED_REQUEST_KIND: &str = "input_error";

/// Failure rendered as `{"error": <kind>, "detail": <message>}`
pub enum ApiError {
    Pipeline(PipelineError),
    Malformed(JsonRejection),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Oracle(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Pipeline(err) => err.kind(),
            ApiError::Malformed(_) => MALFORMED_REQUEST_KIND,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Pipeline(err) => err.to_string(),
            ApiError::Malformed(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "detail": self.detail(),
        });
        (self.status(), Json(body)).into_response()
    }
}
