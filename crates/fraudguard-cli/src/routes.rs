//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fraudguard_batch::to_csv_string;
use fraudguard_core::{Error, TransactionRecord};
use fraudguard_policy::Assessment;
use fraudguard_telemetry::metrics::names;
use fraudguard_telemetry::MetricsSnapshot;
use serde_json::json;
use tracing::{error, info, warn};

use crate::state::AppState;

/// Largest accepted CSV upload
const BATCH_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .route("/v1/check", post(check))
        .route(
            "/v1/batch",
            post(batch).layer(DefaultBodyLimit::max(BATCH_BODY_LIMIT)),
        )
        .route("/v1/stats", get(stats))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Evaluate a single JSON record
async fn check(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRecord>, JsonRejection>,
) -> Result<Json<Assessment>, AppError> {
    metrics::counter!(names::HTTP_REQUESTS_TOTAL, "route" => "check").increment(1);
    let Json(record) = payload.map_err(|e| AppError::Unprocessable(e.body_text()))?;

    let assessment = state.engine.assess(&record).await.map_err(|e| {
        state.collector.record_unresolved();
        AppError::from(e)
    })?;

    state.collector.record_evaluation(
        assessment.verdict.is_fraud,
        assessment.verdict.rule_triggered,
        assessment.prevention.allowed,
    );

    Ok(Json(assessment))
}

/// Evaluate a CSV body and return the annotated CSV
async fn batch(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    metrics::counter!(names::HTTP_REQUESTS_TOTAL, "route" => "batch").increment(1);
    let body = std::str::from_utf8(&body).map_err(|e| {
        AppError::Unprocessable(format!("request body is not valid UTF-8: {}", e))
    })?;

    let token = state.shutdown.child_token();
    let result = state.orchestrator.run_csv(body.as_bytes(), token).await?;

    info!(
        rows = result.summary.total,
        fraud = result.summary.fraud,
        cancelled = result.cancelled,
        "Batch request complete"
    );

    let csv = to_csv_string(&result)?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.collector.snapshot())
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Handler errors, rendered as a JSON error body
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    /// The request body could not be interpreted as records
    #[error("{0}")]
    Unprocessable(String),

    /// The classifier cannot serve predictions
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::Schema { .. } | Error::RowParse(_) | Error::InvalidRecord(_) | Error::Csv(_) => {
                AppError::Unprocessable(err.to_string())
            }
            Error::ClassifierUnavailable(_) => AppError::Unavailable(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request_error"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "classifier_unavailable"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
