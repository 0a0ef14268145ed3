//! HTTP API over a [`Labeler`].
//!
//! - `GET  /email`: 10 random emails with label and prediction
//! - `GET  /email/{id}`: one email with label and prediction
//! - `GET  /email/{id}/label`: `{id, label}`, empty label if unlabeled
//! - `PUT  /email/{id}/label`: body `{"label": "ham"|"spam"}`, trains and returns `{id, label}`
//! - `GET  /email/{id}/prediction`: `{id, prediction}`
//! - `GET  /report`: `{count_ham, count_spam, report}`

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::error::LabelerError;
use crate::label::Label;
use crate::labeler::{EmailView, LabelView, Labeler};

/// Number of emails returned by `GET /email`.
pub const RANDOM_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Front-end build served at `/` when set
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            static_dir: None,
        }
    }
}

type AppState = Arc<Labeler>;

// ── Response types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PredictionResponse {
    id: usize,
    prediction: f32,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    count_ham: usize,
    count_spam: usize,
    report: String,
}

#[derive(Debug, Deserialize)]
struct LabelRequest {
    label: String,
}

/// An error rendered as `{"error": message}` with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<LabelerError> for ApiError {
    fn from(err: LabelerError) -> Self {
        let status = match &err {
            LabelerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LabelerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            LabelerError::Learning(_)
            | LabelerError::Persistence { .. }
            | LabelerError::ConvergenceFailure { .. }
            | LabelerError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Runs a core operation off the async workers; the core blocks on the model lock.
async fn blocking<T, F>(labeler: AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Labeler) -> Result<T, LabelerError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(&labeler)).await {
        Ok(result) => result.map(Json).map_err(ApiError::from),
        Err(e) => {
            error!("Worker task failed: {}", e);
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "worker task failed".to_string(),
            })
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn random_emails(State(labeler): State<AppState>) -> ApiResult<Vec<EmailView>> {
    blocking(labeler, |l| l.random_emails(RANDOM_SAMPLE_SIZE.min(l.corpus().len()))).await
}

async fn get_email(State(labeler): State<AppState>, Path(id): Path<usize>) -> ApiResult<EmailView> {
    blocking(labeler, move |l| l.email(id)).await
}

async fn get_label(State(labeler): State<AppState>, Path(id): Path<usize>) -> ApiResult<LabelView> {
    blocking(labeler, move |l| l.label(id)).await
}

/// Checks the email exists before looking at the body, so an unknown id is 404
/// whatever was sent.
async fn put_label(
    State(labeler): State<AppState>,
    Path(id): Path<usize>,
    body: Result<Json<LabelRequest>, JsonRejection>,
) -> ApiResult<LabelView> {
    blocking(labeler, move |l| {
        l.raw_email(id)?;
        let Json(request) = body.map_err(|e| LabelerError::InvalidArgument(e.body_text()))?;
        let label: Label = request.label.parse()?;
        l.assign_label(id, label)
    })
    .await
}

async fn get_prediction(
    State(labeler): State<AppState>,
    Path(id): Path<usize>,
) -> ApiResult<PredictionResponse> {
    blocking(labeler, move |l| {
        Ok(PredictionResponse {
            id,
            prediction: l.prediction(id)?,
        })
    })
    .await
}

async fn get_report(State(labeler): State<AppState>) -> ApiResult<ReportResponse> {
    blocking(labeler, |l| {
        let report = l.report()?;
        Ok(ReportResponse {
            count_ham: report.count_ham,
            count_spam: report.count_spam,
            report: report.quality.to_string(),
        })
    })
    .await
}

// ── Router ────────────────────────────────────────────────────────────────

/// Builds the API router. Any origin may call it.
pub fn router(labeler: Arc<Labeler>, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/email", get(random_emails))
        .route("/email/{id}", get(get_email))
        .route("/email/{id}/label", get(get_label).put(put_label))
        .route("/email/{id}/prediction", get(get_prediction))
        .route("/report", get(get_report))
        .layer(CorsLayer::permissive())
        .with_state(labeler);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Serves the API until the process is stopped.
pub async fn serve(labeler: Arc<Labeler>, config: ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(labeler, config.static_dir)).await
}
