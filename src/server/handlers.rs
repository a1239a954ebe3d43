//! HTTP request handlers.

use crate::error::DowntimeError;
use crate::serving::{PredictionRequest, PredictionResult, inference};
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::utils::math::round_to;
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const UPLOAD_FIELD: &str = "file";
const NO_FILE: &str = "No file provided. Please upload a CSV file.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub accuracy: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model_trained: bool,
}

/// Runs blocking model work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| DowntimeError::internal(format!("worker task failed: {e}")))?
        .map_err(ApiError::from)
}

/// `POST /upload`: retrain from the CSV in the `file` form field.
pub async fn upload_data(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let file = match multipart {
        Ok(form) => read_upload(form).await?,
        Err(rejection) => {
            debug!(%rejection, "upload without a multipart body");
            None
        }
    };
    train_uploaded(&state, file).await
}

async fn read_upload(mut form: Multipart) -> Result<Option<Bytes>, ApiError> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        DowntimeError::validation(format!("Malformed multipart body: {e}"))
    };
    while let Some(field) = form.next_field().await.map_err(malformed)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());
        if !has_file_name {
            debug!("skipping file part without a filename");
            continue;
        }
        let data = field.bytes().await.map_err(malformed)?;
        return Ok(Some(data));
    }
    Ok(None)
}

/// Trains on an already extracted upload. `None` means no file was sent.
pub async fn train_uploaded(
    state: &AppState,
    file: Option<Bytes>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Some(data) = file else {
        warn!("upload rejected: no file part");
        return Err(DowntimeError::validation(NO_FILE).into());
    };
    info!(bytes = data.len(), "training upload received");

    let holder = Arc::clone(&state.holder);
    let config = state.training;
    let report = run_blocking(move || holder.retrain(&data, &config)).await?;

    Ok(Json(UploadResponse {
        message: "Model trained successfully!".to_string(),
        accuracy: round_to(report.accuracy, 2),
        f1_score: round_to(report.f1_score, 2),
    }))
}

/// `POST /predict`: label one observation with the active model.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResult>, ApiError> {
    let holder = Arc::clone(&state.holder);
    let result = run_blocking(move || {
        let model = holder.require()?;
        let request = PredictionRequest::from_json(&body)?;
        inference::predict(&model, request)
    })
    .await?;
    debug!(downtime = %result.downtime, confidence = result.confidence, "prediction served");
    Ok(Json(result))
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let model_trained = state.holder.is_trained().unwrap_or_else(|e| {
        warn!(error = %e, "could not inspect model store");
        false
    });
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        model_trained,
    };
    (StatusCode::OK, Json(health))
}
