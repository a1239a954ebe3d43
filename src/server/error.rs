use crate::error::{DowntimeError, ErrorKind};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler-side wrapper turning a [`DowntimeError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub DowntimeError);

impl From<DowntimeError> for ApiError {
    fn from(err: DowntimeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError | ErrorKind::ModelNotTrained => StatusCode::BAD_REQUEST,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self.kind() {
            ErrorKind::InternalError => format!("An error occurred: {}", self.0),
            _ => self.0.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind: &'static str = self.kind().into();
        match self.kind() {
            ErrorKind::InternalError => error!(kind, error = %self.0, "request failed"),
            _ => warn!(kind, error = %self.0, "request rejected"),
        }
        let body = ErrorBody {
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
