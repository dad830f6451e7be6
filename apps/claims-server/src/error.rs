//! Error types for the claims server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use claims_core::ClaimsError;
use dashboard_core::DashboardError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(u32),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No report is ready for export")]
    ReportNotReady,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::ClaimNotFound(_) => (StatusCode::NOT_FOUND, "CLAIM_NOT_FOUND"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::ReportNotReady => (StatusCode::CONFLICT, "REPORT_NOT_READY"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<DashboardError> for ServerError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Claims(ClaimsError::NotFound(id)) => ServerError::ClaimNotFound(id),
            DashboardError::Claims(ClaimsError::EmptyQuery) => {
                ServerError::InvalidRequest("search query is empty".to_string())
            }
            DashboardError::NotReady => ServerError::ReportNotReady,
            DashboardError::InvalidTransition { .. } => ServerError::InvalidRequest(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
