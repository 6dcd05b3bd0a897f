//! Mapping of service failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::machine::{ports::MachineRepositoryError, services::MachineFleetServiceError};

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No machine has the requested identifier.
    #[error("machine not found")]
    MachineNotFound,
    /// The request was malformed and nothing was persisted.
    #[error("{0}")]
    InvalidRequest(String),
    /// The request clashes with the stored fleet.
    #[error("{0}")]
    Conflict(String),
    /// Persistence or an unexpected domain failure.
    #[error(transparent)]
    Internal(MachineFleetServiceError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MachineNotFound => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MachineFleetServiceError> for ApiError {
    fn from(err: MachineFleetServiceError) -> Self {
        match err {
            MachineFleetServiceError::InvalidFleetSize { .. } => {
                Self::InvalidRequest(err.to_string())
            }
            MachineFleetServiceError::Repository(
                MachineRepositoryError::DuplicateMachine(_) | MachineRepositoryError::Rejected(_),
            ) => Self::Conflict(err.to_string()),
            MachineFleetServiceError::Repository(MachineRepositoryError::NotFound(_)) => {
                Self::MachineNotFound
            }
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(err) => {
                error!(error = %err, "request failed");
                "internal server error".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
