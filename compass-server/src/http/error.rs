//! JSON error bodies for the REST API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use compass_core::{AuthError, EngineError, PhaseError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// A failed API call: status plus `{error, code}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let (status, code) = match &err {
            EngineError::UnknownQuestion(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            EngineError::AlreadyCompleted(_) => (StatusCode::CONFLICT, "CONFLICT"),
            EngineError::InvalidResponse(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            EngineError::Store(e) => {
                tracing::error!(error = %e, "Engine store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<PhaseError> for ApiError {
    fn from(err: PhaseError) -> Self {
        let (status, code) = match &err {
            PhaseError::UnknownPhase(_) | PhaseError::MissingFields(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            PhaseError::AssessmentNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PhaseError::Store(e) => {
                tracing::error!(error = %e, "Phase store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_rejection() {
            Self::unauthorized(err.to_string())
        } else {
            tracing::error!(error = %err, "Session store failure");
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}
