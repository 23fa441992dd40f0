//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"errors": ...}` with a matching status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sidesa_shared::{ErrorResponse, FieldIssue};

use crate::infrastructure::ports::{RepoError, StorageError};
use crate::use_cases::{EmergencyError, MapError, RegulationError, UserError, ValidationFailure};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Invalid(Vec<FieldIssue>),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    PayloadTooLarge,
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(message) | Self::Forbidden(message) | Self::NotFound(message) => {
                ErrorResponse::message(message)
            }
            Self::Invalid(issues) => ErrorResponse::issues(issues),
            Self::Unauthorized => ErrorResponse::message("Unauthorized"),
            Self::PayloadTooLarge => ErrorResponse::message("File too large"),
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                ErrorResponse::message("Internal Server Error")
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::TooLarge { .. } => ApiError::PayloadTooLarge,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(e: ValidationFailure) -> Self {
        ApiError::Invalid(e.issues)
    }
}

impl From<RegulationError> for ApiError {
    fn from(e: RegulationError) -> Self {
        match e {
            RegulationError::InvalidYear
            | RegulationError::FileRequired
            | RegulationError::NotPdf => ApiError::BadRequest(e.to_string()),
            RegulationError::Validation(failure) => failure.into(),
            RegulationError::NotFound | RegulationError::FileNotFound => {
                ApiError::NotFound(e.to_string())
            }
            RegulationError::Repo(e) => e.into(),
            RegulationError::Storage(e) => e.into(),
        }
    }
}

impl From<EmergencyError> for ApiError {
    fn from(e: EmergencyError) -> Self {
        match e {
            EmergencyError::Validation(failure) => failure.into(),
            EmergencyError::NotRegularUser | EmergencyError::Blocked { .. } => {
                ApiError::Forbidden(e.to_string())
            }
            EmergencyError::NotFound | EmergencyError::UserNotFound => {
                ApiError::NotFound(e.to_string())
            }
            EmergencyError::Repo(e) => e.into(),
        }
    }
}

impl From<MapError> for ApiError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::Validation(failure) => failure.into(),
            MapError::NotFound => ApiError::NotFound(e.to_string()),
            MapError::Repo(e) => e.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::Validation(failure) => failure.into(),
            UserError::EmailTaken => ApiError::BadRequest(e.to_string()),
            UserError::Repo(e) => e.into(),
        }
    }
}
