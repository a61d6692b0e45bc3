use crate::adoption::{AdoptionServiceError, TransitionError};
use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::seed::SeedError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Process-level failures: startup, configuration, serving.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(RepositoryError),
    Bootstrap(AuthError),
    Seed(SeedError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Bootstrap(err) => write!(f, "admin bootstrap failed: {}", err),
            AppError::Seed(err) => write!(f, "seeding failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Bootstrap(err) => Some(err),
            AppError::Seed(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed with process error");
        let body = Json(json!({ "error": "internal server error" }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Bootstrap(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

/// Error surfaced to HTTP callers as a status code plus `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!(%detail, "internal error");
                "internal server error".to_string()
            }
            ApiError::Conflict(message) => {
                warn!(%message, "request conflicted with current state");
                message
            }
            ApiError::NotFound(message)
            | ApiError::Validation(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message) => message,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Duplicate => Self::Conflict("record already exists".to_string()),
            RepositoryError::NotFound => Self::NotFound("record not found".to_string()),
            RepositoryError::Stale => Self::Conflict(
                "record was modified by another request; reload and retry".to_string(),
            ),
            RepositoryError::Unavailable(detail) => Self::Internal(detail),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Validation(err) => Self::Validation(err.to_string()),
            CatalogError::Query(err) => Self::Validation(err.to_string()),
            CatalogError::NotFound => Self::NotFound("Pet not found".to_string()),
            err @ CatalogError::StatusLocked { .. } => Self::Conflict(err.to_string()),
            CatalogError::Repository(err) => err.into(),
        }
    }
}

impl From<AdoptionServiceError> for ApiError {
    fn from(value: AdoptionServiceError) -> Self {
        match value {
            AdoptionServiceError::InvalidPetId(raw) => {
                Self::Validation(format!("Invalid pet ID '{raw}'"))
            }
            err @ AdoptionServiceError::UndecidedStatus => Self::Validation(err.to_string()),
            AdoptionServiceError::PetNotFound => Self::NotFound("Pet not found".to_string()),
            AdoptionServiceError::ApplicationNotFound => {
                Self::NotFound("Application not found".to_string())
            }
            AdoptionServiceError::Transition(err) => Self::Conflict(transition_message(&err)),
            AdoptionServiceError::Repository(err) => err.into(),
        }
    }
}

fn transition_message(err: &TransitionError) -> String {
    match err {
        TransitionError::PetUnavailable { .. } => "Pet is not available for adoption".to_string(),
        TransitionError::DuplicateApplication => {
            "You have already applied for this pet".to_string()
        }
        TransitionError::AlreadyDecided { .. } => err.to_string(),
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Validation(err) => Self::Validation(err.to_string()),
            err @ AuthError::DuplicateUser => Self::Conflict(err.to_string()),
            err @ (AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidSession) => Self::Unauthorized(err.to_string()),
            err @ AuthError::Forbidden => Self::Forbidden(err.to_string()),
            AuthError::Password(err) => Self::Internal(err.to_string()),
            AuthError::Repository(err) => err.into(),
        }
    }
}
