use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::gateway::{GatewayError, IdentityError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("view was closed before loading finished")]
    Cancelled,
    #[error("front page order saved partially: {} of {} updates failed", failed.len(), total)]
    ReorderIncomplete {
        failed: Vec<FailedUpdate>,
        total: usize,
    },
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedUpdate {
    pub id: String,
    pub error: String,
}

#[derive(Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<FailedUpdate>,
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{} {}", field, message)
            })
            .collect();
        fields.sort();
        AppError::Validation(fields.join(", "))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ReorderIncomplete { .. } => StatusCode::BAD_GATEWAY,
            AppError::Gateway(GatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Gateway(GatewayError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Gateway(GatewayError::CircuitOpen) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(StorageError::InvalidUrl(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Identity(IdentityError::InvalidSession) => StatusCode::UNAUTHORIZED,
            AppError::Identity(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let message = self.to_string();
        let failed = match self {
            AppError::ReorderIncomplete { failed, .. } => failed,
            _ => Vec::new(),
        };

        (
            status,
            Json(ApiError {
                success: false,
                message,
                failed,
            }),
        )
            .into_response()
    }
}
