use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not enough characters in plan")]
    QuotaExceeded,

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("{0}")]
    NotFound(String),

    /// The row exists but its backing file is gone.
    #[error("{what} not found on disk: {}", path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::QuotaExceeded => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::MissingFile { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Synthesis(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                "Storage error".to_string()
            }
            AppError::Synthesis(ref msg) => {
                tracing::error!("Synthesis error: {}", msg);
                "Audio generation failed".to_string()
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            AppError::MissingFile { what, ref path } => {
                tracing::error!(path = %path.display(), "{} row references a missing file", what);
                format!("{} not found on disk", what)
            }
            AppError::Auth(ref msg)
            | AppError::Validation(ref msg)
            | AppError::NotFound(ref msg)
            | AppError::Forbidden(ref msg) => msg.clone(),
            AppError::QuotaExceeded => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
