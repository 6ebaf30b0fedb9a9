//! Application error types and handling
//!
//! Infrastructure probe failures never show up here: they are reported
//! in-band as an unhealthy [`crate::health::HealthResult`]. Anything that does
//! reach this type means the sidecar itself is broken.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("System metrics unavailable: {0}")]
    SystemMetrics(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::SystemMetrics(msg) => {
                tracing::error!("System metrics error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("System metrics unavailable: {}", msg),
                )
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
