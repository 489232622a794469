use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Failed to encode image: {0}")]
    ImageEncode(String),

    #[error("Person detection failed: {0}")]
    Detection(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::ImageDecode(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
            ServiceError::ImageEncode(_) => "IMAGE_ENCODE_ERROR",
            ServiceError::Detection(_) => "DETECTION_ERROR",
            ServiceError::Notification(_) => "NOTIFICATION_ERROR",
            ServiceError::Config(_) => "CONFIG_ERROR",
            ServiceError::Http(_) => "HTTP_CLIENT_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });

        if status.is_server_error() {
            tracing::error!("Request failed: {} ({})", self, status);
        } else {
            tracing::warn!("Request rejected: {} ({})", self, status);
        }

        (status, axum::Json(error_response)).into_response()
    }
}
