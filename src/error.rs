use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the classifier itself.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classification failed: {0}")]
    ClassificationFailed(String),
    #[error("invalid classifier configuration: {0}")]
    InvalidConfig(String),
}

/// Failures surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no image was uploaded")]
    EmptyUpload,
    #[error("upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("malformed multipart payload: {0}")]
    Multipart(String),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl ApiError {
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::EmptyUpload => "No file selected",
            ApiError::PayloadTooLarge { .. } => "File is too large",
            ApiError::UnsupportedFormat => "Please upload an image file",
            ApiError::Multipart(_) => "Invalid upload",
            ApiError::Classify(_) => "Failed to classify blood cell image",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyUpload | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Classify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.public_message() }))
    }
}
