use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extract::{DocumentFormat, ExtractError};
use crate::llm_client::LlmError;

const FILE_TOO_LARGE_MESSAGE: &str = "File size must be less than 5MB";

/// Message shown to end users for any failure on the model side of the pipeline.
const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze resume. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant fails the whole request; there are no partial results.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("File '{filename}' is {size_bytes} bytes, limit is {limit} bytes")]
    OversizedInput {
        filename: String,
        size_bytes: u64,
        limit: u64,
    },

    /// The request body outgrew the transport limit before any file could be
    /// validated on its own.
    #[error("Request body too large: {0}")]
    RequestTooLarge(String),

    #[error("Unsupported media type '{0}'")]
    UnsupportedFormat(String),

    #[error("Could not extract text from {format} document: {source}")]
    Extraction {
        format: DocumentFormat,
        #[source]
        source: ExtractError,
    },

    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Prompt is {chars} characters, limit is {limit}")]
    PromptTooLarge { chars: usize, limit: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] LlmError),

    #[error("Model returned malformed JSON ({reason}); sha256={sha256} prefix={prefix:?}")]
    MalformedResponse {
        reason: String,
        sha256: String,
        prefix: String,
    },

    #[error("Model response violates schema at '{field}': {reason}")]
    SchemaViolation { field: String, reason: String },
}

impl AppError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::OversizedInput { .. } | AppError::RequestTooLarge(_) => {
                tracing::info!("Rejected oversized upload: {self}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "FILE_TOO_LARGE",
                    FILE_TOO_LARGE_MESSAGE.to_string(),
                )
            }
            AppError::UnsupportedFormat(_) => {
                tracing::info!("Rejected upload: {self}");
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FORMAT",
                    "Only PDF, DOCX, and TXT files are supported".to_string(),
                )
            }
            AppError::Extraction { format, source } => {
                tracing::warn!("Extraction failed for {format}: {source}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    format!(
                        "Could not read the {format} document. Please re-export it and upload again."
                    ),
                )
            }
            AppError::EmptyInput(_) => (
                StatusCode::BAD_REQUEST,
                "EMPTY_INPUT",
                "Both job description and resume are required".to_string(),
            ),
            AppError::PromptTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PROMPT_TOO_LARGE",
                "The job description and resume are too long to analyze together".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ModelInvocation(e) => {
                tracing::error!("Model invocation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::MalformedResponse { .. } | AppError::SchemaViolation { .. } => {
                tracing::error!("Unusable model output: {self}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ANALYSIS_FAILED",
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
