//! Axum route handlers for the Analysis API.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::input::{DocumentInput, UploadedFile};
use crate::analysis::models::AnalysisResult;
use crate::analysis::pipeline::analyze;
use crate::errors::AppError;
use crate::state::AppState;

/// Form part names, matching the web client's FormData keys.
const JOB_DESCRIPTION_FIELD: &str = "jobDescription";
const RESUME_FIELD: &str = "resume";

/// Declared type for file parts sent without a Content-Type.
const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub job_description: String,
    pub resume: String,
}

/// POST /api/v1/analyze
///
/// Multipart form with `jobDescription` and `resume` parts. A part carrying a
/// filename is treated as an uploaded file; anything else is pasted text.
/// A missing part counts as empty text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let span = info_span!("analyze", request_id = %Uuid::new_v4());
    async move {
        let mut multipart =
            multipart.map_err(|e| AppError::Validation(format!("Expected multipart form: {e}")))?;

        let mut job_description = None;
        let mut resume = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, "Invalid multipart body"))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                JOB_DESCRIPTION_FIELD => job_description = Some(read_input(field).await?),
                RESUME_FIELD => resume = Some(read_input(field).await?),
                other => debug!("Ignoring unexpected form part '{other}'"),
            }
        }

        let result = analyze(
            job_description.unwrap_or_else(|| DocumentInput::Text(String::new())),
            resume.unwrap_or_else(|| DocumentInput::Text(String::new())),
            state.analysis_client.as_ref(),
            state.pipeline_limits(),
        )
        .await?;

        Ok(Json(result))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/analyze/text
///
/// JSON body with both documents as plain text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    request: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let span = info_span!("analyze_text", request_id = %Uuid::new_v4());
    async move {
        let Json(request) = request.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::RequestTooLarge(e.body_text())
            } else {
                AppError::Validation(format!("Invalid JSON body: {e}"))
            }
        })?;

        let result = analyze(
            DocumentInput::Text(request.job_description),
            DocumentInput::Text(request.resume),
            state.analysis_client.as_ref(),
            state.pipeline_limits(),
        )
        .await?;

        Ok(Json(result))
    }
    .instrument(span)
    .await
}

async fn read_input(field: Field<'_>) -> Result<DocumentInput, AppError> {
    let part = field.name().unwrap_or_default().to_string();

    match field.file_name().map(str::to_string) {
        Some(filename) => {
            let media_type = field
                .content_type()
                .unwrap_or(UNKNOWN_MEDIA_TYPE)
                .to_string();
            let bytes = field.bytes().await.map_err(|e| {
                multipart_error(e, &format!("Could not read file part '{part}'"))
            })?;
            Ok(DocumentInput::File(UploadedFile::new(filename, media_type, bytes)))
        }
        None => {
            let text = field.text().await.map_err(|e| {
                multipart_error(e, &format!("Could not read text part '{part}'"))
            })?;
            Ok(DocumentInput::Text(text))
        }
    }
}

/// A stream cut off by the body limit is an oversized upload, not a bad form.
fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::RequestTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}
