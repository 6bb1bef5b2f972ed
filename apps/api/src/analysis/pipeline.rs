//! Analysis pipeline. Orchestrates one request end to end.
//!
//! Flow: validate (files) → extract (files) → empty check → build prompt →
//!       prompt budget check → model call → parse & validate.
//!
//! Every input check runs before the model call, so a request that is going
//! to fail on its inputs never spends a model invocation. Nothing is retried.

use std::time::Instant;

use tracing::{error, info};

use crate::analysis::extract::extract_text_blocking;
use crate::analysis::input::DocumentInput;
use crate::analysis::models::AnalysisResult;
use crate::analysis::parser::parse_analysis;
use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::validation::validate_file;
use crate::errors::AppError;
use crate::llm_client::AnalysisClient;

/// Per-deployment limits applied by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    /// Rendered prompt ceiling, in characters.
    pub max_prompt_chars: usize,
}

/// Runs the full analysis for a job description and a resume.
pub async fn analyze(
    job_description: DocumentInput,
    resume: DocumentInput,
    client: &dyn AnalysisClient,
    limits: PipelineLimits,
) -> Result<AnalysisResult, AppError> {
    info!(
        "Analysis requested: job_description={}, resume={}",
        job_description.describe(),
        resume.describe()
    );

    // Validate both files up front so neither is parsed if the other is invalid.
    for input in [&job_description, &resume] {
        if let DocumentInput::File(file) = input {
            validate_file(file)?;
        }
    }

    let job_description = resolve_text(job_description).await?;
    let resume = resolve_text(resume).await?;

    if job_description.trim().is_empty() {
        return Err(AppError::EmptyInput("job description is empty"));
    }
    if resume.trim().is_empty() {
        return Err(AppError::EmptyInput("resume is empty"));
    }

    let prompt = build_analysis_prompt(&job_description, &resume);
    let prompt_chars = prompt.chars().count();
    if prompt_chars > limits.max_prompt_chars {
        return Err(AppError::PromptTooLarge {
            chars: prompt_chars,
            limit: limits.max_prompt_chars,
        });
    }
    info!("Prompt built: {prompt_chars} chars");

    let started = Instant::now();
    let raw = client.invoke(&prompt).await?;
    info!(
        "Model responded in {}ms ({} chars)",
        started.elapsed().as_millis(),
        raw.len()
    );

    let result = parse_analysis(&raw).inspect_err(|e| {
        error!("Model output rejected: {e}");
    })?;
    info!("Analysis complete: match_score={}", result.match_score);

    Ok(result)
}

/// Turns an input into text: pasted text passes through, files are extracted.
/// Files must already have passed `validate_file`.
async fn resolve_text(input: DocumentInput) -> Result<String, AppError> {
    match input {
        DocumentInput::Text(content) => Ok(content),
        DocumentInput::File(file) => extract_text_blocking(file).await,
    }
}
