//! Response parser/validator: the boundary between untrusted model text and
//! `AnalysisResult`.
//!
//! Every field is checked individually. Nothing is defaulted or coerced, and
//! a response with any bad field is rejected whole.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::analysis::models::{AnalysisResult, Confidence, Recommendation};
use crate::errors::AppError;

/// Characters of raw output kept on a `MalformedResponse` for diagnosis.
const DIAGNOSTIC_PREFIX_CHARS: usize = 200;

/// Soft cap stated in the prompt; exceeding it is logged, not rejected.
const PRIORITY_ACTIONS_SOFT_CAP: usize = 5;

const REQUIRED_FIELDS: [&str; 7] = [
    "match_score",
    "missing_keywords",
    "strengths",
    "ats_recommendations",
    "rewrite_suggestions",
    "priority_actions",
    "summary",
];

/// Parses raw model output into a validated `AnalysisResult`.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AppError> {
    let candidate = strip_json_fences(raw);

    let value: Value = serde_json::from_str(candidate).map_err(|e| malformed(raw, &e))?;

    let obj = value
        .as_object()
        .ok_or_else(|| AppError::schema("$", format!("expected object, got {}", kind(&value))))?;

    let unknown: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !REQUIRED_FIELDS.contains(k))
        .collect();
    if !unknown.is_empty() {
        debug!("Ignoring unknown fields in model output: {unknown:?}");
    }

    let result = AnalysisResult {
        match_score: match_score(obj)?,
        missing_keywords: string_list(obj, "missing_keywords")?,
        strengths: string_list(obj, "strengths")?,
        ats_recommendations: recommendation_list(obj, "ats_recommendations")?,
        rewrite_suggestions: recommendation_list(obj, "rewrite_suggestions")?,
        priority_actions: string_list(obj, "priority_actions")?,
        summary: summary(obj)?,
    };

    if result.priority_actions.len() > PRIORITY_ACTIONS_SOFT_CAP {
        warn!(
            "Model returned {} priority_actions (expected at most {})",
            result.priority_actions.len(),
            PRIORITY_ACTIONS_SOFT_CAP
        );
    }

    Ok(result)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

fn malformed(raw: &str, err: &serde_json::Error) -> AppError {
    let sha256 = hex::encode(Sha256::digest(raw.as_bytes()));
    let prefix: String = raw.chars().take(DIAGNOSTIC_PREFIX_CHARS).collect();
    AppError::MalformedResponse {
        reason: err.to_string(),
        sha256,
        prefix,
    }
}

fn require<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, AppError> {
    obj.get(field)
        .ok_or_else(|| AppError::schema(field, "required field is missing"))
}

fn match_score(obj: &Map<String, Value>) -> Result<f64, AppError> {
    let value = require(obj, "match_score")?;
    let score = value.as_f64().ok_or_else(|| {
        AppError::schema(
            "match_score",
            format!("expected number, got {}", kind(value)),
        )
    })?;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(AppError::schema(
            "match_score",
            format!("{score} is outside 0..=100"),
        ));
    }
    Ok(score)
}

fn string_list(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, AppError> {
    let items = array(obj, field)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(String::from).ok_or_else(|| {
                AppError::schema(
                    format!("{field}[{i}]"),
                    format!("expected string, got {}", kind(item)),
                )
            })
        })
        .collect()
}

fn recommendation_list(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Vec<Recommendation>, AppError> {
    let items = array(obj, field)?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| recommendation(item, &format!("{field}[{i}]")))
        .collect()
}

fn recommendation(item: &Value, path: &str) -> Result<Recommendation, AppError> {
    let entry = item.as_object().ok_or_else(|| {
        AppError::schema(path, format!("expected object, got {}", kind(item)))
    })?;

    let text_path = format!("{path}.text");
    let text = entry
        .get("text")
        .ok_or_else(|| AppError::schema(&text_path, "required field is missing"))?;
    let text = text.as_str().ok_or_else(|| {
        AppError::schema(&text_path, format!("expected string, got {}", kind(text)))
    })?;

    let confidence_path = format!("{path}.confidence");
    let confidence = entry
        .get("confidence")
        .ok_or_else(|| AppError::schema(&confidence_path, "required field is missing"))?;
    let confidence = confidence
        .as_str()
        .and_then(Confidence::parse)
        .ok_or_else(|| {
            AppError::schema(
                &confidence_path,
                format!(
                    "expected one of {:?}, got {}",
                    Confidence::ALLOWED,
                    confidence
                ),
            )
        })?;

    Ok(Recommendation {
        text: text.to_string(),
        confidence,
    })
}

fn summary(obj: &Map<String, Value>) -> Result<String, AppError> {
    let value = require(obj, "summary")?;
    let text = value.as_str().ok_or_else(|| {
        AppError::schema("summary", format!("expected string, got {}", kind(value)))
    })?;
    if text.trim().is_empty() {
        return Err(AppError::schema("summary", "must not be empty"));
    }
    Ok(text.to_string())
}

fn array<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>, AppError> {
    let value = require(obj, field)?;
    value
        .as_array()
        .ok_or_else(|| AppError::schema(field, format!("expected array, got {}", kind(value))))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
