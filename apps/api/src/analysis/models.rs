use serde::Serialize;

/// How strongly the model backs a recommendation.
/// High = critical issue, Medium = helpful improvement, Low = nice-to-have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALLOWED: [&'static str; 3] = ["High", "Medium", "Low"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "High" => Some(Confidence::High),
            "Medium" => Some(Confidence::Medium),
            "Low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub text: String,
    pub confidence: Confidence,
}

/// Validated analysis handed to the presentation layer.
///
/// Only `analysis::parser` builds this, and only after every field has been
/// checked, so consumers can trust each field as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// 0 – 100 inclusive
    pub match_score: f64,
    /// JD terms absent from the resume, in the model's priority order.
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub ats_recommendations: Vec<Recommendation>,
    pub rewrite_suggestions: Vec<Recommendation>,
    /// Ranked by impact; nominally five or fewer.
    pub priority_actions: Vec<String>,
    pub summary: String,
}
