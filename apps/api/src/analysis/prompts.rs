//! Analysis prompt: fixed instructions, both source texts, and the output contract.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Resume analysis prompt template.
/// Placeholders: {job_description}, {resume}, {json_only}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert resume analyst for ScanFit, an AI-powered job matching platform. Your task is to analyze a resume against a job description and provide detailed, actionable insights.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume}

Analyze the match between this resume and job description. Return a JSON object with this EXACT structure and field names (no extra fields):

{
  "match_score": number (0-100 inclusive, overall fit percentage),
  "missing_keywords": ["keyword1", "keyword2"] (array of strings: key skills/terms from the job description not found in the resume, most important first),
  "strengths": ["strength1", "strength2"] (array of strings: matching skills/experiences found in the resume),
  "ats_recommendations": [
    {"text": "recommendation text", "confidence": "High"}
  ] (array of objects: ATS optimization suggestions),
  "rewrite_suggestions": [
    {"text": "suggested rewrite for a resume section", "confidence": "Medium"}
  ] (array of objects: specific resume improvement suggestions),
  "priority_actions": ["action1", "action2"] (array of strings: top 5 improvement steps ranked by impact),
  "summary": "string: a natural language overview of the analysis (2-3 sentences)"
}

CONFIDENCE must be exactly one of "High", "Medium", "Low":
- "High": critical issues
- "Medium": helpful improvements
- "Low": nice-to-have

Guidelines:
- Be specific and actionable in recommendations
- Focus on ATS compatibility, keyword matching, and resume formatting
- Ensure all arrays contain relevant, non-generic items; use [] when there is nothing to report
- Keep suggestions concise but detailed enough to be useful
- "summary" must not be empty

{json_only}"#;

/// Renders the analysis prompt. Pure and deterministic: identical inputs give
/// byte-identical output. Both texts are embedded verbatim.
///
/// No length limit is applied here; the pipeline enforces the prompt budget.
pub fn build_analysis_prompt(job_description: &str, resume: &str) -> String {
    render(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("resume", resume),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

/// Single-pass placeholder substitution. Substituted values are never
/// rescanned, so a resume containing `{job_description}` stays literal.
/// Unknown `{...}` sequences (the JSON example) pass through untouched.
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });
        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
