use std::sync::Arc;

use crate::analysis::pipeline::PipelineLimits;
use crate::config::Config;
use crate::llm_client::AnalysisClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Model transport. Default: Gemini `LlmClient`; tests swap in a substitute.
    pub analysis_client: Arc<dyn AnalysisClient>,
    pub config: Config,
}

impl AppState {
    pub fn pipeline_limits(&self) -> PipelineLimits {
        PipelineLimits {
            max_prompt_chars: self.config.max_prompt_chars,
        }
    }
}
