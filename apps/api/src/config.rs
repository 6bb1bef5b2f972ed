use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmConfig, DEFAULT_API_BASE, DEFAULT_MODEL};

/// Default ceiling on the rendered prompt, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 1_000_000;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_ai_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub max_prompt_chars: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_ai_api_key: require_env("GOOGLE_AI_API_KEY")?,
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_MODEL),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_API_BASE),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            max_prompt_chars: parse_env("MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Builds the explicit client configuration handed to `LlmClient::new`.
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.google_ai_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
