// Resume analysis pipeline.
// Implements: input validation, text extraction, prompt assembly, response validation.
// All model calls go through llm_client; no direct Gemini calls here.

pub mod extract;
pub mod handlers;
pub mod input;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod validation;
