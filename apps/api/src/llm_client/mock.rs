//! Substitute `AnalysisClient` for tests: fixed or failing output, no network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AnalysisClient, LlmError};

enum Reply {
    Text(String),
    Fail(u16, String),
}

pub struct StaticClient {
    reply: Reply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StaticClient {
    /// Returns `text` for every prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    /// Fails every call with an API error.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(status, message.into()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisClient for StaticClient {
    async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(status, message) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
