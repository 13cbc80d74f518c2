//! LLM Insight Module
//!
//! Narrative enrichment from a hosted chat-completion API.
//!
//! ## Architecture
//!
//! - **LlmBackend**: async trait over a provider; `OpenAiBackend` talks to any
//!   OpenAI-compatible `/chat/completions` endpoint
//! - **prompts**: fixed templates for the single-record insight and the three
//!   dataset analyses (insights, risk, quality)
//! - **summary**: structured summaries rendered into the dataset prompts
//! - **InsightService**: one bounded attempt per request, failures folded into
//!   `InsightUnavailable`, dataset analyses cached for a TTL
//!
//! Insight is optional. Nothing in this module returns an error that should
//! stop a prediction from being shown.

use async_trait::async_trait;
use serde::Serialize;

mod insight;
mod openai;
pub mod prompts;
pub mod summary;

pub use insight::{InsightService, InsightText, InsightUnavailable};
pub use openai::OpenAiBackend;
pub use prompts::AnalysisKind;

/// One chat completion call: a system prompt, a user prompt and sampling limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Provider answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Body could not be parsed, or carried no text
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Connection, TLS or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,
}

/// Unified trait for LLM backends
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Run one completion and return the response text
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Get the backend name for logging
    fn backend_name(&self) -> &'static str;
}
