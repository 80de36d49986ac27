//! LLM integration
//!
//! Features:
//! - OpenAI-compatible chat-completions backend (works against Perplexity
//!   and similar hosted APIs as well as local gateways)
//! - Retry with exponential backoff for transient failures
//! - Prompt builders for intent extraction and the web-search fallback

pub mod backend;
pub mod prompt;

pub use backend::ChatBackend;
pub use prompt::{
    extraction_prompt, fallback_prompt, fallback_system_prompt, EXTRACTION_SYSTEM_PROMPT,
};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for referral_agent_core::Error {
    fn from(err: LlmError) -> Self {
        referral_agent_core::Error::Model(err.to_string())
    }
}
