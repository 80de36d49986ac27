//! Language model trait

use async_trait::async_trait;

use crate::Result;

/// Language model interface
///
/// Implementations:
/// - `ChatBackend` - OpenAI-compatible chat-completions HTTP API
///
/// Used for both structured intent extraction (strict JSON expected) and the
/// web-search fallback (free-text markdown expected).
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(ChatBackend::new(config)?);
/// let text = llm.complete("You are a helpful assistant", "What is a food pantry?").await?;
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate a completion for a system/user prompt pair
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
