//! Translation trait

use async_trait::async_trait;

use crate::{Language, Result};

/// Single-string translation interface
///
/// Implementations:
/// - `HttpTranslator` - HTTP translation service
/// - `NoopTranslator` - Pass-through (tests, English-only deployments)
///
/// Stateless per call. Same-language calls return the input unchanged.
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    /// Translate text between languages
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;
}
