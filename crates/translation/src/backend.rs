//! Translator backends

use async_trait::async_trait;
use referral_agent_config::TranslatorConfig;
use referral_agent_core::{Error, Language, Result, Translator};
use serde::{Deserialize, Serialize};

/// HTTP translation backend
///
/// Speaks the LibreTranslate-compatible wire format: POST `{q, source,
/// target}` to the configured endpoint, response carries `translatedText`.
pub struct HttpTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Translation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = TranslateRequest {
            q: text,
            source: from.code(),
            target: to.code(),
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Translation(format!("translation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!(
                "translation service returned {status}: {body}"
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::Translation(format!("malformed translation response: {e}")))?;
        Ok(body.translated_text)
    }
}

/// Pass-through translator for tests and English-only deployments
#[derive(Default)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
        Ok(text.to_string())
    }
}
