//! Intent extraction
//!
//! Turns free text into `{service_categories, postal_code}` via the
//! structured-extraction model. Every failure mode (model call, fence
//! stripping, JSON parse) degrades to the empty intent: no categories means
//! the catalog is skipped and the fallback path engages, which is the right
//! behavior when we could not understand the query.

use std::sync::Arc;

use once_cell::sync::Lazy;
use referral_agent_core::{CatalogStore, LanguageModel, QueryIntent};
use referral_agent_llm::{extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use regex::Regex;
use serde_json::Value;

/// First `{...}` span in otherwise non-JSON model output
static JSON_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

pub struct IntentExtractor {
    model: Arc<dyn LanguageModel>,
    catalog: Arc<dyn CatalogStore>,
}

impl IntentExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { model, catalog }
    }

    /// Extract structured intent from a query, never failing
    pub async fn extract(&self, query: &str) -> QueryIntent {
        let vocabulary = referral_agent_catalog::category_vocabulary(&self.catalog).await;
        let prompt = extraction_prompt(query, &vocabulary);

        let response = match self.model.complete(EXTRACTION_SYSTEM_PROMPT, &prompt).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Intent extraction model call failed, using empty intent");
                return QueryIntent::empty();
            }
        };

        let mut intent = match parse_intent(&response) {
            Some(intent) => intent,
            None => {
                tracing::warn!(
                    response_len = response.len(),
                    "Could not parse intent from model output, using empty intent"
                );
                return QueryIntent::empty();
            }
        };

        // Models occasionally answer "null" or a misread digit string for
        // the postal code; normalize or drop it here so downstream code only
        // ever sees the canonical form
        intent.postal_code = intent
            .postal_code
            .and_then(|p| referral_agent_catalog::normalize_postal_code(&Value::String(p)));

        tracing::debug!(
            categories = ?intent.service_categories,
            postal_code = ?intent.postal_code,
            "Intent extracted"
        );
        intent
    }
}

/// Parse strict-JSON intent output, tolerating markdown fences and prose
fn parse_intent(response: &str) -> Option<QueryIntent> {
    let stripped = strip_code_fences(response);
    if let Ok(intent) = serde_json::from_str::<QueryIntent>(stripped) {
        return Some(intent);
    }
    // Retry on the first {...} span in case the model wrapped the JSON in
    // explanation text
    let span = JSON_SPAN.find(stripped)?;
    serde_json::from_str(span.as_str()).ok()
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use referral_agent_catalog::MemoryCatalog;
    use referral_agent_core::{Error, RawRecord, Result};

    struct FixedModel(Result<&'static str>);

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.to_string()),
                Err(_) => Err(Error::Model("down".to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn extractor(response: Result<&'static str>) -> IntentExtractor {
        let catalog = MemoryCatalog::new(vec![RawRecord {
            organization: "A".to_string(),
            category: "Food Pantry".to_string(),
            postal_code: "60605".to_string(),
            extra: Default::default(),
        }]);
        IntentExtractor::new(Arc::new(FixedModel(response)), Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_strict_json_response() {
        let intent = extractor(Ok(
            r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
        ))
        .extract("food in 60605")
        .await;
        assert_eq!(intent.service_categories, vec!["Food Pantry"]);
        assert_eq!(intent.postal_code.as_deref(), Some("60605"));
    }

    #[tokio::test]
    async fn test_fenced_json_response() {
        let intent = extractor(Ok(
            "```json\n{\"service_categories\": [\"Housing\"], \"postal_code\": null}\n```",
        ))
        .extract("shelter")
        .await;
        assert_eq!(intent.service_categories, vec!["Housing"]);
        assert!(intent.postal_code.is_none());
    }

    #[tokio::test]
    async fn test_json_embedded_in_prose() {
        let intent = extractor(Ok(
            "Sure! Here is the extraction:\n{\"service_categories\": [], \"postal_code\": \"605\"}\nLet me know if you need more.",
        ))
        .extract("anything near 605")
        .await;
        assert!(intent.service_categories.is_empty());
        // Short digit strings are zero-padded to the canonical form
        assert_eq!(intent.postal_code.as_deref(), Some("00605"));
    }

    #[tokio::test]
    async fn test_unparseable_output_degrades_to_empty() {
        let intent = extractor(Ok("I could not determine any categories."))
            .extract("gibberish")
            .await;
        assert_eq!(intent, QueryIntent::empty());
    }

    #[tokio::test]
    async fn test_model_failure_degrades_to_empty() {
        let intent = extractor(Err(Error::Model("down".to_string())))
            .extract("food")
            .await;
        assert_eq!(intent, QueryIntent::empty());
    }

    #[tokio::test]
    async fn test_non_numeric_postal_code_is_dropped() {
        let intent = extractor(Ok(
            r#"{"service_categories": ["Food Pantry"], "postal_code": "null"}"#,
        ))
        .extract("food")
        .await;
        assert!(intent.postal_code.is_none());
    }
}
