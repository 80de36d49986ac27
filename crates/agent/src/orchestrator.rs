//! Query orchestration
//!
//! One request, one pass through the pipeline: validate, resolve the
//! effective language, translate the query to English, extract intent,
//! search the catalog, format or fall back, record history, translate
//! catalog envelopes into the requested language (fallback answers come
//! back already translated). The catalog result must be known before the
//! fallback is attempted; the two paths never run speculatively in parallel.
//!
//! Nothing past validation escapes as an error: every internal failure is
//! recovered by the owning component or converted to an error envelope here.

use std::sync::Arc;

use referral_agent_catalog::{normalize_postal_code, CatalogSearch};
use referral_agent_core::{
    Error, Feedback, Language, ProfileAttributes, ProfileStore, RecordSource, ResponseEnvelope,
    Result, Translator,
};
use referral_agent_translation::translate_envelope;
use serde_json::Value;

use crate::{FallbackSearch, IntentExtractor, ReferralHistoryWriter, ResponseFormatter};

/// One incoming query
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub user_id: String,
    pub query_text: String,
    /// Supplied postal code; wins over whatever the extractor finds
    pub postal_code: Option<String>,
    /// Requested language; `None` falls back to the profile's sticky
    /// preference, then the configured default
    pub language: Option<Language>,
    /// Optional profile attribute updates carried on the request
    pub attributes: ProfileAttributes,
}

pub struct QueryOrchestrator {
    extractor: IntentExtractor,
    search: CatalogSearch,
    formatter: ResponseFormatter,
    fallback: FallbackSearch,
    history: Arc<ReferralHistoryWriter>,
    profiles: Arc<dyn ProfileStore>,
    translator: Arc<dyn Translator>,
    default_language: Language,
}

impl QueryOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractor: IntentExtractor,
        search: CatalogSearch,
        formatter: ResponseFormatter,
        fallback: FallbackSearch,
        history: Arc<ReferralHistoryWriter>,
        profiles: Arc<dyn ProfileStore>,
        translator: Arc<dyn Translator>,
        default_language: Language,
    ) -> Self {
        Self {
            extractor,
            search,
            formatter,
            fallback,
            history,
            profiles,
            translator,
            default_language,
        }
    }

    /// Answer one query
    ///
    /// Only request validation surfaces as an `Err`
    /// ([`Error::InvalidRequest`], a 400 at the transport layer), with the
    /// message translated into the requested language; everything downstream
    /// resolves to an envelope.
    pub async fn answer(&self, request: QueryRequest) -> Result<ResponseEnvelope> {
        let user_id = request.user_id.trim();
        let query_text = request.query_text.trim();
        if user_id.is_empty() {
            // No usable profile to consult for a sticky preference
            let language = request.language.unwrap_or(self.default_language);
            return Err(self.validation_error("user_id is required", language).await);
        }

        let language = self.effective_language(user_id, request.language).await;
        if query_text.is_empty() {
            return Err(self.validation_error("query_text is required", language).await);
        }

        self.apply_profile_updates(user_id, &request.attributes).await;

        tracing::info!(user_id, %language, "Answering query");

        let english_query = self.query_in_english(query_text, language).await;

        let intent = self.extractor.extract(&english_query).await;

        // A postal code supplied on the request wins over the extracted one
        let postal_code = request
            .postal_code
            .as_deref()
            .and_then(|p| normalize_postal_code(&Value::String(p.to_string())))
            .or(intent.postal_code);

        let records = self
            .search
            .search(&intent.service_categories, postal_code.as_deref())
            .await;

        let (envelope, english_envelope, source) = if records.is_empty() {
            // Fallback answers arrive already in the requested language,
            // paired with the English form for cache and history
            let outcome = self
                .fallback
                .resolve(&english_query, postal_code.as_deref(), language)
                .await;
            (outcome.response, outcome.english, RecordSource::WebSearch)
        } else {
            let english = self
                .formatter
                .format(&records, &intent.service_categories, postal_code.as_deref(), user_id)
                .await;
            let translated = translate_envelope(
                self.translator.as_ref(),
                &english,
                Language::English,
                language,
            )
            .await;
            (translated, english, RecordSource::Catalog)
        };

        // History always stores the English pair, whatever language the user
        // asked in
        self.history
            .record_query(
                user_id,
                &english_query,
                query_text,
                &english_envelope,
                postal_code.as_deref(),
                language,
                source,
            )
            .await;

        Ok(envelope)
    }

    /// Attach yes/no feedback to a previously issued referral
    pub async fn attach_feedback(
        &self,
        user_id: &str,
        referral_id: &str,
        feedback: Feedback,
    ) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidRequest("user_id is required".to_string()));
        }
        if referral_id.trim().is_empty() {
            return Err(Error::InvalidRequest("referral_id is required".to_string()));
        }
        self.profiles.set_feedback(user_id.trim(), referral_id.trim(), feedback).await
    }

    /// Resolve the language for this request: explicit choice (persisted as
    /// the new sticky preference) > stored preference > configured default
    async fn effective_language(&self, user_id: &str, requested: Option<Language>) -> Language {
        if let Some(language) = requested {
            if let Err(e) = self.profiles.set_language(user_id, language).await {
                tracing::warn!(error = %e, user_id, "Failed to persist language preference");
            }
            return language;
        }
        match self.profiles.get(user_id).await {
            Ok(Some(profile)) => profile.language,
            Ok(None) => self.default_language,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Profile read failed, using default language");
                self.default_language
            }
        }
    }

    /// Build an invalid-request error with its message translated into the
    /// request language; translation failure keeps the English text
    async fn validation_error(&self, message: &str, language: Language) -> Error {
        if language == Language::English {
            return Error::InvalidRequest(message.to_string());
        }
        match self.translator.translate(message, Language::English, language).await {
            Ok(translated) => Error::InvalidRequest(translated),
            Err(e) => {
                tracing::warn!(error = %e, "Validation message translation failed");
                Error::InvalidRequest(message.to_string())
            }
        }
    }

    async fn apply_profile_updates(&self, user_id: &str, attributes: &ProfileAttributes) {
        if attributes.is_empty() {
            return;
        }
        if let Err(e) = self.profiles.update_attributes(user_id, attributes).await {
            tracing::warn!(error = %e, user_id, "Profile attribute update failed");
        }
    }

    /// Translate the query to the English canonical form used for
    /// extraction, search, caching, and history
    async fn query_in_english(&self, query_text: &str, language: Language) -> String {
        if language == Language::English {
            return query_text.to_string();
        }
        match self.translator.translate(query_text, language, Language::English).await {
            Ok(english) => english,
            Err(e) => {
                tracing::warn!(error = %e, "Query translation failed, using original text");
                query_text.to_string()
            }
        }
    }
}
