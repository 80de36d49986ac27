//! End-to-end pipeline tests with scripted collaborators

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use referral_agent_agent::{
    FallbackSearch, IntentExtractor, QueryOrchestrator, QueryRequest, ReferralHistoryWriter,
    ResponseFormatter,
};
use referral_agent_catalog::{CatalogSearch, MemoryCatalog};
use referral_agent_core::{
    record::detail, CatalogStore, Error, Feedback, Language, LanguageModel, ProfileAttributes,
    ProfileStore, RawRecord, ResponseStatus, Result, Translator,
};
use referral_agent_storage::{MemoryFallbackCache, MemoryProfileStore};
use referral_agent_translation::NoopTranslator;
use serde_json::json;

const FALLBACK_ANSWER: &str = "\
**Community Food Network**
500 W Adams St, Chicago, IL 60661
- Hours: Monday-Friday 8am-4pm
- Phone: 312-555-0188
";

/// Scripted model: answers the extraction prompt and the web-search prompt
/// from fixed strings, counting web-search calls
struct ScriptedModel {
    extraction: String,
    fallback: String,
    fallback_calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(extraction: &str, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            extraction: extraction.to_string(),
            fallback: fallback.to_string(),
            fallback_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system_prompt: &str, _user_prompt: &str) -> Result<String> {
        if system_prompt.contains("extracts specific structured information") {
            Ok(self.extraction.clone())
        } else {
            self.fallback_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fallback.clone())
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Marks translated text with the target language code so tests can see
/// which direction each string went through
struct MarkingTranslator;

#[async_trait]
impl Translator for MarkingTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to {
            return Ok(text.to_string());
        }
        Ok(format!("{}|{text}", to.code()))
    }
}

fn food_pantry_record() -> RawRecord {
    RawRecord {
        organization: "Helping Hands".to_string(),
        category: "Food Pantry".to_string(),
        postal_code: "60605".to_string(),
        extra: [
            ("Address".to_string(), json!("123 Main St")),
            ("State".to_string(), json!("IL")),
            ("Hours".to_string(), json!("Mon-Fri 9-5")),
        ]
        .into_iter()
        .collect(),
    }
}

struct Harness {
    orchestrator: QueryOrchestrator,
    model: Arc<ScriptedModel>,
    profiles: Arc<MemoryProfileStore>,
}

fn harness_with(
    records: Vec<RawRecord>,
    extraction: &str,
    translator: Arc<dyn Translator>,
) -> Harness {
    let model = ScriptedModel::new(extraction, FALLBACK_ANSWER);
    let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalog::new(records));
    let profiles = Arc::new(MemoryProfileStore::new());
    let cache = Arc::new(MemoryFallbackCache::new(chrono::Duration::days(30)));
    let history = Arc::new(ReferralHistoryWriter::new(profiles.clone()));

    let orchestrator = QueryOrchestrator::new(
        IntentExtractor::new(model.clone(), catalog.clone()),
        CatalogSearch::new(catalog),
        ResponseFormatter::new(history.clone()),
        FallbackSearch::new(model.clone(), translator.clone(), cache),
        history,
        profiles.clone(),
        translator,
        Language::English,
    );

    Harness { orchestrator, model, profiles }
}

fn harness(records: Vec<RawRecord>, extraction: &str) -> Harness {
    harness_with(records, extraction, Arc::new(NoopTranslator))
}

fn request(query: &str) -> QueryRequest {
    QueryRequest {
        user_id: "u1".to_string(),
        query_text: query.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_catalog_hit_end_to_end() {
    let h = harness(
        vec![food_pantry_record()],
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
    );

    let envelope = h
        .orchestrator
        .answer(request("Where can I find food pantries in 60605?"))
        .await
        .unwrap();

    assert_eq!(envelope.status, ResponseStatus::Success);
    assert_eq!(envelope.services.len(), 1);
    let service = &envelope.services[0];
    assert_eq!(service.agency, "Helping Hands");
    assert_eq!(service.detail_str(detail::SERVICE_CATEGORY), Some("Food Pantry"));
    // Catalog precedence: a catalog hit never reports the web-search source
    assert_eq!(service.detail_str(detail::SOURCE), Some("catalog"));
    assert_eq!(h.model.fallback_calls.load(Ordering::SeqCst), 0);

    // Referral and query history both recorded
    let profile = h.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(profile.referrals.len(), 1);
    assert_eq!(profile.queries.len(), 1);
}

#[tokio::test]
async fn test_missing_postal_code_skips_catalog_even_with_matching_records() {
    // Catalog has Food Pantry records, but extraction found no postal code
    let h = harness(
        vec![food_pantry_record()],
        r#"{"service_categories": ["Food Pantry"], "postal_code": null}"#,
    );

    let envelope = h.orchestrator.answer(request("I need food")).await.unwrap();

    assert_eq!(h.model.fallback_calls.load(Ordering::SeqCst), 1);
    assert!(envelope
        .services
        .iter()
        .all(|s| s.detail_str(detail::SOURCE) == Some("web-search")));
}

#[tokio::test]
async fn test_fallback_caches_and_second_query_skips_model() {
    let h = harness(
        Vec::new(),
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
    );

    let first = h
        .orchestrator
        .answer(request("Where can I find food pantries in 60605?"))
        .await
        .unwrap();
    assert_eq!(first.status, ResponseStatus::Success);
    assert_eq!(h.model.fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.services[0].agency, "Community Food Network");

    // Identical query within the cache lifetime: served from cache
    let second = h
        .orchestrator
        .answer(request("Where can I find food pantries in 60605?"))
        .await
        .unwrap();
    assert_eq!(h.model.fallback_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.services[0].agency, "Community Food Network");

    // Both queries were still logged to history
    let profile = h.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(profile.queries.len(), 2);
}

#[tokio::test]
async fn test_supplied_postal_code_wins_over_extracted() {
    let mut other = food_pantry_record();
    other.postal_code = "60606".to_string();
    let h = harness(
        vec![food_pantry_record(), other],
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
    );

    let mut req = request("food pantries please");
    req.postal_code = Some("60606".to_string());
    let envelope = h.orchestrator.answer(req).await.unwrap();

    assert_eq!(envelope.postal_code.as_deref(), Some("60606"));
    assert_eq!(envelope.services.len(), 1);
    assert_eq!(envelope.services[0].detail_str(detail::POSTAL_CODE), Some("60606"));
}

#[tokio::test]
async fn test_validation_errors() {
    let h = harness(Vec::new(), "{}");

    let mut req = request("food");
    req.user_id = "  ".to_string();
    assert!(matches!(
        h.orchestrator.answer(req).await,
        Err(Error::InvalidRequest(_))
    ));

    let req = request("   ");
    assert!(matches!(
        h.orchestrator.answer(req).await,
        Err(Error::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn test_validation_message_translated_into_request_language() {
    let h = harness_with(Vec::new(), "{}", Arc::new(MarkingTranslator));

    let mut req = request("   ");
    req.language = Some(Language::Spanish);
    match h.orchestrator.answer(req).await {
        Err(Error::InvalidRequest(message)) => {
            assert_eq!(message, "es|query_text is required");
        }
        other => panic!("expected a translated validation error, got {other:?}"),
    }

    // A blank user_id has no profile to consult; the explicit language wins
    let mut req = request("food");
    req.user_id = String::new();
    req.language = Some(Language::Polish);
    match h.orchestrator.answer(req).await {
        Err(Error::InvalidRequest(message)) => {
            assert_eq!(message, "pl|user_id is required");
        }
        other => panic!("expected a translated validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_english_request_translates_envelope_but_stores_english() {
    let h = harness_with(
        vec![food_pantry_record()],
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
        Arc::new(MarkingTranslator),
    );

    let mut req = request("¿Dónde puedo encontrar comida en 60605?");
    req.language = Some(Language::Spanish);
    let envelope = h.orchestrator.answer(req).await.unwrap();

    // Final envelope went through the forward translation
    assert!(envelope.message.starts_with("es|"));
    assert!(envelope.services[0].agency.starts_with("es|"));
    // Technical values untouched by translation
    assert!(envelope.services[0].referral_id().is_some_and(|id| !id.starts_with("es|")));
    assert_eq!(envelope.services[0].detail_str(detail::POSTAL_CODE), Some("60605"));

    let profile = h.profiles.get("u1").await.unwrap().unwrap();
    // Sticky language persisted
    assert_eq!(profile.language, Language::Spanish);
    // History keeps the English pair: the incoming query was translated to
    // English, the stored response is the untranslated English envelope
    let entry = profile.queries.values().next().unwrap();
    assert!(entry.english_query.starts_with("en|"));
    assert_eq!(entry.query, "¿Dónde puedo encontrar comida en 60605?");
    assert!(!entry.response.contains("es|"));
}

#[tokio::test]
async fn test_sticky_language_applies_when_request_omits_it() {
    let h = harness_with(
        vec![food_pantry_record()],
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
        Arc::new(MarkingTranslator),
    );
    h.profiles.set_language("u1", Language::Polish).await.unwrap();

    let envelope = h.orchestrator.answer(request("food in 60605")).await.unwrap();
    assert!(envelope.message.starts_with("pl|"));
}

#[tokio::test]
async fn test_profile_attributes_applied_from_request() {
    let h = harness(
        Vec::new(),
        r#"{"service_categories": [], "postal_code": null}"#,
    );

    let mut req = request("anything");
    req.attributes = ProfileAttributes {
        postal_code: Some("60605".to_string()),
        phone: Some("555-0000".to_string()),
        email: None,
    };
    h.orchestrator.answer(req).await.unwrap();

    let profile = h.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(profile.postal_code.as_deref(), Some("60605"));
    assert_eq!(profile.phone.as_deref(), Some("555-0000"));
    assert!(profile.email.is_none());
}

#[tokio::test]
async fn test_feedback_round_trip() {
    let h = harness(
        vec![food_pantry_record()],
        r#"{"service_categories": ["Food Pantry"], "postal_code": "60605"}"#,
    );

    let envelope = h.orchestrator.answer(request("food in 60605")).await.unwrap();
    let referral_id = envelope.services[0].referral_id().unwrap();

    h.orchestrator
        .attach_feedback("u1", referral_id, Feedback::Yes)
        .await
        .unwrap();
    let profile = h.profiles.get("u1").await.unwrap().unwrap();
    assert_eq!(profile.referrals[referral_id].feedback, Some(Feedback::Yes));

    // Feedback can only attach to an existing referral
    let err = h
        .orchestrator
        .attach_feedback("u1", "no-such-referral", Feedback::No)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}
