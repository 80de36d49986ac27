//! Web-search fallback
//!
//! When the catalog has nothing, the web-search model is asked for local
//! resources and its markdown answer is parsed back into service records: a
//! `**bold**` line starts a record, the following line is the address, and
//! `-` bullets carry labeled details in whichever language the model
//! answered in. Results are cached in English canonical form under the exact
//! `(normalized query, postal code)` pair.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use referral_agent_core::{
    record::detail, FallbackCache, FallbackCacheEntry, Language, LanguageModel, RecordSource,
    ResponseEnvelope, ResponseStatus, ServiceRecord, Translator,
};
use referral_agent_llm::{fallback_prompt, fallback_system_prompt};
use referral_agent_translation::translate_envelope;
use regex::Regex;
use uuid::Uuid;

static STATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([A-Z]{2})\b").expect("valid regex"));
static ZIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5}(?:-\d{4})?)\b").expect("valid regex"));

/// Bullet label variants across the three supported languages
const HOUR_PREFIXES: &[&str] = &["hours:", "horario:", "godziny:", "hora:", "horas:"];
const PHONE_PREFIXES: &[&str] = &["phone:", "teléfono:", "telefon:", "tel:"];
const ELIGIBILITY_PREFIXES: &[&str] = &[
    "eligibility:",
    "requirements:",
    "qualify:",
    "who can:",
    "elegibilidad:",
    "requisitos:",
    "calificar:",
    "quién puede:",
    "kwalifikowalność:",
    "wymagania:",
    "kwalifikować:",
    "kto może:",
];

/// Multilingual keyword groups for rough category inference on the fallback
/// path (the catalog vocabulary does not apply here)
struct CategoryGroup {
    keywords: &'static [&'static str],
    categories: &'static [&'static str],
    main: &'static str,
}

static CATEGORY_GROUPS: &[CategoryGroup] = &[
    CategoryGroup {
        keywords: &["food", "pantry", "pantries", "comida", "despensa", "żywność", "spiżarnia"],
        categories: &["Food Pantry", "Food Assistance", "Emergency Food"],
        main: "Food Pantry",
    },
    CategoryGroup {
        keywords: &[
            "housing", "shelter", "homeless", "vivienda", "refugio", "sin hogar", "mieszkanie",
            "schronisko", "bezdomny",
        ],
        categories: &["Housing", "Homeless Services", "Emergency Shelter"],
        main: "Housing",
    },
    CategoryGroup {
        keywords: &["child", "children", "kid", "niño", "niños", "hijo", "dziecko", "dzieci"],
        categories: &["Child Care", "Children Services", "Youth Programs"],
        main: "Children Services",
    },
    CategoryGroup {
        keywords: &["health", "medical", "doctor", "salud", "médico", "zdrowie", "lekarz"],
        categories: &["Medical Services", "Healthcare", "Clinics"],
        main: "Healthcare",
    },
    CategoryGroup {
        keywords: &[
            "university", "college", "school", "universidad", "escuela", "uniwersytet", "szkoła",
        ],
        categories: &["Education", "Universities", "Academic Resources"],
        main: "Education",
    },
];

static DEFAULT_GROUP: CategoryGroup = CategoryGroup {
    keywords: &[],
    categories: &["General Assistance", "Social Services", "Community Resources"],
    main: "Social Services",
};

enum BulletLabel {
    Hours,
    Phone,
    Eligibility,
}

fn bullet_label(line: &str) -> Option<BulletLabel> {
    let lower = line.to_lowercase();
    if HOUR_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        Some(BulletLabel::Hours)
    } else if PHONE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        Some(BulletLabel::Phone)
    } else if ELIGIBILITY_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        Some(BulletLabel::Eligibility)
    } else {
        None
    }
}

fn infer_categories(query_lower: &str) -> &'static CategoryGroup {
    CATEGORY_GROUPS
        .iter()
        .find(|group| group.keywords.iter().any(|k| query_lower.contains(k)))
        .unwrap_or(&DEFAULT_GROUP)
}

/// Outcome of one fallback resolution
///
/// `response` is in the requested language and ready to return; `english` is
/// the canonical form that belongs in the cache and in query history. On a
/// miss the two differ only when the model answered in a non-English
/// language.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub response: ResponseEnvelope,
    pub english: ResponseEnvelope,
}

pub struct FallbackSearch {
    model: Arc<dyn LanguageModel>,
    translator: Arc<dyn Translator>,
    cache: Arc<dyn FallbackCache>,
}

impl FallbackSearch {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        translator: Arc<dyn Translator>,
        cache: Arc<dyn FallbackCache>,
    ) -> Self {
        Self { model, translator, cache }
    }

    /// Resolve a query through the cache or the web-search model
    ///
    /// On a cache hit the stored English form is translated forward into
    /// `language`. On a miss the model is asked to answer in `language` and
    /// its native envelope is returned untouched; only the English
    /// back-translation for the cache costs an extra pass. Model failure
    /// produces an error envelope, never an Err, and is not cached.
    pub async fn resolve(
        &self,
        query_en: &str,
        postal_code: Option<&str>,
        language: Language,
    ) -> FallbackOutcome {
        let normalized = query_en.trim().to_lowercase();

        match self.cache.lookup(&normalized, postal_code).await {
            Ok(Some(entry)) => {
                tracing::info!(query = %normalized, "Fallback cache hit, skipping model call");
                let response = translate_envelope(
                    self.translator.as_ref(),
                    &entry.response,
                    Language::English,
                    language,
                )
                .await;
                return FallbackOutcome { response, english: entry.response };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Fallback cache lookup failed, treating as miss");
            }
        }

        let system = fallback_system_prompt(language);
        let user = fallback_prompt(query_en, postal_code, language);
        let content = match self.model.complete(&system, &user).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(error = %e, model = %self.model.model_name(), "Web-search model call failed");
                let english = ResponseEnvelope::error(
                    "I'm having trouble searching for services right now. Please try again \
                     in a few minutes.",
                );
                let response = translate_envelope(
                    self.translator.as_ref(),
                    &english,
                    Language::English,
                    language,
                )
                .await;
                return FallbackOutcome { response, english };
            }
        };

        let group = infer_categories(&normalized);
        let services = parse_services(&content, postal_code, language, group.main);
        tracing::info!(
            parsed = services.len(),
            content_len = content.len(),
            "Parsed web-search response"
        );

        let envelope = ResponseEnvelope {
            status: ResponseStatus::Success,
            service_categories: group.categories.iter().map(|c| c.to_string()).collect(),
            postal_code: postal_code.map(|p| p.to_string()),
            services,
            message: fallback_message(group.main, postal_code, language),
        };

        // The cache's canonical form is English; back-translate when the
        // model answered in another language
        let english =
            translate_envelope(self.translator.as_ref(), &envelope, language, Language::English)
                .await;

        let entry = FallbackCacheEntry {
            normalized_query: normalized,
            postal_code: postal_code.map(|p| p.to_string()),
            response: english.clone(),
            original_language: language,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.cache.append(entry).await {
            tracing::warn!(error = %e, "Fallback cache write failed");
        }

        // The model already answered in the requested language; return its
        // envelope as-is rather than round-tripping through English
        FallbackOutcome { response: envelope, english }
    }
}

fn fallback_message(main: &str, postal_code: Option<&str>, language: Language) -> String {
    match (language, postal_code) {
        (Language::Spanish, Some(p)) => format!("Aquí están los servicios de {main} en {p}."),
        (Language::Spanish, None) => format!("Aquí están los servicios de {main}."),
        (Language::Polish, Some(p)) => format!("Oto usługi {main} w {p}."),
        (Language::Polish, None) => format!("Oto usługi {main}."),
        (Language::English, Some(p)) => format!("Here are {main} services in {p}."),
        (Language::English, None) => format!("Here are {main} services."),
    }
}

/// Parse the model's markdown answer into service records
fn parse_services(
    content: &str,
    postal_code: Option<&str>,
    language: Language,
    main_category: &str,
) -> Vec<ServiceRecord> {
    let mut services: Vec<ServiceRecord> = Vec::new();
    let mut current: Option<ServiceRecord> = None;
    let mut prev_was_org = false;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("**") && line.ends_with("**") && line.len() > 4 {
            if let Some(service) = current.take() {
                services.push(service);
            }
            let name = line.trim_matches('*').trim();
            current = Some(new_record(name, postal_code, main_category));
            prev_was_org = true;
            continue;
        }

        let Some(service) = current.as_mut() else {
            prev_was_org = false;
            continue;
        };

        if let Some(rest) = line.strip_prefix('-') {
            let text = rest.trim();
            match bullet_label(text) {
                Some(BulletLabel::Hours) => service.set_detail(detail::HOURS, text),
                Some(BulletLabel::Phone) => {
                    service.set_detail(detail::PHONE, text);
                    if let Some((_, number)) = text.split_once(':') {
                        let number = number.trim();
                        if !number.is_empty() {
                            service.set_detail(
                                detail::REFERRAL_PROCESS,
                                referral_process(number, language),
                            );
                        }
                    }
                }
                Some(BulletLabel::Eligibility) => service.set_detail(detail::ELIGIBILITY, text),
                None => append_additional(service, text),
            }
        } else if prev_was_org {
            parse_address_line(service, line);
        }
        // Prose between records is dropped, same as the source material
        prev_was_org = false;
    }

    if let Some(service) = current.take() {
        services.push(service);
    }

    // Nothing parsed but the model did answer: wrap the whole answer in one
    // generic record so the content still reaches the user
    if services.is_empty() && !content.trim().is_empty() {
        let mut service =
            new_record(&format!("{main_category} Resources"), postal_code, main_category);
        service.set_detail(detail::ADDITIONAL_INFORMATION, content.trim());
        services.push(service);
    }

    services
}

fn new_record(agency: &str, postal_code: Option<&str>, main_category: &str) -> ServiceRecord {
    let mut service = ServiceRecord::new(agency);
    service.set_detail(detail::REFERRAL_ID, Uuid::new_v4().to_string());
    service.set_detail(detail::SERVICE_CATEGORY, main_category);
    service.set_detail(detail::SOURCE, RecordSource::WebSearch.as_str());
    if let Some(postal) = postal_code {
        service.set_detail(detail::POSTAL_CODE, postal);
    }
    service
}

/// "123 Main St, Chicago, IL 60605" split into address/city/state/postal
fn parse_address_line(service: &mut ServiceRecord, line: &str) {
    let parts: Vec<&str> = line.split(',').collect();
    service.set_detail(detail::ADDRESS, parts[0].trim());
    if parts.len() >= 3 {
        service.set_detail(detail::CITY, parts[1].trim());
        let state_zip = parts[2].trim();
        if let Some(m) = STATE_RE.captures(state_zip) {
            service.set_detail(detail::STATE, &m[1]);
        }
        if service.detail_str(detail::POSTAL_CODE).is_none() {
            if let Some(m) = ZIP_RE.captures(state_zip) {
                service.set_detail(detail::POSTAL_CODE, &m[1]);
            }
        }
    }
}

/// Synthesized referral instruction in the language the model answered in
fn referral_process(number: &str, language: Language) -> String {
    match language {
        Language::English => format!("Call {number}"),
        Language::Spanish => format!("Llamar {number}"),
        Language::Polish => format!("Zadzwoń {number}"),
    }
}

fn append_additional(service: &mut ServiceRecord, text: &str) {
    let merged = match service.detail_str(detail::ADDITIONAL_INFORMATION) {
        Some(existing) => format!("{existing}. {text}"),
        None => text.to_string(),
    };
    service.set_detail(detail::ADDITIONAL_INFORMATION, merged);
}
