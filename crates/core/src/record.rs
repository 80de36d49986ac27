//! Canonical response types
//!
//! `ServiceRecord` is the single output unit produced by both the catalog
//! formatter and the web-search fallback. `ResponseEnvelope` is the top-level
//! object returned to every channel adapter. Envelopes are immutable once
//! built; translation produces a new copy and never mutates the English
//! original (the English form is what gets cached and stored).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Language;

/// Reserved detail keys on a [`ServiceRecord`]
pub mod detail {
    pub const REFERRAL_ID: &str = "referral_id";
    pub const SERVICE_CATEGORY: &str = "service_category";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const POSTAL_CODE: &str = "postal_code";
    pub const HOURS: &str = "hours";
    pub const PHONE: &str = "phone";
    pub const ELIGIBILITY: &str = "eligibility";
    pub const ADDITIONAL_INFORMATION: &str = "additional_information";
    pub const REFERRAL_PROCESS: &str = "referral_process";
    pub const SERVICE_AVAILABILITY: &str = "service_availability";
    pub const SOURCE: &str = "source";
}

/// Where a service record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    #[serde(rename = "catalog")]
    Catalog,
    #[serde(rename = "web-search")]
    WebSearch,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::WebSearch => "web-search",
        }
    }
}

/// Canonical output unit: one provider, with free-form details
///
/// `details` holds string/number values under the reserved keys above plus
/// any extra catalog columns passed through with normalized names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub agency: String,
    pub details: Map<String, Value>,
}

impl ServiceRecord {
    pub fn new(agency: impl Into<String>) -> Self {
        Self {
            agency: agency.into(),
            details: Map::new(),
        }
    }

    /// Set a string detail
    pub fn set_detail(&mut self, key: &str, value: impl Into<String>) {
        self.details.insert(key.to_string(), Value::String(value.into()));
    }

    /// Get a detail as &str if present and string-valued
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    /// The id tying this record into the requesting user's referral history
    pub fn referral_id(&self) -> Option<&str> {
        self.detail_str(detail::REFERRAL_ID)
    }
}

/// Structured intent extracted from free text
///
/// Ephemeral: produced by the intent extractor, consumed immediately by the
/// catalog search. An empty intent (no categories, no postal code) is the
/// graceful-degradation default for every extraction failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    #[serde(default)]
    pub service_categories: Vec<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl QueryIntent {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Envelope status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    NoResults,
    Error,
}

/// Top-level response object returned to any channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    #[serde(default)]
    pub service_categories: Vec<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    pub message: String,
}

impl ResponseEnvelope {
    /// Build a generic error envelope
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            service_categories: Vec::new(),
            postal_code: None,
            services: Vec::new(),
            message: message.into(),
        }
    }
}

/// A raw provider record, normalized at the catalog boundary
///
/// The three required fields are resolved from their header aliases
/// (including the byte-order-mark-prefixed CSV variants) exactly once at
/// ingest; `extra` keeps every remaining column under its original header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub organization: String,
    pub category: String,
    /// Zero-padded 5-character canonical form
    pub postal_code: String,
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl RawRecord {
    /// Get an extra field as &str if present and string-valued
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// One cached fallback-search result
///
/// Conceptually keyed by `(normalized_query, postal_code)`; both must match
/// exactly for a hit. The stored envelope is always the English canonical
/// form. Entries are append-only: duplicates under concurrent misses are
/// tolerated and the newest timestamp wins at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackCacheEntry {
    pub normalized_query: String,
    /// Normalized postal code, or `None` for location-free queries
    pub postal_code: Option<String>,
    /// English canonical response
    pub response: ResponseEnvelope,
    /// Language the model originally answered in
    pub original_language: Language,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ResponseStatus::NoResults).unwrap(),
            "\"no_results\""
        );
        assert_eq!(serde_json::to_string(&ResponseStatus::Success).unwrap(), "\"success\"");
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&RecordSource::WebSearch).unwrap(), "\"web-search\"");
        assert_eq!(RecordSource::Catalog.as_str(), "catalog");
    }

    #[test]
    fn test_service_record_details() {
        let mut record = ServiceRecord::new("Helping Hands");
        record.set_detail(detail::REFERRAL_ID, "r-123");
        record.set_detail(detail::HOURS, "Mon-Fri 9-5");
        assert_eq!(record.referral_id(), Some("r-123"));
        assert_eq!(record.detail_str(detail::HOURS), Some("Mon-Fri 9-5"));
        assert_eq!(record.detail_str(detail::PHONE), None);
    }

    #[test]
    fn test_envelope_json_shape() {
        let mut record = ServiceRecord::new("Food Bank");
        record.set_detail(detail::SERVICE_CATEGORY, "Food Pantry");
        let envelope = ResponseEnvelope {
            status: ResponseStatus::Success,
            service_categories: vec!["Food Pantry".to_string()],
            postal_code: Some("60605".to_string()),
            services: vec![record],
            message: "Here are Food Pantry services available in the 60605 area.".to_string(),
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["postal_code"], "60605");
        assert_eq!(json["services"][0]["agency"], "Food Bank");
        assert_eq!(json["services"][0]["details"]["service_category"], "Food Pantry");
    }

    #[test]
    fn test_intent_default_is_empty() {
        let intent = QueryIntent::empty();
        assert!(intent.service_categories.is_empty());
        assert!(intent.postal_code.is_none());
    }
}
