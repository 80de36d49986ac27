//! Catalog response formatting
//!
//! Maps raw catalog records into the canonical envelope. The upstream sheet
//! fills unknown cells with sentinel text ("Not specified", "Information not
//! found") rather than leaving them blank; those are filtered here so the
//! user never sees them.

use std::sync::Arc;

use referral_agent_core::{
    record::detail, RawRecord, RecordSource, ResponseEnvelope, ResponseStatus, ServiceRecord,
};
use serde_json::Value;
use uuid::Uuid;

use crate::history::ReferralHistoryWriter;

/// Source columns mapped to reserved detail keys, with the sentinel value
/// that marks them as absent
const OPTIONAL_COLUMNS: &[(&str, &str, &str)] = &[
    ("Referral Process", detail::REFERRAL_PROCESS, "not specified"),
    ("Hours", detail::HOURS, "information not found"),
    ("Eligibility Requirements", detail::ELIGIBILITY, "not specified"),
    ("Service Availability", detail::SERVICE_AVAILABILITY, "not specified"),
];

pub struct ResponseFormatter {
    history: Arc<ReferralHistoryWriter>,
}

impl ResponseFormatter {
    pub fn new(history: Arc<ReferralHistoryWriter>) -> Self {
        Self { history }
    }

    /// Format catalog records into the canonical envelope
    ///
    /// On success the whole batch is recorded in the user's referral history;
    /// a history failure logs and continues, the envelope is returned either
    /// way.
    pub async fn format(
        &self,
        records: &[RawRecord],
        categories: &[String],
        postal_code: Option<&str>,
        user_id: &str,
    ) -> ResponseEnvelope {
        if records.is_empty() {
            return no_results_envelope(categories, postal_code);
        }

        let services: Vec<ServiceRecord> = records.iter().map(to_service_record).collect();

        let envelope = ResponseEnvelope {
            status: ResponseStatus::Success,
            service_categories: categories.to_vec(),
            postal_code: postal_code.map(|p| p.to_string()),
            services,
            message: success_message(categories, postal_code),
        };

        self.history.record(user_id, &envelope.services).await;

        envelope
    }
}

fn success_message(categories: &[String], postal_code: Option<&str>) -> String {
    if categories.is_empty() {
        return "Here are the services that match your query.".to_string();
    }
    let categories = categories.join(", ");
    match postal_code {
        Some(postal) => format!("Here are {categories} services available in the {postal} area."),
        None => format!("Here are {categories} services available."),
    }
}

fn no_results_envelope(categories: &[String], postal_code: Option<&str>) -> ResponseEnvelope {
    let message = match (categories.is_empty(), postal_code) {
        (false, Some(postal)) => {
            let categories = categories.join(", ");
            format!("I couldn't find any {categories} services in the {postal} area.")
        }
        (false, None) => {
            let categories = categories.join(", ");
            format!("I couldn't find any information about {categories} services.")
        }
        (true, Some(postal)) => {
            format!("I couldn't find any services in the {postal} area.")
        }
        (true, None) => "I need more information to help you find services. Can you tell me \
                         what type of service you're looking for?"
            .to_string(),
    };

    ResponseEnvelope {
        status: ResponseStatus::NoResults,
        service_categories: categories.to_vec(),
        postal_code: postal_code.map(|p| p.to_string()),
        services: Vec::new(),
        message,
    }
}

fn to_service_record(record: &RawRecord) -> ServiceRecord {
    let mut service = ServiceRecord::new(record.organization.clone());

    service.set_detail(detail::REFERRAL_ID, Uuid::new_v4().to_string());
    service.set_detail(detail::SERVICE_CATEGORY, record.category.clone());
    service.set_detail(detail::POSTAL_CODE, record.postal_code.clone());
    service.set_detail(detail::SOURCE, RecordSource::Catalog.as_str());

    for (column, key, sentinel) in OPTIONAL_COLUMNS {
        if let Some(value) = record.extra_str(column) {
            if !value.is_empty() && !value.eq_ignore_ascii_case(sentinel) {
                service.set_detail(key, value);
            }
        }
    }

    // Everything else passes through with a normalized key
    for (column, value) in &record.extra {
        if OPTIONAL_COLUMNS.iter().any(|(c, _, _)| c == column) {
            continue;
        }
        if matches!(value, Value::Null) || value.as_str().is_some_and(|s| s.is_empty()) {
            continue;
        }
        let key = column.to_lowercase().replace(' ', "_");
        service.details.insert(key, value.clone());
    }

    service
}
