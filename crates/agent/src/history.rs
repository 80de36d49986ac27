//! Referral and query history
//!
//! History is best-effort: a storage failure is logged and swallowed, never
//! surfaced, and never rolls back the response the user already got.

use std::sync::Arc;

use chrono::Utc;
use referral_agent_core::{
    record::detail, Language, ProfileStore, QueryLogEntry, RecordSource, ReferralEntry,
    ResponseEnvelope, ServiceRecord,
};
use uuid::Uuid;

pub struct ReferralHistoryWriter {
    store: Arc<dyn ProfileStore>,
}

impl ReferralHistoryWriter {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Record one batch of referrals against the user's profile
    ///
    /// Each record lands under its own `referral_id` key, so re-running the
    /// same batch overwrites rather than duplicates.
    pub async fn record(&self, user_id: &str, records: &[ServiceRecord]) {
        for record in records {
            let Some(referral_id) = record.referral_id() else {
                tracing::warn!(agency = %record.agency, "Service record without referral_id, skipping history");
                continue;
            };

            let entry = ReferralEntry {
                organization: record.agency.clone(),
                address: record.detail_str(detail::ADDRESS).unwrap_or_default().to_string(),
                postal_code: record
                    .detail_str(detail::POSTAL_CODE)
                    .unwrap_or_default()
                    .to_string(),
                service_category: record
                    .detail_str(detail::SERVICE_CATEGORY)
                    .unwrap_or_default()
                    .to_string(),
                state: record.detail_str(detail::STATE).unwrap_or_default().to_string(),
                timestamp: Utc::now(),
                feedback: None,
                feedback_timestamp: None,
            };

            if let Err(e) = self.store.put_referral(user_id, referral_id, entry).await {
                tracing::error!(error = %e, user_id, referral_id, "Failed to record referral");
            }
        }
    }

    /// Record the query/response pair in the user's history
    ///
    /// Both the English form and the original text are stored; the response
    /// is always the English canonical envelope regardless of the requested
    /// language.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_query(
        &self,
        user_id: &str,
        english_query: &str,
        original_query: &str,
        envelope: &ResponseEnvelope,
        postal_code: Option<&str>,
        language: Language,
        source: RecordSource,
    ) {
        let response = match serde_json::to_string(envelope) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize envelope for history");
                return;
            }
        };

        let entry = QueryLogEntry {
            query: original_query.to_string(),
            english_query: english_query.to_string(),
            timestamp: Utc::now(),
            source,
            postal_code: postal_code.map(|p| p.to_string()),
            language,
            response,
        };

        let query_id = Uuid::new_v4().to_string();
        if let Err(e) = self.store.put_query(user_id, &query_id, entry).await {
            tracing::error!(error = %e, user_id, "Failed to record query history");
        }
    }
}
