//! In-memory profile store

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use referral_agent_core::{
    Error, Feedback, Language, ProfileAttributes, ProfileStore, QueryLogEntry, ReferralEntry,
    Result, UserProfile,
};

/// In-memory user profile store
///
/// Every mutation goes through a per-user entry lock and touches only the
/// targeted field or map key, mirroring the partial-update semantics of the
/// backing key-value engine.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a field-scoped mutation, creating the profile if absent
    fn upsert_with(&self, user_id: &str, mutate: impl FnOnce(&mut UserProfile)) {
        let mut entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        mutate(entry.value_mut());
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.get(user_id).map(|p| p.clone()))
    }

    async fn put_referral(
        &self,
        user_id: &str,
        referral_id: &str,
        entry: ReferralEntry,
    ) -> Result<()> {
        self.upsert_with(user_id, |profile| {
            profile.referrals.insert(referral_id.to_string(), entry);
        });
        Ok(())
    }

    async fn put_query(&self, user_id: &str, query_id: &str, entry: QueryLogEntry) -> Result<()> {
        self.upsert_with(user_id, |profile| {
            profile.queries.insert(query_id.to_string(), entry);
        });
        Ok(())
    }

    async fn update_attributes(&self, user_id: &str, attrs: &ProfileAttributes) -> Result<()> {
        if attrs.is_empty() {
            return Ok(());
        }
        self.upsert_with(user_id, |profile| {
            if let Some(postal_code) = &attrs.postal_code {
                profile.postal_code = Some(postal_code.clone());
            }
            if let Some(phone) = &attrs.phone {
                profile.phone = Some(phone.clone());
            }
            if let Some(email) = &attrs.email {
                profile.email = Some(email.clone());
            }
        });
        Ok(())
    }

    async fn set_language(&self, user_id: &str, language: Language) -> Result<()> {
        self.upsert_with(user_id, |profile| {
            profile.language = language;
        });
        Ok(())
    }

    async fn set_feedback(
        &self,
        user_id: &str,
        referral_id: &str,
        feedback: Feedback,
    ) -> Result<()> {
        let mut profile = self
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
        let entry = profile
            .referrals
            .get_mut(referral_id)
            .ok_or_else(|| Error::NotFound(format!("referral {referral_id}")))?;
        entry.feedback = Some(feedback);
        entry.feedback_timestamp = Some(Utc::now());
        Ok(())
    }
}
