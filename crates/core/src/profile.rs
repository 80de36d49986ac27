//! User profile entities
//!
//! Profiles are created lazily on first write and mutated only through
//! field-scoped partial updates (see `ProfileStore`), so concurrent writers
//! for the same user commute instead of clobbering each other.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Language, RecordSource};

/// Yes/no usefulness feedback on a referral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Yes,
    No,
}

impl Feedback {
    /// Parse from the request wire form
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// One referral attached to a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralEntry {
    pub organization: String,
    pub address: String,
    pub postal_code: String,
    pub service_category: String,
    pub state: String,
    pub timestamp: DateTime<Utc>,
    /// Attached later via feedback collection, only on an existing entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_timestamp: Option<DateTime<Utc>>,
}

/// One logged query with its response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    /// Query text as the user typed it, in its original language
    pub query: String,
    /// English form used for extraction, search and caching
    pub english_query: String,
    pub timestamp: DateTime<Utc>,
    pub source: RecordSource,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub language: Language,
    /// Serialized English response envelope
    pub response: String,
}

/// Persistent per-user entity keyed by `user_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Sticky preference, defaults to English
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub referrals: HashMap<String, ReferralEntry>,
    #[serde(default)]
    pub queries: HashMap<String, QueryLogEntry>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}

/// Optional profile attributes carried on a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ProfileAttributes {
    pub fn is_empty(&self) -> bool {
        self.postal_code.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_parse() {
        assert_eq!(Feedback::from_str_loose("Yes"), Some(Feedback::Yes));
        assert_eq!(Feedback::from_str_loose(" no "), Some(Feedback::No));
        assert_eq!(Feedback::from_str_loose("maybe"), None);
    }

    #[test]
    fn test_profile_defaults() {
        let profile = UserProfile::new("u1");
        assert_eq!(profile.language, Language::English);
        assert!(profile.referrals.is_empty());
        assert!(profile.queries.is_empty());
    }

    #[test]
    fn test_attributes_is_empty() {
        assert!(ProfileAttributes::default().is_empty());
        let attrs = ProfileAttributes {
            phone: Some("555-123-4567".to_string()),
            ..Default::default()
        };
        assert!(!attrs.is_empty());
    }
}
