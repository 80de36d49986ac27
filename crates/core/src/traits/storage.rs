//! Profile and fallback-cache storage traits
//!
//! Both traits expose targeted, field-scoped operations rather than
//! whole-document writes: profile mutations add or overwrite a single map
//! key, and cache writes append. Concurrent invocations for the same user
//! therefore commute instead of racing on full overwrites.

use async_trait::async_trait;

use crate::{
    FallbackCacheEntry, Feedback, Language, ProfileAttributes, QueryLogEntry, ReferralEntry,
    Result, UserProfile,
};

/// Persistent user profile store
///
/// Implementations:
/// - `MemoryProfileStore` - in-memory key-value map
///
/// Profiles are created lazily by the first write targeting a user; every
/// mutation is an upsert of one field or one map key.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Fetch a profile, `None` if the user has never been written
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Add or overwrite a single referral entry (creates the profile and
    /// the referrals map as needed)
    async fn put_referral(&self, user_id: &str, referral_id: &str, entry: ReferralEntry)
        -> Result<()>;

    /// Add or overwrite a single query-log entry
    async fn put_query(&self, user_id: &str, query_id: &str, entry: QueryLogEntry) -> Result<()>;

    /// Update only the supplied profile attributes
    async fn update_attributes(&self, user_id: &str, attrs: &ProfileAttributes) -> Result<()>;

    /// Persist the sticky language preference
    async fn set_language(&self, user_id: &str, language: Language) -> Result<()>;

    /// Attach feedback to an existing referral entry
    ///
    /// Fails with [`crate::Error::NotFound`] when the user or referral does
    /// not exist; feedback can only be attached, never create an entry.
    async fn set_feedback(&self, user_id: &str, referral_id: &str, feedback: Feedback)
        -> Result<()>;
}

/// Append-only cache for fallback-search results
///
/// Implementations:
/// - `MemoryFallbackCache` - in-memory, read-time TTL
///
/// Lookup requires an exact match on both the normalized query text and the
/// postal code; there is deliberately no query-only fallback match. There is
/// no lock around the check-then-write sequence, so duplicate entries under
/// concurrent misses are possible and tolerated: the newest timestamp wins.
#[async_trait]
pub trait FallbackCache: Send + Sync + 'static {
    /// Exact-match lookup; returns the most recent non-expired entry
    async fn lookup(
        &self,
        normalized_query: &str,
        postal_code: Option<&str>,
    ) -> Result<Option<FallbackCacheEntry>>;

    /// Append a new entry (never updates in place)
    async fn append(&self, entry: FallbackCacheEntry) -> Result<()>;
}
