//! In-memory fallback-search cache

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use referral_agent_core::{FallbackCache, FallbackCacheEntry, Result};

/// In-memory append-only cache for fallback-search results
///
/// Entries are bucketed by (normalized query, postal code). Appends never
/// update in place, so concurrent misses that both compute a response leave
/// two entries behind; lookups resolve the race by taking the newest
/// timestamp. Expiry is read-time only: stale entries are skipped, not
/// deleted.
pub struct MemoryFallbackCache {
    entries: DashMap<(String, Option<String>), Vec<FallbackCacheEntry>>,
    ttl: Duration,
}

impl MemoryFallbackCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait]
impl FallbackCache for MemoryFallbackCache {
    async fn lookup(
        &self,
        normalized_query: &str,
        postal_code: Option<&str>,
    ) -> Result<Option<FallbackCacheEntry>> {
        let key = (
            normalized_query.to_string(),
            postal_code.map(|p| p.to_string()),
        );
        let cutoff = Utc::now() - self.ttl;
        let hit = self.entries.get(&key).and_then(|bucket| {
            bucket
                .iter()
                .filter(|e| e.timestamp > cutoff)
                .max_by_key(|e| e.timestamp)
                .cloned()
        });
        if let Some(entry) = &hit {
            tracing::debug!(
                query = %normalized_query,
                age_secs = (Utc::now() - entry.timestamp).num_seconds(),
                "Fallback cache hit"
            );
        }
        Ok(hit)
    }

    async fn append(&self, entry: FallbackCacheEntry) -> Result<()> {
        let key = (entry.normalized_query.clone(), entry.postal_code.clone());
        self.entries.entry(key).or_default().push(entry);
        Ok(())
    }
}
