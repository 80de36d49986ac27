//! Catalog search
//!
//! Both extracted categories AND a postal code are required for a catalog
//! hit; location-free or category-free queries always fall through to the
//! web-search fallback. This is a deliberate gate, not an optimization.

use std::sync::Arc;

use referral_agent_core::{CatalogFilter, CatalogStore, RawRecord};
use serde_json::Value;

use crate::record::normalize_postal_code;

/// Filters the catalog by extracted categories and postal code
pub struct CatalogSearch {
    store: Arc<dyn CatalogStore>,
}

impl CatalogSearch {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Search for matching provider records
    ///
    /// Returns empty immediately unless both categories and a valid postal
    /// code are present. Pages through the full result set. Store failures
    /// are logged and degrade to an empty result (the caller then takes the
    /// fallback path), never an error.
    pub async fn search(&self, categories: &[String], postal_code: Option<&str>) -> Vec<RawRecord> {
        if categories.is_empty() {
            tracing::debug!("No service categories extracted, skipping catalog search");
            return Vec::new();
        }
        let Some(postal_code) =
            postal_code.and_then(|p| normalize_postal_code(&Value::String(p.to_string())))
        else {
            tracing::debug!("No usable postal code, skipping catalog search");
            return Vec::new();
        };

        let filter = CatalogFilter {
            categories: categories.to_vec(),
            postal_code,
        };

        match self.store.scan_all(Some(&filter)).await {
            Ok(records) => {
                tracing::info!(
                    matches = records.len(),
                    categories = ?filter.categories,
                    postal_code = %filter.postal_code,
                    "Catalog search complete"
                );
                records
            }
            Err(e) => {
                tracing::error!(error = %e, "Catalog search failed, returning no matches");
                Vec::new()
            }
        }
    }
}
