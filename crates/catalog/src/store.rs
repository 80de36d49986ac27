//! In-memory catalog store and category vocabulary

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use referral_agent_core::{CatalogFilter, CatalogStore, RawRecord, Result, ScanPage};
use serde_json::Value;

use crate::record::resolve_record;

/// Default page size for scans
const PAGE_SIZE: usize = 100;

/// Built-in vocabulary used when the catalog scan fails
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Adult Education",
    "Child Care",
    "Child Care Assistance",
    "Children Services",
    "Clothing & Household Items",
    "Community Services",
    "Crisis Assistance",
    "Dental",
    "Domestic Violence Services",
    "Education Services",
    "Employment Services",
    "Family Services",
    "Financial Assistance",
    "Food Assistance",
    "Food Pantry",
    "Healthcare",
    "Homeless Services",
    "Hospitals",
    "Housing",
    "Legal Assistance",
    "Legal Services",
    "Medical Assistance",
    "Medical Services",
    "Mental Health Services",
    "Rental Assistance",
    "SNAP",
    "Sexual Assault Services",
    "Substance Use & Addiction Support",
    "Support Groups",
    "Transportation",
    "Utility Assistance",
    "WIC (Women, Infants, and Children)",
    "Youth Programs",
];

/// In-memory provider catalog
///
/// Holds normalized records and serves paged, filtered scans. Read-mostly:
/// the record set is fixed at construction.
pub struct MemoryCatalog {
    records: Vec<RawRecord>,
    page_size: usize,
}

impl MemoryCatalog {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            page_size: PAGE_SIZE,
        }
    }

    /// Ingest raw rows, normalizing headers and dropping unusable rows
    pub fn from_rows(rows: Vec<BTreeMap<String, Value>>) -> Self {
        let total = rows.len();
        let records: Vec<RawRecord> = rows.into_iter().filter_map(resolve_record).collect();
        if records.len() < total {
            tracing::warn!(
                dropped = total - records.len(),
                kept = records.len(),
                "Dropped catalog rows without a usable category or postal code"
            );
        }
        Self::new(records)
    }

    #[cfg(test)]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn matches(record: &RawRecord, filter: &CatalogFilter) -> bool {
        filter.categories.iter().any(|c| c == &record.category)
            && record.postal_code == filter.postal_code
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn scan_page(
        &self,
        filter: Option<&CatalogFilter>,
        start: Option<u64>,
    ) -> Result<ScanPage> {
        let start = start.unwrap_or(0) as usize;
        let records: Vec<RawRecord> = self
            .records
            .iter()
            .skip(start)
            .filter(|r| filter.map_or(true, |f| Self::matches(r, f)))
            .take(self.page_size)
            .cloned()
            .collect();

        // The cursor walks the unfiltered record list, mirroring a scan with
        // a filter expression applied per page
        let consumed = self
            .records
            .iter()
            .skip(start)
            .scan(0usize, |kept, r| {
                if *kept >= self.page_size {
                    return None;
                }
                if filter.map_or(true, |f| Self::matches(r, f)) {
                    *kept += 1;
                }
                Some(())
            })
            .count();

        let next_start = start + consumed;
        let next = if next_start < self.records.len() {
            Some(next_start as u64)
        } else {
            None
        };

        Ok(ScanPage { records, next })
    }
}

/// Compute the distinct category vocabulary by a full scan
///
/// Deduplicated and sorted for consistent prompt ordering. Falls back to the
/// built-in [`DEFAULT_CATEGORIES`] list when the scan fails, so intent
/// extraction keeps working through a catalog outage.
pub async fn category_vocabulary(store: &Arc<dyn CatalogStore>) -> Vec<String> {
    match store.scan_all(None).await {
        Ok(records) => {
            let mut categories: Vec<String> = records
                .into_iter()
                .map(|r| r.category.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            categories.sort();
            categories.dedup();
            categories
        }
        Err(e) => {
            tracing::error!(error = %e, "Catalog scan for category vocabulary failed, using defaults");
            DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
        }
    }
}
