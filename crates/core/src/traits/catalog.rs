//! Catalog store trait

use async_trait::async_trait;

use crate::{RawRecord, Result};

/// Equality-or-membership filter applied by the store during a scan
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFilter {
    /// Record matches if its category is any of these
    pub categories: Vec<String>,
    /// Normalized 5-character postal code, equality match
    pub postal_code: String,
}

/// One page of a scan
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub records: Vec<RawRecord>,
    /// Cursor for the next page; `None` when the scan is exhausted
    pub next: Option<u64>,
}

/// Read-mostly provider catalog
///
/// Implementations:
/// - `MemoryCatalog` - in-memory store backed by ingested CSV rows
///
/// The catalog has no enforced upper bound, so consumers must page through
/// the full result set; `scan_all` does that loop.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Scan one page, optionally filtered
    async fn scan_page(&self, filter: Option<&CatalogFilter>, start: Option<u64>)
        -> Result<ScanPage>;

    /// Scan every page, optionally filtered
    async fn scan_all(&self, filter: Option<&CatalogFilter>) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut start = None;
        loop {
            let page = self.scan_page(filter, start).await?;
            records.extend(page.records);
            match page.next {
                Some(next) => start = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}
