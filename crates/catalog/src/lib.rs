//! Provider catalog
//!
//! Ingests raw provider rows (CSV-shaped maps with inconsistent header
//! casing, including byte-order-mark-prefixed headers), normalizes them once
//! at the store boundary, and serves the filtered, paged scans the search
//! layer needs.

pub mod record;
pub mod search;
pub mod store;

pub use record::{normalize_postal_code, resolve_record};
pub use search::CatalogSearch;
pub use store::{category_vocabulary, MemoryCatalog, DEFAULT_CATEGORIES};
