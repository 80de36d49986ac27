//! Core traits and types for the referral agent
//!
//! This crate provides foundational types used across all other crates:
//! - Core traits for pluggable collaborators (LLM, translator, catalog, stores)
//! - Language definitions (English, Spanish, Polish)
//! - Canonical response types (`ServiceRecord`, `ResponseEnvelope`)
//! - User profile and fallback-cache entities
//! - Error types

pub mod error;
pub mod language;
pub mod profile;
pub mod record;
pub mod traits;

pub use error::{Error, Result};
pub use language::Language;
pub use profile::{
    Feedback, ProfileAttributes, QueryLogEntry, ReferralEntry, UserProfile,
};
pub use record::{
    FallbackCacheEntry, QueryIntent, RawRecord, RecordSource, ResponseEnvelope, ResponseStatus,
    ServiceRecord,
};

// Trait re-exports
pub use traits::{
    CatalogFilter, CatalogStore, FallbackCache, LanguageModel, ProfileStore, ScanPage, Translator,
};
