//! Storage implementations
//!
//! In-memory implementations of the profile store and fallback cache. The
//! production storage engine is an external collaborator behind the same
//! traits; these stores model its semantics (field-scoped partial updates,
//! append-only cache writes) and back the test suite and local runs.

pub mod cache;
pub mod profile;

pub use cache::MemoryFallbackCache;
pub use profile::MemoryProfileStore;
