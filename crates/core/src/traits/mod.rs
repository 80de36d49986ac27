//! Collaborator traits
//!
//! The channel transports, AI services and storage engine are external
//! collaborators; these traits are the seams the pipeline is built against.

mod catalog;
mod llm;
mod storage;
mod translate;

pub use catalog::{CatalogFilter, CatalogStore, ScanPage};
pub use llm::LanguageModel;
pub use storage::{FallbackCache, ProfileStore};
pub use translate::Translator;
