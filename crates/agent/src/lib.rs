//! Query resolution pipeline
//!
//! The pipeline turns one free-text query into one structured response:
//!
//! 1. [`IntentExtractor`] asks the structured-extraction model for service
//!    categories and a postal code, grounded in the catalog's vocabulary.
//! 2. `CatalogSearch` (in the catalog crate) filters provider records; both
//!    categories and a postal code are required for a hit.
//! 3. [`ResponseFormatter`] turns catalog records into the canonical
//!    envelope, or [`FallbackSearch`] asks the web-search model and parses
//!    its markdown answer, backed by an exact-match cache.
//! 4. [`ReferralHistoryWriter`] records referrals and the query/response
//!    pair, best-effort.
//! 5. [`QueryOrchestrator`] sequences the above and converts every failure
//!    into a structured envelope.

pub mod fallback;
pub mod format;
pub mod history;
pub mod intent;
pub mod orchestrator;

pub use fallback::{FallbackOutcome, FallbackSearch};
pub use format::ResponseFormatter;
pub use history::ReferralHistoryWriter;
pub use intent::IntentExtractor;
pub use orchestrator::{QueryOrchestrator, QueryRequest};
