//! Translation layer
//!
//! Two pieces: a [`Translator`](referral_agent_core::Translator) backend that
//! translates one string at a time, and [`translate_tree`], which walks a
//! JSON response and translates the human-readable leaves while leaving
//! machine-facing fields alone.

pub mod adapter;
pub mod backend;

pub use adapter::{translate_envelope, translate_tree, TECHNICAL_KEYS};
pub use backend::{HttpTranslator, NoopTranslator};
