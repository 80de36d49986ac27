//! Error types shared across the workspace

use thiserror::Error;

/// Core error type
///
/// Component crates convert their local errors into these variants at the
/// trait boundary so the orchestrator can apply one recovery policy per
/// failure class.
#[derive(Error, Debug)]
pub enum Error {
    /// Language-model call or response failure (intent extraction, web search)
    #[error("Model error: {0}")]
    Model(String),

    /// Translation service failure
    #[error("Translation error: {0}")]
    Translation(String),

    /// Profile or cache storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catalog scan failure
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Caller supplied an invalid request (missing user_id / query text)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Precondition failure on a targeted update (e.g. feedback for an
    /// unknown referral)
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Model(format!("JSON error: {err}"))
    }
}
