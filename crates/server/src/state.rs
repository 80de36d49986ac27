//! Application state
//!
//! Shared state across all handlers. Collaborator clients are constructed
//! once at startup and injected; handlers only see the orchestrator.

use std::sync::Arc;

use referral_agent_agent::QueryOrchestrator;
use referral_agent_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<QueryOrchestrator>,
}

impl AppState {
    pub fn new(settings: Settings, orchestrator: QueryOrchestrator) -> Self {
        Self {
            settings: Arc::new(settings),
            orchestrator: Arc::new(orchestrator),
        }
    }
}
