//! Referral Agent Server Entry Point

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use referral_agent_agent::{
    FallbackSearch, IntentExtractor, QueryOrchestrator, ReferralHistoryWriter, ResponseFormatter,
};
use referral_agent_catalog::{CatalogSearch, MemoryCatalog};
use referral_agent_config::{load_settings, Settings};
use referral_agent_core::{CatalogStore, LanguageModel, ProfileStore, Translator};
use referral_agent_llm::ChatBackend;
use referral_agent_server::{create_router, AppState};
use referral_agent_storage::{MemoryFallbackCache, MemoryProfileStore};
use referral_agent_translation::HttpTranslator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before tracing so the log filter can come from the
    // file too; early failures go to stderr
    let config_path = std::env::var("REFERRAL_AGENT_CONFIG").ok();
    let settings = match load_settings(config_path.as_deref().map(Path::new)) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}. Using defaults.");
            Settings::default()
        }
    };

    init_tracing();

    tracing::info!("Starting Referral Agent Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_path = config_path.as_deref().unwrap_or("defaults"),
        extractor_model = %settings.extractor.model,
        fallback_model = %settings.fallback.model,
        "Configuration loaded"
    );

    let catalog: Arc<dyn CatalogStore> =
        Arc::new(load_catalog(settings.catalog.path.as_deref()));
    let profiles: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::new());
    let cache = Arc::new(MemoryFallbackCache::new(chrono::Duration::days(
        settings.cache.ttl_days as i64,
    )));

    let extractor_model: Arc<dyn LanguageModel> =
        Arc::new(ChatBackend::new(settings.extractor.clone())?);
    let fallback_model: Arc<dyn LanguageModel> =
        Arc::new(ChatBackend::new(settings.fallback.clone())?);
    let translator: Arc<dyn Translator> =
        Arc::new(HttpTranslator::new(settings.translator.clone())?);

    let history = Arc::new(ReferralHistoryWriter::new(profiles.clone()));
    let orchestrator = QueryOrchestrator::new(
        IntentExtractor::new(extractor_model, catalog.clone()),
        CatalogSearch::new(catalog),
        ResponseFormatter::new(history.clone()),
        FallbackSearch::new(fallback_model, translator.clone(), cache),
        history,
        profiles,
        translator,
        settings.default_language,
    );

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let router = create_router(AppState::new(settings, orchestrator));

    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,referral_agent=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load the provider catalog from a JSON file of raw rows
///
/// Header aliases are resolved and unusable rows dropped at ingest. A
/// missing or unreadable file logs and starts with an empty catalog (every
/// query then takes the fallback path) rather than refusing to boot.
fn load_catalog(path: Option<&str>) -> MemoryCatalog {
    let Some(path) = path else {
        tracing::info!("No catalog file configured, starting with an empty catalog");
        return MemoryCatalog::new(Vec::new());
    };

    let rows: Vec<BTreeMap<String, serde_json::Value>> = match std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, path, "Failed to load catalog file, starting empty");
            return MemoryCatalog::new(Vec::new());
        }
    };

    tracing::info!(path, rows = rows.len(), "Catalog loaded");
    MemoryCatalog::from_rows(rows)
}
