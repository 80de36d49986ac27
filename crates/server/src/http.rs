//! HTTP Endpoints
//!
//! REST API for the referral agent.

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use referral_agent_agent::QueryRequest;
use referral_agent_core::{Feedback, Language, ProfileAttributes, ResponseEnvelope};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        // Query endpoint
        .route("/api/query", post(query))
        // Referral feedback
        .route("/api/feedback", post(feedback))
        // Health check
        .route("/health", get(health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        } else {
            tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        }
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().expect("valid origin"))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

/// Query request body
#[derive(Debug, Deserialize)]
struct QueryBody {
    user_id: String,
    query: String,
    #[serde(default)]
    postal_code: Option<String>,
    /// Requested language; unknown or absent values fall back to the
    /// profile's sticky preference
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Query endpoint
async fn query(
    State(state): State<AppState>,
    Json(body): Json<QueryBody>,
) -> Result<Json<ResponseEnvelope>, (StatusCode, Json<serde_json::Value>)> {
    let request = QueryRequest {
        user_id: body.user_id,
        query_text: body.query,
        postal_code: body.postal_code.clone(),
        language: body.language.as_deref().and_then(Language::from_str_loose),
        attributes: ProfileAttributes {
            postal_code: body.postal_code,
            phone: body.phone,
            email: body.email,
        },
    };

    match state.orchestrator.answer(request).await {
        Ok(envelope) => Ok(Json(envelope)),
        Err(e) => Err(error_response(e.into())),
    }
}

/// Feedback request body
#[derive(Debug, Deserialize)]
struct FeedbackBody {
    user_id: String,
    referral_id: String,
    /// "yes" or "no"
    feedback: String,
}

/// Referral feedback endpoint
async fn feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackBody>,
) -> Result<StatusCode, (StatusCode, Json<serde_json::Value>)> {
    let Some(feedback) = Feedback::from_str_loose(&body.feedback) else {
        return Err(error_response(ServerError::InvalidRequest(
            "feedback must be \"yes\" or \"no\"".to_string(),
        )));
    };

    match state
        .orchestrator
        .attach_feedback(&body.user_id, &body.referral_id, feedback)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(error_response(e.into())),
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn error_response(err: ServerError) -> (StatusCode, Json<serde_json::Value>) {
    let message = err.to_string();
    let status = StatusCode::from(err);
    if status.is_server_error() {
        tracing::error!(%status, "Request failed: {message}");
    }
    (status, Json(serde_json::json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_variants() {
        // None of these should panic
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://app.example.org".to_string()], true);
        let _ = build_cors_layer(&["not a header value\u{0}".to_string()], true);
    }

    #[test]
    fn test_query_body_defaults() {
        let body: QueryBody =
            serde_json::from_str(r#"{"user_id": "u1", "query": "food"}"#).unwrap();
        assert!(body.postal_code.is_none());
        assert!(body.language.is_none());
    }
}
