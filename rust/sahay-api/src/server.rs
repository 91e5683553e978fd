//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::AppConfig;
use crate::decider::patterns::PatternTable;
use crate::decider::{ResponseDecider, UniformPicker};
use crate::gateway::rate_limit::{
    RateLimits, chat_rate_limit_middleware, global_rate_limit_middleware,
};
use crate::gateway::sessions::SessionStore;
use crate::llm::{self, LlmSettings, OpenAiClient};
use crate::logging::OpTimer;
use crate::{AppState, log_init_step, log_init_warning};

/// Create the application with all routes and middleware.
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let overall_timer = OpTimer::new("server", "create_app");

    // [1/5] LLM client
    let settings = llm_settings(&config);
    log_init_step!(
        1,
        5,
        "LLM client",
        format!(
            "{} ({})",
            settings.model,
            if settings.api_key.is_some() {
                "key configured"
            } else {
                "no API key"
            }
        )
    );
    if settings.api_key.is_none() {
        log_init_warning!("No OpenAI API key configured; every chat will answer from the pattern table");
    }
    let client = Arc::new(OpenAiClient::new(settings)?);

    // [2/5] Decision pipeline
    let patterns = PatternTable::builtin()?;
    log_init_step!(
        2,
        5,
        "Decider",
        format!("{} fallback patterns", patterns.len())
    );
    let decider = Arc::new(ResponseDecider::new(
        client,
        patterns,
        Box::new(UniformPicker),
    ));

    // [3/5] Session store
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(
        config.gateway.session_ttl_secs,
    )));
    log_init_step!(
        3,
        5,
        "Session store",
        format!("in-memory, {}s idle TTL", config.gateway.session_ttl_secs)
    );

    // [4/5] Rate limiters
    let limits = Arc::new(RateLimits::new(&config.gateway));
    log_init_step!(
        4,
        5,
        "Rate limits",
        format!(
            "{}/min chat, {}/hour global",
            config.gateway.chat_rate_limit_per_minute, config.gateway.global_rate_limit_per_hour
        )
    );

    let state = AppState {
        config: Arc::new(config),
        decider,
        sessions,
        limits,
    };

    // [5/5] Router + middleware
    let app = app_from_state(state);
    log_init_step!(5, 5, "Router", "routes + middleware configured");

    overall_timer.finish();
    Ok(app)
}

/// Build the router from prepared state.
///
/// Split out of [`create_app`] so integration tests can inject their own
/// decider and limits.
pub fn app_from_state(state: AppState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);
    let timeout = Duration::from_secs(state.config.server.timeout_secs);

    api::create_router()
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            chat_rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit_middleware,
        ))
        // Outermost so rate-limited responses are marked uncacheable too.
        .layer(axum::middleware::from_fn(no_store_middleware))
        .with_state(state)
}

/// CORS layer from configured origins. An empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    }
}

/// Mark API responses uncacheable unless a handler already set a policy.
async fn no_store_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
    }
    response
}

/// Build LLM settings from app config.
fn llm_settings(config: &AppConfig) -> LlmSettings {
    let openai = &config.providers.openai;

    LlmSettings {
        base_url: openai
            .base_url
            .clone()
            .unwrap_or_else(|| llm::DEFAULT_BASE_URL.to_string()),
        api_key: openai.api_key.clone(),
        model: config.llm.model.clone(),
        timeout_secs: config.llm.timeout_secs,
    }
}
