//! Sahay API - supportive chat gateway with crisis detection.
//!
//! This crate provides a small HTTP service that routes user messages
//! through a crisis-aware decision pipeline backed by an
//! OpenAI-compatible LLM API:
//!
//! - **Decider**: keyword crisis scan, remote crisis classification,
//!   remote reply and mood generation, ordered regex fallback table
//! - **Sessions**: in-memory conversation and mood history with capped,
//!   drop-oldest eviction
//! - **Gateway**: per-client and global rate limiting, CORS
//! - **Resources**: static crisis/support helpline catalog
//!
//! # Architecture
//!
//! - [`config`]: Configuration management and environment loading
//! - [`llm`]: LLM client trait and the OpenAI-compatible driver
//! - [`decider`]: The response decision pipeline and its static tables
//! - [`domain`]: Core domain models (moods, results, history records)
//! - [`gateway`]: Rate limiting and the session store
//! - [`api`]: HTTP API endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use sahay_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let app = create_app(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod decider;
pub mod domain;
pub mod gateway;
pub mod llm;
pub mod logging;
pub mod server;

use std::sync::Arc;

use config::AppConfig;
use decider::ResponseDecider;
use gateway::rate_limit::RateLimits;
use gateway::sessions::SessionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Response decision pipeline.
    pub decider: Arc<ResponseDecider>,
    /// In-memory session store.
    pub sessions: Arc<SessionStore>,
    /// Global and per-client rate limiters.
    pub limits: Arc<RateLimits>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"AppConfig")
            .field("decider", &self.decider)
            .field("sessions", &"SessionStore")
            .field("limits", &"RateLimits")
            .finish()
    }
}
