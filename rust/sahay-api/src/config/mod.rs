//! Configuration management.
//!
//! Configuration is loaded from defaults, an optional config file, and
//! environment variables (`SAHAY`-prefixed, `__` as section separator),
//! with well-known overrides like `OPENAI_API_KEY` applied last.

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Gateway configuration (rate limiting, sessions, CORS).
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// LLM provider configuration.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Default LLM settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment and config files.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/sahay-api").required(false))
            .add_source(
                config::Environment::with_prefix("SAHAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize().unwrap_or_default();

        // Provider API key overrides
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            app_config.providers.openai.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            app_config.providers.openai.base_url = Some(url);
        }

        Ok(app_config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Per-client chat requests per minute.
    #[serde(default = "default_chat_rate_limit")]
    pub chat_rate_limit_per_minute: u32,
    /// Rate limit burst size.
    #[serde(default = "default_rate_burst")]
    pub rate_limit_burst: u32,
    /// Global requests per hour across all clients.
    #[serde(default = "default_global_rate_limit")]
    pub global_rate_limit_per_hour: u32,
    /// Idle session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_chat_rate_limit() -> u32 {
    10
}

fn default_rate_burst() -> u32 {
    10
}

fn default_global_rate_limit() -> u32 {
    50
}

fn default_session_ttl() -> u64 {
    86400 // 1 day
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chat_rate_limit_per_minute: default_chat_rate_limit(),
            rate_limit_burst: default_rate_burst(),
            global_rate_limit_per_hour: default_global_rate_limit(),
            session_ttl_secs: default_session_ttl(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// OpenAI-compatible provider configuration.
    #[serde(default)]
    pub openai: ProviderConfig,
}

/// Individual provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
}

/// Default LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_policy() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gateway.chat_rate_limit_per_minute, 10);
        assert_eq!(config.gateway.session_ttl_secs, 86400);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!(config.providers.openai.api_key.is_none());
    }

    #[test]
    fn sections_deserialize_from_partial_toml() {
        let config: AppConfig = toml_like(r#"{"gateway": {"chat_rate_limit_per_minute": 3}}"#);
        assert_eq!(config.gateway.chat_rate_limit_per_minute, 3);
        // Untouched sections keep their defaults.
        assert_eq!(config.gateway.rate_limit_burst, 10);
        assert_eq!(config.server.port, 8080);
    }

    fn toml_like(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }
}
