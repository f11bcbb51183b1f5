//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use taskchat_core::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Runtime configuration for taskchat-server.
///
/// Every field has a default, so the server starts without any environment
/// set. Chat requests fail with an upstream error until `GEMINI_API_KEY` is
/// provided.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,

    /// Upper bound on one model call.
    pub llm_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: true,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_owned(),
            gemini_base_url: DEFAULT_BASE_URL.to_owned(),
            llm_timeout: Duration::from_secs(30),
        }
    }
}

// The API key must never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_swagger", &self.enable_swagger)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("llm_timeout", &self.llm_timeout)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("TASKCHAT_BIND", &defaults.bind_address),
            log_level: env_or("TASKCHAT_LOG", &defaults.log_level),
            log_json: parse_bool("TASKCHAT_LOG_JSON", defaults.log_json),
            cors_allowed_origins: env_opt("TASKCHAT_CORS_ORIGINS"),
            enable_swagger: parse_bool("TASKCHAT_ENABLE_SWAGGER", defaults.enable_swagger),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("TASKCHAT_GEMINI_MODEL", &defaults.gemini_model),
            gemini_base_url: env_or("TASKCHAT_GEMINI_BASE_URL", &defaults.gemini_base_url),
            llm_timeout: Duration::from_secs(parse_env(
                "TASKCHAT_LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )),
        }
    }
}

/// Load `.env` from the working directory into the process environment.
///
/// Variables already set win. A missing file is `Ok(None)`.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
