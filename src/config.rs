//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for confab-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set (though without `OPENAI_API_KEY`
/// the completion endpoint will reject every call).
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://confab.db"`).
    pub database_url: String,

    /// API key for the completion service, read from `OPENAI_API_KEY` (the
    /// stock variable name, deliberately not `CONFAB_`-prefixed).  May be
    /// empty at startup; completions then fail at call time, not boot time.
    pub openai_api_key: String,

    /// Model identifier sent with every completion request
    /// (default: `"gpt-4o"`).
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    /// (default: `"https://api.openai.com/v1"`).
    pub openai_base: String,

    /// Comma-separated list of allowed CORS origins.
    /// Unset means every origin is allowed.
    pub cors_allowed_origins: Option<String>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui` (default: `true`).
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CONFAB_BIND", "0.0.0.0:3000"),
            database_url: env_or("CONFAB_DATABASE_URL", "sqlite://confab.db"),
            openai_api_key: env_or("OPENAI_API_KEY", ""),
            model: env_or("CONFAB_MODEL", "gpt-4o"),
            openai_base: env_or("CONFAB_OPENAI_BASE", "https://api.openai.com/v1"),
            cors_allowed_origins: std::env::var("CONFAB_CORS_ORIGINS").ok(),
            log_level: env_or("CONFAB_LOG", "info"),
            log_json: bool_env("CONFAB_LOG_JSON", false),
            enable_swagger: bool_env("CONFAB_ENABLE_SWAGGER", true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
