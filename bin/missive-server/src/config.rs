//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

use clap::Parser;

/// Runtime configuration for missive-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://missive.db"`). The file is
    /// created on first start.
    pub database_url: String,

    /// Upper bound on pooled SQLite connections. Ignored for `:memory:`
    /// databases, which always use a single connection.
    pub db_max_connections: u32,

    /// Prefix under which the message and health routes are mounted
    /// (default: `"/api"`). Empty mounts them at the root.
    pub api_prefix: String,

    /// Time budget for the database probe behind the health endpoint.
    pub health_timeout: Duration,

    /// Comma-separated CORS origin allow-list. `None` permits every origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs are also written to daily-rotated files in this directory.
    pub log_dir: Option<String>,
}

/// Command-line overrides; each flag wins over its environment variable.
#[derive(Debug, Parser)]
#[command(name = "missive-server", version, about = "HTTP backend for the message board")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long)]
    pub bind: Option<String>,

    /// SQLite database URL.
    #[arg(long)]
    pub database_url: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        Self {
            bind_address: env_or("MISSIVE_BIND", "0.0.0.0:8080"),
            database_url: env_or("MISSIVE_DATABASE_URL", "sqlite://missive.db"),
            db_max_connections: parse_or(lookup("MISSIVE_DB_MAX_CONNECTIONS"), 5),
            api_prefix: normalize_prefix(&env_or("MISSIVE_API_PREFIX", "/api")),
            health_timeout: Duration::from_millis(parse_or(
                lookup("MISSIVE_HEALTH_TIMEOUT_MS"),
                2000,
            )),
            cors_allowed_origins: lookup("MISSIVE_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_swagger: lookup("MISSIVE_ENABLE_SWAGGER")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            log_level: env_or("MISSIVE_LOG", "info"),
            log_json: lookup("MISSIVE_LOG_JSON").map(|v| parse_flag(&v)).unwrap_or(false),
            log_dir: lookup("MISSIVE_LOG_DIR").filter(|v| !v.trim().is_empty()),
        }
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(bind) = cli.bind {
            self.bind_address = bind;
        }
        if let Some(url) = cli.database_url {
            self.database_url = url;
        }
        self
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_flag(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

/// `"api/"` → `"/api"`, `"/"` → `""`.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
