//! Engine configuration from the environment.
//!
//! `.env.local` / `.env` at the repository root are loaded first (see
//! [`load_dotenv_from_repo_root`]); real environment variables win.

use std::str::FromStr;
use std::time::Duration;

use crate::infrastructure::event_bus::DEFAULT_EVENT_BUS_CAPACITY;

/// Runtime configuration for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Shared bearer token; `None` disables the auth hook.
    pub auth_token: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub audit_log_enabled: bool,
    pub event_bus_capacity: usize,
    /// Comma-separated origins or `*`; `None` disables CORS.
    pub cors_allowed_origins: Option<String>,
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            auth_token: None,
            rate_limit: RateLimitConfig::default(),
            audit_log_enabled: true,
            event_bus_capacity: DEFAULT_EVENT_BUS_CAPACITY,
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = get("SERVER_PORT")
            .or_else(|| get("PORT"))
            .map(|raw| parse_or("SERVER_PORT", &raw, defaults.server_port))
            .unwrap_or(defaults.server_port);

        let rate_limit = RateLimitConfig {
            enabled: get("RATE_LIMIT_ENABLED")
                .map(|raw| parse_bool_or("RATE_LIMIT_ENABLED", &raw, defaults.rate_limit.enabled))
                .unwrap_or(defaults.rate_limit.enabled),
            max_requests: get("RATE_LIMIT_MAX_REQUESTS")
                .map(|raw| {
                    parse_or(
                        "RATE_LIMIT_MAX_REQUESTS",
                        &raw,
                        defaults.rate_limit.max_requests,
                    )
                })
                .unwrap_or(defaults.rate_limit.max_requests),
            window: get("RATE_LIMIT_WINDOW_SECS")
                .map(|raw| {
                    Duration::from_secs(parse_or(
                        "RATE_LIMIT_WINDOW_SECS",
                        &raw,
                        defaults.rate_limit.window.as_secs(),
                    ))
                })
                .unwrap_or(defaults.rate_limit.window),
        };

        Self {
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            auth_token: get("AUTH_TOKEN"),
            rate_limit,
            audit_log_enabled: get("AUDIT_LOG_ENABLED")
                .map(|raw| parse_bool_or("AUDIT_LOG_ENABLED", &raw, defaults.audit_log_enabled))
                .unwrap_or(defaults.audit_log_enabled),
            event_bus_capacity: get("EVENT_BUS_CAPACITY")
                .map(|raw| parse_or("EVENT_BUS_CAPACITY", &raw, defaults.event_bus_capacity))
                .unwrap_or(defaults.event_bus_capacity),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: &str, default: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = raw, %default, "Invalid value, using default");
        default
    })
}

fn parse_bool_or(key: &str, raw: &str, default: bool) -> bool {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(key, value = raw, default, "Invalid boolean, using default");
            default
        }
    }
}

/// Load `.env.local` then `.env` from the repository root, if present.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
