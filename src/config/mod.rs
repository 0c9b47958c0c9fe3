use std::env;
use std::str::FromStr;

/// Which key-value store implementation backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Native Redis protocol over `REDIS_URL`.
    #[default]
    Redis,
    /// Upstash-style REST endpoint over `UPSTASH_REDIS_REST_URL`.
    Rest,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "rest" | "upstash" => Ok(Self::Rest),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Environment variables that are missing or hold unusable values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub rest_url: Option<String>,
    pub rest_token: Option<String>,
    pub session_secret: String,
    pub session_max_age_secs: i64,
    pub secure_cookies: bool,
}

impl AppConfig {
    /// Default session lifetime: 30 days.
    pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

    /// Longest accepted session lifetime: 10 years.
    pub const MAX_SESSION_MAX_AGE_SECS: i64 = 10 * 365 * 24 * 60 * 60;

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            store_backend: parse_store_backend(env::var("STORE_BACKEND").ok().as_deref())?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            rest_url: env::var("UPSTASH_REDIS_REST_URL").ok(),
            rest_token: env::var("UPSTASH_REDIS_REST_TOKEN").ok(),
            session_secret: env::var("SESSION_SECRET").map_err(|_| ConfigError::Missing {
                name: "SESSION_SECRET",
            })?,
            session_max_age_secs: parse_session_max_age(
                env::var("SESSION_MAX_AGE_SECS").ok().as_deref(),
            )?,
            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        })
    }

    /// Configuration for tests and local tooling, independent of the environment.
    pub fn for_secret(session_secret: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:3001".to_string(),
            store_backend: StoreBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            rest_url: None,
            rest_token: None,
            session_secret: session_secret.to_string(),
            session_max_age_secs: Self::DEFAULT_SESSION_MAX_AGE_SECS,
            secure_cookies: false,
        }
    }
}

/// `STORE_BACKEND`, defaulting to Redis when unset. A set but unknown value is an error.
fn parse_store_backend(raw: Option<&str>) -> Result<StoreBackend, ConfigError> {
    match raw {
        None => Ok(StoreBackend::default()),
        Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
            name: "STORE_BACKEND",
            reason,
        }),
    }
}

/// `SESSION_MAX_AGE_SECS`, which must be positive and at most ten years.
fn parse_session_max_age(raw: Option<&str>) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(AppConfig::DEFAULT_SESSION_MAX_AGE_SECS);
    };

    let secs: i64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
        name: "SESSION_MAX_AGE_SECS",
        reason: format!("{raw:?}: {e}"),
    })?;
    if !(1..=AppConfig::MAX_SESSION_MAX_AGE_SECS).contains(&secs) {
        return Err(ConfigError::Invalid {
            name: "SESSION_MAX_AGE_SECS",
            reason: format!(
                "{secs} is outside 1..={}",
                AppConfig::MAX_SESSION_MAX_AGE_SECS
            ),
        });
    }
    Ok(secs)
}
