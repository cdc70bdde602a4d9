use std::str::FromStr;

use marknotes_core::accounts::DEFAULT_MIN_PASSWORD_LENGTH;

use crate::auth::jwt::JwtConfig;

/// Default access token lifetime: one day.
const DEFAULT_JWT_EXPIRY_MINS: i64 = 24 * 60;
/// One year.
const MAX_JWT_EXPIRY_MINS: i64 = 365 * 24 * 60;

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Everything except the database URL and the JWT secret has a default
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// JWT signing secret and token lifetime.
    pub jwt: JwtConfig,
    /// Minimum accepted password length at registration (default: `8`).
    pub password_min_length: usize,
    /// Log output format (default: text).
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | required                   |
    /// | `JWT_SECRET`           | required                   |
    /// | `JWT_EXPIRY_MINS`      | `1440`                     |
    /// | `PASSWORD_MIN_LENGTH`  | `8`                        |
    /// | `LOG_FORMAT`           | `text`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 5000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let database_url = required(&lookup, "DATABASE_URL")?;

        let secret = required(&lookup, "JWT_SECRET")?;
        let token_expiry_mins: i64 = parse_or(&lookup, "JWT_EXPIRY_MINS", DEFAULT_JWT_EXPIRY_MINS)?;
        if !(1..=MAX_JWT_EXPIRY_MINS).contains(&token_expiry_mins) {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRY_MINS",
                value: token_expiry_mins.to_string(),
                reason: format!("must be between 1 and {MAX_JWT_EXPIRY_MINS}"),
            });
        }

        let password_min_length: usize =
            parse_or(&lookup, "PASSWORD_MIN_LENGTH", DEFAULT_MIN_PASSWORD_LENGTH)?;
        let log_format: LogFormat = parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt: JwtConfig {
                secret,
                token_expiry_mins,
            },
            password_min_length,
            log_format,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
