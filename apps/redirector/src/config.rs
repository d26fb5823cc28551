//! Centralized configuration for the redirector.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than at request time.

use axum::http::HeaderValue;
use std::env;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use domain::sequence::SequencePolicy;

/// Storage backend provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// In-memory storage (data lost on restart)
    Memory,
    /// SQLite file-based storage
    Sqlite,
}

impl StorageProvider {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Sqlite
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (default: 0.0.0.0)
    pub host: IpAddr,
    /// Server port (default: 5000)
    pub port: u16,
    /// Visitor sequence: step count, per-step wait, final redirect delay
    pub policy: SequencePolicy,
    /// Short-code length (default: 6)
    pub code_len: usize,
    /// Storage provider
    pub storage_provider: StorageProvider,
    /// SQLite database path (when using sqlite storage)
    pub db_path: PathBuf,
    /// Absolute origin used in generated short URLs; request Host otherwise
    pub public_origin: Option<String>,
    /// CORS allow origin
    pub cors_allow_origin: HeaderValue,
    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// Fails fast on invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port = parse_or(&lookup, "PORT", 5000u16)?;

        let defaults = SequencePolicy::default();
        let steps = parse_or(&lookup, "INTERSTITIAL_STEPS", defaults.steps)?;
        if steps == 0 {
            return Err(ConfigError {
                field: "INTERSTITIAL_STEPS",
                message: "must be at least 1".into(),
            });
        }
        let policy = SequencePolicy {
            steps,
            wait_seconds: parse_or(&lookup, "WAIT_SECONDS", defaults.wait_seconds)?,
            final_delay_ms: parse_or(&lookup, "FINAL_DELAY_MS", defaults.final_delay_ms)?,
        };

        let code_len = parse_or(&lookup, "CODE_LEN", domain::code::DEFAULT_CODE_LEN)?;
        if !(1..=32).contains(&code_len) {
            return Err(ConfigError {
                field: "CODE_LEN",
                message: format!("must be between 1 and 32, got {}", code_len),
            });
        }

        let storage_provider = StorageProvider::from_str(
            &lookup("STORAGE_PROVIDER").unwrap_or_else(|| "sqlite".into()),
        );

        let db_path = lookup("DB_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/links.db"));

        let public_origin = lookup("PUBLIC_ORIGIN")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        if let Some(origin) = &public_origin {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ConfigError {
                    field: "PUBLIC_ORIGIN",
                    message: format!("'{}' must start with http:// or https://", origin),
                });
            }
        }

        let cors_origin_str = lookup("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into());
        let cors_allow_origin = if cors_origin_str == "*" {
            HeaderValue::from_static("*")
        } else {
            HeaderValue::from_str(&cors_origin_str).map_err(|e| ConfigError {
                field: "CORS_ALLOW_ORIGIN",
                message: format!("Invalid header value '{}': {}", cors_origin_str, e),
            })?
        };

        let log_format =
            LogFormat::from_str(&lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        Ok(Self {
            host,
            port,
            policy,
            code_len,
            storage_provider,
            db_path,
            public_origin,
            cors_allow_origin,
            log_format,
        })
    }

    /// Log notes about settings that are valid but probably unintended.
    pub fn warn_if_unusual(&self) {
        if self.storage_provider == StorageProvider::Memory {
            tracing::warn!("STORAGE_PROVIDER=memory: links are lost when the process exits");
        }
        if self.policy.wait_seconds == 0 {
            tracing::warn!("WAIT_SECONDS=0: interstitial pages unlock immediately");
        }
    }
}

fn parse_or<T, F>(lookup: &F, field: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(field).map(|s| s.trim().to_string()) {
        None => Ok(default),
        Some(s) if s.is_empty() => Ok(default),
        Some(s) => s.parse().map_err(|e: T::Err| ConfigError {
            field,
            message: format!("invalid value '{}': {}", s, e),
        }),
    }
}
