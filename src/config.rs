//! Runtime configuration from environment variables.
//!
//! Only `GEMINI_API_KEY` is required. Every other value has a default; a set
//! but unparseable value logs a warning and falls back to that default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::llm::RetryPolicy;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig};
use crate::llm::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_ENV_VAR: &str = "GEMINI_MODEL";
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";
pub const TIMEOUT_ENV_VAR: &str = "GEMINI_TIMEOUT";
pub const MAX_ATTEMPTS_ENV_VAR: &str = "GEMINI_MAX_ATTEMPTS";
pub const RETRY_DELAY_ENV_VAR: &str = "GEMINI_RETRY_DELAY";
pub const SESSION_TTL_ENV_VAR: &str = "SESSION_TTL";

/// Default Gemini request timeout (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default lifetime of a generated session (1 hour).
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Everything the service needs besides the listen address.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub model: String,
    pub retry: RetryPolicy,
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = match env::var(API_KEY_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => return Err(ConfigError::MissingVar(API_KEY_ENV_VAR)),
        };

        let base_url = match env::var(BASE_URL_ENV_VAR) {
            Ok(v) if !v.is_empty() => {
                if !(v.starts_with("http://") || v.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        name: BASE_URL_ENV_VAR,
                        value: v,
                        reason: "must start with http:// or https://".to_string(),
                    });
                }
                v
            }
            _ => DEFAULT_BASE_URL.to_string(),
        };

        let model = match env::var(MODEL_ENV_VAR) {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => DEFAULT_MODEL.to_string(),
        };

        let timeout = Duration::from_secs(parse_env(TIMEOUT_ENV_VAR, DEFAULT_TIMEOUT_SECS, |s| *s > 0));
        let max_attempts = parse_env(MAX_ATTEMPTS_ENV_VAR, DEFAULT_MAX_ATTEMPTS, |n| *n >= 1);
        // Rejects negative, NaN and values too large for a Duration.
        let base_delay = parse_env(RETRY_DELAY_ENV_VAR, DEFAULT_BASE_DELAY.as_secs_f64(), |s| {
            Duration::try_from_secs_f64(*s).is_ok()
        });
        let base_delay = Duration::try_from_secs_f64(base_delay).unwrap_or(DEFAULT_BASE_DELAY);
        let session_ttl = parse_env(SESSION_TTL_ENV_VAR, DEFAULT_SESSION_TTL_SECS, |s| *s > 0);

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                base_url,
                timeout,
            },
            model,
            retry: RetryPolicy::new(max_attempts, base_delay),
            session_ttl: Duration::from_secs(session_ttl),
        })
    }
}

/// Read `name` as `T`, warning and falling back to `default` when invalid.
fn parse_env<T>(name: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match env::var(name) {
        Ok(v) if !v.is_empty() => match v.trim().parse::<T>() {
            Ok(parsed) if valid(&parsed) => parsed,
            _ => {
                warn!("Invalid {} value '{}', using default {}", name, v, default);
                default
            }
        },
        _ => default,
    }
}
