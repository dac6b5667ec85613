//! Configuration management for context-db-mcp
//!
//! All configuration is environment-sourced, read once at startup, and
//! immutable for the process lifetime. Primary variables use the
//! `CONTEXT_DB_` prefix; the unprefixed OpenAI names are accepted as
//! fallbacks so existing shell profiles keep working.

use crate::error::{Error, Result};
use tracing::debug;

/// Default request timeout for remote API calls, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: f64 = 120.0;

/// Default maximum number of search results when the caller omits a cap
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Process-wide configuration, loaded once from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key used for all vector store operations
    pub api_key: String,

    /// Optional OpenAI organization identifier
    pub organization: Option<String>,

    /// Optional OpenAI project identifier
    pub project: Option<String>,

    /// Base URL of the vector store API
    pub api_base_url: String,

    /// Vector store ID used when a tool call omits an explicit identifier
    pub default_vector_store_id: Option<String>,

    /// Vector store name to find or create when no ID is resolvable
    pub default_vector_store_name: Option<String>,

    /// Request timeout applied to every remote API call
    pub request_timeout_seconds: f64,

    /// Fallback maximum number of search results
    pub default_max_results: u32,

    /// Application log level (e.g. info, debug)
    pub log_level: String,

    /// Whether name-based resolution may create a store on read paths
    /// (retrieval and info). Ingestion always creates when needed.
    pub create_if_missing: bool,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Fails when no API key is set; everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let api_key = get(&["CONTEXT_DB_OPENAI_API_KEY", "OPENAI_API_KEY"]).ok_or_else(|| {
            Error::Config(
                "CONTEXT_DB_OPENAI_API_KEY (or OPENAI_API_KEY) must be set".to_string(),
            )
        })?;

        let request_timeout_seconds = match get(&["CONTEXT_DB_REQUEST_TIMEOUT_SECONDS"]) {
            Some(raw) => raw.parse::<f64>().map_err(|_| {
                Error::Config(format!(
                    "Invalid CONTEXT_DB_REQUEST_TIMEOUT_SECONDS '{}': expected a number of seconds",
                    raw
                ))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECONDS,
        };
        if !request_timeout_seconds.is_finite() || request_timeout_seconds <= 0.0 {
            return Err(Error::Config(format!(
                "Request timeout must be a positive number of seconds, got {}",
                request_timeout_seconds
            )));
        }

        let default_max_results = match get(&["CONTEXT_DB_DEFAULT_MAX_RESULTS"]) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                Error::Config(format!(
                    "Invalid CONTEXT_DB_DEFAULT_MAX_RESULTS '{}': expected an integer",
                    raw
                ))
            })?,
            None => DEFAULT_MAX_RESULTS,
        };

        let create_if_missing = match get(&["CONTEXT_DB_CREATE_IF_MISSING"]) {
            Some(raw) => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(Error::Config(format!(
                        "Invalid CONTEXT_DB_CREATE_IF_MISSING '{}': expected true or false",
                        other
                    )))
                }
            },
            None => true,
        };

        let config = Self {
            api_key,
            organization: get(&[
                "CONTEXT_DB_OPENAI_ORGANIZATION",
                "CONTEXT_DB_OPENAI_ORG",
                "OPENAI_ORGANIZATION",
                "OPENAI_ORG",
            ]),
            project: get(&["CONTEXT_DB_OPENAI_PROJECT", "OPENAI_PROJECT"]),
            api_base_url: get(&["CONTEXT_DB_API_BASE_URL"])
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            default_vector_store_id: get(&[
                "CONTEXT_DB_VECTOR_STORE_ID",
                "OPENAI_VECTOR_STORE_ID",
                "VECTOR_STORE_ID",
            ]),
            default_vector_store_name: get(&["CONTEXT_DB_VECTOR_STORE_NAME"]),
            request_timeout_seconds,
            default_max_results,
            log_level: get(&["CONTEXT_DB_LOG_LEVEL", "LOG_LEVEL"])
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            create_if_missing,
        };

        debug!(
            "Loaded config: base_url={}, default_store_id={:?}, default_store_name={:?}",
            config.api_base_url, config.default_vector_store_id, config.default_vector_store_name
        );

        Ok(config)
    }
}
