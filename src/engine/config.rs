// ── Keepsake Engine: Configuration ─────────────────────────────────────────
// Environment-driven config, resolved once at startup. Required credentials
// fail fast with a Config error; secrets are logged as a short prefix only.

use std::path::PathBuf;

use log::info;

use crate::atoms::constants::{INGEST_BATCH_SIZE, INGEST_MAX_ATTEMPTS, INGEST_POLL_SECS};
use crate::atoms::error::{KeepsakeError, KeepsakeResult};

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the vector memory service.
    pub moorcheh_api_key: String,
    pub moorcheh_base_url: String,
    /// Logical partition scoping which indexed memories are searchable for
    /// this deployment. Injected everywhere — never hardwired in the engine.
    pub namespace: String,

    /// When false, the semantic path returns the assembled context block
    /// directly instead of conditioning a generative model on it.
    pub generative_enabled: bool,
    /// Required only when `generative_enabled`.
    pub google_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,

    pub bind_address: String,
    pub port: u16,
    /// Root for the SQLite database and stored images.
    pub data_dir: PathBuf,

    pub ingest_enabled: bool,
    pub ingest_poll_secs: u64,
    pub ingest_batch_size: i64,
    pub ingest_max_attempts: i64,
}

impl Config {
    pub fn from_env() -> KeepsakeResult<Self> {
        let moorcheh_api_key = require("MOORCHEH_API_KEY")?;
        let namespace = require("MEMORY_NAMESPACE")?;
        let generative_enabled = env_bool("GENERATIVE_ENABLED", true);

        let google_api_key = std::env::var("GOOGLE_API_KEY").unwrap_or_default();
        if generative_enabled && google_api_key.is_empty() {
            return Err(KeepsakeError::Config(
                "GOOGLE_API_KEY is required when GENERATIVE_ENABLED is on".into(),
            ));
        }

        let data_dir = match std::env::var("KEEPSAKE_DATA_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir().unwrap_or_default().join(".keepsake"),
        };

        let config = Config {
            moorcheh_api_key,
            moorcheh_base_url: env_or("MOORCHEH_BASE_URL", "https://api.moorcheh.ai/v1"),
            namespace,
            generative_enabled,
            google_api_key,
            gemini_base_url: env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.5-flash"),
            bind_address: env_or("BIND_ADDRESS", "127.0.0.1"),
            port: env_parsed("PORT", 8080),
            data_dir,
            ingest_enabled: env_bool("INGEST_ENABLED", true),
            ingest_poll_secs: env_parsed("INGEST_POLL_SECS", INGEST_POLL_SECS),
            ingest_batch_size: env_parsed("INGEST_BATCH_SIZE", INGEST_BATCH_SIZE),
            ingest_max_attempts: env_parsed("INGEST_MAX_ATTEMPTS", INGEST_MAX_ATTEMPTS),
        };

        info!(
            "[config] namespace={} generative={} moorcheh_key={}… ingest={}",
            config.namespace,
            config.generative_enabled,
            key_prefix(&config.moorcheh_api_key),
            config.ingest_enabled,
        );
        Ok(config)
    }
}

fn require(name: &str) -> KeepsakeResult<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(KeepsakeError::Config(format!("{name} is not set"))),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// First six characters of a secret — enough to tell keys apart in logs
/// without ever logging the full value.
pub fn key_prefix(key: &str) -> &str {
    let end = key
        .char_indices()
        .nth(6)
        .map(|(i, _)| i)
        .unwrap_or(key.len());
    &key[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_prefix_is_short_and_safe() {
        assert_eq!(key_prefix("sk-abcdef123456"), "sk-abc");
        assert_eq!(key_prefix("ab"), "ab");
        assert_eq!(key_prefix(""), "");
    }
}
