// ── Keepsake Atoms: Error Types ────────────────────────────────────────────
// Single canonical error enum for the crate, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, DB, Upstream, Config…).
//   • `#[from]` wires std/external error conversions automatically.
//   • No variant carries secret material (API keys) in its message.
//   • Upstream messages are pre-truncated by the constructor — errors may be
//     logged freely without dumping whole response bodies.

use thiserror::Error;

use crate::atoms::constants::ERROR_BODY_MAX;
use crate::atoms::types::truncate_utf8;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum KeepsakeError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// SQLite / rusqlite database failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Vector or generative service returned non-success or a malformed
    /// payload. `status` is 0 when the request never produced a response.
    #[error("Upstream error: {service} status={status}: {message}")]
    Upstream {
        service: String,
        status: u16,
        message: String,
    },

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl KeepsakeError {
    /// Create an upstream-service error with a truncated detail message.
    pub fn upstream(service: impl Into<String>, status: u16, message: &str) -> Self {
        Self::Upstream {
            service: service.into(),
            status,
            message: truncate_utf8(message, ERROR_BODY_MAX).to_string(),
        }
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations return this type. The server boundary converts it
/// into the fixed patient-safe failure sentence plus a 500 status.
pub type KeepsakeResult<T> = Result<T, KeepsakeError>;
