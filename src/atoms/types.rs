// ── Keepsake Atoms: Core Types ─────────────────────────────────────────────
// Request-scoped retrieval types plus the stored-memory record.
// Everything here is plain data; the engine layer owns all behavior.

use serde::{Deserialize, Serialize};

// ── Chat ───────────────────────────────────────────────────────────────────

/// One role-tagged turn of the patient conversation. Only the most recent
/// turn's `content` is consumed by retrieval; history ordering is insertion
/// order and otherwise unused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// ── Retrieval ──────────────────────────────────────────────────────────────

/// How the latest patient message should be answered. The two variants are
/// mutually exclusive: a message matching the `#file:` pattern is always a
/// file lookup, never a semantic search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalQuery {
    /// Exact metadata-filtered lookup of a single indexed memory.
    FileLookup { file_id: String },
    /// Ranked semantic search over the patient's namespace.
    Semantic { text: String },
}

/// A retrieved unit of memory text. `text` may be absent or empty — filtering
/// happens at context-assembly time, not in the client. Order is as returned
/// by the vector service (rank-descending); never re-sorted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySnippet {
    pub text: Option<String>,
    pub score: Option<f64>,
}

// ── Stored memories ────────────────────────────────────────────────────────

/// Ingestion status of a caregiver-submitted memory. The chat path only ever
/// sees the downstream effect: `Pending`/`Failed` records are simply absent
/// from search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Pending,
    Indexed,
    Failed,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Pending => "pending",
            IngestStatus::Indexed => "indexed",
            IngestStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "indexed" => IngestStatus::Indexed,
            "failed" => IngestStatus::Failed,
            _ => IngestStatus::Pending,
        }
    }
}

/// A caregiver-submitted memory as stored in SQLite.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryRecord {
    pub id: String,
    pub text: String,
    pub author: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub status: IngestStatus,
    pub attempts: i64,
    #[serde(rename = "indexedAt")]
    pub indexed_at: Option<String>,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// Truncate a string to at most `max` bytes without splitting a UTF-8
/// character. Used for log lines and error messages carrying upstream bodies.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
