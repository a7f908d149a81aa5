// ── Keepsake Atoms: Constants ──────────────────────────────────────────────
// All named constants for the crate live here.

// ── Patient-facing sentences ───────────────────────────────────────────────
// Both are rendered (and often spoken via TTS) directly to a vulnerable end
// user. Treat the exact wording as stable; downstream audio prompts and
// caregiver training material quote these verbatim.

/// Spoken when no adequate memory could be found for a question.
pub const DEFERRAL_SENTENCE: &str = "I'm not sure, let's call Sarah.";

/// Spoken when anything in the answer pipeline fails.
pub const FAILURE_SENTENCE: &str = "I am having trouble thinking right now.";

// ── Retrieval parameters ───────────────────────────────────────────────────

/// Number of ranked snippets requested per semantic search.
pub const SEARCH_TOP_K: usize = 3;

/// Result cap for metadata-filtered file lookups. Only the first result is
/// ever consumed; the cap just bounds the response size.
pub const FILE_LOOKUP_LIMIT: usize = 3;

/// The prompt instructs the model to stay under this many words. The bound
/// is instruction-only — completions that exceed it are logged, not cut.
pub const ANSWER_WORD_LIMIT: usize = 20;

// ── Outbound HTTP timeouts ─────────────────────────────────────────────────
// The patient is waiting for a spoken reply; a fast failure with the
// fallback sentence beats a slow answer. No retries anywhere.

pub const CONNECT_TIMEOUT_SECS: u64 = 5;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ── Diagnostic truncation ──────────────────────────────────────────────────
// Upstream bodies are logged truncated and embedded in error messages even
// shorter. Raw upstream text never reaches the caller either way.

pub const ERROR_BODY_MAX: usize = 200;
pub const LOG_BODY_MAX: usize = 500;

// ── Ingestion worker defaults ──────────────────────────────────────────────
// Used by engine/ingest.rs; each is overridable via INGEST_* env vars.

pub const INGEST_POLL_SECS: u64 = 20;
pub const INGEST_BATCH_SIZE: i64 = 50;
pub const INGEST_MAX_ATTEMPTS: i64 = 5;
