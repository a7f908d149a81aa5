// ── Keepsake Atoms: Collaborator Traits ────────────────────────────────────
// Seams between the retrieval orchestrator and its two external services.
// The orchestrator holds type-erased trait objects, so tests substitute
// in-memory fakes without touching the network.

use async_trait::async_trait;

use crate::atoms::error::KeepsakeResult;
use crate::atoms::types::MemorySnippet;

/// Namespace-scoped search over previously indexed memory text.
#[async_trait]
pub trait VectorMemory: Send + Sync {
    /// Ranked free-text search; returns up to `top_k` snippets, best first.
    /// No relevance threshold is applied — all results come back regardless
    /// of score.
    async fn semantic_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> KeepsakeResult<Vec<MemorySnippet>>;

    /// Exact-match lookup on the `file` metadata field. Result order carries
    /// no ranking meaning; callers consume the first entry only.
    async fn file_lookup(
        &self,
        file_id: &str,
        limit: usize,
    ) -> KeepsakeResult<Vec<MemorySnippet>>;
}

/// Single-turn prompt-in, text-out completion. No conversation state is kept
/// across calls — each request carries the full constructed prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> KeepsakeResult<String>;
}
