// ── Keepsake Engine: Query Classifier ──────────────────────────────────────
// Decides whether the latest patient message is a direct memory-file lookup
// (`#file:<identifier>`) or a free-text semantic search. A message matching
// the file pattern never falls through to semantic search — with one guarded
// exception: an empty identifier (`#file:` alone) is meaningless as a lookup
// and is classified as a semantic query over the original text instead.

use std::sync::LazyLock;

use regex::Regex;

use crate::atoms::types::RetrievalQuery;

/// Anchored on the trimmed message, case-insensitive.
static FILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#file:(.+)$").expect("file pattern is valid"));

pub fn classify(raw: &str) -> RetrievalQuery {
    let trimmed = raw.trim();

    if let Some(caps) = FILE_PATTERN.captures(trimmed) {
        let file_id = caps[1].trim();
        if !file_id.is_empty() {
            return RetrievalQuery::FileLookup {
                file_id: file_id.to_string(),
            };
        }
        // Whitespace-only identifier: fall through to semantic search.
    }

    RetrievalQuery::Semantic {
        text: trimmed.to_string(),
    }
}
