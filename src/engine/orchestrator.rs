// ── Keepsake Engine: Retrieval Orchestrator ────────────────────────────────
// The core answer flow: classify the latest patient message, query the
// vector memory service, assemble context, apply the defer-to-human policy,
// and optionally condition the generative model on the context.
//
// Strictly sequential, request-scoped, stateless: at most two outbound calls
// (search, then optionally generation), nothing mutated or persisted here.
//
// Answer policy:
//   • File lookup — first snippet's text verbatim; never generative.
//   • Semantic, empty context — the fixed deferral sentence, both modes.
//   • Semantic, generative on — completion text verbatim.
//   • Semantic, generative off — the context block itself.
// A deferral is a successful answer. Upstream failures propagate as errors;
// the server boundary turns them into the safe failure sentence + 500.

use std::sync::Arc;

use log::{info, warn};

use crate::atoms::constants::{
    ANSWER_WORD_LIMIT, DEFERRAL_SENTENCE, FILE_LOOKUP_LIMIT, SEARCH_TOP_K,
};
use crate::atoms::error::KeepsakeResult;
use crate::atoms::traits::{AnswerGenerator, VectorMemory};
use crate::atoms::types::{truncate_utf8, ChatTurn, MemorySnippet, RetrievalQuery};
use crate::engine::classify::classify;

pub struct Orchestrator {
    vector: Arc<dyn VectorMemory>,
    /// `None` runs the direct (non-generative) semantic path.
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl Orchestrator {
    pub fn new(vector: Arc<dyn VectorMemory>, generator: Option<Arc<dyn AnswerGenerator>>) -> Self {
        Orchestrator { vector, generator }
    }

    /// Answer the conversation's latest user message.
    ///
    /// A missing or empty turn list behaves as an empty semantic query — the
    /// search simply finds nothing and the deferral sentence comes back.
    pub async fn answer(&self, turns: &[ChatTurn]) -> KeepsakeResult<String> {
        let question = turns.last().map(|t| t.content.as_str()).unwrap_or("");
        info!("[chat] question: \"{}\"", truncate_utf8(question.trim(), 120));

        match classify(question) {
            RetrievalQuery::FileLookup { file_id } => self.answer_file_lookup(&file_id).await,
            RetrievalQuery::Semantic { text } => self.answer_semantic(&text).await,
        }
    }

    async fn answer_file_lookup(&self, file_id: &str) -> KeepsakeResult<String> {
        let snippets = self.vector.file_lookup(file_id, FILE_LOOKUP_LIMIT).await?;

        // Only the first result is consumed; the generative step never runs
        // on this path.
        match snippets.first().and_then(|s| s.text.as_deref()) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => {
                info!("[chat] file {file_id} has no stored text, deferring");
                Ok(DEFERRAL_SENTENCE.to_string())
            }
        }
    }

    async fn answer_semantic(&self, question: &str) -> KeepsakeResult<String> {
        let snippets = self.vector.semantic_search(question, SEARCH_TOP_K).await?;
        let context = build_context(&snippets);

        if context.is_empty() {
            info!("[chat] no usable context, deferring");
            return Ok(DEFERRAL_SENTENCE.to_string());
        }

        let Some(generator) = &self.generator else {
            return Ok(context);
        };

        let prompt = build_prompt(&context, question);
        let answer = generator.generate(&prompt).await?;

        let words = answer.split_whitespace().count();
        if words > ANSWER_WORD_LIMIT {
            // The length bound is instruction-only; surface drift in logs.
            warn!("[chat] completion is {words} words, over the {ANSWER_WORD_LIMIT}-word instruction");
        }
        Ok(answer)
    }
}

// ── Context assembly ───────────────────────────────────────────────────────

/// Join the non-empty snippet texts with a blank line, order preserved.
/// Empty when no snippet carries text.
pub fn build_context(snippets: &[MemorySnippet]) -> String {
    snippets
        .iter()
        .filter_map(|s| s.text.as_deref())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The full prompt for the generative step: persona, retrieved memory,
/// question, and the strict answer policy.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "ROLE: You are \"Keepsake,\" a compassionate dementia care assistant.\n\
         \n\
         RETRIEVED MEMORY:\n\
         {context}\n\
         \n\
         USER QUESTION:\n\
         {question}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Answer using ONLY the provided MEMORY.\n\
         2. If the answer isn't in the memory, say \"{DEFERRAL_SENTENCE}\"\n\
         3. Keep the answer under {ANSWER_WORD_LIMIT} words.\n\
         4. Speak slowly and clearly."
    )
}
