// End-to-end answer-flow tests: orchestrator policy with fake collaborators,
// plus the HTTP chat boundary's status/sentence contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use keepsake::atoms::constants::{DEFERRAL_SENTENCE, FAILURE_SENTENCE};
use keepsake::atoms::error::{KeepsakeError, KeepsakeResult};
use keepsake::atoms::traits::{AnswerGenerator, VectorMemory};
use keepsake::atoms::types::{ChatTurn, MemorySnippet};
use keepsake::engine::orchestrator::Orchestrator;

// ── Fakes ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeVector {
    semantic: Vec<MemorySnippet>,
    file: Vec<MemorySnippet>,
    fail: bool,
    semantic_calls: AtomicUsize,
    file_calls: AtomicUsize,
}

impl FakeVector {
    fn semantic(snippets: Vec<MemorySnippet>) -> Self {
        FakeVector { semantic: snippets, ..Default::default() }
    }

    fn file(snippets: Vec<MemorySnippet>) -> Self {
        FakeVector { file: snippets, ..Default::default() }
    }

    fn failing() -> Self {
        FakeVector { fail: true, ..Default::default() }
    }
}

#[async_trait]
impl VectorMemory for FakeVector {
    async fn semantic_search(&self, _query: &str, _top_k: usize) -> KeepsakeResult<Vec<MemorySnippet>> {
        self.semantic_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KeepsakeError::upstream("moorcheh", 503, "service unavailable"));
        }
        Ok(self.semantic.clone())
    }

    async fn file_lookup(&self, _file_id: &str, _limit: usize) -> KeepsakeResult<Vec<MemorySnippet>> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(KeepsakeError::upstream("moorcheh", 503, "service unavailable"));
        }
        Ok(self.file.clone())
    }
}

#[derive(Default)]
struct FakeGenerator {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AnswerGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> KeepsakeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

fn snippet(text: &str) -> MemorySnippet {
    MemorySnippet { text: Some(text.to_string()), score: Some(0.9) }
}

fn turns(content: &str) -> Vec<ChatTurn> {
    vec![ChatTurn { role: "user".into(), content: content.into() }]
}

// ── File-lookup path ───────────────────────────────────────────────────────

#[tokio::test]
async fn file_lookup_returns_first_snippet_verbatim_without_generation() {
    let gen_calls = Arc::new(AtomicUsize::new(0));
    let generator = FakeGenerator { reply: "should not appear".into(), calls: gen_calls.clone() };
    let orchestrator = Orchestrator::new(
        Arc::new(FakeVector::file(vec![
            snippet("Grandpa loved fishing at the lake."),
            snippet("second result, never consumed"),
        ])),
        Some(Arc::new(generator)),
    );

    let answer = orchestrator.answer(&turns("#file:photo42")).await.unwrap();
    assert_eq!(answer, "Grandpa loved fishing at the lake.");
    assert_eq!(gen_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn file_lookup_with_empty_text_defers() {
    let orchestrator = Orchestrator::new(
        Arc::new(FakeVector::file(vec![MemorySnippet { text: None, score: None }])),
        None,
    );
    let answer = orchestrator.answer(&turns("#file:photo42")).await.unwrap();
    assert_eq!(answer, DEFERRAL_SENTENCE);
}

#[tokio::test]
async fn file_lookup_with_no_results_defers() {
    let vector = Arc::new(FakeVector::file(vec![]));
    let orchestrator = Orchestrator::new(vector.clone(), None);
    let answer = orchestrator.answer(&turns("#file:photo42")).await.unwrap();
    assert_eq!(answer, DEFERRAL_SENTENCE);
    // Classified as a lookup, never as a semantic search
    assert_eq!(vector.file_calls.load(Ordering::SeqCst), 1);
    assert_eq!(vector.semantic_calls.load(Ordering::SeqCst), 0);
}

// ── Semantic path ──────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_search_defers_regardless_of_mode() {
    for generator in [
        None,
        Some(Arc::new(FakeGenerator::default()) as Arc<dyn AnswerGenerator>),
    ] {
        let orchestrator = Orchestrator::new(Arc::new(FakeVector::semantic(vec![])), generator);
        let answer = orchestrator.answer(&turns("Who is Sarah?")).await.unwrap();
        assert_eq!(answer, DEFERRAL_SENTENCE);
    }
}

#[tokio::test]
async fn all_empty_snippets_defer_without_generation() {
    let gen_calls = Arc::new(AtomicUsize::new(0));
    let generator = FakeGenerator { reply: "nope".into(), calls: gen_calls.clone() };
    let orchestrator = Orchestrator::new(
        Arc::new(FakeVector::semantic(vec![snippet(""), MemorySnippet::default()])),
        Some(Arc::new(generator)),
    );
    let answer = orchestrator.answer(&turns("Who is Sarah?")).await.unwrap();
    assert_eq!(answer, DEFERRAL_SENTENCE);
    assert_eq!(gen_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_generative_mode_returns_context_block() {
    let orchestrator = Orchestrator::new(
        Arc::new(FakeVector::semantic(vec![snippet("A"), snippet(""), snippet("B")])),
        None,
    );
    let answer = orchestrator.answer(&turns("tell me about A and B")).await.unwrap();
    assert_eq!(answer, "A\n\nB");
}

#[tokio::test]
async fn generative_mode_returns_completion_verbatim() {
    let generator = FakeGenerator { reply: "He fished at the lake.".into(), calls: Arc::default() };
    let orchestrator = Orchestrator::new(
        Arc::new(FakeVector::semantic(vec![snippet("Grandpa loved fishing at the lake.")])),
        Some(Arc::new(generator)),
    );
    let answer = orchestrator.answer(&turns("What did Grandpa love?")).await.unwrap();
    assert_eq!(answer, "He fished at the lake.");
}

#[tokio::test]
async fn missing_message_list_behaves_as_empty_query() {
    let vector = Arc::new(FakeVector::semantic(vec![]));
    let orchestrator = Orchestrator::new(vector.clone(), None);
    let answer = orchestrator.answer(&[]).await.unwrap();
    assert_eq!(answer, DEFERRAL_SENTENCE);
    assert_eq!(vector.semantic_calls.load(Ordering::SeqCst), 1);
}

// ── Failure propagation ────────────────────────────────────────────────────

#[tokio::test]
async fn upstream_failure_propagates_without_generation() {
    let gen_calls = Arc::new(AtomicUsize::new(0));
    let generator = FakeGenerator { reply: "unused".into(), calls: gen_calls.clone() };
    let orchestrator =
        Orchestrator::new(Arc::new(FakeVector::failing()), Some(Arc::new(generator)));

    let result = orchestrator.answer(&turns("Who is Sarah?")).await;
    assert!(matches!(result, Err(KeepsakeError::Upstream { status: 503, .. })));
    assert_eq!(gen_calls.load(Ordering::SeqCst), 0);
}

// ── HTTP boundary ──────────────────────────────────────────────────────────

mod http_boundary {
    use super::*;

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::StatusCode;

    use keepsake::engine::images::ImageStore;
    use keepsake::engine::store::MemoryStore;
    use keepsake::server::{routes, AppState};

    fn state_with(vector: FakeVector) -> Arc<AppState> {
        let dir = std::env::temp_dir().join(format!("keepsake-test-{}", uuid::Uuid::new_v4()));
        Arc::new(AppState {
            orchestrator: Orchestrator::new(Arc::new(vector), None),
            store: Arc::new(MemoryStore::open_in_memory().unwrap()),
            images: ImageStore::open(dir).unwrap(),
        })
    }

    fn chat_body(content: &str) -> Bytes {
        Bytes::from(
            serde_json::json!({ "messages": [{ "role": "user", "content": content }] })
                .to_string(),
        )
    }

    #[tokio::test]
    async fn deferral_is_a_successful_answer() {
        let state = state_with(FakeVector::semantic(vec![]));
        let (status, body) = routes::chat(State(state), chat_body("Who is Sarah?")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, DEFERRAL_SENTENCE);
    }

    #[tokio::test]
    async fn upstream_failure_becomes_safe_sentence_and_500() {
        let state = state_with(FakeVector::failing());
        let (status, body) = routes::chat(State(state), chat_body("Who is Sarah?")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FAILURE_SENTENCE);
    }

    #[tokio::test]
    async fn malformed_body_becomes_safe_sentence_and_500() {
        let state = state_with(FakeVector::semantic(vec![]));
        let (status, body) =
            routes::chat(State(state), Bytes::from_static(b"this is not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, FAILURE_SENTENCE);
    }

    #[tokio::test]
    async fn answer_text_passes_through_unwrapped() {
        let state = state_with(FakeVector::semantic(vec![MemorySnippet {
            text: Some("Grandpa loved fishing at the lake.".into()),
            score: Some(0.92),
        }]));
        let (status, body) = routes::chat(State(state), chat_body("What did Grandpa love?")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Grandpa loved fishing at the lake.");
    }
}
