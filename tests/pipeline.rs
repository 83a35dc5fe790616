//! Session pipeline integration tests against a mock provider.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use studymate_backend::core::config::{ChunkingConfig, RetrievalConfig};
use studymate_backend::core::errors::ApiError;
use studymate_backend::ingest::SourceFile;
use studymate_backend::llm::provider::LlmProvider;
use studymate_backend::llm::types::ChatRequest;
use studymate_backend::session::{AskOutcome, SessionPipeline, StudySession};

/// Deterministic embedder and canned chat model with call counters, so tests
/// can assert which collaborators were invoked and with what.
struct MockProvider {
    embed_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    fail_embeddings: AtomicBool,
    captured_requests: Mutex<Vec<ChatRequest>>,
    reply: String,
}

impl MockProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            embed_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            fail_embeddings: AtomicBool::new(false),
            captured_requests: Mutex::new(Vec::new()),
            reply: "The capital of France is Paris.".to_string(),
        })
    }

    fn set_fail_embeddings(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    fn embed_count(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    fn chat_count(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ChatRequest {
        self.captured_requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no chat request captured")
    }

    /// Letter-frequency embedding: same dimensionality for every input,
    /// similar texts score higher under cosine similarity.
    fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            vector[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_requests.lock().unwrap().push(request);
        Ok(self.reply.clone())
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(ApiError::EmbeddingService("simulated outage".to_string()));
        }
        Ok(inputs.iter().map(|text| Self::embed_text(text)).collect())
    }
}

fn pipeline(provider: Arc<MockProvider>, max_chars: usize, overlap: usize) -> SessionPipeline {
    SessionPipeline::new(
        provider,
        ChunkingConfig { max_chars, overlap },
        &RetrievalConfig { top_k: 4 },
    )
}

fn text_file(name: &str, content: &str) -> SourceFile {
    SourceFile {
        name: name.to_string(),
        bytes: content.as_bytes().to_vec(),
    }
}

#[tokio::test]
async fn asking_before_indexing_returns_sentinel_without_provider_calls() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 100, 20);
    let mut session = StudySession::new();

    let outcome = pipeline.ask(&mut session, "What is mitosis?").await.unwrap();

    assert!(matches!(outcome, AskOutcome::NotIndexed));
    assert_eq!(provider.embed_count(), 0);
    assert_eq!(provider.chat_count(), 0);
    assert_eq!(session.index_state().name(), "empty");
    // The question itself is still part of the history.
    assert_eq!(session.conversation().len(), 1);
}

#[tokio::test]
async fn empty_batch_is_rejected_and_leaves_state_untouched() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 100, 20);
    let mut session = StudySession::new();

    let err = pipeline.index_documents(&mut session, &[]).await.unwrap_err();

    assert!(matches!(err, ApiError::BadRequest(_)));
    assert_eq!(session.index_state().name(), "empty");
    assert_eq!(provider.embed_count(), 0);
}

#[tokio::test]
async fn failed_indexing_leaves_index_error_and_recovery_reaches_ready() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 100, 20);
    let mut session = StudySession::new();
    let files = [text_file("bio.txt", "Cells divide by mitosis. Growth requires energy.")];

    provider.set_fail_embeddings(true);
    let err = pipeline.index_documents(&mut session, &files).await.unwrap_err();
    assert!(matches!(err, ApiError::EmbeddingService(_)));
    assert_eq!(session.index_state().name(), "index_error");
    assert_eq!(session.index_state().chunk_count(), 0);

    // Questions in IndexError get the sentinel, not a generation.
    let outcome = pipeline.ask(&mut session, "What is mitosis?").await.unwrap();
    assert!(matches!(outcome, AskOutcome::NotIndexed));
    assert_eq!(provider.chat_count(), 0);

    provider.set_fail_embeddings(false);
    let report = pipeline.index_documents(&mut session, &files).await.unwrap();
    assert_eq!(session.index_state().name(), "ready");
    assert!(report.chunks >= 1);
}

#[tokio::test]
async fn unsupported_file_aborts_the_batch_before_embedding() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 100, 20);
    let mut session = StudySession::new();
    let files = [
        text_file("notes.txt", "Some perfectly fine text."),
        text_file("image.png", "not really text"),
    ];

    let err = pipeline.index_documents(&mut session, &files).await.unwrap_err();

    assert!(matches!(err, ApiError::Ingestion(_)));
    assert_eq!(session.index_state().name(), "index_error");
    assert_eq!(provider.embed_count(), 0);
}

#[tokio::test]
async fn blank_documents_fail_the_trigger_with_ingestion() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 100, 20);
    let mut session = StudySession::new();

    let err = pipeline
        .index_documents(&mut session, &[text_file("blank.txt", "   \n\n  ")])
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Ingestion(_)));
    assert_eq!(session.index_state().name(), "index_error");
}

#[tokio::test]
async fn end_to_end_paris_question_is_grounded_in_the_document() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 50, 10);
    let mut session = StudySession::new();

    let report = pipeline
        .index_documents(
            &mut session,
            &[text_file(
                "france.txt",
                "Paris is the capital of France. The Eiffel Tower is in Paris.",
            )],
        )
        .await
        .unwrap();

    assert_eq!(session.index_state().name(), "ready");
    assert_eq!(report.files, 1);
    assert_eq!(report.pages, 1);
    assert!(report.chunks >= 2);

    let outcome = pipeline
        .ask(&mut session, "What is the capital of France?")
        .await
        .unwrap();

    let AskOutcome::Answered(answer) = outcome else {
        panic!("expected an answer");
    };
    assert_eq!(answer, "The capital of France is Paris.");

    // Exactly one generation, grounded in the retrieved sentence.
    assert_eq!(provider.chat_count(), 1);
    let request = provider.last_request();
    assert_eq!(request.temperature, Some(0.0));
    assert!(request.messages[0].content.contains("Paris is the capital of France."));
    assert_eq!(request.messages[1].content, "What is the capital of France?");

    // One user turn and one assistant turn were appended.
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation()[1].content, answer);
    assert_eq!(session.index_state().name(), "ready");
}

#[tokio::test]
async fn a_new_trigger_fully_replaces_the_previous_index() {
    let provider = MockProvider::new();
    let pipeline = pipeline(provider.clone(), 200, 20);
    let mut session = StudySession::new();

    pipeline
        .index_documents(
            &mut session,
            &[text_file("chemistry.txt", "Oxygen is element eight.")],
        )
        .await
        .unwrap();

    pipeline
        .index_documents(
            &mut session,
            &[text_file("history.txt", "The treaty was signed in 1648.")],
        )
        .await
        .unwrap();

    pipeline
        .ask(&mut session, "When was the treaty signed?")
        .await
        .unwrap();

    let request = provider.last_request();
    assert!(request.messages[0].content.contains("treaty"));
    assert!(!request.messages[0].content.contains("Oxygen"));
}
