//! Session state and the retrieve-then-generate pipeline.
//!
//! A [`StudySession`] is an explicit handle created by the caller: the
//! conversation log plus the index slot. [`SessionPipeline`] runs the two
//! operations against it — an indexing trigger and a question — and owns no
//! session state itself. The caller must not run both operations on the same
//! session concurrently; the serving layer holds the session behind a mutex
//! for the duration of each call.

pub mod composer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::{ChunkingConfig, RetrievalConfig};
use crate::core::errors::ApiError;
use crate::ingest::{self, SourceFile};
use crate::llm::provider::LlmProvider;
use crate::rag::chunker;
use crate::rag::index::VectorIndex;
use crate::rag::retriever::Retriever;

pub const NOT_INDEXED_NOTICE: &str = "Please upload and index your documents first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// The index slot of a session. `Ready` is the only state holding a usable
/// index; a failed build discards any prior one rather than rolling back.
pub enum IndexState {
    Empty,
    Indexing,
    Ready(VectorIndex),
    IndexError,
}

impl IndexState {
    pub fn name(&self) -> &'static str {
        match self {
            IndexState::Empty => "empty",
            IndexState::Indexing => "indexing",
            IndexState::Ready(_) => "ready",
            IndexState::IndexError => "index_error",
        }
    }

    pub fn chunk_count(&self) -> usize {
        match self {
            IndexState::Ready(index) => index.len(),
            _ => 0,
        }
    }
}

/// One user's session: append-only conversation plus the index slot. Created
/// empty; everything here dies with the session.
pub struct StudySession {
    pub id: String,
    conversation: Vec<ConversationTurn>,
    index: IndexState,
}

impl StudySession {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation: Vec::new(),
            index: IndexState::Empty,
        }
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        &self.conversation
    }

    pub fn index_state(&self) -> &IndexState {
        &self.index
    }

    fn record(&mut self, role: Role, content: &str) {
        self.conversation.push(ConversationTurn {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        });
    }
}

impl Default for StudySession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub files: usize,
    pub pages: usize,
    pub chunks: usize,
}

#[derive(Debug)]
pub enum AskOutcome {
    Answered(String),
    /// No usable index; the question was recorded but nothing was retrieved
    /// or generated.
    NotIndexed,
}

pub struct SessionPipeline {
    provider: Arc<dyn LlmProvider>,
    chunking: ChunkingConfig,
    retriever: Retriever,
}

impl SessionPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        chunking: ChunkingConfig,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            provider,
            chunking,
            retriever: Retriever::new(retrieval.top_k),
        }
    }

    /// The indexing trigger: loader, chunker, embedder, index build, run
    /// synchronously with respect to the caller. On success the new index
    /// atomically replaces any prior one; on failure the session is left in
    /// `IndexError` with no index at all.
    pub async fn index_documents(
        &self,
        session: &mut StudySession,
        files: &[SourceFile],
    ) -> Result<IndexReport, ApiError> {
        if files.is_empty() {
            return Err(ApiError::BadRequest(
                "at least one file is required".to_string(),
            ));
        }

        session.index = IndexState::Indexing;
        tracing::info!(session = %session.id, files = files.len(), "indexing triggered");

        match self.build_index(files).await {
            Ok((index, report)) => {
                tracing::info!(
                    session = %session.id,
                    pages = report.pages,
                    chunks = report.chunks,
                    "index built"
                );
                session.index = IndexState::Ready(index);
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(session = %session.id, error = %err, "indexing failed");
                session.index = IndexState::IndexError;
                Err(err)
            }
        }
    }

    async fn build_index(&self, files: &[SourceFile]) -> Result<(VectorIndex, IndexReport), ApiError> {
        let documents = ingest::load_documents(files)?;
        let pages = documents.len();

        let chunks = chunker::split_documents(&documents, &self.chunking);
        if chunks.is_empty() {
            return Err(ApiError::Ingestion(
                "uploaded documents contain no indexable text".to_string(),
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.provider.embed(&texts).await?;

        let report = IndexReport {
            files: files.len(),
            pages,
            chunks: chunks.len(),
        };
        let index = VectorIndex::build(chunks, vectors)?;
        Ok((index, report))
    }

    /// Answers one question against the session's index. The user turn is
    /// recorded before the index check, so questions asked too early still
    /// appear in the history; without a `Ready` index the provider is never
    /// invoked and the caller gets the not-indexed sentinel.
    pub async fn ask(
        &self,
        session: &mut StudySession,
        question: &str,
    ) -> Result<AskOutcome, ApiError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ApiError::BadRequest("question must not be empty".to_string()));
        }

        session.record(Role::User, question);

        let IndexState::Ready(index) = &session.index else {
            tracing::debug!(session = %session.id, "question before any usable index");
            return Ok(AskOutcome::NotIndexed);
        };

        let retrieved = self
            .retriever
            .retrieve(self.provider.as_ref(), index, question)
            .await?;
        let answer = composer::answer(self.provider.as_ref(), &retrieved, question).await?;

        session.record(Role::Assistant, &answer);
        Ok(AskOutcome::Answered(answer))
    }
}
