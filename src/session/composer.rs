//! Grounded answer composition.
//!
//! Builds the single generation request for a question: a fixed tutor
//! instruction with the retrieved context embedded, plus the question as the
//! sole user message. Request construction is a pure function so tests can
//! assert on the composed context.

use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatMessage, ChatRequest};
use crate::rag::chunker::Chunk;

const SYSTEM_INSTRUCTION: &str = "You are an expert tutor. Use the following pieces of \
retrieved context to answer the question. If you don't know the answer, say you don't \
know. When asked to make a quiz, use MCQ-style questions with four answer options \
maximum. Use five sentences maximum and keep the answer concise.";

pub fn build_generation_request(retrieved_chunks: &[Chunk], question: &str) -> ChatRequest {
    let context = retrieved_chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    ChatRequest::new(vec![
        ChatMessage::system(format!("{SYSTEM_INSTRUCTION}\n\n{context}")),
        ChatMessage::user(question),
    ])
    .with_temperature(0.0)
}

/// Invokes the generative model exactly once and returns the raw generated
/// text. Transient failures propagate; retrying is not this layer's job.
pub async fn answer(
    provider: &dyn LlmProvider,
    retrieved_chunks: &[Chunk],
    question: &str,
) -> Result<String, ApiError> {
    provider.chat(build_generation_request(retrieved_chunks, question)).await
}
