use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// The external collaborators behind one interface: a generative chat model
/// and an embedding model. Implementations are stateless across calls and
/// never retry on their own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// chat completion (non-streaming, one call per question)
    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError>;

    /// generate embeddings, one vector per input, preserving order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
