//! Top-k retrieval: embed the query, search the index, drop the scores.

use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::rag::chunker::Chunk;
use crate::rag::index::VectorIndex;

pub struct Retriever {
    top_k: usize,
}

impl Retriever {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn retrieve(
        &self,
        provider: &dyn LlmProvider,
        index: &VectorIndex,
        query: &str,
    ) -> Result<Vec<Chunk>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::BadRequest("query must not be empty".to_string()));
        }

        let embeddings = provider.embed(&[query.to_string()]).await?;
        let query_embedding = embeddings.first().ok_or_else(|| {
            ApiError::EmbeddingService("provider returned no embedding for the query".to_string())
        })?;

        let hits = index.query(query_embedding, self.top_k)?;
        Ok(hits.into_iter().map(|(chunk, _score)| chunk.clone()).collect())
    }
}
