//! In-memory vector index: brute-force cosine search over chunk/vector pairs.

use std::cmp::Ordering;

use crate::core::errors::ApiError;
use crate::rag::chunker::Chunk;

/// A read-only collection of chunks and their embeddings, paired by
/// position. Built once per indexing trigger and replaced wholesale on the
/// next one.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self, ApiError> {
        if chunks.len() != vectors.len() {
            return Err(ApiError::Internal(format!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        if let Some(first) = vectors.first() {
            let dims = first.len();
            if dims == 0 || vectors.iter().any(|vector| vector.len() != dims) {
                return Err(ApiError::Internal(
                    "inconsistent embedding dimensions".to_string(),
                ));
            }
        }

        Ok(Self { chunks, vectors })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns up to `k` chunks ordered by descending cosine similarity.
    /// Ties keep insertion order (the sort is stable). Querying an empty
    /// index is an error, which distinguishes "no index yet" from "no
    /// relevant matches".
    pub fn query(&self, query_embedding: &[f32], k: usize) -> Result<Vec<(&Chunk, f32)>, ApiError> {
        if self.chunks.is_empty() {
            return Err(ApiError::IndexUnavailable);
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .map(|vector| cosine_similarity(query_embedding, vector))
            .enumerate()
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| (&self.chunks[position], score))
            .collect())
    }
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
