use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Chunk and embedding counts differ: {chunks} chunks, {embeddings} embeddings")]
    CountMismatch { chunks: usize, embeddings: usize },
    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    id: usize,
    text: String,
    embedding: Vec<f32>,
}

/// One retrieval hit: the chunk text, its similarity to the query, and the
/// chunk's position in the source document.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub chunk_id: usize,
    pub text: String,
    pub score: f32,
}

/// In-memory nearest-neighbor index over embedded text chunks.
///
/// Built fresh on every ingestion and discarded wholesale with the previous
/// session; there is no incremental update path.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
    dimension: usize,
}

impl VectorIndex {
    pub fn build(texts: Vec<String>, embeddings: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if texts.len() != embeddings.len() {
            return Err(IndexError::CountMismatch {
                chunks: texts.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        for embedding in &embeddings {
            if embedding.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: embedding.len(),
                });
            }
        }

        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(id, (text, embedding))| IndexedChunk { id, text, embedding })
            .collect();

        Ok(Self { chunks, dimension })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `top_k` chunks most similar to the query embedding.
    /// Ties keep source order, so equal-scored chunks come back in the order
    /// they appeared in the document.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchResult> {
        let mut scored: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                chunk_id: chunk.id,
                text: chunk.text.clone(),
                score: cosine_similarity(&chunk.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk_id.cmp(&b.chunk_id))
        });
        scored.truncate(top_k);
        scored
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(embeddings: Vec<Vec<f32>>) -> VectorIndex {
        let texts = (0..embeddings.len()).map(|i| format!("chunk {}", i)).collect();
        VectorIndex::build(texts, embeddings).unwrap()
    }

    #[test]
    fn search_returns_nearest_chunks_first() {
        let index = index_of(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
        ]);

        let results = index.search(&[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, 0);
        assert_eq!(results[1].chunk_id, 2);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn ties_break_by_source_order() {
        let index = index_of(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ]);

        let results = index.search(&[1.0, 0.0], 3);
        assert_eq!(results[0].chunk_id, 1);
        assert_eq!(results[1].chunk_id, 2);
        assert_eq!(results[2].chunk_id, 0);
    }

    #[test]
    fn build_rejects_mismatched_lengths() {
        let err = VectorIndex::build(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::CountMismatch { .. }));
    }

    #[test]
    fn build_rejects_ragged_embeddings() {
        let err = VectorIndex::build(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![1.0, 2.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn identical_vectors_have_unit_similarity() {
        let v = vec![0.3, 0.5, 0.2];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_similarity_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
