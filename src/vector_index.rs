//! In-memory vector index over one video's chunks.
//!
//! The index is built once from a complete set of entries and never mutated
//! afterwards; replacing a video means building a new index.

use crate::error::{ChatTubeError, Result};
use serde::Serialize;

/// A chunk together with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub text: String,
    pub embedding: Vec<f32>,
    /// Position of the chunk in the transcript.
    pub order: usize,
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub text: String,
    pub order: usize,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Immutable k-nearest-neighbour index using cosine similarity.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from a complete set of entries.
    pub fn build(entries: Vec<IndexEntry>) -> Result<Self> {
        let dimensions = match entries.first() {
            Some(entry) => entry.embedding.len(),
            None => {
                return Err(ChatTubeError::VectorIndex(
                    "cannot build an index without entries".to_string(),
                ))
            }
        };

        if dimensions == 0 {
            return Err(ChatTubeError::VectorIndex(
                "embeddings must not be empty".to_string(),
            ));
        }

        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(ChatTubeError::VectorIndex(format!(
                "chunk {} has {} dimensions, expected {}",
                bad.order,
                bad.embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Return up to `k` entries most similar to `query`, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if query.len() != self.dimensions {
            return Err(ChatTubeError::VectorIndex(format!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut results: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                text: entry.text.clone(),
                order: entry.order,
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.order.cmp(&b.order)));
        results.truncate(k);

        Ok(results)
    }

    /// Number of indexed chunks; never zero.
    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, embedding: Vec<f32>, order: usize) -> IndexEntry {
        IndexEntry {
            text: text.to_string(),
            embedding,
            order,
        }
    }

    fn sample_index() -> VectorIndex {
        VectorIndex::build(vec![
            entry("east", vec![1.0, 0.0, 0.0], 0),
            entry("north", vec![0.0, 1.0, 0.0], 1),
            entry("north-east", vec![0.7, 0.7, 0.0], 2),
            entry("west", vec![-1.0, 0.0, 0.0], 3),
        ])
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_search_orders_best_first() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.1, 0.0], 4).unwrap();

        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["east", "north-east", "north", "west"]);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_search_respects_k_and_size() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0, 1.0, 0.0], 10).unwrap().len(), index.chunk_count());
        assert!(index.search(&[0.0, 1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_index_reports_shape() {
        let index = sample_index();
        assert_eq!(index.chunk_count(), 4);
        assert_eq!(index.dimensions(), 3);
        assert!(index.search(&[1.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_ties_keep_transcript_order() {
        let index = VectorIndex::build(vec![
            entry("second", vec![0.0, 1.0], 1),
            entry("first", vec![0.0, 1.0], 0),
        ])
        .unwrap();
        let results = index.search(&[0.0, 1.0], 2).unwrap();
        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert!(matches!(
            VectorIndex::build(Vec::new()),
            Err(ChatTubeError::VectorIndex(_))
        ));
        assert!(matches!(
            VectorIndex::build(vec![entry("a", vec![1.0, 0.0], 0), entry("b", vec![1.0], 1)]),
            Err(ChatTubeError::VectorIndex(_))
        ));
        assert!(matches!(
            VectorIndex::build(vec![entry("a", Vec::new(), 0)]),
            Err(ChatTubeError::VectorIndex(_))
        ));
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 2),
            Err(ChatTubeError::VectorIndex(_))
        ));
    }
}
