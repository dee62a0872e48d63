//! In-memory cosine similarity store backing the knowledge index.
//!
//! Vectors are normalised on insert so a dot product gives the cosine score.
//! Nothing is persisted: the store lives exactly as long as its index.
#![forbid(unsafe_code)]

use anyhow::Result;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

type Float = f32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    /// Position of the vector in insertion order.
    pub index: usize,
    pub score: Float,
}

#[derive(PartialEq)]
struct ScoredIndex {
    score: Float,
    index: usize,
}

impl Eq for ScoredIndex {}

impl PartialOrd for ScoredIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredIndex {
    // Reversed so the BinaryHeap pops the lowest score first; NaN ranks lowest.
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.partial_cmp(&self.score).unwrap_or_else(|| {
            if self.score.is_nan() && !other.score.is_nan() {
                Ordering::Less
            } else if !self.score.is_nan() && other.score.is_nan() {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }
}

#[derive(Debug)]
pub struct VectorStore {
    embedding_dim: usize,
    /// Row-major, one normalised vector per entry.
    matrix: Vec<Float>,
}

impl VectorStore {
    pub fn new(embedding_dim: usize) -> Self {
        Self {
            embedding_dim,
            matrix: Vec::new(),
        }
    }

    pub fn add_batch(&mut self, embeddings: &[Vec<Float>]) -> Result<()> {
        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != self.embedding_dim {
                anyhow::bail!(
                    "Embedding dimension mismatch for item {}. Expected {}, got {}.",
                    self.len() + i,
                    self.embedding_dim,
                    embedding.len()
                );
            }
            if embedding.iter().any(|v| v.is_nan() || v.is_infinite()) {
                anyhow::bail!("Embedding for item {} contains NaN or Infinity.", self.len() + i);
            }
        }
        for embedding in embeddings {
            self.matrix.extend_from_slice(&normalize(embedding));
        }
        Ok(())
    }

    /// Top `k` entries by cosine similarity, best first.
    pub fn query(&self, query: &[Float], k: usize) -> Result<Vec<ScoredHit>> {
        if query.len() != self.embedding_dim {
            anyhow::bail!(
                "Search query embedding dimension mismatch. Expected {}, got {}.",
                self.embedding_dim,
                query.len()
            );
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_norm = normalize(query);

        let scores: Vec<Float> = self
            .matrix
            .par_chunks_exact(self.embedding_dim)
            .map(|row| dot_product(row, &query_norm))
            .collect();

        let mut heap = BinaryHeap::with_capacity(k + 1);
        for (index, score) in scores.into_iter().enumerate() {
            heap.push(ScoredIndex { score, index });
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|si| ScoredHit {
                index: si.index,
                score: si.score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.matrix.len() / self.embedding_dim.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.embedding_dim
    }
}

#[inline]
fn dot_product(a: &[Float], b: &[Float]) -> Float {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scales a vector to unit length. The zero vector stays zero.
pub fn normalize(vector: &[Float]) -> Vec<Float> {
    let norm_sq: Float = vector.iter().map(|&x| x * x).sum();
    if norm_sq == 0.0 {
        return vec![0.0; vector.len()];
    }
    let inv_norm = 1.0 / norm_sq.sqrt();
    vector.iter().map(|&x| x * inv_norm).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn dummy_embeddings(count: usize, dim: usize) -> Vec<Vec<f32>> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| (0..dim).map(|_| rng.gen::<f32>() - 0.5).collect())
            .collect()
    }

    #[test]
    fn test_query_returns_self_first() -> Result<()> {
        let dim = 32;
        let mut store = VectorStore::new(dim);
        let embeddings = dummy_embeddings(100, dim);
        store.add_batch(&embeddings)?;
        assert_eq!(store.len(), 100);

        let hits = store.query(&embeddings[42], 5)?;
        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0].index, 42);
        assert!(hits[0].score > 0.999);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        Ok(())
    }

    #[test]
    fn test_query_with_k_larger_than_store() -> Result<()> {
        let mut store = VectorStore::new(3);
        store.add_batch(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])?;
        let hits = store.query(&[0.0, 2.0, 0.0], 5)?;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut store = VectorStore::new(3);
        let err = store.add_batch(&[vec![1.0, 2.0]]).unwrap_err();
        assert!(err.to_string().contains("Expected 3, got 2"));
        assert!(store.is_empty());
        assert!(store.query(&[1.0], 1).is_err());
    }

    #[test]
    fn test_nan_embedding_rejected() {
        let mut store = VectorStore::new(2);
        assert!(store.add_batch(&[vec![f32::NAN, 1.0]]).is_err());
    }

    #[test]
    fn test_scored_index_ordering_keeps_top_k() {
        let mut heap = BinaryHeap::new();
        for (index, score) in [0.8, 0.9, 0.7, 1.0].into_iter().enumerate() {
            heap.push(ScoredIndex { score, index });
            if heap.len() > 2 {
                heap.pop();
            }
        }
        let sorted = heap.into_sorted_vec();
        assert_eq!(sorted[0].score, 1.0);
        assert_eq!(sorted[1].score, 0.9);

        let nan = ScoredIndex { score: Float::NAN, index: 0 };
        let regular = ScoredIndex { score: 0.5, index: 1 };
        assert_eq!(nan.cmp(&regular), Ordering::Less);
        assert_eq!(regular.cmp(&nan), Ordering::Greater);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        let n = normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 1e-6);
        assert!((n[1] - 0.8).abs() < 1e-6);
    }
}
