//! Flat in-memory vector index over the corpus embedding matrix.
//!
//! The matrix is built offline together with the corpus metadata; row i holds
//! the embedding of corpus item i. Search is exact inner product over
//! L2-normalized rows, which is cosine ranking. Corpus scale (a few thousand
//! rows) keeps the exhaustive scan well under a millisecond.

use std::path::Path;

use serde::Deserialize;

/// One ranked hit: position into the corpus metadata array plus similarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    pub score: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("index parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("index has inconsistent row dimensions")]
    RaggedRows,
}

#[derive(Debug, Deserialize)]
struct IndexArtifact {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

/// Exact-scan similarity index. Immutable after load.
#[derive(Debug, Default)]
pub struct VectorIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let raw = std::fs::read_to_string(path)?;
        let artifact: IndexArtifact = serde_json::from_str(&raw)?;
        if artifact.vectors.iter().any(|v| v.len() != artifact.dim) {
            return Err(IndexError::RaggedRows);
        }
        let vectors = artifact.vectors.into_iter().map(normalize).collect::<Vec<_>>();
        tracing::info!(
            rows = vectors.len(),
            dim = artifact.dim,
            path = %path.display(),
            "vector index loaded"
        );
        Ok(Self {
            dim: artifact.dim,
            vectors,
        })
    }

    pub fn from_vectors(dim: usize, vectors: Vec<Vec<f32>>) -> Self {
        let vectors = vectors.into_iter().map(normalize).collect();
        Self { dim, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Top-k rows by inner product against `query`, descending. Returns fewer
    /// than k when the index is small, and nothing at all on a dimension
    /// mismatch (a stale artifact from another embedding model).
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 || self.vectors.is_empty() {
            return Vec::new();
        }
        if query.len() != self.dim {
            tracing::warn!(
                expected = self.dim,
                got = query.len(),
                "query embedding dimension mismatch, returning no hits"
            );
            return Vec::new();
        }
        let query = normalize(query.to_vec());
        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, row)| SearchHit {
                index,
                score: dot(&query, row),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}
