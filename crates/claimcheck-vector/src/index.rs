//! Exact inner-product search over L2-normalized vectors.
//!
//! Inner product of unit vectors is cosine similarity, so every vector is
//! normalized on the way in and the search itself is a plain dot product.

use claimcheck_core::error::{Error, Result};
use claimcheck_core::norm::{dot, l2_normalize};
use claimcheck_core::types::Chunk;

/// Row-major matrix of unit-length vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(vectors.len() * dim);
        for mut v in vectors {
            if v.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: v.len() });
            }
            l2_normalize(&mut v);
            data.extend_from_slice(&v);
        }
        Ok(Self { dim, data })
    }

    pub fn size(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Top-`k` rows by inner product with `query`, best first.
    ///
    /// `k` is clamped to the index size. Equal scores keep row order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        let n = self.size();
        if n == 0 || k == 0 {
            return Ok(vec![]);
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        let mut scored: Vec<(usize, f32)> = (0..n).map(|i| (i, dot(self.row(i), query))).collect();
        // stable: ties stay in row order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k.min(n));
        Ok(scored)
    }
}

/// Vectors plus the chunk metadata they embed, kept together per row.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    records: Vec<Chunk>,
    vectors: FlatIndex,
    embedder_id: String,
}

impl SearchIndex {
    /// Pair `records[i]` with `vectors[i]`. Counts must agree.
    pub fn from_parts(records: Vec<Chunk>, vectors: Vec<Vec<f32>>, embedder_id: impl Into<String>) -> Result<Self> {
        if records.len() != vectors.len() {
            return Err(Error::MetadataMismatch { vectors: vectors.len(), records: records.len() });
        }
        Ok(Self { records, vectors: FlatIndex::build(vectors)?, embedder_id: embedder_id.into() })
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    pub fn embedder_id(&self) -> &str {
        &self.embedder_id
    }

    pub fn records(&self) -> &[Chunk] {
        &self.records
    }

    /// Normalized vector of row `i`.
    pub fn vector(&self, i: usize) -> &[f32] {
        self.vectors.row(i)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(&Chunk, f32)>> {
        Ok(self
            .vectors
            .search(query, k)?
            .into_iter()
            .map(|(i, score)| (&self.records[i], score))
            .collect())
    }
}
