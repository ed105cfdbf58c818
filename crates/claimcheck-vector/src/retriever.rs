use claimcheck_core::error::{Error, Result};
use claimcheck_core::norm::l2_normalize;
use claimcheck_core::traits::{Embedder, EvidenceSource};
use claimcheck_core::types::EvidenceItem;

use crate::index::SearchIndex;

/// Embeds a claim and returns the closest chunks from a loaded index.
pub struct Retriever {
    embedder: Box<dyn Embedder>,
    index: Option<SearchIndex>,
}

impl Retriever {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, index: None }
    }

    /// Attach an index built by the same embedder.
    pub fn attach(&mut self, index: SearchIndex) -> Result<()> {
        if index.embedder_id() != self.embedder.embedder_id() {
            return Err(Error::InvalidConfig(format!(
                "index was built with '{}' but the query embedder is '{}'",
                index.embedder_id(),
                self.embedder.embedder_id()
            )));
        }
        if index.size() > 0 && index.dim() != self.embedder.dim() {
            return Err(Error::DimensionMismatch { expected: index.dim(), actual: self.embedder.dim() });
        }
        self.index = Some(index);
        Ok(())
    }

    pub fn with_index(mut self, index: SearchIndex) -> Result<Self> {
        self.attach(index)?;
        Ok(self)
    }

    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    /// Top-`k` evidence for `claim`, best first, ranks starting at 1.
    /// Returns fewer than `k` items when the index is smaller.
    pub fn retrieve(&self, claim: &str, k: usize) -> Result<Vec<EvidenceItem>> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| Error::IndexUnavailable("no index loaded; build one with claimcheck-index".into()))?;

        let mut query = self
            .embedder
            .embed_batch(&[claim.to_string()])
            .map_err(|e| Error::Upstream(format!("embedding provider: {e:#}")))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Upstream("embedding provider returned no vector".into()))?;
        l2_normalize(&mut query);

        let hits = index.search(&query, k)?;
        tracing::debug!(k, returned = hits.len(), "retrieved evidence");
        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(i, (chunk, score))| EvidenceItem {
                rank: i + 1,
                score,
                chunk_id: chunk.chunk_id.clone(),
                doc_id: chunk.doc_id.clone(),
                text: chunk.text.clone(),
            })
            .collect())
    }
}

impl EvidenceSource for Retriever {
    fn retrieve(&self, claim: &str, k: usize) -> Result<Vec<EvidenceItem>> {
        Retriever::retrieve(self, claim, k)
    }
}
