//! Offline index build: chunks → embeddings → persisted [`SearchIndex`].
//!
//! Typical flow:
//! 1) Fingerprint the chunk stream together with the embedder id
//! 2) Skip the build when the stored manifest already carries that fingerprint
//! 3) Otherwise embed in batches, normalize, and replace the stored table

use anyhow::{ensure, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use claimcheck_core::traits::Embedder;
use claimcheck_core::types::Chunk;

use crate::index::SearchIndex;
use crate::store::{self, IndexManifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built { rows: usize },
    Unchanged { rows: usize },
}

/// Content hash of the ordered chunk stream (every persisted column) plus the
/// embedder identity.
pub fn fingerprint(chunks: &[Chunk], embedder_id: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(embedder_id.as_bytes());
    for c in chunks {
        for field in [c.chunk_id.as_bytes(), c.doc_id.as_bytes(), c.title.as_bytes(), c.text.as_bytes()] {
            hasher.update(&[0]);
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        hasher.update(&(c.chunk_index as u64).to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Whether a stored manifest already describes exactly this chunk stream.
pub fn is_current(manifest: Option<&IndexManifest>, fingerprint: &str, rows: usize) -> bool {
    manifest.is_some_and(|m| m.fingerprint == fingerprint && m.rows == rows)
}

/// Embed every chunk's text in order. Output row `i` embeds `chunks[i]`.
pub fn embed_chunks(chunks: &[Chunk], embedder: &dyn Embedder, batch_size: usize) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );
    let mut vectors = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embedded = embedder.embed_batch(&texts)?;
        ensure!(embedded.len() == batch.len(), "embedder returned {} vectors for {} texts", embedded.len(), batch.len());
        for v in &embedded {
            ensure!(v.len() == embedder.dim(), "embedder returned a {}-dim vector, expected {}", v.len(), embedder.dim());
        }
        vectors.extend(embedded);
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("embedded");
    Ok(vectors)
}

/// Build and persist the index for `chunks` unless an identical one is stored.
///
/// Embedding runs inline on the calling task; callers with a blocking
/// embedder drive the steps themselves (see [`is_current`], [`embed_chunks`]).
pub async fn build_index(
    dir: &Path,
    table: &str,
    chunks: &[Chunk],
    embedder: &dyn Embedder,
    batch_size: usize,
    force: bool,
) -> Result<BuildOutcome> {
    ensure!(!chunks.is_empty(), "no chunks to index");
    let fp = fingerprint(chunks, embedder.embedder_id());
    if !force && is_current(store::read_manifest(dir, table).await?.as_ref(), &fp, chunks.len()) {
        tracing::info!(table, rows = chunks.len(), "index is up to date, skipping rebuild");
        return Ok(BuildOutcome::Unchanged { rows: chunks.len() });
    }

    tracing::info!(table, chunks = chunks.len(), embedder = embedder.embedder_id(), "building index");
    let vectors = embed_chunks(chunks, embedder, batch_size)?;
    let index = SearchIndex::from_parts(chunks.to_vec(), vectors, embedder.embedder_id())?;
    store::persist(dir, table, &index, &fp).await?;
    Ok(BuildOutcome::Built { rows: index.size() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, text: &str) -> Chunk {
        Chunk { chunk_id: id.into(), doc_id: "d".into(), title: String::new(), chunk_index: 0, text: text.into() }
    }

    #[test]
    fn fingerprint_tracks_content_order_and_embedder() {
        let a = vec![chunk("d::chunk_0", "alpha"), chunk("d::chunk_1", "beta")];
        let b = vec![chunk("d::chunk_1", "beta"), chunk("d::chunk_0", "alpha")];
        assert_eq!(fingerprint(&a, "fake"), fingerprint(&a.clone(), "fake"));
        assert_ne!(fingerprint(&a, "fake"), fingerprint(&b, "fake"));
        assert_ne!(fingerprint(&a, "fake"), fingerprint(&a, "other"));
    }

    #[test]
    fn fingerprint_tracks_persisted_metadata() {
        let base = vec![chunk("d::chunk_0", "alpha")];
        let fp = fingerprint(&base, "fake");

        let mut retitled = base.clone();
        retitled[0].title = "Vitamin D fact sheet".into();
        assert_ne!(fingerprint(&retitled, "fake"), fp);

        let mut moved = base.clone();
        moved[0].doc_id = "e".into();
        assert_ne!(fingerprint(&moved, "fake"), fp);

        let mut reindexed = base.clone();
        reindexed[0].chunk_index = 1;
        assert_ne!(fingerprint(&reindexed, "fake"), fp);
    }
}
