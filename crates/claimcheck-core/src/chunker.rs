use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Sliding-window parameters, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: 1200, overlap_chars: 200 }
    }
}

impl ChunkingConfig {
    pub fn new(max_chars: usize, overlap_chars: usize) -> Result<Self> {
        let config = Self { max_chars, overlap_chars };
        config.validate()?;
        Ok(config)
    }

    /// The window must advance on every step.
    pub fn validate(&self) -> Result<()> {
        if self.overlap_chars >= self.max_chars {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// Split `text` into windows of at most `max_chars` characters, each starting
/// `max_chars - overlap_chars` characters after the previous one.
///
/// A text no longer than `max_chars` yields a single chunk equal to the text;
/// an empty text yields no chunks.
pub fn split_into_chunks(text: &str, max_chars: usize, overlap_chars: usize) -> Result<Vec<String>> {
    ChunkingConfig { max_chars, overlap_chars }.validate()?;

    // Byte offset of every char boundary, plus the end of the string.
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let len = bounds.len() - 1;
    let step = max_chars - overlap_chars;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let end = (start + max_chars).min(len);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        if end >= len {
            break;
        }
        start += step;
    }
    Ok(chunks)
}

pub fn chunk_document(doc: &Document, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let pieces = split_into_chunks(&doc.text, config.max_chars, config.overlap_chars)?;
    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(chunk_index, text)| Chunk {
            chunk_id: Chunk::make_id(&doc.doc_id, chunk_index),
            doc_id: doc.doc_id.clone(),
            title: doc.title.clone(),
            chunk_index,
            text,
        })
        .collect())
}

pub fn chunk_documents(docs: &[Document], config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    let mut all_chunks = Vec::new();
    for (i, doc) in docs.iter().enumerate() {
        let chunks = chunk_document(doc, config)?;
        tracing::debug!(doc = %doc.doc_id, n = chunks.len(), "chunked document {}/{}", i + 1, docs.len());
        all_chunks.extend(chunks);
    }
    tracing::info!(docs = docs.len(), chunks = all_chunks.len(), "chunking complete");
    Ok(all_chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> Document {
        Document { doc_id: id.into(), title: format!("{id} fact sheet"), source: "NIH ODS".into(), text: text.into() }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        for text in ["a", "magnesium", &"x".repeat(50)] {
            let chunks = split_into_chunks(text, 50, 10).unwrap();
            assert_eq!(chunks, vec![text.to_string()]);
        }
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split_into_chunks("", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn consecutive_chunks_overlap_exactly() {
        let text: String = (0..137).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let (max, overlap) = (40, 15);
        let chunks = split_into_chunks(&text, max, overlap).unwrap();
        assert!(chunks.len() >= 2);
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(max - overlap).collect();
            let head: String = pair[1].chars().take(overlap).collect();
            assert_eq!(tail, head);
        }
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), max);
        }
        assert!(chunks.last().unwrap().chars().count() <= max);
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
    }

    #[test]
    fn windows_respect_multibyte_chars() {
        let text = "é".repeat(25);
        let chunks = split_into_chunks(&text, 10, 3).unwrap();
        assert_eq!(chunks[0], "é".repeat(10));
        assert_eq!(chunks[1].chars().count(), 10);
    }

    #[test]
    fn non_advancing_window_is_rejected() {
        assert!(matches!(split_into_chunks("abc", 5, 5), Err(Error::InvalidConfig(_))));
        assert!(matches!(split_into_chunks("abc", 5, 9), Err(Error::InvalidConfig(_))));
        assert!(ChunkingConfig::new(0, 0).is_err());
    }

    #[test]
    fn chunk_ids_follow_doc_and_index() {
        let config = ChunkingConfig::new(10, 2).unwrap();
        let chunks = chunk_document(&doc("zinc", &"z".repeat(30)), &config).unwrap();
        let ids: Vec<_> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["zinc::chunk_0", "zinc::chunk_1", "zinc::chunk_2", "zinc::chunk_3"]);
        assert!(chunks.iter().enumerate().all(|(i, c)| c.chunk_index == i && c.title == "zinc fact sheet"));

        let again = chunk_document(&doc("zinc", &"z".repeat(30)), &config).unwrap();
        assert_eq!(chunks, again);
    }
}
