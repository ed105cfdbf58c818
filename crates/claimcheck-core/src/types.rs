//! Domain types shared by the chunker, index, judge and evaluation harness.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ChunkId = String;

/// A reference document as produced by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub source: String,
    pub text: String,
}

/// A bounded, overlapping window of a document's text; the unit of retrieval.
///
/// `chunk_id` is always `<doc_id>::chunk_<chunk_index>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub doc_id: String,
    #[serde(default)]
    pub title: String,
    pub chunk_index: usize,
    pub text: String,
}

impl Chunk {
    pub fn make_id(doc_id: &str, chunk_index: usize) -> ChunkId {
        format!("{doc_id}::chunk_{chunk_index}")
    }
}

/// One retrieved chunk with its similarity to the query. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub rank: usize,
    pub score: f32,
    pub chunk_id: ChunkId,
    pub doc_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictLabel {
    Supported,
    Mixed,
    NotSupported,
    #[default]
    Unknown,
}

impl VerdictLabel {
    pub const ALL: [VerdictLabel; 4] = [
        VerdictLabel::Supported,
        VerdictLabel::Mixed,
        VerdictLabel::NotSupported,
        VerdictLabel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Supported => "Supported",
            VerdictLabel::Mixed => "Mixed",
            VerdictLabel::NotSupported => "NotSupported",
            VerdictLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerdictLabel {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VerdictLabel::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| crate::error::Error::Parse(format!("unrecognized verdict '{s}'")))
    }
}

/// The judge's structured conclusion about a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub verdict: VerdictLabel,
    #[serde(default)]
    pub short_reason: String,
    #[serde(default)]
    pub citations: Vec<ChunkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Verdict {
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self { verdict: VerdictLabel::Unknown, short_reason: reason.into(), citations: Vec::new(), confidence: Some(0.0) }
    }
}

/// How the claim text entered the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Text,
    Image,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Text => "text",
            InputMode::Image => "image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ids_are_deterministic() {
        assert_eq!(Chunk::make_id("vitamin_d", 0), "vitamin_d::chunk_0");
        assert_eq!(Chunk::make_id("vitamin_d", 12), Chunk::make_id("vitamin_d", 12));
    }

    #[test]
    fn verdict_labels_parse_exactly() {
        assert_eq!("NotSupported".parse::<VerdictLabel>().unwrap(), VerdictLabel::NotSupported);
        assert_eq!(" Mixed ".parse::<VerdictLabel>().unwrap(), VerdictLabel::Mixed);
        assert!("supported-ish".parse::<VerdictLabel>().is_err());
    }

    #[test]
    fn verdict_defaults_missing_fields() {
        let v: Verdict = serde_json::from_str(r#"{"short_reason":"nothing"}"#).unwrap();
        assert_eq!(v.verdict, VerdictLabel::Unknown);
        assert!(v.citations.is_empty());
        assert_eq!(v.confidence, None);
    }
}
