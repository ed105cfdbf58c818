use crate::error::Result;
use crate::types::EvidenceItem;

/// Text embedding provider. Must be deterministic for a fixed model.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model, recorded next to a persisted index.
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Generative model consumed as `prompt -> completion`.
pub trait JudgeModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Image-to-text collaborator used for photographed labels.
pub trait LabelReader: Send + Sync {
    fn read_label(&self, image_path: &std::path::Path) -> Result<String>;
}

/// Anything that returns ranked evidence for a claim.
pub trait EvidenceSource {
    fn retrieve(&self, claim: &str, k: usize) -> Result<Vec<EvidenceItem>>;
}
