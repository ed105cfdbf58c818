//! Embedding providers behind the [`Embedder`] trait: a local BERT-family
//! sentence model on candle, an Ollama HTTP client, and a deterministic fake.

use anyhow::Result;
use std::path::Path;

use claimcheck_core::config::{resolve_with_base, EmbeddingProviderKind, EmbeddingSettings};
pub use claimcheck_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod local;
pub mod ollama;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use local::LocalEmbedder;
pub use ollama::OllamaEmbedder;
pub use pool::masked_mean_l2;

/// Build the configured provider. `APP_USE_FAKE_EMBEDDINGS=1` forces the fake
/// embedder regardless of configuration.
pub fn from_settings(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Box<dyn Embedder>> {
    let force_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let kind = if force_fake { EmbeddingProviderKind::Fake } else { settings.provider };

    match kind {
        EmbeddingProviderKind::Fake => {
            tracing::info!(dim = settings.fake_dim, "using FakeEmbedder");
            Ok(Box::new(FakeEmbedder::new(settings.fake_dim)))
        }
        EmbeddingProviderKind::Local => {
            let dir = resolve_with_base(base_dir, &settings.model_dir);
            Ok(Box::new(LocalEmbedder::load(&dir, settings.max_len)?))
        }
        EmbeddingProviderKind::Ollama => Ok(Box::new(OllamaEmbedder::connect(&settings.url, &settings.model)?)),
    }
}
