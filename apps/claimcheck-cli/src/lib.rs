//! Shared start-up for the claimcheck binaries.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use claimcheck_core::config::{resolve_with_base, Config, Settings};
use claimcheck_core::traits::Embedder;
use claimcheck_vector::{store, Retriever};

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Merged, validated settings plus the directory relative paths resolve against.
pub struct App {
    pub settings: Settings,
    pub base_dir: PathBuf,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = Config::load().map_err(|e| {
            eprintln!("Error loading config: {e}");
            e
        })?;
        let settings = config.settings()?;
        let base_dir = std::env::current_dir()?;
        tracing::info!(
            base = %base_dir.display(),
            embedding = ?settings.embedding.provider,
            judge = %settings.judge.model,
            top_k = settings.retrieval.top_k,
            "configuration loaded"
        );
        Ok(Self { settings, base_dir })
    }

    pub fn path(&self, p: &str) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }

    pub fn index_dir(&self) -> PathBuf {
        self.path(&self.settings.data.index_dir)
    }

    pub fn embedder(&self) -> Result<Box<dyn Embedder>> {
        claimcheck_embed::from_settings(&self.settings.embedding, &self.base_dir).context("initializing embedding provider")
    }

    /// Build the configured embedder and attach the persisted index to it.
    pub fn retriever(&self, rt: &Runtime) -> Result<Retriever> {
        let embedder = self.embedder()?;
        let index = load_index(rt, &self.index_dir(), &self.settings.retrieval.table)?;
        tracing::info!(rows = index.size(), embedder = index.embedder_id(), "retriever ready");
        Ok(Retriever::new(embedder).with_index(index)?)
    }
}

pub fn load_index(rt: &Runtime, dir: &Path, table: &str) -> Result<claimcheck_vector::SearchIndex> {
    rt.block_on(store::load(dir, table))
        .with_context(|| format!("loading index '{table}' from {}", dir.display()))
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().nth(max).is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("héllo", 10), "héllo");
        assert_eq!(preview("héllo wörld", 5), "héllo…");
    }
}
