//! Embeddings from an Ollama server (`POST /api/embed`).

use anyhow::{anyhow, ensure, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use claimcheck_core::traits::Embedder;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dim: usize,
    id: String,
}

impl OllamaEmbedder {
    /// Connects and probes the model once to learn its dimensionality.
    pub fn connect(url: &str, model: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        let mut embedder = Self { client, url: url.to_string(), model: model.to_string(), dim: 0, id: String::new() };
        let probe = embedder.request(&["dimension probe".to_string()])?;
        let dim = probe.first().map(Vec::len).ok_or_else(|| anyhow!("embedding server returned no vectors"))?;
        embedder.dim = dim;
        embedder.id = format!("ollama:{model}:d{dim}");
        tracing::info!(url, model, dim, "connected to embedding server");
        Ok(embedder)
    }

    fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let resp = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .with_context(|| format!("embedding request to {}", self.url))?
            .error_for_status()?;
        let body: EmbedResponse = resp.json().context("decoding embedding response")?;
        ensure!(body.embeddings.len() == texts.len(), "asked for {} embeddings, got {}", texts.len(), body.embeddings.len());
        Ok(body.embeddings)
    }
}

impl Embedder for OllamaEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let vectors = self.request(texts)?;
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(anyhow!("embedding server changed dimension: expected {}, got {}", self.dim, bad.len()));
        }
        Ok(vectors)
    }
}
