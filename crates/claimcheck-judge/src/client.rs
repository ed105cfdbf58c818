//! Blocking client for Ollama's `/api/generate` endpoint.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use claimcheck_core::config::JudgeSettings;
use claimcheck_core::error::{Error, Result};
use claimcheck_core::traits::JudgeModel;

#[derive(Serialize)]
pub(crate) struct GenerateOptions {
    pub temperature: f32,
}

#[derive(Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct GenerateResponse {
    pub response: String,
}

/// Send one non-streaming generate request and return the `response` text.
pub(crate) fn generate(client: &Client, url: &str, request: &GenerateRequest<'_>) -> Result<String> {
    let resp = client.post(url).json(request).send().map_err(|e| {
        if e.is_timeout() {
            Error::Upstream(format!("request to {url} timed out"))
        } else {
            Error::Upstream(format!("request to {url} failed: {e}"))
        }
    })?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(Error::Upstream(format!("{url} returned {status}: {}", body.trim())));
    }
    let body: GenerateResponse = resp
        .json()
        .map_err(|e| Error::Upstream(format!("unexpected response body from {url}: {e}")))?;
    Ok(body.response)
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {e}")))
}

/// The judge model served by a local Ollama instance.
pub struct OllamaJudge {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
}

impl OllamaJudge {
    pub fn new(settings: &JudgeSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            url: settings.url.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl JudgeModel for OllamaJudge {
    fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling judge model");
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Some(GenerateOptions { temperature: self.temperature }),
            images: Vec::new(),
        };
        generate(&self.client, &self.url, &request)
    }
}
