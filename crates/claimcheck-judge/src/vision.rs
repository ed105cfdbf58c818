use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use claimcheck_core::config::OcrSettings;
use claimcheck_core::error::{Error, Result};
use claimcheck_core::traits::LabelReader;

use crate::client::{generate, http_client, GenerateRequest};

const OCR_PROMPT: &str = "Transcribe all printed text on this supplement label exactly as written. \
Output only the transcribed text.";

/// Reads supplement labels with an Ollama vision model.
pub struct OllamaVision {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

impl OllamaVision {
    pub fn new(settings: &OcrSettings) -> Result<Self> {
        Ok(Self { client: http_client(settings.timeout_secs)?, url: settings.url.clone(), model: settings.model.clone() })
    }
}

/// Collapse runs of whitespace to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl LabelReader for OllamaVision {
    fn read_label(&self, image_path: &Path) -> Result<String> {
        if !image_path.is_file() {
            return Err(Error::NotFound(format!("image {}", image_path.display())));
        }
        let bytes = std::fs::read(image_path)?;
        let request = GenerateRequest {
            model: &self.model,
            prompt: OCR_PROMPT,
            stream: false,
            options: None,
            images: vec![STANDARD.encode(bytes)],
        };
        let text = collapse_whitespace(&generate(&self.client, &self.url, &request)?);
        tracing::info!(image = %image_path.display(), chars = text.len(), "label transcribed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(collapse_whitespace("  Vitamin D3\n\n 1000 IU\t softgels "), "Vitamin D3 1000 IU softgels");
    }

    #[test]
    fn missing_image_is_not_found() {
        let ocr = OllamaVision::new(&OcrSettings::default()).unwrap();
        let err = ocr.read_label(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
