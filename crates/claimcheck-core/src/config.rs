//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_JUDGE__MODEL`). Every key has a
//! default so an empty working directory still yields usable [`Settings`].

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        tracing::debug!(env = %env_name, "configuration sources merged");
        Ok(Self { figment })
    }

    /// Build from an inline TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Self {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        Self { figment }
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub judge: JudgeSettings,
    pub ocr: OcrSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into()));
        }
        if self.judge.timeout_secs == 0 {
            return Err(Error::InvalidConfig("judge.timeout_secs must be positive".into()));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(Error::InvalidConfig("ocr.timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub docs_path: String,
    pub chunks_path: String,
    pub index_dir: String,
    pub failure_set: String,
    pub eval_out_dir: String,
    pub history_db: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            docs_path: "data/processed/docs.jsonl".into(),
            chunks_path: "data/processed/chunks.jsonl".into(),
            index_dir: "data/processed/index".into(),
            failure_set: "eval/failure_set.jsonl".into(),
            eval_out_dir: "eval/results".into(),
            history_db: "telemetry/history.db".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub table: String,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5, table: "chunks".into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Local,
    Ollama,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,
    /// Directory holding `config.json`, `tokenizer.json` and weights for the local model.
    pub model_dir: String,
    pub model: String,
    pub url: String,
    pub max_len: usize,
    pub batch_size: usize,
    pub fake_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Local,
            model_dir: "models/all-MiniLM-L6-v2".into(),
            model: "all-minilm".into(),
            url: "http://localhost:11434/api/embed".into(),
            max_len: 256,
            batch_size: 32,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for JudgeSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".into(),
            model: "llama3.1:8b".into(),
            temperature: 0.2,
            timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { url: "http://localhost:11434/api/generate".into(), model: "llava".into(), timeout_secs: 120 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_pipeline() {
        let settings = Config::from_toml_str("").settings().unwrap();
        assert_eq!(settings.chunking.max_chars, 1200);
        assert_eq!(settings.chunking.overlap_chars, 200);
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.judge.timeout_secs, 180);
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Local);
    }

    #[test]
    fn toml_overrides_nested_keys() {
        let config = Config::from_toml_str(
            r#"
            [judge]
            model = "qwen2.5:7b"
            [embedding]
            provider = "fake"
            "#,
        );
        let settings = config.settings().unwrap();
        assert_eq!(settings.judge.model, "qwen2.5:7b");
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Fake);
        assert_eq!(settings.retrieval.top_k, 5);
    }

    #[test]
    fn rejects_non_advancing_chunk_window() {
        let config = Config::from_toml_str("[chunking]\nmax_chars = 100\noverlap_chars = 100\n");
        assert!(config.settings().is_err());
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let base = Path::new("/srv/claimcheck");
        assert_eq!(resolve_with_base(base, "/tmp/index"), PathBuf::from("/tmp/index"));
        assert_eq!(resolve_with_base(base, "data/index"), PathBuf::from("/srv/claimcheck/data/index"));
    }
}
