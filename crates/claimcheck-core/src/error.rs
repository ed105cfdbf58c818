use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// No search index has been built or loaded.
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// Vector rows and chunk metadata records disagree in count.
    #[error("Index metadata mismatch: {vectors} vectors but {records} metadata records")]
    MetadataMismatch { vectors: usize, records: usize },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Non-success response, timeout or transport failure from an external model service.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// No JSON object could be recovered from a model completion.
    #[error("Could not parse model output: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Failures that belong to a single judged claim rather than to the whole run.
    pub fn is_per_claim(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
