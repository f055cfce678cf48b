//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not enough data to reconcile descriptions and images")]
    InsufficientData,

    #[error("No unclaimed first-frame image for slot {slot}")]
    UnresolvedSlot { slot: usize },

    #[error("Generation failed for index {index}")]
    GenerationFailed { index: usize },

    #[error("Asset {index} not ready after {attempts} attempts")]
    AssetNotReady { index: usize, attempts: u32 },

    #[error("Invalid asset {index}: {reason}")]
    InvalidAsset { index: usize, reason: String },

    #[error("Output stream closed by consumer")]
    StreamClosed,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Generation service error: {0}")]
    GenAi(#[from] reel_genai::GenAiError),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] reel_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Check if this error means the caller's request was rejected
    /// before any remote work started.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput(_)
                | PipelineError::InsufficientData
                | PipelineError::UnresolvedSlot { .. }
        )
    }
}
