use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default max token count for label text (the CLIP context limit).
pub const CLIP_MAX_SEQ_LEN: usize = crate::constants::CLIP_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`ClipScorer`](super::ClipScorer).
pub struct ClipScorerConfig {
    /// Path to the safetensors weights file.
    pub weights_path: PathBuf,
    /// Path to `tokenizer.json`.
    pub tokenizer_path: PathBuf,
    /// Max tokens per label.
    pub max_seq_len: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ClipScorerConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            tokenizer_path: PathBuf::new(),
            max_seq_len: CLIP_MAX_SEQ_LEN,
            testing_stub: false,
        }
    }
}

impl ClipScorerConfig {
    /// Creates a config from a model directory containing `model.safetensors`
    /// and `tokenizer.json`.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();

        Self {
            weights_path: model_dir.join("model.safetensors"),
            tokenizer_path: model_dir.join("tokenizer.json"),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic scores).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            return Ok(());
        }

        if self.weights_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "weights_path is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.weights_path.exists() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.weights_path.clone(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the weights file exists.
    pub fn weights_available(&self) -> bool {
        !self.weights_path.as_os_str().is_empty() && self.weights_path.exists()
    }

    /// Returns `true` if the tokenizer file exists.
    pub fn tokenizer_available(&self) -> bool {
        !self.tokenizer_path.as_os_str().is_empty() && self.tokenizer_path.exists()
    }
}
