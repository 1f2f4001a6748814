//! CLIP scorer (safetensors weights + tokenizer).
//!
//! Use [`ClipScorerConfig::stub`] for tests/deployments without model files.

/// Scorer configuration.
pub mod config;
/// Raster decode + pixel preprocessing.
pub mod image;


pub use config::{CLIP_MAX_SEQ_LEN, ClipScorerConfig};
pub use image::decode_image;

use std::sync::Arc;

use ::image::DynamicImage;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::embedding::LabelScorer;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_tokenizer_with_truncation;

enum ScorerBackend {
    Model(Arc<LoadedClip>),
    Stub,
}

struct LoadedClip {
    // The candle graph is not re-entrant; concurrent requests queue here.
    model: Mutex<clip::ClipModel>,
    tokenizer: tokenizers::Tokenizer,
    pad_id: u32,
    image_size: usize,
    device: Device,
}

impl LoadedClip {
    fn score(&self, image: &DynamicImage, labels: &[String]) -> Result<Vec<f32>, EmbeddingError> {
        let pixel_values = self::image::preprocess(image, self.image_size, &self.device)?;
        let input_ids = self.tokenize_labels(labels)?;

        debug!(
            num_labels = labels.len(),
            image_size = self.image_size,
            "Scoring image against label set"
        );

        // logits_per_image: [1, num_labels]
        let (_logits_per_text, logits_per_image) = self
            .model
            .lock()
            .forward(&pixel_values, &input_ids)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("CLIP forward pass failed: {}", e),
            })?;

        let distribution = candle_nn::ops::softmax(&logits_per_image, candle_core::D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;

        Ok(distribution)
    }

    fn tokenize_labels(&self, labels: &[String]) -> Result<Tensor, EmbeddingError> {
        let mut rows: Vec<Vec<u32>> = Vec::with_capacity(labels.len());
        for label in labels {
            let encoding = self.tokenizer.encode(label.as_str(), true).map_err(|e| {
                EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                }
            })?;
            rows.push(encoding.get_ids().to_vec());
        }

        // Ragged rows are padded up to the longest label in the batch.
        let max_len = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(max_len, self.pad_id);
        }

        Ok(Tensor::new(rows, &self.device)?)
    }
}

/// Keyword-conditioned image scorer over a shared image/text embedding space.
///
/// Loads the `openai/clip-vit-base-patch32` architecture once at construction
/// and holds it immutable for the life of the process. `score` encodes one
/// image against an ordered label set and returns the softmax distribution
/// over the label axis.
pub struct ClipScorer {
    backend: ScorerBackend,
    config: ClipScorerConfig,
}

impl std::fmt::Debug for ClipScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipScorer")
            .field(
                "backend",
                &match &self.backend {
                    ScorerBackend::Model(loaded) => format!("Model({:?})", loaded.device),
                    ScorerBackend::Stub => "Stub".to_string(),
                },
            )
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl ClipScorer {
    /// Loads the scorer from a config (stub mode is supported).
    pub fn load(config: ClipScorerConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("CLIP scorer running in STUB mode (testing only)");
            return Ok(Self {
                backend: ScorerBackend::Stub,
                config,
            });
        }

        if !config.weights_available() || !config.tokenizer_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.weights_path.clone(),
            });
        }

        let loaded = Self::load_model(&config)?;

        info!(
            weights_path = %config.weights_path.display(),
            image_size = loaded.image_size,
            max_seq_len = config.max_seq_len,
            "CLIP model loaded"
        );

        Ok(Self {
            backend: ScorerBackend::Model(Arc::new(loaded)),
            config,
        })
    }

    fn load_model(config: &ClipScorerConfig) -> Result<LoadedClip, EmbeddingError> {
        let device = select_device()?;
        debug!(?device, "Selected compute device for CLIP");

        let clip_config = clip::ClipConfig::vit_base_patch32();

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[config.weights_path.clone()],
                DType::F32,
                &device,
            )?
        };
        let model =
            clip::ClipModel::new(vb, &clip_config).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to build CLIP graph: {}", e),
            })?;

        let tokenizer = load_tokenizer_with_truncation(&config.tokenizer_path, config.max_seq_len)
            .map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        // CLIP pads with the end-of-text token; its position marks the pooled
        // text embedding.
        let pad_id = *tokenizer.get_vocab(true).get("<|endoftext|>").ok_or_else(|| {
            EmbeddingError::ModelLoadFailed {
                reason: "tokenizer vocab is missing <|endoftext|>".to_string(),
            }
        })?;

        Ok(LoadedClip {
            model: Mutex::new(model),
            tokenizer,
            pad_id,
            image_size: clip_config.image_size,
            device,
        })
    }

    /// Convenience constructor for stub mode.
    pub fn stub() -> Result<Self, EmbeddingError> {
        Self::load(ClipScorerConfig::stub())
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, ScorerBackend::Stub)
    }

    /// Returns `true` if a model is loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, ScorerBackend::Model(_))
    }

    /// Returns the scorer configuration.
    pub fn config(&self) -> &ClipScorerConfig {
        &self.config
    }

    /// Deterministic pseudo-scores derived from the image and label text.
    ///
    /// Same image + same labels always produce the same distribution, and the
    /// output is a valid probability simplex.
    fn score_stub(&self, image: &DynamicImage, labels: &[String]) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut fingerprint = DefaultHasher::new();
        image.width().hash(&mut fingerprint);
        image.height().hash(&mut fingerprint);
        for byte in image.as_bytes().iter().take(64) {
            byte.hash(&mut fingerprint);
        }
        let image_seed = fingerprint.finish();

        let logits: Vec<f32> = labels
            .iter()
            .map(|label| {
                let mut hasher = DefaultHasher::new();
                image_seed.hash(&mut hasher);
                label.hash(&mut hasher);
                // bounded logits keep the softmax well-conditioned
                (hasher.finish() % 1000) as f32 / 250.0
            })
            .collect();

        softmax_f32(&logits)
    }
}

impl LabelScorer for ClipScorer {
    fn score(&self, image: &DynamicImage, labels: &[String]) -> Result<Vec<f32>, EmbeddingError> {
        if labels.is_empty() {
            return Err(EmbeddingError::InvalidLabels {
                reason: "label set is empty".to_string(),
            });
        }

        match &self.backend {
            ScorerBackend::Model(loaded) => loaded.score(image, labels),
            ScorerBackend::Stub => Ok(self.score_stub(image, labels)),
        }
    }

    fn is_stub(&self) -> bool {
        ClipScorer::is_stub(self)
    }
}

fn softmax_f32(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
