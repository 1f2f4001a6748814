//! Embedding + model utilities.
//!
//! - [`clip`] provides keyword-conditioned image scoring.
//! - [`LabelScorer`] is the seam the gateway depends on; inject [`MockScorer`]
//!   in tests for fixed distributions.

/// CLIP scorer (the production [`LabelScorer`]).
pub mod clip;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use clip::{CLIP_MAX_SEQ_LEN, ClipScorer, ClipScorerConfig, decode_image};
pub use error::EmbeddingError;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockScorer;

use image::DynamicImage;

/// Scores one image against an ordered label set.
///
/// Implementations must return a probability distribution with the same
/// length and order as `labels` (values in [0, 1], summing to ~1). Scoring is
/// independent per call; no cross-request state beyond the immutable model.
pub trait LabelScorer: Send + Sync + 'static {
    /// Produces the per-label probability distribution for `image`.
    fn score(&self, image: &DynamicImage, labels: &[String]) -> Result<Vec<f32>, EmbeddingError>;

    /// Returns `true` when backed by the deterministic stub rather than real
    /// model weights.
    fn is_stub(&self) -> bool;
}
