use image::DynamicImage;
use parking_lot::Mutex;

use super::{EmbeddingError, LabelScorer};

/// Test scorer returning a scripted distribution (or a scripted failure).
///
/// Records how many times `score` was called so tests can assert that
/// rejected-before-inference paths never reach the scorer.
#[derive(Debug)]
pub struct MockScorer {
    distribution: Option<Vec<f32>>,
    calls: Mutex<usize>,
}

impl MockScorer {
    /// Scorer that always returns `distribution`.
    pub fn returning(distribution: Vec<f32>) -> Self {
        Self {
            distribution: Some(distribution),
            calls: Mutex::new(0),
        }
    }

    /// Scorer that always fails with an inference error.
    pub fn failing() -> Self {
        Self {
            distribution: None,
            calls: Mutex::new(0),
        }
    }

    /// Number of times `score` has been invoked.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl LabelScorer for MockScorer {
    fn score(&self, _image: &DynamicImage, labels: &[String]) -> Result<Vec<f32>, EmbeddingError> {
        *self.calls.lock() += 1;

        match &self.distribution {
            Some(distribution) => {
                assert_eq!(
                    distribution.len(),
                    labels.len(),
                    "scripted distribution length must match the label set"
                );
                Ok(distribution.clone())
            }
            None => Err(EmbeddingError::InferenceFailed {
                reason: "mock scorer scripted to fail".to_string(),
            }),
        }
    }

    fn is_stub(&self) -> bool {
        true
    }
}
