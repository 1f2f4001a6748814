use tracing::debug;

use super::types::Verdict;
use crate::constants::DEFAULT_VERIFICATION_THRESHOLD;

/// Threshold-based pass/fail decision over an ordered distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyPolicy {
    threshold: f32,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_VERIFICATION_THRESHOLD,
        }
    }
}

impl VerifyPolicy {
    /// Creates a policy with the given confidence threshold.
    pub fn new(threshold: f32) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "threshold must be in (0.0, 1.0]"
        );
        Self { threshold }
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Decides whether `target_index` verifies against `distribution`.
    ///
    /// `verified = argmax(distribution) == target_index
    ///             && distribution[target_index] >= threshold`
    ///
    /// The threshold bound is inclusive, and argmax is first-occurrence: a
    /// tie between the target and a later index resolves to the target.
    pub fn decide(&self, distribution: &[f32], target_index: usize) -> Verdict {
        let Some(top_index) = argmax(distribution) else {
            debug!("Empty distribution, rejecting");
            return Verdict::Rejected {
                score: 0.0,
                top_index: 0,
            };
        };

        let score = distribution.get(target_index).copied().unwrap_or(0.0);

        if top_index == target_index && score >= self.threshold {
            Verdict::Verified { score }
        } else {
            Verdict::Rejected { score, top_index }
        }
    }
}

/// Index of the maximum value, first occurrence on ties. `None` when empty.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
