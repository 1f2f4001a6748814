#[derive(Debug, Clone, PartialEq)]
/// Outcome of a verification decision.
pub enum Verdict {
    /// Target label was top-ranked at or above the threshold.
    Verified {
        /// Probability assigned to the target label.
        score: f32,
    },
    /// Target label lost the ranking or fell below the threshold.
    Rejected {
        /// Probability assigned to the target label.
        score: f32,
        /// Index that actually won the ranking.
        top_index: usize,
    },
}

impl Verdict {
    /// Returns `true` if verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified { .. })
    }

    /// Probability assigned to the target label.
    pub fn score(&self) -> f32 {
        match self {
            Verdict::Verified { score } | Verdict::Rejected { score, .. } => *score,
        }
    }

    /// Short status string (used for the response header and logs).
    pub fn status_label(&self) -> &'static str {
        match self {
            Verdict::Verified { .. } => crate::constants::OCULAR_STATUS_VERIFIED,
            Verdict::Rejected { .. } => crate::constants::OCULAR_STATUS_REJECTED,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Verified { score } => write!(f, "VERIFIED (score: {:.4})", score),
            Verdict::Rejected { score, top_index } => {
                write!(f, "REJECTED (score: {:.4}, top_index: {})", score, top_index)
            }
        }
    }
}
