//! Label set construction.
//!
//! The scorer is contrastive: it needs the keyword-derived hypothesis plus
//! distractor alternatives to produce a meaningful distribution. The target
//! label always sits at [`LabelSet::TARGET_INDEX`]; downstream policy code
//! relies on that position, never on label text.


use thiserror::Error;

use crate::constants::DEFAULT_DISTRACTOR_LABELS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("keyword must be a non-empty string")]
    EmptyKeyword,
}

/// Ordered label set: the keyword-derived target first, distractors after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Position of the target label; a fixed contract, not a convention.
    pub const TARGET_INDEX: usize = 0;

    /// Builds the label set for a keyword.
    ///
    /// The keyword is whitespace-normalized and wrapped in the descriptive
    /// template `"a {keyword}"` (a bare noun scores poorly against full
    /// phrases). An empty or whitespace-only keyword is rejected.
    pub fn for_keyword(keyword: &str, distractors: &[String]) -> Result<Self, LabelError> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Err(LabelError::EmptyKeyword);
        }

        let mut labels = Vec::with_capacity(1 + distractors.len());
        labels.push(format!("a {keyword}"));
        labels.extend(distractors.iter().cloned());

        Ok(Self { labels })
    }

    /// Builds the label set with the default distractors.
    pub fn with_default_distractors(keyword: &str) -> Result<Self, LabelError> {
        Self::for_keyword(keyword, &default_distractors())
    }

    /// The full ordered label sequence.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The target label text (always index 0).
    pub fn target(&self) -> &str {
        &self.labels[Self::TARGET_INDEX]
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Trims the keyword and collapses internal whitespace runs.
pub fn normalize_keyword(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Default distractor labels as owned strings.
pub fn default_distractors() -> Vec<String> {
    DEFAULT_DISTRACTOR_LABELS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
