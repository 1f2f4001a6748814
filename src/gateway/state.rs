use std::sync::Arc;
use std::time::Duration;

use crate::constants::{DEFAULT_INFERENCE_TIMEOUT_SECS, DEFAULT_REWARD_POINTS};
use crate::embedding::LabelScorer;
use crate::labels::default_distractors;
use crate::scoring::VerifyPolicy;
use crate::taskstore::TaskStore;

/// Shared state injected into every gateway handler.
///
/// The scorer is loaded once at startup and immutable afterwards; handlers
/// receive it here rather than through ambient globals so tests can swap in a
/// fake returning fixed distributions.
pub struct HandlerState<S: LabelScorer, T: TaskStore> {
    pub scorer: Arc<S>,

    /// Game backend adapter; `None` when no store is configured.
    pub task_store: Option<Arc<T>>,

    pub policy: VerifyPolicy,

    /// Distractor labels appended after the target label.
    pub distractors: Vec<String>,

    /// Fallback keyword for requests that omit the field.
    pub default_keyword: Option<String>,

    /// Points credited per verified submission.
    pub reward_points: i64,

    /// Bound on the decode + inference step.
    pub inference_timeout: Duration,
}

impl<S: LabelScorer, T: TaskStore> Clone for HandlerState<S, T> {
    fn clone(&self) -> Self {
        Self {
            scorer: Arc::clone(&self.scorer),
            task_store: self.task_store.clone(),
            policy: self.policy,
            distractors: self.distractors.clone(),
            default_keyword: self.default_keyword.clone(),
            reward_points: self.reward_points,
            inference_timeout: self.inference_timeout,
        }
    }
}

impl<S: LabelScorer, T: TaskStore> HandlerState<S, T> {
    pub fn new(scorer: Arc<S>, task_store: Option<Arc<T>>, policy: VerifyPolicy) -> Self {
        Self {
            scorer,
            task_store,
            policy,
            distractors: default_distractors(),
            default_keyword: None,
            reward_points: DEFAULT_REWARD_POINTS,
            inference_timeout: Duration::from_secs(DEFAULT_INFERENCE_TIMEOUT_SECS),
        }
    }

    pub fn with_distractors(mut self, distractors: Vec<String>) -> Self {
        self.distractors = distractors;
        self
    }

    pub fn with_default_keyword(mut self, keyword: Option<String>) -> Self {
        self.default_keyword = keyword;
        self
    }

    pub fn with_reward_points(mut self, points: i64) -> Self {
        self.reward_points = points;
        self
    }

    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }
}
