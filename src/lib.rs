//! Ocular library crate (used by the server and integration tests).
//!
//! Keyword-conditioned image verification: one uploaded image is scored
//! against an ordered label set (`"a {keyword}"` plus distractors) by a CLIP
//! embedding model, and a threshold policy turns the resulting distribution
//! into a pass/fail verdict.
//!
//! # Public API Surface
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`LabelSet`] - Ordered labels with the target pinned at index 0
//! - [`VerifyPolicy`], [`Verdict`] - Threshold decision over a distribution
//!
//! ## Scoring
//! - [`LabelScorer`] - Scorer seam injected into the gateway
//! - [`ClipScorer`], [`ClipScorerConfig`] - CLIP-backed implementation
//! - [`decode_image`] - Upload decode (performed before any inference)
//!
//! ## Collaborators
//! - [`TaskStore`], [`HttpTaskStore`] - Game backend adapter (random tasks,
//!   point credits)
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod labels;
pub mod scoring;
pub mod taskstore;

pub use config::{Config, ConfigError};
pub use constants::{
    CLIP_MAX_SEQ_LEN, DEFAULT_DISTRACTOR_LABELS, DEFAULT_VERIFICATION_THRESHOLD,
    OCULAR_STATUS_HEADER,
};
pub use embedding::{ClipScorer, ClipScorerConfig, EmbeddingError, LabelScorer, decode_image};
pub use gateway::{
    ClassifyResponse, GatewayError, HandlerState, create_router_with_limit,
    create_router_with_state,
};
pub use labels::{LabelError, LabelSet, default_distractors, normalize_keyword};
pub use scoring::{Verdict, VerifyPolicy, argmax};
pub use taskstore::{HttpTaskStore, RandomTask, StoreError, TaskStore};

#[cfg(any(test, feature = "mock"))]
pub use embedding::MockScorer;
#[cfg(any(test, feature = "mock"))]
pub use taskstore::MockTaskStore;
