//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.

/// Default confidence threshold applied by the verification policy.
///
/// Deployments have historically run this between 0.80 and 0.85; the value is
/// tunable via `OCULAR_THRESHOLD` and the bound is inclusive.
pub const DEFAULT_VERIFICATION_THRESHOLD: f32 = 0.80;

/// Maximum text sequence length supported by the CLIP text encoder.
pub const CLIP_MAX_SEQ_LEN: usize = 77;

/// Distractor labels used when none are configured.
///
/// The target label (`"a {keyword}"`) always occupies index 0 of the label
/// set; these fill the remaining slots.
pub const DEFAULT_DISTRACTOR_LABELS: [&str; 2] = ["a blurry background", "a random object"];

/// Points awarded for a verified submission when no override is configured.
pub const DEFAULT_REWARD_POINTS: i64 = 10;

/// Upper bound on image decode + inference per request, in seconds.
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted multipart upload size, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

/// Response header carrying the gateway's disposition of the request.
pub const OCULAR_STATUS_HEADER: &str = "x-ocular-status";

/// Header value for a verified evaluation.
pub const OCULAR_STATUS_VERIFIED: &str = "verified";
/// Header value for a completed evaluation that did not verify.
pub const OCULAR_STATUS_REJECTED: &str = "rejected";
/// Header value reported by `/healthz`.
pub const OCULAR_STATUS_HEALTHY: &str = "healthy";
/// Header value for a ready component.
pub const OCULAR_STATUS_READY: &str = "ready";
/// Header value for a failed or misconfigured component.
pub const OCULAR_STATUS_ERROR: &str = "error";
