//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `OCULAR_*` environment
//! variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_INFERENCE_TIMEOUT_SECS, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REWARD_POINTS,
    DEFAULT_VERIFICATION_THRESHOLD,
};
use crate::labels::default_distractors;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `OCULAR_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding `model.safetensors` + `tokenizer.json`. Unset runs
    /// the scorer in stub mode.
    pub model_path: Option<PathBuf>,

    /// Verification confidence threshold, inclusive. Default: `0.80`.
    pub threshold: f32,

    /// Distractor labels appended after the target label.
    pub distractors: Vec<String>,

    /// Keyword used when a request omits the `keyword` field. Unset means
    /// such requests are rejected.
    pub default_keyword: Option<String>,

    /// Base URL of the game backend's task/points API. Unset disables the
    /// store-backed endpoints.
    pub task_api_url: Option<String>,

    /// Points credited for a verified submission. Default: `10`.
    pub reward_points: i64,

    /// Per-request bound on decode + inference, in seconds. Default: `5`.
    pub inference_timeout_secs: u64,

    /// Maximum multipart upload size in bytes. Default: 8 MiB.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            model_path: None,
            threshold: DEFAULT_VERIFICATION_THRESHOLD,
            distractors: default_distractors(),
            default_keyword: None,
            task_api_url: None,
            reward_points: DEFAULT_REWARD_POINTS,
            inference_timeout_secs: DEFAULT_INFERENCE_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "OCULAR_PORT";
    const ENV_BIND_ADDR: &'static str = "OCULAR_BIND_ADDR";
    const ENV_MODEL_PATH: &'static str = "OCULAR_MODEL_PATH";
    const ENV_THRESHOLD: &'static str = "OCULAR_THRESHOLD";
    const ENV_DISTRACTORS: &'static str = "OCULAR_DISTRACTORS";
    const ENV_DEFAULT_KEYWORD: &'static str = "OCULAR_DEFAULT_KEYWORD";
    const ENV_TASK_API_URL: &'static str = "OCULAR_TASK_API_URL";
    const ENV_REWARD_POINTS: &'static str = "OCULAR_REWARD_POINTS";
    const ENV_INFERENCE_TIMEOUT_SECS: &'static str = "OCULAR_INFERENCE_TIMEOUT_SECS";
    const ENV_MAX_UPLOAD_BYTES: &'static str = "OCULAR_MAX_UPLOAD_BYTES";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let model_path = Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH).map(PathBuf::from);
        let threshold = Self::parse_threshold_from_env(defaults.threshold)?;
        let distractors = Self::parse_distractors_from_env(defaults.distractors)?;
        let default_keyword = Self::parse_optional_string_from_env(Self::ENV_DEFAULT_KEYWORD);
        let task_api_url = Self::parse_optional_string_from_env(Self::ENV_TASK_API_URL);
        let reward_points =
            Self::parse_i64_from_env(Self::ENV_REWARD_POINTS, defaults.reward_points);
        let inference_timeout_secs = Self::parse_u64_from_env(
            Self::ENV_INFERENCE_TIMEOUT_SECS,
            defaults.inference_timeout_secs,
        );
        let max_upload_bytes =
            Self::parse_usize_from_env(Self::ENV_MAX_UPLOAD_BYTES, defaults.max_upload_bytes);

        Ok(Self {
            port,
            bind_addr,
            model_path,
            threshold,
            distractors,
            default_keyword,
            task_api_url,
            reward_points,
            inference_timeout_secs,
            max_upload_bytes,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::ThresholdOutOfRange {
                value: self.threshold,
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_threshold_from_env(default: f32) -> Result<f32, ConfigError> {
        match env::var(Self::ENV_THRESHOLD) {
            Ok(value) => {
                let threshold: f32 =
                    value
                        .parse()
                        .map_err(|e| ConfigError::ThresholdParseError {
                            value: value.clone(),
                            source: e,
                        })?;

                if !(threshold > 0.0 && threshold <= 1.0) {
                    return Err(ConfigError::ThresholdOutOfRange { value: threshold });
                }

                Ok(threshold)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_distractors_from_env(default: Vec<String>) -> Result<Vec<String>, ConfigError> {
        match env::var(Self::ENV_DISTRACTORS) {
            Ok(value) => {
                let labels: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();

                if labels.is_empty() {
                    return Err(ConfigError::EmptyDistractors { value });
                }

                Ok(labels)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_i64_from_env(var_name: &str, default: i64) -> i64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
