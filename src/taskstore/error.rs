use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task store request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("task store returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("task store response could not be parsed: {reason}")]
    InvalidResponse { reason: String },
}
