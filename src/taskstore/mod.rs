//! Task store adapter.
//!
//! The game backend that owns tasks and point balances is an external
//! collaborator; this module only models the interface the verification
//! service consumes. [`HttpTaskStore`] talks to its REST API; inject
//! [`MockTaskStore`] in tests.

pub mod error;
pub mod http;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use error::StoreError;
pub use http::HttpTaskStore;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTaskStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A task handed out for photo verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomTask {
    /// Keyword the submitted photo must match.
    pub keyword: String,
}

/// Consumed interface of the game backend.
///
/// Calls acquire and release their connection within the request scope;
/// implementations must not share an unpooled connection across concurrent
/// requests.
#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Fetches a random open task, or `None` when the store has none.
    async fn get_random_task(&self) -> Result<Option<RandomTask>, StoreError>;

    /// Credits `amount` points to `user_id`.
    async fn add_points(&self, user_id: i64, amount: i64) -> Result<(), StoreError>;
}
