use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::StoreError;
use super::{RandomTask, TaskStore};

/// Scripted in-memory store for tests.
#[derive(Debug, Default)]
pub struct MockTaskStore {
    task: Option<RandomTask>,
    fail: bool,
    awarded: Mutex<Vec<(i64, i64)>>,
}

impl MockTaskStore {
    /// Store that hands out `keyword` for every random-task request.
    pub fn with_task(keyword: &str) -> Self {
        Self {
            task: Some(RandomTask {
                keyword: keyword.to_string(),
            }),
            ..Default::default()
        }
    }

    /// Store with no tasks available.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store where every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// All `(user_id, amount)` pairs credited so far.
    pub fn awarded(&self) -> Vec<(i64, i64)> {
        self.awarded.lock().clone()
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn get_random_task(&self) -> Result<Option<RandomTask>, StoreError> {
        if self.fail {
            return Err(StoreError::UnexpectedStatus {
                status: 500,
                body: "mock store scripted to fail".to_string(),
            });
        }
        Ok(self.task.clone())
    }

    async fn add_points(&self, user_id: i64, amount: i64) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::UnexpectedStatus {
                status: 500,
                body: "mock store scripted to fail".to_string(),
            });
        }
        self.awarded.lock().push((user_id, amount));
        Ok(())
    }
}
