use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use super::error::StoreError;
use super::{RandomTask, TaskStore};

const STORE_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// REST client for the game backend's task and points endpoints.
///
/// Connections come from reqwest's internal pool, acquired per request and
/// returned on every exit path.
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AddPointsBody {
    amount: i64,
}

impl HttpTaskStore {
    /// Creates a store client for `base_url` (no trailing slash required).
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(STORE_REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn get_random_task(&self) -> Result<Option<RandomTask>, StoreError> {
        let url = self.url("/tasks/random");
        debug!(url = %url, "Fetching random task");

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let task = response
                    .json::<RandomTask>()
                    .await
                    .map_err(|e| StoreError::InvalidResponse {
                        reason: e.to_string(),
                    })?;
                Ok(Some(task))
            }
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn add_points(&self, user_id: i64, amount: i64) -> Result<(), StoreError> {
        let url = self.url(&format!("/users/{user_id}/points"));
        debug!(url = %url, amount, "Crediting points");

        let response = self
            .client
            .post(&url)
            .json(&AddPointsBody { amount })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
