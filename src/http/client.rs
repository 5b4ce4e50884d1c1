use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use crate::api::job::dto::SearchFilters;
use crate::api::job::models::{Job, JobCreate, JobUpdate};

/// Store-level errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Job not found: {0}")]
    NotFound(i64),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Job store is unavailable")]
    Unavailable,
}

/// Persistence boundary for job records.
///
/// Every call is a full round trip; implementations keep no client-side cache.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Job>, StoreError>;

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Job>, StoreError>;

    async fn get(&self, id: i64) -> Result<Job, StoreError>;

    async fn create(&self, payload: &JobCreate) -> Result<Job, StoreError>;

    async fn update(&self, id: i64, payload: &JobUpdate) -> Result<Job, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn create_batch(&self, payloads: &[JobCreate]) -> Result<Vec<Job>, StoreError>;
}

/// REST implementation of [`JobStore`] talking to the jobs backend
#[derive(Clone)]
pub struct HttpJobStore {
    client: Client,
    base_url: Url,
}

impl HttpJobStore {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn ensure_success(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        error!("Backend responded {} for {}", status, message);
        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn not_found_as(id: i64, err: StoreError) -> StoreError {
        match err {
            StoreError::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                StoreError::NotFound(id)
            }
            other => other,
        }
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let url = self.endpoint("jobs/")?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Job>, StoreError> {
        let url = self.endpoint("jobs/search")?;
        debug!("GET {} filters={:?}", url, filters);
        let response = self.client.get(url).query(filters).send().await?;
        Self::decode(response).await
    }

    async fn get(&self, id: i64) -> Result<Job, StoreError> {
        let url = self.endpoint(&format!("jobs/{}", id))?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response)
            .await
            .map_err(|e| Self::not_found_as(id, e))
    }

    async fn create(&self, payload: &JobCreate) -> Result<Job, StoreError> {
        let url = self.endpoint("jobs/")?;
        debug!("POST {} title={}", url, payload.title);
        let response = self.client.post(url).json(payload).send().await?;
        Self::decode(response).await
    }

    async fn update(&self, id: i64, payload: &JobUpdate) -> Result<Job, StoreError> {
        let url = self.endpoint(&format!("jobs/{}", id))?;
        debug!("PUT {}", url);
        let response = self.client.put(url).json(payload).send().await?;
        Self::decode(response)
            .await
            .map_err(|e| Self::not_found_as(id, e))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let url = self.endpoint(&format!("jobs/{}", id))?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        Self::ensure_success(response)
            .await
            .map(|_| ())
            .map_err(|e| Self::not_found_as(id, e))
    }

    async fn create_batch(&self, payloads: &[JobCreate]) -> Result<Vec<Job>, StoreError> {
        let url = self.endpoint("jobs/batch")?;
        debug!("POST {} with {} jobs", url, payloads.len());
        let response = self.client.post(url).json(payloads).send().await?;
        Self::decode(response).await
    }
}
