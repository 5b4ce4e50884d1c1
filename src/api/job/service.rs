use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::dto::SearchFilters;
use super::guard::{InFlightGuard, RecordKey};
use super::models::{Job, JobCreate, JobUpdate};
use crate::api::import::{ImportError, ImportSession};
use crate::api::validation::{self, ValidationError};
use crate::http::{JobStore, StoreError};

/// Which store call failed, for the message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Search,
    Save,
    Delete,
    Upload,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Load => "Failed to load jobs. Please try again.",
            Operation::Search => "Failed to search jobs. Please try again.",
            Operation::Save => "Failed to save job. Please try again.",
            Operation::Delete => "Failed to delete job. Please try again.",
            Operation::Upload => "Failed to upload jobs. Please try again.",
        }
    }
}

/// Service-level errors.
///
/// The display text of each variant is the single line shown to the user.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("A submission for this {0} is already in progress.")]
    InFlight(RecordKey),

    #[error("{}", .operation.failure_message())]
    SubmissionFailed {
        operation: Operation,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    fn submission(operation: Operation) -> impl FnOnce(StoreError) -> ServiceError {
        move |source| {
            error!("Service: {:?} failed: {}", operation, source);
            ServiceError::SubmissionFailed { operation, source }
        }
    }
}

/// Job service containing the client-side business logic
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobStore>,
    guard: InFlightGuard,
}

impl JobService {
    /// Create a new JobService on top of a store
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            guard: InFlightGuard::new(),
        }
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Fetch the authoritative job list
    pub async fn list(&self) -> Result<Vec<Job>, ServiceError> {
        let jobs = self
            .store
            .list()
            .await
            .map_err(ServiceError::submission(Operation::Load))?;
        info!("Service: Loaded {} jobs", jobs.len());
        Ok(jobs)
    }

    /// Fetch a single job, including ones past the first page of `list`.
    ///
    /// # Returns
    /// - `Ok(Some(Job))` - Job as stored by the backend
    /// - `Ok(None)` - No job with this id
    /// - `Err(ServiceError)` - The store could not be reached
    pub async fn get(&self, id: i64) -> Result<Option<Job>, ServiceError> {
        match self.store.get(id).await {
            Ok(job) => Ok(Some(job)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(ServiceError::submission(Operation::Load)(e)),
        }
    }

    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Job>, ServiceError> {
        self.store
            .search(filters)
            .await
            .map_err(ServiceError::submission(Operation::Search))
    }

    /// Create a single job
    ///
    /// # Business Logic
    /// - Validates the candidate (first failing rule is reported)
    /// - Refuses a second create while one is outstanding
    /// - Sends the candidate unchanged to the store
    ///
    /// # Returns
    /// - `Ok(Job)` - Job as stored by the backend
    /// - `Err(ServiceError)` - Validation or submission failed
    pub async fn create(&self, candidate: &JobCreate) -> Result<Job, ServiceError> {
        self.check(candidate)?;
        let _token = self
            .guard
            .try_acquire(RecordKey::New)
            .ok_or(ServiceError::InFlight(RecordKey::New))?;

        info!("Service: Creating job title={} company={}", candidate.title, candidate.company);
        let job = self
            .store
            .create(candidate)
            .await
            .map_err(ServiceError::submission(Operation::Save))?;
        info!("Service: Job created with id={}", job.id);
        Ok(job)
    }

    /// Update an existing job with the full candidate record
    ///
    /// Every field is sent; absent optional fields are cleared on the backend.
    pub async fn update(&self, id: i64, candidate: &JobCreate) -> Result<Job, ServiceError> {
        self.check(candidate)?;
        let key = RecordKey::Existing(id);
        let _token = self
            .guard
            .try_acquire(key)
            .ok_or(ServiceError::InFlight(key))?;

        info!("Service: Updating job id={}", id);
        self.store
            .update(id, &JobUpdate::from(candidate.clone()))
            .await
            .map_err(ServiceError::submission(Operation::Save))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let key = RecordKey::Existing(id);
        let _token = self
            .guard
            .try_acquire(key)
            .ok_or(ServiceError::InFlight(key))?;

        info!("Service: Deleting job id={}", id);
        self.store
            .delete(id)
            .await
            .map_err(ServiceError::submission(Operation::Delete))
    }

    /// Upload a validated import
    ///
    /// # Business Logic
    /// - Only a `Validated`, non-empty import is uploaded
    /// - Records go to the store as parsed; the field validator is not
    ///   re-run per row
    /// - All-or-nothing: a record that does not fit the model blocks the batch
    pub async fn upload(&self, session: &ImportSession) -> Result<Vec<Job>, ServiceError> {
        let payloads = session.payloads().map_err(|e| {
            warn!("Service: Upload blocked: {}", e);
            e
        })?;
        let _token = self
            .guard
            .try_acquire(RecordKey::Batch)
            .ok_or(ServiceError::InFlight(RecordKey::Batch))?;

        info!("Service: Uploading batch of {} jobs", payloads.len());
        let created = self
            .store
            .create_batch(&payloads)
            .await
            .map_err(ServiceError::submission(Operation::Upload))?;
        info!("Service: Batch upload created {} jobs", created.len());
        Ok(created)
    }

    fn check(&self, candidate: &JobCreate) -> Result<(), ServiceError> {
        validation::validate(candidate).map_err(|e| {
            warn!("Service: Candidate rejected: {}", e);
            ServiceError::from(e)
        })
    }
}
