use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::client::{JobStore, StoreError};
use crate::api::job::dto::{SearchFilters, SortField};
use crate::api::job::models::{Job, JobCreate, JobUpdate};
use crate::api::validation::parse_date;

const DEFAULT_LIMIT: usize = 100;

/// In-process [`JobStore`] with the same observable behaviour as the REST
/// backend: sequential ids, server timestamps, duplicate suppression on
/// `(job_board_id, company)` and case-insensitive substring search.
#[derive(Default)]
pub struct MemoryJobStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default, Clone)]
struct Inner {
    jobs: Vec<Job>,
    next_id: i64,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.inner.lock().map_err(|_| StoreError::Unavailable)
    }

    fn insert(inner: &mut Inner, payload: &JobCreate) -> Result<Job, StoreError> {
        if let (Some(board_id), company) = (payload.job_board_id.as_deref(), payload.company.as_str()) {
            if let Some(existing) = inner
                .jobs
                .iter()
                .find(|job| job.job_board_id.as_deref() == Some(board_id) && job.company == company)
            {
                debug!("Duplicate posting {} at {}, returning job {}", board_id, company, existing.id);
                return Ok(existing.clone());
            }
        }

        inner.next_id += 1;
        let now = Utc::now().naive_utc();
        let job = build_job(inner.next_id, payload, now, now)?;
        inner.jobs.push(job.clone());
        Ok(job)
    }
}

fn stored_date(raw: Option<&str>) -> Result<Option<NaiveDate>, StoreError> {
    match raw {
        None => Ok(None),
        Some(value) => parse_date(value).map(Some).ok_or_else(|| StoreError::Status {
            status: 422,
            message: format!("invalid date: {}", value),
        }),
    }
}

fn build_job(
    id: i64,
    payload: &JobCreate,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
) -> Result<Job, StoreError> {
    Ok(Job {
        id,
        title: payload.title.clone(),
        company: payload.company.clone(),
        location: payload.location.clone(),
        status: payload.status,
        applied_date: stored_date(payload.applied_date.as_deref())?,
        follow_up_date: stored_date(payload.follow_up_date.as_deref())?,
        job_link: payload.job_link.clone(),
        job_description: payload.job_description.clone(),
        resume_path: payload.resume_path.clone(),
        job_board_id: payload.job_board_id.clone(),
        source: payload.source.clone(),
        notes: payload.notes.clone(),
        created_at,
        updated_at,
    })
}

fn contains_ignore_case(haystack: &str, needle: &Option<String>) -> bool {
    match needle.as_deref() {
        Some(needle) if !needle.is_empty() => haystack.to_lowercase().contains(&needle.to_lowercase()),
        _ => true,
    }
}

fn compare(a: &Job, b: &Job, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Company => a.company.cmp(&b.company),
        SortField::Location => a.location.cmp(&b.location),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::AppliedDate => a.applied_date.cmp(&b.applied_date),
        SortField::FollowUpDate => a.follow_up_date.cmp(&b.follow_up_date),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list(&self) -> Result<Vec<Job>, StoreError> {
        let inner = self.lock()?;
        Ok(inner.jobs.iter().take(DEFAULT_LIMIT).cloned().collect())
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Job>, StoreError> {
        let inner = self.lock()?;
        let status = filters.status.map(|s| s.as_str().to_string());

        let mut matched: Vec<Job> = inner
            .jobs
            .iter()
            .filter(|job| contains_ignore_case(&job.company, &filters.company))
            .filter(|job| contains_ignore_case(&job.title, &filters.title))
            .filter(|job| contains_ignore_case(&job.location, &filters.location))
            .filter(|job| contains_ignore_case(job.status.as_str(), &status))
            .cloned()
            .collect();

        let field = filters.sort_by.unwrap_or(SortField::AppliedDate);
        let descending = filters.sort_desc.unwrap_or(true);
        matched.sort_by(|a, b| {
            let ordering = compare(a, b, field);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        let skip = filters.skip.unwrap_or(0) as usize;
        let limit = filters.limit.map(|l| l as usize).unwrap_or(DEFAULT_LIMIT);
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn create(&self, payload: &JobCreate) -> Result<Job, StoreError> {
        let mut inner = self.lock()?;
        Self::insert(&mut inner, payload)
    }

    async fn update(&self, id: i64, payload: &JobUpdate) -> Result<Job, StoreError> {
        let mut inner = self.lock()?;
        let slot = inner
            .jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let merged = payload.apply_to(&JobCreate::from(&*slot));
        let updated = build_job(id, &merged, slot.created_at, Utc::now().naive_utc())?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let position = inner
            .jobs
            .iter()
            .position(|job| job.id == id)
            .ok_or(StoreError::NotFound(id))?;
        inner.jobs.remove(position);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Job, StoreError> {
        let inner = self.lock()?;
        inner
            .jobs
            .iter()
            .find(|job| job.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// All rows land or none do; ids are only consumed on success.
    async fn create_batch(&self, payloads: &[JobCreate]) -> Result<Vec<Job>, StoreError> {
        let mut inner = self.lock()?;
        let mut staged = inner.clone();
        let created = payloads
            .iter()
            .map(|payload| Self::insert(&mut staged, payload))
            .collect::<Result<Vec<_>, _>>()?;
        *inner = staged;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::{JobStatus, Patch};

    fn posting(title: &str, company: &str, applied: Option<&str>) -> JobCreate {
        let mut job = JobCreate::new(title, company, "Remote");
        job.applied_date = applied.map(String::from);
        job
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryJobStore::new();
        let first = store.create(&posting("Dev", "Acme", None)).await.unwrap();
        let second = store.create(&posting("Ops", "Acme", None)).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_board_posting_returns_existing() {
        let store = MemoryJobStore::new();
        let mut job = posting("Dev", "Acme", None);
        job.job_board_id = Some("LI-42".into());
        let first = store.create(&job).await.unwrap();
        let again = store.create(&job).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_filters_and_sorts() {
        let store = MemoryJobStore::new();
        store
            .create_batch(&[
                posting("Backend Dev", "Acme", Some("2024-01-05")),
                posting("Frontend Dev", "Globex", Some("2024-02-01")),
                posting("Backend Lead", "ACME Labs", Some("2024-03-01")),
            ])
            .await
            .unwrap();

        let filters = SearchFilters {
            company: Some("acme".into()),
            ..Default::default()
        };
        let found = store.search(&filters).await.unwrap();
        let titles: Vec<_> = found.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["Backend Lead", "Backend Dev"]);

        let filters = SearchFilters {
            sort_by: Some(SortField::Title),
            sort_desc: Some(false),
            limit: Some(2),
            ..Default::default()
        };
        let found = store.search(&filters).await.unwrap();
        let titles: Vec<_> = found.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, ["Backend Dev", "Backend Lead"]);
    }

    #[tokio::test]
    async fn batch_with_bad_row_stores_nothing() {
        let store = MemoryJobStore::new();
        let err = store
            .create_batch(&[
                posting("Dev", "Acme", Some("2024-01-10")),
                posting("Ops", "Globex", Some("01/10/2024")),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 422, .. }));
        assert!(store.list().await.unwrap().is_empty());

        let job = store.create(&posting("Dev", "Acme", None)).await.unwrap();
        assert_eq!(job.id, 1);
    }

    #[tokio::test]
    async fn get_finds_jobs_past_list_limit() {
        let store = MemoryJobStore::new();
        let batch: Vec<JobCreate> = (0..DEFAULT_LIMIT + 1)
            .map(|n| posting(&format!("Role {}", n), "Acme", None))
            .collect();
        store.create_batch(&batch).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), DEFAULT_LIMIT);
        let last = store.get(DEFAULT_LIMIT as i64 + 1).await.unwrap();
        assert_eq!(last.title, format!("Role {}", DEFAULT_LIMIT));
        assert!(matches!(store.get(999).await, Err(StoreError::NotFound(999))));
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let store = MemoryJobStore::new();
        let err = store.update(9, &JobUpdate::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(9)));
        let err = store.delete(9).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(9)));
    }

    #[tokio::test]
    async fn update_merges_partial_payload() {
        let store = MemoryJobStore::new();
        let mut job = posting("Dev", "Acme", Some("2024-01-05"));
        job.notes = Some("recruiter call".into());
        let created = store.create(&job).await.unwrap();

        let update = JobUpdate {
            status: Some(JobStatus::Interview),
            notes: Patch::Clear,
            ..Default::default()
        };
        let updated = store.update(created.id, &update).await.unwrap();
        assert_eq!(updated.status, JobStatus::Interview);
        assert_eq!(updated.notes, None);
        assert_eq!(updated.applied_date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryJobStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.list().await, Err(StoreError::Unavailable)));
        store.set_unavailable(false);
        assert!(store.list().await.unwrap().is_empty());
    }
}
