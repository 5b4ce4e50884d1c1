use tracing::{debug, info};

use super::confirm::{Confirmation, PendingAction};
use super::form::{FormInput, FormMode, JobForm};
use super::metrics::DashboardMetrics;
use crate::api::job::models::Job;
use crate::api::job::service::JobService;

/// What the modal area is showing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Modal {
    #[default]
    Closed,
    Form(JobForm),
}

/// State of the job list screen, from mount to unmount.
///
/// Owns the fetched list, the open form (if any), the pending confirmation
/// and the one message currently shown. Every successful mutation refetches
/// the whole list.
pub struct JobListView {
    service: JobService,
    jobs: Vec<Job>,
    modal: Modal,
    confirmation: Confirmation,
    message: Option<String>,
}

impl JobListView {
    /// Mount the screen and load the list.
    pub async fn mount(service: JobService) -> Self {
        info!("Mounting job list view");
        let mut view = Self {
            service,
            jobs: Vec::new(),
            modal: Modal::Closed,
            confirmation: Confirmation::default(),
            message: None,
        };
        view.refresh().await;
        view
    }

    /// Tear the screen down. Outstanding requests are not cancelled.
    pub fn unmount(self) {
        info!("Unmounting job list view with {} jobs loaded", self.jobs.len());
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn form(&self) -> Option<&JobForm> {
        match &self.modal {
            Modal::Form(form) => Some(form),
            Modal::Closed => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.confirmation.pending()
    }

    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::from_jobs(&self.jobs)
    }

    /// Refetch the authoritative list. On failure the previous list stays
    /// and the failure becomes the current message.
    pub async fn refresh(&mut self) {
        match self.service.list().await {
            Ok(jobs) => self.jobs = jobs,
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    pub fn open_create(&mut self) {
        self.message = None;
        self.modal = Modal::Form(JobForm::blank());
    }

    /// Finds a job in the loaded list, falling back to the backend for ids
    /// past the first page.
    async fn locate(&mut self, id: i64) -> Option<Job> {
        if let Some(job) = self.jobs.iter().find(|job| job.id == id) {
            return Some(job.clone());
        }
        match self.service.get(id).await {
            Ok(Some(job)) => Some(job),
            Ok(None) => {
                self.message = Some(format!("Job {} not found.", id));
                None
            }
            Err(err) => {
                self.message = Some(err.to_string());
                None
            }
        }
    }

    /// Opens the edit form for a job.
    pub async fn open_edit(&mut self, id: i64) -> bool {
        let Some(job) = self.locate(id).await else {
            return false;
        };
        self.message = None;
        self.modal = Modal::Form(JobForm::edit(&job));
        true
    }

    pub fn input(&mut self, input: FormInput) {
        if let Modal::Form(form) = &mut self.modal {
            if let Err(err) = form.apply(input) {
                self.message = Some(err.to_string());
            }
        }
    }

    /// Validate and save the open form. Returns true when the save went
    /// through; the form then closes and the list is refetched.
    pub async fn submit(&mut self) -> bool {
        let Modal::Form(form) = &self.modal else {
            return false;
        };
        self.message = None;

        let result = match form.mode() {
            FormMode::Create => self.service.create(form.candidate()).await,
            FormMode::Edit(id) => self.service.update(id, form.candidate()).await,
        };

        match result {
            Ok(job) => {
                debug!("Saved job {}", job.id);
                self.modal = Modal::Closed;
                self.refresh().await;
                true
            }
            Err(err) => {
                self.message = Some(err.to_string());
                false
            }
        }
    }

    /// Close the form, asking first if it has unsaved changes.
    pub fn request_close(&mut self) {
        if matches!(&self.modal, Modal::Form(form) if form.is_dirty()) {
            self.confirmation.request(PendingAction::DiscardChanges);
        } else {
            self.modal = Modal::Closed;
        }
    }

    pub async fn request_delete(&mut self, id: i64) -> Option<&PendingAction> {
        let job = self.locate(id).await?;
        let label = format!("{} at {}", job.title, job.company);
        Some(self.confirmation.request(PendingAction::Delete { id, label }))
    }

    /// Run the pending action. Returns true when the action itself went
    /// through; a failed refetch after a delete only sets the message.
    pub async fn confirm(&mut self) -> bool {
        match self.confirmation.confirm() {
            Some(PendingAction::Delete { id, .. }) => match self.service.delete(id).await {
                Ok(()) => {
                    self.message = None;
                    self.refresh().await;
                    true
                }
                Err(err) => {
                    self.message = Some(err.to_string());
                    false
                }
            },
            Some(PendingAction::DiscardChanges) => {
                self.modal = Modal::Closed;
                true
            }
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        if let Some(action) = self.confirmation.cancel() {
            debug!("Cancelled {:?}", action);
        }
    }
}
