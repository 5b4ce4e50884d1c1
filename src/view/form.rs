use std::str::FromStr;

use crate::api::job::models::{Job, JobCreate, JobStatus, UnknownStatus};

/// Input fields of the job form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Company,
    Location,
    Status,
    AppliedDate,
    FollowUpDate,
    JobLink,
    JobDescription,
    JobBoardId,
    Source,
    Notes,
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(FormField::Title),
            "company" => Ok(FormField::Company),
            "location" => Ok(FormField::Location),
            "status" => Ok(FormField::Status),
            "applied_date" => Ok(FormField::AppliedDate),
            "follow_up_date" => Ok(FormField::FollowUpDate),
            "job_link" => Ok(FormField::JobLink),
            "job_description" => Ok(FormField::JobDescription),
            "job_board_id" => Ok(FormField::JobBoardId),
            "source" => Ok(FormField::Source),
            "notes" => Ok(FormField::Notes),
            other => Err(format!("unknown form field: {}", other)),
        }
    }
}

/// A raw change event: the field and the text now in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub field: FormField,
    pub value: String,
}

impl FormInput {
    pub fn new(field: FormField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// The add/edit form: a candidate record plus the record it started from
#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    mode: FormMode,
    initial: JobCreate,
    candidate: JobCreate,
}

impl JobForm {
    pub fn blank() -> Self {
        Self {
            mode: FormMode::Create,
            initial: JobCreate::default(),
            candidate: JobCreate::default(),
        }
    }

    pub fn edit(job: &Job) -> Self {
        let initial = JobCreate::from(job);
        Self {
            mode: FormMode::Edit(job.id),
            candidate: initial.clone(),
            initial,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn candidate(&self) -> &JobCreate {
        &self.candidate
    }

    pub fn is_dirty(&self) -> bool {
        self.candidate != self.initial
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Job",
            FormMode::Edit(_) => "Update Job",
        }
    }

    /// Folds one input event into the candidate.
    ///
    /// An emptied or whitespace-only optional field becomes absent; required
    /// fields keep the raw text so the validator can report them. A status
    /// outside the enumeration leaves the candidate untouched.
    pub fn apply(&mut self, input: FormInput) -> Result<(), UnknownStatus> {
        let FormInput { field, value } = input;
        let optional = |value: String| if value.trim().is_empty() { None } else { Some(value) };

        let job = &mut self.candidate;
        match field {
            FormField::Title => job.title = value,
            FormField::Company => job.company = value,
            FormField::Location => job.location = value,
            FormField::Status => {
                job.status = if value.trim().is_empty() {
                    JobStatus::default()
                } else {
                    value.parse()?
                }
            }
            FormField::AppliedDate => job.applied_date = optional(value),
            FormField::FollowUpDate => job.follow_up_date = optional(value),
            FormField::JobLink => job.job_link = optional(value),
            FormField::JobDescription => job.job_description = optional(value),
            FormField::JobBoardId => job.job_board_id = optional(value),
            FormField::Source => job.source = optional(value),
            FormField::Notes => job.notes = optional(value),
        }
        Ok(())
    }
}
