use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use validator::Validate;

/// Job status enum representing where an application currently stands
#[derive(Debug, Default, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    #[default]
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Saved,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Saved => "Saved",
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job status '{0}', expected one of Saved, Applied, Interview, Offer, Rejected")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A job application as returned by the backend.
///
/// The backend owns `id`, `created_at` and `updated_at`; the client only ever
/// holds a read-only copy from the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: JobStatus,
    #[serde(default)]
    pub applied_date: Option<NaiveDate>,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub resume_path: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub job_board_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Candidate payload for creating a job.
///
/// Dates stay as text until the validator has looked at them, so a
/// malformed value can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct JobCreate {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub company: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub job_board_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl JobCreate {
    pub fn new(title: impl Into<String>, company: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            ..Default::default()
        }
    }
}

impl From<&Job> for JobCreate {
    fn from(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            status: job.status,
            applied_date: job.applied_date.map(|d| d.to_string()),
            follow_up_date: job.follow_up_date.map(|d| d.to_string()),
            job_link: job.job_link.clone(),
            job_description: job.job_description.clone(),
            resume_path: job.resume_path.clone(),
            job_board_id: job.job_board_id.clone(),
            source: job.source.clone(),
            notes: job.notes.clone(),
        }
    }
}

/// One attribute of a partial update: leave it alone, clear it, or set it.
///
/// `Keep` is omitted from the payload, `Clear` is sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Patch::Clear, Patch::Set)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

/// Partial update payload; every attribute is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub applied_date: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub follow_up_date: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub job_link: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub job_description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub resume_path: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub job_board_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub source: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub notes: Patch<String>,
}

impl JobUpdate {
    /// Applies the update on top of an existing candidate, producing the
    /// record the backend is expected to hold afterwards.
    pub fn apply_to(&self, base: &JobCreate) -> JobCreate {
        fn patched(patch: &Patch<String>, current: &Option<String>) -> Option<String> {
            match patch {
                Patch::Keep => current.clone(),
                Patch::Clear => None,
                Patch::Set(value) => Some(value.clone()),
            }
        }

        JobCreate {
            title: self.title.clone().unwrap_or_else(|| base.title.clone()),
            company: self.company.clone().unwrap_or_else(|| base.company.clone()),
            location: self.location.clone().unwrap_or_else(|| base.location.clone()),
            status: self.status.unwrap_or(base.status),
            applied_date: patched(&self.applied_date, &base.applied_date),
            follow_up_date: patched(&self.follow_up_date, &base.follow_up_date),
            job_link: patched(&self.job_link, &base.job_link),
            job_description: patched(&self.job_description, &base.job_description),
            resume_path: patched(&self.resume_path, &base.resume_path),
            job_board_id: patched(&self.job_board_id, &base.job_board_id),
            source: patched(&self.source, &base.source),
            notes: patched(&self.notes, &base.notes),
        }
    }
}

/// Full-object update: every attribute is sent, absent ones as `null`.
impl From<JobCreate> for JobUpdate {
    fn from(job: JobCreate) -> Self {
        Self {
            title: Some(job.title),
            company: Some(job.company),
            location: Some(job.location),
            status: Some(job.status),
            applied_date: job.applied_date.into(),
            follow_up_date: job.follow_up_date.into(),
            job_link: job.job_link.into(),
            job_description: job.job_description.into(),
            resume_path: job.resume_path.into(),
            job_board_id: job.job_board_id.into(),
            source: job.source.into(),
            notes: job.notes.into(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Treats `null`, a missing key and a blank string the same way.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

fn status_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<JobStatus, D::Error> {
    blank_as_none(deserializer).map(Option::unwrap_or_default)
}
