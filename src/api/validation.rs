use chrono::{DateTime, NaiveDate};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::api::job::models::{JobCreate, JobStatus};

/// Reasons a candidate record cannot be submitted.
///
/// Only one is ever reported at a time; the display text is the line shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Must specify Title, Company and Location for job.")]
    MissingRequiredFields,

    #[error("{0} is not a valid date. Use YYYY-MM-DD.")]
    InvalidDate(DateField),

    #[error("Follow-up date cannot be before application date.")]
    InvalidDateOrder,

    #[error("Please enter the date you applied for this position.")]
    MissingAppliedDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    AppliedDate,
    FollowUpDate,
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateField::AppliedDate => f.write_str("Application date"),
            DateField::FollowUpDate => f.write_str("Follow-up date"),
        }
    }
}

/// Decides whether a candidate may be handed to the store.
///
/// Rules run in a fixed order and the first failure wins:
/// 1. title, company and location are non-blank
/// 2. dates parse, and the follow-up date is not before the applied date
/// 3. an `Applied` job carries an applied date
pub fn validate(candidate: &JobCreate) -> Result<(), ValidationError> {
    if candidate.validate().is_err() {
        debug!("Candidate rejected: blank required field");
        return Err(ValidationError::MissingRequiredFields);
    }

    let applied = parse_optional_date(candidate.applied_date.as_deref(), DateField::AppliedDate)?;
    let follow_up = parse_optional_date(candidate.follow_up_date.as_deref(), DateField::FollowUpDate)?;
    if let (Some(applied), Some(follow_up)) = (applied, follow_up) {
        if follow_up < applied {
            debug!("Candidate rejected: follow-up {} before applied {}", follow_up, applied);
            return Err(ValidationError::InvalidDateOrder);
        }
    }

    if candidate.status == JobStatus::Applied && applied.is_none() {
        return Err(ValidationError::MissingAppliedDate);
    }

    Ok(())
}

/// Parses a calendar date, ignoring any time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_optional_date(raw: Option<&str>, field: DateField) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or(ValidationError::InvalidDate(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> JobCreate {
        JobCreate::new("Backend Engineer", "Acme", "Remote")
    }

    #[test]
    fn accepts_minimal_candidate() {
        assert_eq!(validate(&candidate()), Ok(()));
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        for (title, company, location) in [
            ("", "Acme", "Remote"),
            ("Dev", "   ", "Remote"),
            ("Dev", "Acme", "\t\n"),
            ("", "", ""),
        ] {
            let job = JobCreate::new(title, company, location);
            assert_eq!(validate(&job), Err(ValidationError::MissingRequiredFields));
        }
    }

    #[test]
    fn follow_up_before_applied_is_rejected() {
        let mut job = candidate();
        job.applied_date = Some("2024-01-10".into());
        job.follow_up_date = Some("2024-01-01".into());
        assert_eq!(validate(&job), Err(ValidationError::InvalidDateOrder));
    }

    #[test]
    fn same_day_follow_up_is_allowed() {
        let mut job = candidate();
        job.applied_date = Some("2024-01-10".into());
        job.follow_up_date = Some("2024-01-10T18:00:00Z".into());
        assert_eq!(validate(&job), Ok(()));
    }

    #[test]
    fn applied_status_needs_applied_date() {
        let mut job = candidate();
        job.status = JobStatus::Applied;
        assert_eq!(validate(&job), Err(ValidationError::MissingAppliedDate));

        job.applied_date = Some("  ".into());
        assert_eq!(validate(&job), Err(ValidationError::MissingAppliedDate));

        job.applied_date = Some("2024-02-01".into());
        assert_eq!(validate(&job), Ok(()));
    }

    #[test]
    fn required_fields_win_over_later_rules() {
        let mut job = JobCreate::new("", "Acme", "Remote");
        job.status = JobStatus::Applied;
        job.applied_date = Some("2024-01-10".into());
        job.follow_up_date = Some("2024-01-01".into());
        assert_eq!(validate(&job), Err(ValidationError::MissingRequiredFields));

        let mut job = candidate();
        job.status = JobStatus::Applied;
        job.follow_up_date = Some("2024-01-01".into());
        assert_eq!(validate(&job), Err(ValidationError::MissingAppliedDate));
    }

    #[test]
    fn unparseable_date_is_reported() {
        let mut job = candidate();
        job.applied_date = Some("last tuesday".into());
        assert_eq!(
            validate(&job),
            Err(ValidationError::InvalidDate(DateField::AppliedDate))
        );
        assert_eq!(
            ValidationError::InvalidDate(DateField::AppliedDate).to_string(),
            "Application date is not a valid date. Use YYYY-MM-DD."
        );
    }

    #[test]
    fn validation_does_not_touch_candidate() {
        let mut job = candidate();
        job.title = "  padded  ".into();
        let before = job.clone();
        validate(&job).unwrap();
        assert_eq!(job, before);
    }
}
