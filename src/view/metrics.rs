use std::fmt;

use serde::Serialize;

use crate::api::job::models::{Job, JobStatus};

/// Headline counts for the dashboard
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total: usize,
    pub applied: usize,
    pub interviewing: usize,
    pub offers: usize,
    pub rejected: usize,
}

impl DashboardMetrics {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        jobs.iter().fold(
            DashboardMetrics {
                total: jobs.len(),
                ..Default::default()
            },
            |mut metrics, job| {
                match job.status {
                    JobStatus::Applied => metrics.applied += 1,
                    JobStatus::Interview => metrics.interviewing += 1,
                    JobStatus::Offer => metrics.offers += 1,
                    JobStatus::Rejected => metrics.rejected += 1,
                    JobStatus::Saved => {}
                }
                metrics
            },
        )
    }
}

impl fmt::Display for DashboardMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total Jobs: {} | Applied: {} | Interviewing: {} | Offers: {} | Rejected: {}",
            self.total, self.applied, self.interviewing, self.offers, self.rejected
        )
    }
}
