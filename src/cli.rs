use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use job_tracker::api::job::dto::{SearchFilters, SortField};
use job_tracker::api::job::models::JobStatus;
use job_tracker::view::{FormField, FormInput};

#[derive(Parser, Debug)]
#[command(name = "job-tracker", version, about = "Track job applications against the jobs API")]
pub struct Cli {
    /// Backend base URL (overrides JOBS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every job
    List,

    /// Show counts per status
    Dashboard,

    /// Filter and sort jobs on the backend
    Search(SearchArgs),

    /// Add a job
    Add(JobArgs),

    /// Edit a job; only the given fields change, an empty value clears a field
    Update {
        id: i64,
        #[command(flatten)]
        fields: JobArgs,
    },

    /// Delete a job
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Bulk-create jobs from a CSV or JSON file
    Import {
        file: PathBuf,
        /// Parse and preview only
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct JobArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// Saved, Applied, Interview, Offer or Rejected
    #[arg(long)]
    pub status: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub applied_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub follow_up_date: Option<String>,
    #[arg(long)]
    pub job_link: Option<String>,
    #[arg(long)]
    pub job_description: Option<String>,
    #[arg(long)]
    pub job_board_id: Option<String>,
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl JobArgs {
    /// The given flags as form input events, in form order
    pub fn inputs(self) -> Vec<FormInput> {
        [
            (FormField::Title, self.title),
            (FormField::Company, self.company),
            (FormField::Location, self.location),
            (FormField::Status, self.status),
            (FormField::AppliedDate, self.applied_date),
            (FormField::FollowUpDate, self.follow_up_date),
            (FormField::JobLink, self.job_link),
            (FormField::JobDescription, self.job_description),
            (FormField::JobBoardId, self.job_board_id),
            (FormField::Source, self.source),
            (FormField::Notes, self.notes),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| FormInput::new(field, value)))
        .collect()
    }
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub status: Option<JobStatus>,
    #[arg(long)]
    pub skip: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Column to sort on (default: applied_date)
    #[arg(long)]
    pub sort_by: Option<SortField>,
    /// Sort ascending instead of descending
    #[arg(long)]
    pub asc: bool,
}

impl From<SearchArgs> for SearchFilters {
    fn from(args: SearchArgs) -> Self {
        SearchFilters {
            company: args.company,
            title: args.title,
            location: args.location,
            status: args.status,
            skip: args.skip,
            limit: args.limit,
            sort_by: args.sort_by,
            sort_desc: args.asc.then_some(false),
        }
    }
}
