use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::cli::{Command, JobArgs};
use job_tracker::api::import::ImportSession;
use job_tracker::api::job::dto::SearchFilters;
use job_tracker::api::job::JobService;
use job_tracker::config::Config;
use job_tracker::view::table::{render_jobs, render_preview};
use job_tracker::view::{DashboardMetrics, JobListView};

/// Ask a yes/no question on the terminal; anything but `y`/`yes` is a no.
async fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{} [y/N] ", prompt).as_bytes()).await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Mount the list screen, failing if even the first load did not work.
async fn mount(service: JobService) -> Result<JobListView> {
    let view = JobListView::mount(service).await;
    if let Some(message) = view.message() {
        bail!("{}", message);
    }
    Ok(view)
}

async fn save(mut view: JobListView, fields: JobArgs, done: &str) -> Result<()> {
    for input in fields.inputs() {
        view.input(input);
        if let Some(message) = view.message() {
            bail!("{}", message);
        }
    }

    if !view.submit().await {
        bail!("{}", view.message().unwrap_or("Failed to save job. Please try again."));
    }
    println!("{}", done);
    println!("{}", render_jobs(view.jobs()));
    view.unmount();
    Ok(())
}

pub async fn run(command: Command, service: JobService, config: &Config) -> Result<()> {
    match command {
        Command::List => {
            let view = mount(service).await?;
            println!("{}", render_jobs(view.jobs()));
            view.unmount();
        }
        Command::Dashboard => {
            let view = mount(service).await?;
            println!("{}", view.metrics());
            view.unmount();
        }
        Command::Search(args) => {
            let filters = SearchFilters::from(args);
            let jobs = service.search(&filters).await?;
            println!("{}", render_jobs(&jobs));
        }
        Command::Add(fields) => {
            let mut view = mount(service).await?;
            view.open_create();
            save(view, fields, "Job added.").await?;
        }
        Command::Update { id, fields } => {
            let mut view = mount(service).await?;
            if !view.open_edit(id).await {
                bail!("{}", view.message().unwrap_or("Job not found."));
            }
            save(view, fields, "Job updated.").await?;
        }
        Command::Delete { id, yes } => {
            let mut view = mount(service).await?;
            let prompt = view.request_delete(id).await.map(|action| action.prompt());
            let Some(prompt) = prompt else {
                bail!("{}", view.message().unwrap_or("Job not found."));
            };

            if yes || confirm(&prompt).await? {
                if !view.confirm().await {
                    bail!("{}", view.message().unwrap_or("Failed to delete job. Please try again."));
                }
                println!("Job deleted.");
                if let Some(message) = view.message() {
                    eprintln!("{}", message);
                }
            } else {
                view.cancel();
                println!("Cancelled.");
            }
            view.unmount();
        }
        Command::Import { file, dry_run, yes } => {
            let filename = file.display().to_string();
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", filename))?;

            let mut session = ImportSession::new(config.max_import_size);
            session.load(&filename, &bytes);
            if let Some(err) = session.error() {
                bail!("{}", err);
            }
            if let Some(batch) = session.batch() {
                println!("{}", render_preview(batch));
            }
            if dry_run {
                return Ok(());
            }

            let count = session.batch().map(|batch| batch.len()).unwrap_or_default();
            if !yes && !confirm(&format!("Upload {} jobs?", count)).await? {
                println!("Cancelled.");
                return Ok(());
            }

            let created = service.upload(&session).await?;
            info!("Imported {} jobs from {}", created.len(), filename);
            println!("Uploaded {} jobs.", created.len());

            let jobs = service.list().await?;
            println!("{}", DashboardMetrics::from_jobs(&jobs));
        }
    }
    Ok(())
}
