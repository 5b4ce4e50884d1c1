use serde_json::Value;

use crate::api::import::ParsedBatch;
use crate::api::job::models::Job;

const MAX_CELL: usize = 32;

fn truncate(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL {
        return cell.to_string();
    }
    let mut short: String = cell.chars().take(MAX_CELL - 1).collect();
    short.push('…');
    short
}

fn render_grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers.to_vec())];
    out.push(line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// The jobs table: one row per job, `No jobs found.` when empty.
pub fn render_jobs(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return "No jobs found.".to_string();
    }

    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| {
            let source = job
                .source
                .as_deref()
                .or(job.job_link.as_deref())
                .unwrap_or("N/A");
            vec![
                job.id.to_string(),
                truncate(&job.title),
                truncate(&job.company),
                truncate(&job.location),
                job.status.to_string(),
                truncate(source),
                job.applied_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-/-/-".to_string()),
            ]
        })
        .collect();

    render_grid(
        &["ID", "Title", "Company", "Location", "Status", "Source", "Applied Date"],
        &rows,
    )
}

/// Preview of a parsed import before upload.
pub fn render_preview(batch: &ParsedBatch) -> String {
    if batch.is_empty() {
        return "No jobs to upload.".to_string();
    }

    let rows: Vec<Vec<String>> = batch
        .records
        .iter()
        .map(|record| {
            batch
                .columns
                .iter()
                .map(|column| match record.get(column) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(text)) => truncate(text),
                    Some(other) => truncate(&other.to_string()),
                })
                .collect()
        })
        .collect();

    let headers: Vec<&str> = batch.columns.iter().map(String::as_str).collect();
    render_grid(&headers, &rows)
}
