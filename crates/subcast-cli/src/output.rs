//! Output renderers for CLI commands: a human-readable table view and a
//! machine-readable JSON view, selected with `--output`.

use anyhow::anyhow;
use clap::ValueEnum;
use subcast_api::dto::{EventsResponse, HealthResponse, StatusResponse, SubmitResponse};

use crate::client::{CliError, CliResult};

/// Output format shared across every rendering command.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Aligned, human-readable table output (the default).
    #[default]
    Table,
    /// Pretty-printed JSON, for scripting.
    Json,
}

pub(crate) fn render_submit(response: &SubmitResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(response)?,
        OutputFormat::Table => {
            println!("job_id: {}", response.job_id);
            println!("deduplicated: {}", response.deduplicated);
        }
    }
    Ok(())
}

pub(crate) fn render_status(response: &StatusResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(response)?,
        OutputFormat::Table => {
            println!("job_id: {}", response.job_id);
            println!("status: {:?}", response.status);
            println!("progress: {}%", response.progress_percentage);
            if let Some(path) = &response.result_path {
                println!("result_path: {path}");
            }
            if let Some(message) = &response.error_message {
                println!("error: {message}");
            }
            println!("created_at: {}", response.created_at);
            println!("updated_at: {}", response.updated_at);
        }
    }
    Ok(())
}

pub(crate) fn render_events(response: &EventsResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(response)?,
        OutputFormat::Table => {
            if response.events.is_empty() {
                println!("no events recorded for this job");
            }
            for entry in &response.events {
                println!("{} {:?}", entry.received_at, entry.envelope.payload);
            }
        }
    }
    Ok(())
}

pub(crate) fn render_health(response: &HealthResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(response)?,
        OutputFormat::Table => {
            println!("status: {}", response.status);
            println!("broker_connected: {}", response.broker_connected);
            println!("store_connected: {}", response.store_connected);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use subcast_domain::{JobId, JobStatus};

    #[test]
    fn render_status_table_does_not_error() {
        let response = StatusResponse {
            job_id: JobId::new(),
            status: JobStatus::DownloadQueued,
            progress_percentage: 10,
            result_path: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        render_status(&response, OutputFormat::Table).expect("table render succeeds");
        render_status(&response, OutputFormat::Json).expect("json render succeeds");
    }
}
