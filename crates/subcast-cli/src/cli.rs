//! Argument parsing and command dispatch for the `subcast` CLI.

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use subcast_api::dto::{
    EventsResponse, HealthResponse, StatusResponse, SubmitDownloadRequest, SubmitResponse,
    SubmitTranslationRequest,
};
use subcast_domain::JobId;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, classify_problem, parse_url};
use crate::output::{OutputFormat, render_events, render_health, render_status, render_submit};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let request_id = Uuid::new_v4().to_string();

    let result = dispatch(cli, &request_id).await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, request_id: &str) -> CliResult<()> {
    let output = cli.output;
    let ctx = AppContext::from_cli(&cli, request_id)?;

    match cli.command {
        Command::SubmitDownload(args) => handle_submit_download(&ctx, args, output).await,
        Command::SubmitTranslation(args) => handle_submit_translation(&ctx, args, output).await,
        Command::Status(args) => handle_status(&ctx, args, output).await,
        Command::Events(args) => handle_events(&ctx, args, output).await,
        Command::Health(_args) => handle_health(&ctx, output).await,
    }
}

#[derive(Parser)]
#[command(name = "subcast", about = "Operator CLI for the subtitle job orchestrator")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "SUBCAST_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "SUBCAST_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a download job for a video's subtitles.
    SubmitDownload(SubmitDownloadArgs),
    /// Submit a translation job for an existing subtitle file.
    SubmitTranslation(SubmitTranslationArgs),
    /// Fetch the current status of a job.
    Status(JobArgs),
    /// Fetch the audit trail for a job, newest first.
    Events(JobArgs),
    /// Check orchestrator and dependency health.
    Health(HealthArgs),
}

#[derive(Args)]
struct SubmitDownloadArgs {
    #[arg(help = "Source video location (local path or remote URL)")]
    video_url: String,
    #[arg(long, help = "Requested subtitle language (two-letter lowercase code)")]
    target_language: String,
    #[arg(long)]
    video_title: Option<String>,
    #[arg(long)]
    imdb_id: Option<String>,
}

#[derive(Args)]
struct SubmitTranslationArgs {
    #[arg(help = "Filesystem path to the subtitle file to translate")]
    subtitle_path: String,
    #[arg(long, help = "Language the subtitle file is currently written in")]
    source_language: String,
    #[arg(long, help = "Language the subtitle file should be translated into")]
    target_language: String,
    #[arg(long)]
    video_title: Option<String>,
}

#[derive(Args)]
struct JobArgs {
    #[arg(help = "Job identifier")]
    job_id: JobId,
}

#[derive(Args, Default)]
struct HealthArgs {}

async fn handle_submit_download(
    ctx: &AppContext,
    args: SubmitDownloadArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let video_url = args.video_url.trim();
    if video_url.is_empty() {
        return Err(CliError::validation("video_url must not be empty"));
    }

    let request = SubmitDownloadRequest {
        video_url: video_url.to_string(),
        target_language: args.target_language,
        video_title: args.video_title,
        imdb_id: args.imdb_id,
    };

    let url = ctx
        .base_url
        .join("/v1/downloads")
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;

    let response = ctx
        .client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/downloads failed: {err}")))?;

    if response.status().is_success() {
        let body = response
            .json::<SubmitResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse submit response: {err}")))?;
        render_submit(&body, output)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn handle_submit_translation(
    ctx: &AppContext,
    args: SubmitTranslationArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let subtitle_path = args.subtitle_path.trim();
    if subtitle_path.is_empty() {
        return Err(CliError::validation("subtitle_path must not be empty"));
    }

    let request = SubmitTranslationRequest {
        subtitle_path: subtitle_path.to_string(),
        source_language: args.source_language,
        target_language: args.target_language,
        video_title: args.video_title,
    };

    let url = ctx
        .base_url
        .join("/v1/translations")
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;

    let response = ctx
        .client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/translations failed: {err}")))?;

    if response.status().is_success() {
        let body = response
            .json::<SubmitResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse submit response: {err}")))?;
        render_submit(&body, output)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn handle_status(ctx: &AppContext, args: JobArgs, output: OutputFormat) -> CliResult<()> {
    let url = ctx
        .base_url
        .join(&format!("/v1/jobs/{}", args.job_id))
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;

    let response = ctx
        .client
        .get(url)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/jobs/{{id}} failed: {err}")))?;

    if response.status().is_success() {
        let body = response
            .json::<StatusResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse status response: {err}")))?;
        render_status(&body, output)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn handle_events(ctx: &AppContext, args: JobArgs, output: OutputFormat) -> CliResult<()> {
    let url = ctx
        .base_url
        .join(&format!("/v1/jobs/{}/events", args.job_id))
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;

    let response = ctx.client.get(url).send().await.map_err(|err| {
        CliError::failure(anyhow!("request to /v1/jobs/{{id}}/events failed: {err}"))
    })?;

    if response.status().is_success() {
        let body = response
            .json::<EventsResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse events response: {err}")))?;
        render_events(&body, output)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn handle_health(ctx: &AppContext, output: OutputFormat) -> CliResult<()> {
    let url = ctx
        .base_url
        .join("/health")
        .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))?;

    let response = ctx
        .client
        .get(url)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /health failed: {err}")))?;

    if response.status().is_success() {
        let body = response
            .json::<HealthResponse>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse health response: {err}")))?;
        render_health(&body, output)
    } else {
        Err(classify_problem(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    fn context_for(server: &MockServer) -> AppContext {
        AppContext {
            client: reqwest::Client::new(),
            base_url: server.base_url().parse().expect("valid URL"),
        }
    }

    #[tokio::test]
    async fn submit_download_posts_and_renders() {
        let server = MockServer::start_async().await;
        let job_id = JobId::new();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/downloads");
            then.status(202)
                .header("content-type", "application/json")
                .json_body(json!({"job_id": job_id, "deduplicated": false}));
        });

        let ctx = context_for(&server);
        let args = SubmitDownloadArgs {
            video_url: "/media/movie.mkv".to_string(),
            target_language: "es".to_string(),
            video_title: None,
            imdb_id: None,
        };

        handle_submit_download(&ctx, args, OutputFormat::Table)
            .await
            .expect("submit download should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn submit_download_rejects_empty_video_url() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server);
        let args = SubmitDownloadArgs {
            video_url: "  ".to_string(),
            target_language: "es".to_string(),
            video_title: None,
            imdb_id: None,
        };

        let err = handle_submit_download(&ctx, args, OutputFormat::Table)
            .await
            .expect_err("blank video_url should fail validation");
        assert!(matches!(err, CliError::Validation(message) if message.contains("video_url")));
    }

    #[tokio::test]
    async fn status_surfaces_not_found_as_validation_error() {
        let server = MockServer::start_async().await;
        let job_id = JobId::new();
        let path = format!("/v1/jobs/{job_id}");
        server.mock(move |when, then| {
            when.method(GET).path(path.as_str());
            then.status(404)
                .header("content-type", "application/json")
                .json_body(json!({
                    "error_type": "not_found",
                    "status": 404,
                    "detail": "job not found"
                }));
        });

        let ctx = context_for(&server);
        let err = handle_status(&ctx, JobArgs { job_id }, OutputFormat::Table)
            .await
            .expect_err("missing job should fail");
        assert!(matches!(err, CliError::Validation(message) if message.contains("job not found")));
    }

    #[tokio::test]
    async fn health_fetches_and_renders() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "status": "ok",
                    "broker_connected": true,
                    "store_connected": true
                }));
        });

        let ctx = context_for(&server);
        handle_health(&ctx, OutputFormat::Json)
            .await
            .expect("health check should succeed");
    }
}
