//! Submits a normalized [`SubmitRequest`] to the orchestrator's
//! `submit_download` operation over HTTP.

use reqwest::Client;
use subcast_api::dto::{SubmitDownloadRequest, SubmitResponse};
use subcast_domain::JobId;
use subcast_scanner::SubmitRequest;
use tracing::{info, warn};

/// `POST {orchestrator_url}/v1/downloads` for `request`, logging the outcome.
///
/// Returns the orchestrator-assigned `job_id` on acceptance, `None` on any
/// failure. Failures are logged rather than propagated: a missed submission
/// here is recovered by the periodic fallback resync, so the intake loop
/// that called this should keep running rather than abort on one bad
/// request.
pub(crate) async fn submit_download(
    client: &Client,
    orchestrator_url: &str,
    request: SubmitRequest,
) -> Option<JobId> {
    let body = SubmitDownloadRequest {
        video_url: request.video_url.clone(),
        target_language: request.target_language,
        video_title: request.video_title,
        imdb_id: None,
    };

    let url = format!("{orchestrator_url}/v1/downloads");
    match client.post(&url).json(&body).send().await {
        Ok(response) if response.status().is_success() => match response.json::<SubmitResponse>().await {
            Ok(submitted) => {
                info!(video_url = %request.video_url, job_id = %submitted.job_id, "submitted download to orchestrator");
                Some(submitted.job_id)
            }
            Err(err) => {
                warn!(video_url = %request.video_url, error = %err, "orchestrator response body was not a valid submission");
                None
            }
        },
        Ok(response) => {
            warn!(video_url = %request.video_url, status = %response.status(), "orchestrator rejected submission");
            None
        }
        Err(err) => {
            warn!(video_url = %request.video_url, error = %err, "failed to reach orchestrator");
            None
        }
    }
}
