//! URL submission and queue status.

use super::API_PREFIX;
use crate::client::UrlqueryClient;
use crate::decode::decode_response;
use crate::error::UrlqueryError;
use crate::types::{QueuedJob, SubmitJob};
use crate::utils::{encode_path_segment, filter_tags, require_non_empty};
use reqwest::Method;

impl UrlqueryClient {
    /// Submit a URL for sandbox analysis.
    ///
    /// Invalid tags are dropped (with a warning) before sending. The POST is
    /// never retried.
    pub async fn submit(&self, job: &SubmitJob) -> Result<QueuedJob, UrlqueryError> {
        let job = prepare_job(job)?;
        let body = serde_json::to_vec(&job)
            .map_err(|e| UrlqueryError::internal(format!("Failed to encode submission: {}", e)))?;

        let path = format!("{}/submit/url", API_PREFIX);
        let response = self.send(Method::POST, &path, Some(body)).await?;

        Ok(decode_response::<QueuedJob>(response)
            .await?
            .unwrap_or_default())
    }

    /// Current state of a queued submission.
    pub async fn queue_status(&self, queue_id: &str) -> Result<QueuedJob, UrlqueryError> {
        let queue_id = encode_path_segment("queue id", queue_id)?;

        let path = format!("{}/submit/status/{}", API_PREFIX, queue_id);
        let response = self.send(Method::GET, &path, None).await?;

        Ok(decode_response::<QueuedJob>(response)
            .await?
            .unwrap_or_default())
    }
}

/// Validate a submission and return the copy that goes on the wire.
pub(crate) fn prepare_job(job: &SubmitJob) -> Result<SubmitJob, UrlqueryError> {
    require_non_empty("url", &job.url)?;

    let mut prepared = job.clone();
    prepared.url = job.url.trim().to_string();
    prepared.tags = filter_tags(&job.tags);
    prepared.useragent = job
        .useragent
        .as_ref()
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty());
    prepared.referer = job
        .referer
        .as_ref()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(prepared)
}
