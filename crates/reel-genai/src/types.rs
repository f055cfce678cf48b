//! Generation service request/response types.

use serde::{Deserialize, Serialize};

use reel_models::GenerationStatus;

/// One content item of a job-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentItem {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ImageUrl {
    pub url: String,
}

/// Request body for creating a generation job.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateJobRequest {
    /// Model/endpoint id serving the job
    pub model: String,
    /// Prompt text plus the first-frame image reference
    pub content: Vec<ContentItem>,
}

/// Response body of a job-creation call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreateJobResponse {
    pub id: String,
}

/// Response body of a job-status poll.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PollJobResponse {
    pub status: GenerationStatus,
    #[serde(default)]
    pub content: Option<PollJobContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PollJobContent {
    pub video_url: Option<String>,
}

/// Polled state of a generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPoll {
    /// Current job status
    pub status: GenerationStatus,
    /// Result locator, present once the job succeeded
    pub video_url: Option<String>,
}

impl JobPoll {
    /// The result locator, or an invalid-response error if the service
    /// reported success without one.
    pub fn locator(&self) -> Option<&str> {
        self.video_url.as_deref()
    }
}

impl From<PollJobResponse> for JobPoll {
    fn from(resp: PollJobResponse) -> Self {
        Self {
            status: resp.status,
            video_url: resp.content.and_then(|c| c.video_url),
        }
    }
}
