//! Generation service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use reel_models::GenerationJobId;

use crate::error::{GenAiError, GenAiResult};
use crate::types::{
    ContentItem, CreateJobRequest, CreateJobResponse, ImageUrl, JobPoll, PollJobResponse,
};

/// Configuration for the generation client.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Base URL of the generation service
    pub base_url: String,
    /// Model/endpoint id used for job creation
    pub model: String,
    /// Bearer token, if the deployment requires one
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8100".to_string(),
            model: "cgt-default".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GenerationConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GENAI_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8100".to_string()),
            model: std::env::var("GENAI_MODEL").unwrap_or_else(|_| "cgt-default".to_string()),
            api_key: std::env::var("GENAI_API_KEY").ok(),
            timeout: Duration::from_secs(
                std::env::var("GENAI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Operations on remote generation jobs.
///
/// The trait seam lets the orchestrator run against in-memory doubles;
/// production code uses [`GenerationClient`].
#[async_trait]
pub trait GenerationJobs: Send + Sync {
    /// Create a job from a prompt and a first-frame image reference.
    async fn create(&self, prompt: &str, image_ref: &str) -> GenAiResult<GenerationJobId>;

    /// Poll a job's current status.
    async fn poll(&self, job_id: &GenerationJobId) -> GenAiResult<JobPoll>;
}

/// HTTP client for the generation service.
pub struct GenerationClient {
    http: Client,
    config: GenerationConfig,
}

impl GenerationClient {
    /// Create a new generation client.
    pub fn new(config: GenerationConfig) -> GenAiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenAiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GenAiResult<Self> {
        Self::new(GenerationConfig::from_env())
    }

    fn tasks_url(&self) -> String {
        format!("{}/content_generation/tasks", self.config.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl GenerationJobs for GenerationClient {
    async fn create(&self, prompt: &str, image_ref: &str) -> GenAiResult<GenerationJobId> {
        let body = CreateJobRequest {
            model: self.config.model.clone(),
            content: vec![
                ContentItem::Text {
                    text: prompt.to_string(),
                },
                ContentItem::ImageUrl {
                    image_url: ImageUrl {
                        url: image_ref.to_string(),
                    },
                },
            ],
        };

        debug!("Creating generation job at {}", self.tasks_url());

        let response = self
            .authorize(self.http.post(self.tasks_url()))
            .json(&body)
            .send()
            .await
            .map_err(GenAiError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenAiError::request_failed(format!(
                "job creation returned {}: {}",
                status, text
            )));
        }

        let created: CreateJobResponse = response.json().await?;
        Ok(GenerationJobId::from_string(created.id))
    }

    async fn poll(&self, job_id: &GenerationJobId) -> GenAiResult<JobPoll> {
        let url = format!("{}/{}", self.tasks_url(), job_id);

        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(GenAiError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenAiError::request_failed(format!(
                "job poll returned {}: {}",
                status, text
            )));
        }

        let polled: PollJobResponse = response.json().await?;
        Ok(polled.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_models::GenerationStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> GenerationClient {
        GenerationClient::new(GenerationConfig {
            base_url,
            model: "cgt-test".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_returns_job_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/content_generation/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "cgt-abc123"})))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let job_id = client.create("a red fox runs", "https://img/0.png").await.unwrap();
        assert_eq!(job_id.as_str(), "cgt-abc123");
    }

    #[tokio::test]
    async fn test_create_surfaces_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/content_generation/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let err = client.create("p", "i").await.unwrap_err();
        assert!(matches!(err, GenAiError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_poll_pending_has_no_locator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content_generation/tasks/cgt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let poll = client.poll(&GenerationJobId::from_string("cgt-1")).await.unwrap();
        assert_eq!(poll.status, GenerationStatus::Pending);
        assert!(poll.locator().is_none());
    }

    #[tokio::test]
    async fn test_poll_succeeded_carries_locator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content_generation/tasks/cgt-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "succeeded",
                "content": {"video_url": "https://cdn/video.mp4"}
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let poll = client.poll(&GenerationJobId::from_string("cgt-2")).await.unwrap();
        assert_eq!(poll.status, GenerationStatus::Succeeded);
        assert_eq!(poll.locator(), Some("https://cdn/video.mp4"));
    }
}
