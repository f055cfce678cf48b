//! Per-asset retrying downloads with exponential backoff.
//!
//! Each asset is materialized by exactly one task: poll (videos only),
//! fetch, store bytes in place. Pending states and transient errors
//! consume the attempt budget with an uncapped doubling backoff; a
//! backend-reported failure aborts immediately and is never retried.

use std::time::Duration;

use tracing::{info, warn};

use reel_genai::{is_remote_locator, AssetFetcher, GenerationJobs};
use reel_models::{Audio, GenerationStatus, Video};

use crate::error::{PipelineError, PipelineResult};

/// Retry policy for one asset class.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempt ceiling (including the first attempt)
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles each retry, uncapped
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }
}

/// Download one generated video clip into its byte buffer.
///
/// State machine per attempt: poll the job; on `succeeded` fetch the
/// result locator and finish; on `failed` abort immediately; on
/// `pending` or any transient error sleep the current backoff and
/// retry until the ceiling.
pub async fn download_video(
    jobs: &dyn GenerationJobs,
    fetcher: &dyn AssetFetcher,
    video: &mut Video,
    policy: RetryPolicy,
) -> PipelineResult<()> {
    let job_id = video
        .job_id
        .clone()
        .ok_or(PipelineError::GenerationFailed { index: video.index })?;

    let mut delay = policy.base_delay;

    for attempt in 1..=policy.max_attempts {
        match jobs.poll(&job_id).await {
            Ok(poll) => match poll.status {
                GenerationStatus::Succeeded => {
                    match fetch_locator(fetcher, poll.locator(), video.index).await {
                        Ok(bytes) => {
                            video.data = Some(bytes);
                            info!(index = video.index, "Downloaded video");
                            return Ok(());
                        }
                        Err(e) => {
                            warn!(index = video.index, error = %e, "Video fetch failed, retrying");
                        }
                    }
                }
                GenerationStatus::Failed => {
                    warn!(index = video.index, job_id = %job_id, "Video generation failed");
                    return Err(PipelineError::GenerationFailed { index: video.index });
                }
                GenerationStatus::Pending => {
                    info!(
                        index = video.index,
                        attempt = attempt,
                        "Video not ready yet, retrying after {:?}",
                        delay
                    );
                }
            },
            Err(e) => {
                warn!(index = video.index, error = %e, "Video status poll failed, retrying");
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    warn!(
        index = video.index,
        attempts = policy.max_attempts,
        "Video still not ready after final attempt"
    );
    Err(PipelineError::AssetNotReady {
        index: video.index,
        attempts: policy.max_attempts,
    })
}

/// Download one narration audio into its byte buffer.
///
/// Validates the locator up front; a malformed one fails fast without
/// consuming any attempt.
pub async fn download_audio(
    fetcher: &dyn AssetFetcher,
    audio: &mut Audio,
    policy: RetryPolicy,
) -> PipelineResult<()> {
    if !is_remote_locator(&audio.url) {
        return Err(PipelineError::InvalidAsset {
            index: audio.index,
            reason: format!("not a remote locator: {}", audio.url),
        });
    }

    let mut delay = policy.base_delay;

    for attempt in 1..=policy.max_attempts {
        match fetcher.fetch(&audio.url).await {
            Ok(bytes) => {
                audio.data = Some(bytes);
                info!(index = audio.index, "Downloaded audio");
                return Ok(());
            }
            Err(e) => {
                warn!(
                    index = audio.index,
                    attempt = attempt,
                    error = %e,
                    "Audio download failed"
                );
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    Err(PipelineError::AssetNotReady {
        index: audio.index,
        attempts: policy.max_attempts,
    })
}

async fn fetch_locator(
    fetcher: &dyn AssetFetcher,
    locator: Option<&str>,
    index: usize,
) -> PipelineResult<Vec<u8>> {
    let locator = locator.ok_or_else(|| {
        PipelineError::invalid_input(format!("job for index {} succeeded without a locator", index))
    })?;
    Ok(fetcher.fetch(locator).await?)
}
