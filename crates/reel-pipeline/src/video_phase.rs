//! Video phase: fan out generation job creation.
//!
//! Reconciles descriptions with first-frame images, creates one
//! generation job per storyboard slot and streams the resulting
//! handles. Job creation is fail-soft per item: a creation error
//! becomes a sentinel handle without a job id instead of aborting the
//! batch.

use serde::Deserialize;
use tracing::{error, info};

use reel_genai::GenerationJobs;
use reel_models::{FirstFrameImage, Phase, Video, VideoDescription};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::fanout::drain_as_completed;
use crate::reconcile::{reconcile, ReconciledScene};
use crate::stream::ChunkSender;

/// Inbound payload of the video phase.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoPhaseRequest {
    pub descriptions: Vec<VideoDescription>,
    pub images: Vec<FirstFrameImage>,
    /// Regeneration contract: handles whose index already carries a
    /// job id are not re-created.
    #[serde(default)]
    pub videos: Vec<Video>,
}

/// Drive the video phase, returning the full handle set.
pub async fn run_video_phase(
    jobs: &dyn GenerationJobs,
    config: &PipelineConfig,
    request: VideoPhaseRequest,
    chunks: &ChunkSender,
) -> PipelineResult<Vec<Video>> {
    if request.descriptions.is_empty() {
        return Err(PipelineError::invalid_input("video descriptions not found"));
    }
    if request.images.is_empty() {
        return Err(PipelineError::invalid_input("first frame images not found"));
    }
    if request.descriptions.len() > config.max_storyboards
        || request.images.len() > config.max_storyboards
    {
        return Err(PipelineError::invalid_input(format!(
            "storyboard count exceeds limit of {}",
            config.max_storyboards
        )));
    }

    let scenes = reconcile(&request.descriptions, &request.images)?;

    // Everything below creates remote jobs; rejected inputs never get here
    chunks.phase(Phase::Video).await?;

    let mut videos: Vec<Video> = request
        .videos
        .into_iter()
        .filter(|v| v.job_id.is_some() && v.index < scenes.len())
        .collect();
    let existing: Vec<usize> = videos.iter().map(|v| v.index).collect();

    info!(
        total = scenes.len(),
        reused = existing.len(),
        "Creating generation jobs"
    );

    let tasks = scenes
        .into_iter()
        .filter(|scene| !existing.contains(&scene.slot))
        .map(|scene| create_job(jobs, scene));
    videos.extend(drain_as_completed(tasks).await);

    videos.sort_by_key(|v| v.index);

    chunks.videos(videos.clone()).await?;
    chunks.done().await?;

    Ok(videos)
}

/// Create one generation job; errors collapse into the sentinel handle.
async fn create_job(jobs: &dyn GenerationJobs, scene: ReconciledScene) -> Video {
    let Some(image) = scene.image.primary_image() else {
        error!(index = scene.slot, "No first-frame image reference for slot");
        return Video::creation_failed(scene.slot);
    };

    match jobs.create(&scene.description.description, image).await {
        Ok(job_id) => {
            info!(index = scene.slot, job_id = %job_id, "Created generation job");
            Video::with_job(scene.slot, job_id)
        }
        Err(e) => {
            error!(index = scene.slot, error = %e, "Failed to create generation job");
            Video::creation_failed(scene.slot)
        }
    }
}
